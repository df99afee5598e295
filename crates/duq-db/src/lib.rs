//! duq-db - Database layer for duq
//!
//! This crate provides the `Database` trait models are materialized through,
//! and its DuckDB implementation.

pub mod duckdb;
pub mod error;
pub mod traits;

pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use traits::Database;
