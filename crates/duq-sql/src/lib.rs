//! duq-sql - SQL parsing layer for duq
//!
//! This crate wraps sqlparser-rs with the DuckDB dialect. It answers two
//! questions about a model's query: which named tables does it read (with
//! CTE-bound names removed), and what does the statement that materializes it
//! look like.

pub mod dialect;
pub mod error;
pub mod extractor;
pub mod parser;
pub mod render;

pub use dialect::{parse_duckdb, quote_ident};
pub use error::{SqlError, SqlResult};
pub use extractor::{declared_target, extract_table_refs, unqualified_name, TableRefs};
pub use parser::SqlParser;
pub use render::{render_materialization, Materialization};
