//! Error types for duq-sql

use thiserror::Error;

/// SQL parsing and analysis errors
#[derive(Error, Debug)]
pub enum SqlError {
    /// SQL parse error (S001)
    #[error("[S001] SQL parse error at line {line}, column {column}: {message}")]
    ParseError {
        message: String,
        line: usize,
        column: usize,
    },

    /// Empty SQL (S002)
    #[error("[S002] SQL is empty")]
    EmptySql,

    /// Model body is not a query (S003)
    #[error("[S003] Expected a SELECT statement, found {0}")]
    NotASelect(String),

    /// More than one statement in a model (S004)
    #[error("[S004] Expected a single statement, found {0}")]
    MultipleStatements(usize),

    /// Table reference scopes could not be resolved (S005)
    #[error("[S005] Cannot resolve table references: {0}")]
    ScopeResolution(String),
}

/// Result type alias for SqlError
pub type SqlResult<T> = Result<T, SqlError>;
