//! SQL parser wrapper

use crate::dialect::parse_duckdb;
use crate::error::{SqlError, SqlResult};
use sqlparser::ast::{Query, Statement};

/// SQL parser for model bodies, using the DuckDB grammar
pub struct SqlParser;

impl SqlParser {
    /// Create a new parser with DuckDB dialect
    pub fn duckdb() -> Self {
        Self
    }

    /// Parse SQL into AST statements
    pub fn parse(&self, sql: &str) -> SqlResult<Vec<Statement>> {
        let sql = sql.trim();
        if sql.is_empty() {
            return Err(SqlError::EmptySql);
        }

        parse_duckdb(sql)
    }

    /// Parse a model body: exactly one statement, and that statement must be
    /// a read query.
    pub fn parse_query(&self, sql: &str) -> SqlResult<Box<Query>> {
        let mut stmts = self.parse(sql)?;
        if stmts.len() > 1 {
            return Err(SqlError::MultipleStatements(stmts.len()));
        }
        match stmts.pop() {
            Some(Statement::Query(query)) => Ok(query),
            Some(other) => Err(SqlError::NotASelect(statement_kind(&other))),
            None => Err(SqlError::EmptySql),
        }
    }
}

/// Leading keywords of a statement, e.g. `CREATE TABLE`, for error messages.
fn statement_kind(stmt: &Statement) -> String {
    stmt.to_string()
        .split_whitespace()
        .take(2)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
#[path = "parser_test.rs"]
mod tests;
