//! DuckDB dialect helpers

use sqlparser::ast::Statement;
use sqlparser::dialect::DuckDbDialect;
use sqlparser::parser::Parser;

use crate::error::{SqlError, SqlResult};

/// Parse SQL text with the DuckDB grammar
pub fn parse_duckdb(sql: &str) -> SqlResult<Vec<Statement>> {
    Parser::parse_sql(&DuckDbDialect {}, sql).map_err(|e| {
        let msg = e.to_string();
        let (line, column) = parse_location_from_error(&msg);
        SqlError::ParseError {
            message: msg,
            line,
            column,
        }
    })
}

/// Double-quote an identifier, doubling embedded quotes
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Parse line and column from sqlparser error message.
///
/// `ParserError` carries no structured location, so "Line: N, Column: M" is
/// read back out of the message text. Returns `(0, 0)` when absent.
fn parse_location_from_error(msg: &str) -> (usize, usize) {
    let Some(line_idx) = msg.find("Line: ") else {
        return (0, 0);
    };
    let line_start = line_idx + 6;
    let Some(comma_idx) = msg[line_start..].find(',') else {
        return (0, 0);
    };
    let Ok(line) = msg[line_start..line_start + comma_idx]
        .trim()
        .parse::<usize>()
    else {
        return (0, 0);
    };
    let Some(col_idx) = msg.find("Column: ") else {
        return (0, 0);
    };
    let col_start = col_idx + 8;
    let col_end = msg[col_start..]
        .find(|c: char| !c.is_ascii_digit())
        .map(|i| col_start + i)
        .unwrap_or(msg.len());
    let Ok(column) = msg[col_start..col_end].trim().parse::<usize>() else {
        return (0, 0);
    };
    (line, column)
}

#[cfg(test)]
#[path = "dialect_test.rs"]
mod tests;
