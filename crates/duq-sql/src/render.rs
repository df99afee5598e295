//! Materialization statement rendering

use serde::{Deserialize, Serialize};
use sqlparser::ast::{Query, SetExpr};
use std::borrow::Cow;
use std::fmt;

use crate::dialect::quote_ident;

/// How a model is persisted in the target database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Materialization {
    /// `CREATE OR REPLACE TABLE ... AS`
    #[default]
    Table,
    /// `CREATE OR REPLACE VIEW ... AS`
    View,
}

impl Materialization {
    /// SQL keyword for the relation kind
    pub fn keyword(self) -> &'static str {
        match self {
            Materialization::Table => "TABLE",
            Materialization::View => "VIEW",
        }
    }
}

impl fmt::Display for Materialization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Materialization::Table => write!(f, "table"),
            Materialization::View => write!(f, "view"),
        }
    }
}

/// Render `CREATE OR REPLACE <TABLE|VIEW> target AS <query>`.
///
/// The statement carries no trailing semicolon. A `SELECT ... INTO` clause on
/// the query is dropped, since the target comes from `target`.
pub fn render_materialization(query: &Query, target: &str, mode: Materialization) -> String {
    format!(
        "CREATE OR REPLACE {} {} AS {}",
        mode.keyword(),
        quote_qualified(target),
        without_into(query)
    )
}

fn without_into(query: &Query) -> Cow<'_, Query> {
    let has_into = matches!(query.body.as_ref(), SetExpr::Select(select) if select.into.is_some());
    if !has_into {
        return Cow::Borrowed(query);
    }
    let mut owned = query.clone();
    if let SetExpr::Select(select) = owned.body.as_mut() {
        select.into = None;
    }
    Cow::Owned(owned)
}

fn quote_qualified(name: &str) -> String {
    name.split('.')
        .map(quote_ident)
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;
