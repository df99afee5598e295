//! Table reference extraction from a parsed query
//!
//! A query's references are collected across every nested scope (CTE bodies,
//! subqueries, joins, set operations, expression subqueries). Names bound by a
//! CTE anywhere in the query are then removed, so a CTE never shows up as an
//! external dependency even when a table of the same name exists.

use sqlparser::ast::{
    Ident, ObjectName, ObjectNamePart, Query, SetExpr, TableFactor, Visit, Visitor,
};
use std::collections::{BTreeSet, HashSet};
use std::ops::ControlFlow;

use crate::error::{SqlError, SqlResult};

/// Table references read by one query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRefs {
    /// Named relations, with CTE-bound names removed
    pub named: BTreeSet<String>,

    /// Anonymous references: table functions such as `read_csv('x.csv')`
    pub anonymous: usize,
}

impl TableRefs {
    /// True when every reference is anonymous (or there are none at all)
    pub fn is_anonymous_only(&self) -> bool {
        self.named.is_empty()
    }
}

#[derive(Default)]
struct RefCollector {
    relations: BTreeSet<String>,
    anonymous: usize,
    cte_names: HashSet<String>,
    duplicate_cte: Option<String>,
}

impl Visitor for RefCollector {
    type Break = ();

    fn pre_visit_query(&mut self, query: &Query) -> ControlFlow<Self::Break> {
        let Some(with) = &query.with else {
            return ControlFlow::Continue(());
        };
        let mut bound_here = HashSet::new();
        for cte in &with.cte_tables {
            let name = normalize_ident(&cte.alias.name);
            if !bound_here.insert(name.clone()) {
                self.duplicate_cte = Some(name);
                return ControlFlow::Break(());
            }
            self.cte_names.insert(name);
        }
        ControlFlow::Continue(())
    }

    fn pre_visit_table_factor(&mut self, factor: &TableFactor) -> ControlFlow<Self::Break> {
        match factor {
            TableFactor::Table { args: Some(_), .. } => self.anonymous += 1,
            TableFactor::Table { name, .. } => {
                self.relations.insert(object_name_to_string(name));
            }
            TableFactor::Function { .. } | TableFactor::TableFunction { .. } => {
                self.anonymous += 1
            }
            _ => {}
        }
        ControlFlow::Continue(())
    }
}

/// Collect the table references of a query.
///
/// Fails with [`SqlError::ScopeResolution`] when a single `WITH` clause binds
/// the same name twice, since references to that name cannot be resolved.
pub fn extract_table_refs(query: &Query) -> SqlResult<TableRefs> {
    let mut collector = RefCollector::default();
    if query.visit(&mut collector).is_break() {
        let name = collector.duplicate_cte.unwrap_or_default();
        return Err(SqlError::ScopeResolution(format!(
            "CTE '{}' is defined more than once in the same WITH clause",
            name
        )));
    }

    let RefCollector {
        relations,
        anonymous,
        cte_names,
        ..
    } = collector;

    Ok(TableRefs {
        named: relations
            .into_iter()
            .filter(|name| !cte_names.contains(name))
            .collect(),
        anonymous,
    })
}

/// The target name a query declares for itself via `SELECT ... INTO name`.
pub fn declared_target(query: &Query) -> Option<String> {
    match query.body.as_ref() {
        SetExpr::Select(select) => select
            .into
            .as_ref()
            .map(|into| object_name_to_string(&into.name)),
        _ => None,
    }
}

/// Last component of a possibly schema-qualified name.
///
/// `"main.orders"` -> `"orders"`, `"orders"` -> `"orders"`.
pub fn unqualified_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// Identifiers fold to lower case, quoted or not: DuckDB resolves both
/// `"Orders"` and `orders` to the same relation.
fn normalize_ident(ident: &Ident) -> String {
    ident.value.to_lowercase()
}

fn object_name_to_string(name: &ObjectName) -> String {
    name.0
        .iter()
        .map(|part| match part {
            ObjectNamePart::Identifier(ident) => normalize_ident(ident),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(".")
}

#[cfg(test)]
#[path = "extractor_test.rs"]
mod tests;
