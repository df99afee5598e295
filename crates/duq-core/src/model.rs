//! Model descriptors: one parsed SQL file each

use duq_sql::{
    declared_target, extract_table_refs, render_materialization, Materialization, SqlParser,
};
use sqlparser::ast::Query;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, CoreResult};
use crate::model_name::ModelName;

/// Origin label used in diagnostics for models parsed from a string
const INLINE_ORIGIN: &str = "<inline>";

/// A parsed model definition.
///
/// Built once per input file and never mutated afterwards. The parsed query
/// is kept so the materialization statement can be rendered without parsing
/// the text again.
#[derive(Debug, Clone)]
pub struct SqlModel {
    /// Model name, unique within a run
    pub name: ModelName,

    /// Named tables the query reads, CTE names excluded
    pub dependencies: BTreeSet<String>,

    /// Number of anonymous table references (`read_csv(...)` and friends)
    pub anonymous_refs: usize,

    /// Parsed query
    pub query: Box<Query>,

    /// Original SQL text
    pub source_sql: String,

    /// File the model was loaded from, if any
    pub origin: Option<PathBuf>,
}

impl SqlModel {
    /// Parse a model from SQL text.
    ///
    /// The name comes from a `SELECT ... INTO target` clause when present,
    /// otherwise from `origin`'s lower-cased file stem.
    pub fn parse(sql: &str, origin: Option<&Path>) -> CoreResult<Self> {
        let origin_label = origin_label(origin);
        let definition_error = |source| CoreError::ModelDefinition {
            origin: origin_label.clone(),
            source,
        };

        let query = SqlParser::duckdb()
            .parse_query(sql)
            .map_err(definition_error)?;
        let refs = extract_table_refs(&query).map_err(definition_error)?;

        let name = declared_target(&query)
            .and_then(ModelName::try_new)
            .or_else(|| origin.and_then(ModelName::from_path))
            .ok_or_else(|| CoreError::UnnamedModel {
                origin: origin_label.clone(),
            })?;

        log::debug!(
            "Parsed model '{}' from {} ({} named deps, {} anonymous refs)",
            name,
            origin_label,
            refs.named.len(),
            refs.anonymous
        );

        Ok(Self {
            name,
            dependencies: refs.named,
            anonymous_refs: refs.anonymous,
            query,
            source_sql: sql.to_string(),
            origin: origin.map(Path::to_path_buf),
        })
    }

    /// Read and parse a model file
    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let sql = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::parse(&sql, Some(path))
    }

    /// True when the model reads no named relation, only files or table
    /// functions.
    pub fn is_source_model(&self) -> bool {
        self.dependencies.is_empty()
    }

    /// Provenance for diagnostics and script headers
    pub fn origin_display(&self) -> String {
        origin_label(self.origin.as_deref())
    }

    /// The statement that materializes this model
    pub fn materialization_sql(&self, mode: Materialization) -> String {
        render_materialization(&self.query, &self.name, mode)
    }
}

fn origin_label(origin: Option<&Path>) -> String {
    origin
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| INLINE_ORIGIN.to_string())
}

#[cfg(test)]
#[path = "model_test.rs"]
mod tests;
