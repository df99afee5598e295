//! Database trait definition

use crate::error::DbResult;
use async_trait::async_trait;

/// Database abstraction used by the run driver.
///
/// Implementations must be Send + Sync: the driver shares one backend across
/// every concurrently dispatched model.
#[async_trait]
pub trait Database: Send + Sync {
    /// Execute one statement, returns affected rows
    async fn execute(&self, sql: &str) -> DbResult<usize>;

    /// Execute one or more `;`-separated statements
    async fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Check if a table or view exists. `schema.name` is accepted; an
    /// unqualified name is looked up in `main`.
    async fn relation_exists(&self, name: &str) -> DbResult<bool>;

    /// Number of rows a query returns
    async fn query_count(&self, sql: &str) -> DbResult<usize>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}
