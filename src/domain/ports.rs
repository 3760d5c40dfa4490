use crate::domain::model::{ColumnInfo, RowErrorPolicy};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// One open transaction against the store.
///
/// Dropping a session without calling `commit` must roll it back and
/// release the underlying connection.
#[async_trait]
pub trait ImportSession: Send {
    async fn execute(&mut self, sql: &str) -> Result<()>;

    /// Runs a parameterized statement; `None` binds SQL NULL.
    async fn execute_with(&mut self, sql: &str, params: &[Option<String>]) -> Result<()>;

    async fn commit(self: Box<Self>) -> Result<()>;

    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// Storage handle shared by the import pipeline and the table registry.
/// Table names passed in are already sanitized.
#[async_trait]
pub trait TableStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn ImportSession>>;

    async fn list_tables(&self) -> Result<Vec<String>>;

    async fn table_exists(&self, table: &str) -> Result<bool>;

    async fn describe_table(&self, table: &str) -> Result<Vec<ColumnInfo>>;

    async fn fetch_rows(
        &self,
        table: &str,
        columns: &[ColumnInfo],
        limit: u64,
    ) -> Result<Vec<serde_json::Map<String, serde_json::Value>>>;

    async fn count_rows(&self, table: &str) -> Result<u64>;

    /// Returns whether a table was actually dropped.
    async fn drop_table(&self, table: &str) -> Result<bool>;
}

pub trait ConfigProvider: Send + Sync {
    fn row_error_policy(&self) -> RowErrorPolicy;
    fn import_timeout(&self) -> Option<Duration>;
    fn default_read_limit(&self) -> u64;
}
