use crate::core::sanitize::sanitize_table_name;
use crate::domain::model::TableData;
use crate::domain::ports::TableStore;
use crate::utils::error::{ImportError, Result};

pub const DEFAULT_READ_LIMIT: u64 = 500;

/// List, read and delete operations over existing destination tables.
/// Runs outside any import transaction.
#[derive(Debug, Clone)]
pub struct TableRegistry<S: TableStore> {
    store: S,
    default_read_limit: u64,
}

impl<S: TableStore> TableRegistry<S> {
    pub fn new(store: S) -> Self {
        Self::with_read_limit(store, DEFAULT_READ_LIMIT)
    }

    pub fn with_read_limit(store: S, default_read_limit: u64) -> Self {
        Self {
            store,
            default_read_limit,
        }
    }

    pub async fn list_tables(&self) -> Result<Vec<String>> {
        let mut tables = self.store.list_tables().await?;
        tables.sort();
        tracing::debug!("Found {} tables", tables.len());
        Ok(tables)
    }

    /// Reads column metadata and up to `limit` rows in storage order.
    /// `None` uses the registry's default limit.
    pub async fn read_table(&self, name: &str, limit: Option<u64>) -> Result<TableData> {
        let table = sanitize_table_name(name)?;
        if !self.store.table_exists(&table).await? {
            return Err(ImportError::TableNotFound { name: table });
        }

        let limit = limit.unwrap_or(self.default_read_limit);
        let columns = self.store.describe_table(&table).await?;
        let rows = self.store.fetch_rows(&table, &columns, limit).await?;
        let total_rows = self.store.count_rows(&table).await?;

        tracing::info!(
            "📖 Read {} of {} rows from '{}'",
            rows.len(),
            total_rows,
            table
        );

        Ok(TableData {
            table_name: table,
            columns,
            showing: limit.min(total_rows),
            rows,
            total_rows,
        })
    }

    /// Drops the table. A missing table is not an error.
    pub async fn delete_table(&self, name: &str) -> Result<()> {
        let table = sanitize_table_name(name)?;
        if self.store.drop_table(&table).await? {
            tracing::info!("🗑️ Deleted table '{}'", table);
        } else {
            tracing::debug!("Delete requested for missing table '{}', nothing to do", table);
        }
        Ok(())
    }
}
