use crate::config::toml_config::DatabaseConfig;
use crate::core::sanitize::quote;
use crate::domain::model::ColumnInfo;
use crate::domain::ports::{ImportSession, TableStore};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteRow,
    SqliteSynchronous,
};
use sqlx::{Column, Row, Sqlite, Transaction, TypeInfo, ValueRef};
use std::time::Duration;

/// SQLite-backed table store. Cloning shares the same pool.
///
/// Open with [`SqliteStore::connect`] and release with [`SqliteStore::close`].
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(config.busy_timeout_seconds));

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.busy_timeout_seconds.max(1)))
            .connect_with(options)
            .await?;

        tracing::info!("🗄️ Opened database at {}", config.path);
        Ok(Self { pool })
    }

    /// Waits for checked-out connections to return, then closes the pool.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::debug!("Database pool closed");
    }
}

struct SqliteSession {
    tx: Transaction<'static, Sqlite>,
}

#[async_trait]
impl ImportSession for SqliteSession {
    async fn execute(&mut self, sql: &str) -> Result<()> {
        sqlx::query(sql)
            .persistent(false)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn execute_with(&mut self, sql: &str, params: &[Option<String>]) -> Result<()> {
        let mut query = sqlx::query(sql);
        for param in params {
            query = query.bind(param.as_deref());
        }
        query.execute(&mut *self.tx).await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}

#[async_trait]
impl TableStore for SqliteStore {
    async fn begin(&self) -> Result<Box<dyn ImportSession>> {
        // IMMEDIATE 先取得寫入鎖，讓 busy_timeout 生效
        let tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;
        Ok(Box::new(SqliteSession { tx }))
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        let tables = sqlx::query_scalar::<_, String>(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\'",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(tables)
    }

    async fn table_exists(&self, table: &str) -> Result<bool> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
        )
        .bind(table)
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }

    async fn describe_table(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        let rows = sqlx::query(&format!("PRAGMA table_info({})", quote(table)))
            .persistent(false)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| -> Result<ColumnInfo> {
                Ok(ColumnInfo {
                    name: row.try_get("name")?,
                    data_type: row.try_get("type")?,
                })
            })
            .collect()
    }

    async fn fetch_rows(
        &self,
        table: &str,
        columns: &[ColumnInfo],
        limit: u64,
    ) -> Result<Vec<serde_json::Map<String, Value>>> {
        let projection = if columns.is_empty() {
            "*".to_string()
        } else {
            columns
                .iter()
                .map(|c| quote(&c.name))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let sql = format!("SELECT {} FROM {} LIMIT ?", projection, quote(table));

        let rows = sqlx::query(&sql)
            .persistent(false)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_object).collect()
    }

    async fn count_rows(&self, table: &str) -> Result<u64> {
        let count = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", quote(table)))
            .persistent(false)
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    async fn drop_table(&self, table: &str) -> Result<bool> {
        let existed = self.table_exists(table).await?;
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", quote(table)))
            .persistent(false)
            .execute(&self.pool)
            .await?;
        Ok(existed)
    }
}

fn row_to_object(row: &SqliteRow) -> Result<serde_json::Map<String, Value>> {
    let mut object = serde_json::Map::new();
    for (index, column) in row.columns().iter().enumerate() {
        object.insert(column.name().to_string(), decode_cell(row, index)?);
    }
    Ok(object)
}

/// Decodes by the value's storage class rather than the declared column type.
fn decode_cell(row: &SqliteRow, index: usize) -> Result<Value> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }

    let value = match raw.type_info().name() {
        "INTEGER" => Value::from(row.try_get_unchecked::<i64, _>(index)?),
        "REAL" => serde_json::Number::from_f64(row.try_get_unchecked::<f64, _>(index)?)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        "BLOB" => Value::String(
            String::from_utf8_lossy(&row.try_get_unchecked::<Vec<u8>, _>(index)?).into_owned(),
        ),
        _ => Value::String(row.try_get_unchecked::<String, _>(index)?),
    };
    Ok(value)
}
