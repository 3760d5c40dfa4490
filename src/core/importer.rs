use crate::core::loader::load_rows;
use crate::core::provision::provision_table;
use crate::core::report::OutcomeReporter;
use crate::core::sanitize::sanitize_table_name;
use crate::core::schema::infer_schema;
use crate::domain::model::{ImportOutcome, Record, RowErrorPolicy, TableSchema};
use crate::domain::ports::{ConfigProvider, ImportSession, TableStore};
use crate::utils::error::{ImportError, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Runs full-replace imports against a table store.
///
/// Imports targeting the same sanitized table name are serialized through
/// an in-process lock; different names proceed concurrently.
pub struct Importer<S: TableStore, C: ConfigProvider> {
    store: S,
    config: C,
    table_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl<S: TableStore, C: ConfigProvider> Importer<S, C> {
    pub fn new(store: S, config: C) -> Self {
        Self {
            store,
            config,
            table_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Replaces `table_name` with the contents of `records`.
    ///
    /// Never returns an error: every failure is folded into the outcome.
    pub async fn import(&self, table_name: &str, records: &[Record]) -> ImportOutcome {
        let mut reporter = OutcomeReporter::new();
        reporter.log("Initializing data transformation sequence...");

        // 1. 清理表名
        let table = match sanitize_table_name(table_name) {
            Ok(table) => table,
            Err(e) => return Self::fail(reporter, e),
        };
        reporter.log(format!("Target table identified: {}", table));

        // 2. 推斷欄位
        reporter.log("Analyzing data structure...");
        let schema = match infer_schema(&table, records) {
            Ok(schema) => schema,
            Err(e) => return Self::fail(reporter, e),
        };
        reporter.log(format!(
            "Detected {} columns: {}",
            schema.columns.len(),
            schema.column_names().join(", ")
        ));

        let lock = self.table_lock(&table);
        let guard = lock.lock().await;

        // 3. 建表與寫入，在同一個交易內
        let policy = self.config.row_error_policy();
        let result = match self.config.import_timeout() {
            Some(limit) => {
                match tokio::time::timeout(
                    limit,
                    self.run_transaction(&schema, records, policy, &mut reporter),
                )
                .await
                {
                    Ok(result) => result,
                    Err(_) => Err(ImportError::Timeout { limit }),
                }
            }
            None => {
                self.run_transaction(&schema, records, policy, &mut reporter)
                    .await
            }
        };

        drop(guard);
        self.release_table_lock(&table, &lock);

        match result {
            Ok(()) => {
                reporter.log("Batch processing complete.");
                reporter.set_table_name(&schema.table_name);
                tracing::info!(
                    "✅ Imported {} rows into '{}' ({} row errors)",
                    reporter.row_count(),
                    schema.table_name,
                    reporter.error_count()
                );
                reporter.finish_success()
            }
            Err(e) => Self::fail(reporter, e),
        }
    }

    async fn run_transaction(
        &self,
        schema: &TableSchema,
        records: &[Record],
        policy: RowErrorPolicy,
        reporter: &mut OutcomeReporter,
    ) -> Result<()> {
        reporter.log("Constructing database schema...");
        let mut session = self.store.begin().await?;

        match Self::provision_and_load(session.as_mut(), schema, records, policy, reporter).await {
            Ok(()) => session.commit().await,
            Err(e) => {
                if let Err(rollback_error) = session.rollback().await {
                    tracing::error!(
                        "Rollback of import into '{}' failed: {}",
                        schema.table_name,
                        rollback_error
                    );
                }
                Err(e)
            }
        }
    }

    async fn provision_and_load(
        session: &mut dyn ImportSession,
        schema: &TableSchema,
        records: &[Record],
        policy: RowErrorPolicy,
        reporter: &mut OutcomeReporter,
    ) -> Result<()> {
        provision_table(session, schema).await?;
        reporter.log("Schema created successfully.");

        reporter.log("Normalizing and inserting data batch...");
        load_rows(session, schema, records, policy, reporter).await
    }

    fn table_lock(&self, table: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .table_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks
            .entry(table.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Forgets the lock entry once no other import holds or waits on it.
    fn release_table_lock(&self, table: &str, lock: &Arc<tokio::sync::Mutex<()>>) {
        let mut locks = self
            .table_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        // map 與呼叫端各持有一份
        let idle = Arc::strong_count(lock) == 2
            && locks.get(table).is_some_and(|entry| Arc::ptr_eq(entry, lock));
        if idle {
            locks.remove(table);
        }
    }

    fn fail(reporter: OutcomeReporter, error: ImportError) -> ImportOutcome {
        tracing::error!(
            "❌ Import failed: {} (Category: {:?}, Severity: {:?})",
            error,
            error.category(),
            error.severity()
        );
        reporter.finish_failure(error.cause_message())
    }
}
