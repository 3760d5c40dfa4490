use crate::core::report::OutcomeReporter;
use crate::core::sanitize::quote;
use crate::domain::model::{Record, RowErrorPolicy, TableSchema};
use crate::domain::ports::ImportSession;
use crate::utils::error::{ImportError, Result};
use serde_json::Value;

const ROW_SAVEPOINT: &str = "import_row";

/// Column order follows the schema, never the record's own key order.
pub fn insert_sql(schema: &TableSchema) -> String {
    let columns: Vec<String> = schema
        .columns
        .iter()
        .map(|c| quote(&c.sanitized_name))
        .collect();
    let placeholders = vec!["?"; schema.columns.len()].join(", ");

    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote(&schema.table_name),
        columns.join(", "),
        placeholders
    )
}

/// Missing and null map to SQL NULL; everything else is stored as trimmed text.
pub fn normalize_value(value: Option<&Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(other) => Some(other.to_string().trim().to_string()),
    }
}

pub fn row_values(schema: &TableSchema, record: &Record) -> Vec<Option<String>> {
    schema
        .columns
        .iter()
        .map(|c| normalize_value(record.data.get(&c.original_name)))
        .collect()
}

/// Inserts every record, one statement per row, in input order.
///
/// Row-local failures are handled according to `policy`. An `Err` from this
/// function is always fatal for the run.
pub async fn load_rows(
    session: &mut dyn ImportSession,
    schema: &TableSchema,
    records: &[Record],
    policy: RowErrorPolicy,
    reporter: &mut OutcomeReporter,
) -> Result<()> {
    let sql = insert_sql(schema);
    tracing::debug!("{}", sql);

    for (index, record) in records.iter().enumerate() {
        let row = index + 1;
        let values = row_values(schema, record);

        match policy {
            RowErrorPolicy::Isolate => {
                session
                    .execute(&format!("SAVEPOINT {}", ROW_SAVEPOINT))
                    .await?;

                match session.execute_with(&sql, &values).await {
                    Ok(()) => {
                        session
                            .execute(&format!("RELEASE SAVEPOINT {}", ROW_SAVEPOINT))
                            .await?;
                        reporter.record_row_success();
                    }
                    Err(e) if e.is_connection_failure() => return Err(e),
                    Err(e) => {
                        let message = e.cause_message();
                        tracing::warn!("⚠️ Row {} rejected: {}", row, message);
                        session
                            .execute(&format!("ROLLBACK TO SAVEPOINT {}", ROW_SAVEPOINT))
                            .await?;
                        session
                            .execute(&format!("RELEASE SAVEPOINT {}", ROW_SAVEPOINT))
                            .await?;
                        reporter.record_row_error(row, &message);
                    }
                }
            }
            RowErrorPolicy::Abort => {
                session
                    .execute_with(&sql, &values)
                    .await
                    .map_err(|e| {
                        if e.is_connection_failure() {
                            e
                        } else {
                            ImportError::RowInsertError {
                                row,
                                message: e.cause_message(),
                            }
                        }
                    })?;
                reporter.record_row_success();
            }
        }
    }

    tracing::info!(
        "📥 Loaded {} of {} rows into '{}'",
        reporter.row_count(),
        records.len(),
        schema.table_name
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ColumnSpec;
    use serde_json::json;

    fn schema() -> TableSchema {
        TableSchema {
            table_name: "my_students".to_string(),
            columns: vec![
                ColumnSpec {
                    original_name: "Name".to_string(),
                    sanitized_name: "name".to_string(),
                },
                ColumnSpec {
                    original_name: "Age".to_string(),
                    sanitized_name: "age".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_insert_sql() {
        assert_eq!(
            insert_sql(&schema()),
            "INSERT INTO \"my_students\" (\"name\", \"age\") VALUES (?, ?)"
        );
    }

    #[test]
    fn test_normalize_value() {
        assert_eq!(normalize_value(None), None);
        assert_eq!(normalize_value(Some(&json!(null))), None);
        assert_eq!(normalize_value(Some(&json!("  Alice "))), Some("Alice".to_string()));
        assert_eq!(normalize_value(Some(&json!("   "))), Some(String::new()));
        assert_eq!(normalize_value(Some(&json!(42))), Some("42".to_string()));
        assert_eq!(normalize_value(Some(&json!(2.5))), Some("2.5".to_string()));
        assert_eq!(normalize_value(Some(&json!(true))), Some("true".to_string()));
        assert_eq!(
            normalize_value(Some(&json!({"a": [1, 2]}))),
            Some("{\"a\":[1,2]}".to_string())
        );
    }

    #[test]
    fn test_row_values_follow_schema_order_and_pad_nulls() {
        let record: Record = serde_json::from_value(json!({"Age": 30, "Name": "Bob "})).unwrap();
        assert_eq!(
            row_values(&schema(), &record),
            vec![Some("Bob".to_string()), Some("30".to_string())]
        );

        let sparse: Record = serde_json::from_value(json!({"Name": "Bob"})).unwrap();
        assert_eq!(row_values(&schema(), &sparse), vec![Some("Bob".to_string()), None]);
    }
}
