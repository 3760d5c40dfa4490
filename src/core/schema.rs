use crate::core::sanitize::sanitize_identifier;
use crate::domain::model::{ColumnSpec, Record, TableSchema};
use crate::utils::error::{ImportError, Result};
use std::collections::HashMap;

/// Builds the destination schema from the union of all record keys, in
/// order of first appearance across the batch.
///
/// `table_name` must already be sanitized.
pub fn infer_schema(table_name: &str, records: &[Record]) -> Result<TableSchema> {
    if records.is_empty() {
        return Err(ImportError::EmptyBatch);
    }

    let mut columns: Vec<ColumnSpec> = Vec::new();
    // sanitized -> original
    let mut taken: HashMap<String, String> = HashMap::new();

    for record in records {
        for key in record.data.keys() {
            let sanitized = sanitize_identifier(key);

            match taken.get(&sanitized) {
                Some(original) if original == key => continue,
                Some(original) => {
                    return Err(ImportError::ColumnCollision {
                        column: sanitized,
                        first: original.clone(),
                        second: key.clone(),
                    });
                }
                None => {}
            }

            if sanitized.is_empty() {
                return Err(ImportError::InvalidColumnName { raw: key.clone() });
            }

            taken.insert(sanitized.clone(), key.clone());
            columns.push(ColumnSpec {
                original_name: key.clone(),
                sanitized_name: sanitized,
            });
        }
    }

    if columns.is_empty() {
        return Err(ImportError::NoColumnsDetected);
    }

    tracing::debug!(
        "Inferred {} columns for '{}' from {} records",
        columns.len(),
        table_name,
        records.len()
    );

    Ok(TableSchema {
        table_name: table_name.to_string(),
        columns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_union_in_first_seen_order() {
        let records = vec![
            record(json!({"Name": "Alice", "Age": "30"})),
            record(json!({"Name": "Bob", "City": "Pune"})),
            record(json!({"Email": "c@example.com", "Age": 41})),
        ];

        let schema = infer_schema("students", &records).unwrap();

        assert_eq!(schema.table_name, "students");
        assert_eq!(schema.column_names(), vec!["name", "age", "city", "email"]);
        assert_eq!(schema.columns[0].original_name, "Name");
    }

    #[test]
    fn test_empty_batch() {
        assert!(matches!(
            infer_schema("t", &[]),
            Err(ImportError::EmptyBatch)
        ));
    }

    #[test]
    fn test_records_without_keys() {
        let records = vec![Record::new(), Record::new()];
        assert!(matches!(
            infer_schema("t", &records),
            Err(ImportError::NoColumnsDetected)
        ));
    }

    #[test]
    fn test_sanitization_collision_is_rejected() {
        let records = vec![
            record(json!({"First Name": "Alice"})),
            record(json!({"first_name": "Bob"})),
        ];

        match infer_schema("t", &records) {
            Err(ImportError::ColumnCollision {
                column,
                first,
                second,
            }) => {
                assert_eq!(column, "first_name");
                assert_eq!(first, "First Name");
                assert_eq!(second, "first_name");
            }
            other => panic!("expected collision, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_key_is_rejected() {
        let records = vec![record(json!({"": "x"}))];
        assert!(matches!(
            infer_schema("t", &records),
            Err(ImportError::InvalidColumnName { .. })
        ));
    }
}
