use crate::domain::model::Record;
use crate::utils::error::{ImportError, Result};
use crate::utils::validation::validate_file_extension;
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;

pub const SUPPORTED_EXTENSIONS: &[&str] = &["csv", "json"];

/// Reads an upload into records: a JSON array of objects, or a CSV file
/// with a header row. Empty CSV cells become null.
pub fn read_records(path: &Path) -> Result<Vec<Record>> {
    let shown = path.display().to_string();
    validate_file_extension("file", &shown, SUPPORTED_EXTENSIONS)?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    let content = std::fs::read(path)?;
    let records = if extension == "json" {
        records_from_json(&content)?
    } else {
        records_from_csv(content.as_slice())?
    };

    tracing::info!("📄 Read {} records from {}", records.len(), shown);
    Ok(records)
}

pub fn records_from_json(content: &[u8]) -> Result<Vec<Record>> {
    let value: Value = serde_json::from_slice(content)?;
    match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(map) => Ok(Record::from(map)),
                other => Err(ImportError::ConfigValidationError {
                    field: format!("file[{}]", index),
                    message: format!("expected an object, found {}", json_kind(&other)),
                }),
            })
            .collect(),
        Value::Object(map) => Ok(vec![Record::from(map)]),
        other => Err(ImportError::ConfigValidationError {
            field: "file".to_string(),
            message: format!("expected an array of objects, found {}", json_kind(&other)),
        }),
    }
}

pub fn records_from_csv<R: std::io::Read>(reader: R) -> Result<Vec<Record>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    // 重複欄位名稱會讓後面的值覆蓋前面的值
    let mut seen = HashSet::new();
    for header in headers.iter() {
        if !seen.insert(header) {
            return Err(ImportError::ConfigValidationError {
                field: "file".to_string(),
                message: format!("duplicate CSV header '{}'", header),
            });
        }
    }

    let mut records = Vec::new();
    for row in csv_reader.records() {
        let row = row?;
        let mut record = Record::new();
        for (header, cell) in headers.iter().zip(row.iter()) {
            let value = if cell.is_empty() {
                Value::Null
            } else {
                Value::String(cell.to_string())
            };
            record.data.insert(header.to_string(), value);
        }
        records.push(record);
    }
    Ok(records)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_records_from_json_array() {
        let records = records_from_json(br#"[{"Name": "Alice", "Age": 30}, {"Name": "Bob"}]"#).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].data["Age"], 30);
        let keys: Vec<&str> = records[0].data.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["Name", "Age"]);
    }

    #[test]
    fn test_records_from_json_rejects_scalars() {
        assert!(records_from_json(b"[1, 2]").is_err());
        assert!(records_from_json(b"\"text\"").is_err());
    }

    #[test]
    fn test_records_from_csv() {
        let csv = "Name, Age ,City\nAlice,30,\nBob,,Pune\n";
        let records = records_from_csv(csv.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].data["Name"], "Alice");
        assert_eq!(records[0].data["Age"], "30");
        assert!(records[0].data["City"].is_null());
        assert!(records[1].data["Age"].is_null());
    }

    #[test]
    fn test_records_from_csv_rejects_duplicate_headers() {
        let result = records_from_csv("Name,Name\nAlice,Smith\n".as_bytes());

        match result {
            Err(ImportError::ConfigValidationError { field, message }) => {
                assert_eq!(field, "file");
                assert!(message.contains("'Name'"));
            }
            other => panic!("expected duplicate header error, got {:?}", other),
        }

        // 修剪後才相同的標題也算重複
        assert!(records_from_csv("City, City\nPune,Delhi\n".as_bytes()).is_err());
    }

    #[test]
    fn test_read_records_by_extension() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(br#"[{"a": 1}]"#).unwrap();
        assert_eq!(read_records(file.path()).unwrap().len(), 1);

        let mut text = Builder::new().suffix(".txt").tempfile().unwrap();
        text.write_all(b"a\n1\n").unwrap();
        assert!(read_records(text.path()).is_err());
    }
}
