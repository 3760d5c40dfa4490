use serde_json::json;
use std::io::Write;
use tabular_import::adapters::input::read_records;
use tabular_import::{DatabaseConfig, ImportConfig, Importer, SqliteStore, TableRegistry};
use tempfile::TempDir;

#[tokio::test]
async fn test_csv_file_to_table() {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("students.csv");
    let mut file = std::fs::File::create(&csv_path).unwrap();
    writeln!(file, "Student Name, Grade ,Email").unwrap();
    writeln!(file, "Ann, 90 ,ann@example.com").unwrap();
    writeln!(file, "Bob,,").unwrap();
    drop(file);

    let records = read_records(&csv_path).unwrap();
    assert_eq!(records.len(), 2);

    let db_path = temp_dir.path().join("imports.db");
    let store = SqliteStore::connect(&DatabaseConfig::at_path(db_path.to_str().unwrap()))
        .await
        .unwrap();
    let importer = Importer::new(store.clone(), ImportConfig::default());

    let outcome = importer.import("Spring Roster", &records).await;
    assert!(outcome.success, "import failed: {:?}", outcome.errors);
    assert_eq!(outcome.table_name.as_deref(), Some("spring_roster"));
    assert_eq!(outcome.row_count, Some(2));

    let data = TableRegistry::new(store.clone())
        .read_table("spring_roster", None)
        .await
        .unwrap();
    let column_names: Vec<&str> = data.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        column_names,
        vec!["id", "student_name", "grade", "email", "_imported_at"]
    );
    // 值會去除前後空白，空儲存格為 NULL
    assert_eq!(data.rows[0]["grade"], json!("90"));
    assert_eq!(data.rows[1]["student_name"], json!("Bob"));
    assert_eq!(data.rows[1]["email"], serde_json::Value::Null);

    store.close().await;
}

#[tokio::test]
async fn test_json_file_to_table() {
    let temp_dir = TempDir::new().unwrap();
    let json_path = temp_dir.path().join("orders.json");
    std::fs::write(
        &json_path,
        r#"[{"Order ID": 1001, "Total": 12.5}, {"Order ID": 1002, "Note": "rush"}]"#,
    )
    .unwrap();

    let records = read_records(&json_path).unwrap();

    let db_path = temp_dir.path().join("imports.db");
    let store = SqliteStore::connect(&DatabaseConfig::at_path(db_path.to_str().unwrap()))
        .await
        .unwrap();
    let outcome = Importer::new(store.clone(), ImportConfig::default())
        .import("orders", &records)
        .await;

    assert!(outcome.success);
    assert!(outcome
        .logs
        .contains(&"Detected 3 columns: order_id, total, note".to_string()));

    let data = TableRegistry::new(store.clone())
        .read_table("orders", None)
        .await
        .unwrap();
    assert_eq!(data.rows[0]["order_id"], json!("1001"));
    assert_eq!(data.rows[0]["total"], json!("12.5"));
    assert_eq!(data.rows[0]["note"], serde_json::Value::Null);
    assert_eq!(data.rows[1]["note"], json!("rush"));

    store.close().await;
}

#[test]
fn test_unsupported_extension_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("sheet.xlsx");
    std::fs::write(&path, b"not really a spreadsheet").unwrap();

    assert!(read_records(&path).is_err());
}
