use crate::core::sanitize::quote;
use crate::domain::model::TableSchema;
use crate::domain::ports::ImportSession;
use crate::utils::error::{ImportError, Result};

pub const SURROGATE_KEY_COLUMN: &str = "id";
pub const IMPORTED_AT_COLUMN: &str = "_imported_at";

pub fn drop_table_sql(table: &str) -> String {
    format!("DROP TABLE IF EXISTS {}", quote(table))
}

pub fn create_table_sql(schema: &TableSchema) -> String {
    let mut definitions = Vec::with_capacity(schema.columns.len() + 2);
    definitions.push(format!(
        "{} INTEGER PRIMARY KEY AUTOINCREMENT",
        SURROGATE_KEY_COLUMN
    ));
    for column in &schema.columns {
        definitions.push(format!("{} TEXT", quote(&column.sanitized_name)));
    }
    definitions.push(format!(
        "{} TIMESTAMP DEFAULT CURRENT_TIMESTAMP",
        IMPORTED_AT_COLUMN
    ));

    format!(
        "CREATE TABLE {} ({})",
        quote(&schema.table_name),
        definitions.join(", ")
    )
}

/// Drops any existing table of the schema's name and creates a fresh one,
/// inside the caller's session. Any failure here is fatal for the run.
pub async fn provision_table(session: &mut dyn ImportSession, schema: &TableSchema) -> Result<()> {
    let to_provisioning_error = |e: ImportError| ImportError::ProvisioningError {
        table: schema.table_name.clone(),
        message: e.cause_message(),
    };

    let drop_sql = drop_table_sql(&schema.table_name);
    tracing::debug!("{}", drop_sql);
    session
        .execute(&drop_sql)
        .await
        .map_err(&to_provisioning_error)?;

    let create_sql = create_table_sql(schema);
    tracing::debug!("{}", create_sql);
    session
        .execute(&create_sql)
        .await
        .map_err(&to_provisioning_error)?;

    tracing::info!(
        "🏗️ Created table '{}' with {} data columns",
        schema.table_name,
        schema.columns.len()
    );
    Ok(())
}
