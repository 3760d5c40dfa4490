use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("No data provided")]
    EmptyBatch,

    #[error("Could not detect columns from data")]
    NoColumnsDetected,

    #[error("Invalid table name '{raw}': sanitizes to '{sanitized}'")]
    InvalidTableName { raw: String, sanitized: String },

    #[error("Invalid column name '{raw}': sanitizes to an empty identifier")]
    InvalidColumnName { raw: String },

    #[error("Columns '{first}' and '{second}' both map to '{column}'")]
    ColumnCollision {
        column: String,
        first: String,
        second: String,
    },

    #[error("Failed to provision table '{table}': {message}")]
    ProvisioningError { table: String, message: String },

    #[error("Row {row}: {message}")]
    RowInsertError { row: usize, message: String },

    #[error("Table '{name}' not found")]
    TableNotFound { name: String },

    #[error("Import timed out after {limit:?}")]
    Timeout { limit: std::time::Duration },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Configuration,
    Storage,
    Input,
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ImportError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ImportError::EmptyBatch
            | ImportError::NoColumnsDetected
            | ImportError::InvalidTableName { .. }
            | ImportError::InvalidColumnName { .. }
            | ImportError::ColumnCollision { .. } => ErrorCategory::Validation,
            ImportError::ConfigValidationError { .. }
            | ImportError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            ImportError::DatabaseError(_)
            | ImportError::ProvisioningError { .. }
            | ImportError::RowInsertError { .. }
            | ImportError::Timeout { .. } => ErrorCategory::Storage,
            ImportError::CsvError(_)
            | ImportError::IoError(_)
            | ImportError::SerializationError(_) => ErrorCategory::Input,
            ImportError::TableNotFound { .. } => ErrorCategory::NotFound,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ImportError::TableNotFound { .. } => ErrorSeverity::Low,
            ImportError::RowInsertError { .. } | ImportError::Timeout { .. } => {
                ErrorSeverity::Medium
            }
            ImportError::DatabaseError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    /// 給操作人員看的訊息，不包含內部細節
    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Validation => format!("The uploaded data was rejected: {}", self),
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Storage => format!("The database could not complete the import: {}", self),
            ErrorCategory::Input => format!("The input file could not be read: {}", self),
            ErrorCategory::NotFound => self.to_string(),
        }
    }

    /// The bare message of the underlying cause, without driver framing.
    pub fn cause_message(&self) -> String {
        match self {
            ImportError::DatabaseError(sqlx::Error::Database(db)) => db.message().to_string(),
            other => other.to_string(),
        }
    }

    /// True when the connection itself is gone, as opposed to one statement
    /// being rejected.
    pub fn is_connection_failure(&self) -> bool {
        matches!(
            self,
            ImportError::DatabaseError(
                sqlx::Error::Io(_)
                    | sqlx::Error::PoolTimedOut
                    | sqlx::Error::PoolClosed
                    | sqlx::Error::WorkerCrashed
            )
        )
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            ImportError::EmptyBatch => "Provide at least one row of data",
            ImportError::NoColumnsDetected => "Make sure the rows contain named fields",
            ImportError::InvalidTableName { .. } => {
                "Use a table name containing letters or digits"
            }
            ImportError::InvalidColumnName { .. } => "Give every column a non-empty header",
            ImportError::ColumnCollision { .. } => {
                "Rename one of the colliding columns so their sanitized names differ"
            }
            ImportError::ProvisioningError { .. } => {
                "Avoid column names that clash with the reserved 'id' and '_imported_at' columns"
            }
            ImportError::RowInsertError { .. } => "Inspect the failing row and re-run the import",
            ImportError::TableNotFound { .. } => "List the available tables and check the name",
            ImportError::Timeout { .. } => "Increase import.timeout_seconds or split the batch",
            ImportError::DatabaseError(_) => "Check the database path and that it is writable",
            ImportError::CsvError(_) | ImportError::SerializationError(_) => {
                "Check that the input file is valid CSV or a JSON array of objects"
            }
            ImportError::IoError(_) => "Check that the file exists and is readable",
            ImportError::ConfigValidationError { .. }
            | ImportError::InvalidConfigValueError { .. } => "Fix the configuration file and retry",
        }
    }
}

pub type Result<T> = std::result::Result<T, ImportError>;
