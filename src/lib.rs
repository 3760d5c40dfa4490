pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{DatabaseConfig, ImportConfig};

pub use adapters::sqlite::SqliteStore;
pub use core::{importer::Importer, registry::TableRegistry, sanitize::sanitize_identifier};
pub use domain::model::{ImportOutcome, Record, RowErrorPolicy, TableData};
pub use utils::error::{ImportError, Result};
