pub mod importer;
pub mod loader;
pub mod provision;
pub mod registry;
pub mod report;
pub mod sanitize;
pub mod schema;

pub use crate::domain::model::{ImportOutcome, Record, TableSchema};
pub use crate::domain::ports::{ConfigProvider, ImportSession, TableStore};
pub use crate::utils::error::Result;
