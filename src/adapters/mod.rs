// Adapters layer: concrete implementations for external systems (storage, input files).

pub mod input;
pub mod sqlite;
