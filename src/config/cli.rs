use crate::config::toml_config::ImportConfig;
use crate::domain::model::RowErrorPolicy;
use crate::utils::error::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "tabular-import")]
#[command(about = "Load tabular uploads into replaceable SQLite tables")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the database path from the config file
    #[arg(long, global = true)]
    pub database: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Replace a table with the rows of a JSON or CSV file
    Import {
        #[arg(short, long)]
        table: String,

        #[arg(short, long)]
        file: PathBuf,

        /// Override how failing rows are handled
        #[arg(long, value_enum)]
        on_row_error: Option<PolicyArg>,
    },
    /// List existing tables
    List,
    /// Show columns and rows of a table
    Read {
        name: String,

        #[arg(short, long)]
        limit: Option<u64>,
    },
    /// Drop a table (no-op when missing)
    Delete { name: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PolicyArg {
    Isolate,
    Abort,
}

impl From<PolicyArg> for RowErrorPolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::Isolate => RowErrorPolicy::Isolate,
            PolicyArg::Abort => RowErrorPolicy::Abort,
        }
    }
}

impl CliConfig {
    /// Loads the config file (or defaults) and applies command-line overrides.
    pub fn resolve(&self) -> Result<ImportConfig> {
        let mut config = match &self.config {
            Some(path) => ImportConfig::from_file(path)?,
            None => ImportConfig::default(),
        };

        if let Some(database) = &self.database {
            config.database.path = database.clone();
        }

        if let Command::Import {
            on_row_error: Some(policy),
            ..
        } = &self.command
        {
            config.import.row_error_policy = (*policy).into();
        }

        Ok(config)
    }

    pub fn verbose_logging(&self, config: &ImportConfig) -> bool {
        self.verbose || config.verbose_logging()
    }

    pub fn json_logging(&self, config: &ImportConfig) -> bool {
        self.json_logs || config.json_logging()
    }
}
