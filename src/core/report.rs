use crate::domain::model::ImportOutcome;

/// Collects the narrated trace, row errors and counters of one import run.
#[derive(Debug, Default)]
pub struct OutcomeReporter {
    logs: Vec<String>,
    row_errors: Vec<String>,
    row_count: u64,
    table_name: Option<String>,
}

impl OutcomeReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log(&mut self, line: impl Into<String>) {
        let line = line.into();
        tracing::debug!("{}", line);
        self.logs.push(line);
    }

    pub fn set_table_name(&mut self, table_name: &str) {
        self.table_name = Some(table_name.to_string());
    }

    pub fn record_row_success(&mut self) {
        self.row_count += 1;
    }

    /// `row` is 1-indexed.
    pub fn record_row_error(&mut self, row: usize, message: &str) {
        self.row_errors.push(format!("Row {}: {}", row, message));
    }

    pub fn row_count(&self) -> u64 {
        self.row_count
    }

    pub fn error_count(&self) -> usize {
        self.row_errors.len()
    }

    /// The run reached the end of loading. Row errors, if any, ride along.
    pub fn finish_success(self) -> ImportOutcome {
        ImportOutcome {
            success: true,
            table_name: self.table_name,
            row_count: Some(self.row_count),
            logs: self.logs,
            errors: if self.row_errors.is_empty() {
                None
            } else {
                Some(self.row_errors)
            },
        }
    }

    /// A fatal cause ends the run; it replaces any row errors collected so far.
    pub fn finish_failure(self, cause: impl Into<String>) -> ImportOutcome {
        ImportOutcome {
            success: false,
            table_name: None,
            row_count: None,
            logs: self.logs,
            errors: Some(vec![cause.into()]),
        }
    }
}
