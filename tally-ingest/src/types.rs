use serde::{Deserialize, Serialize};
use tally_core::{RowParseError, Transaction};

/// Date formats tried in order: ISO-8601 first, then US month/day/year.
pub const DEFAULT_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// What to do with a row whose date or amount will not parse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowPolicy {
    /// Drop the row, record it in [`LoadReport::skipped`], keep going
    #[default]
    Skip,
    /// Fail the whole load on the first bad row
    Abort,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// `chrono` strftime patterns
    pub date_formats: Vec<String>,
    pub policy: RowPolicy,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect(),
            policy: RowPolicy::Skip,
        }
    }
}

impl LoadOptions {
    pub fn strict(mut self) -> Self {
        self.policy = RowPolicy::Abort;
        self
    }

    pub fn with_date_formats(mut self, formats: Vec<String>) -> Self {
        if !formats.is_empty() {
            self.date_formats = formats;
        }
        self
    }
}

/// Output of a load: parsed transactions in file order plus every rejected row
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoadReport {
    pub transactions: Vec<Transaction>,
    pub skipped: Vec<RowParseError>,
}

impl LoadReport {
    pub fn parsed_count(&self) -> usize {
        self.transactions.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}
