//! One report run: load → categorize → aggregate → present.
//!
//! Everything a run depends on lives in [`Session`]; stages share no state.

use chrono::NaiveDate;
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use tally_core::{CategorizedTransaction, MonthlyAggregate, RowParseError, TallyError};
use tally_ingest::{load_transactions, load_transactions_path, LoadOptions, LoadReport};
use tracing::info;

use crate::aggregator::{aggregate, in_window_transactions, WindowOptions, WindowSummary};
use crate::category_rules::categorize_all;
use crate::mapping::CategoryMapping;
use crate::presenter::Dashboard;

/// Per-run inputs
#[derive(Debug, Clone)]
pub struct Session {
    pub mapping: CategoryMapping,
    pub as_of: NaiveDate,
    pub window: WindowOptions,
    pub load: LoadOptions,
}

/// Loaded and categorized transactions, before aggregation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Categorization {
    pub transactions: Vec<CategorizedTransaction>,
    pub skipped: Vec<RowParseError>,
}

/// Everything a display layer needs from one run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub as_of: NaiveDate,
    pub window: WindowOptions,
    pub parsed_rows: usize,
    pub skipped_rows: usize,
    pub skipped: Vec<RowParseError>,
    pub months: Vec<MonthlyAggregate>,
    pub dashboard: Dashboard,
}

impl Session {
    pub fn new(mapping: CategoryMapping, as_of: NaiveDate) -> Self {
        Self {
            mapping,
            as_of,
            window: WindowOptions::default(),
            load: LoadOptions::default(),
        }
    }

    pub fn with_window(mut self, window: WindowOptions) -> Self {
        self.window = window;
        self
    }

    pub fn with_load_options(mut self, load: LoadOptions) -> Self {
        self.load = load;
        self
    }

    pub fn categorize(&self, loaded: LoadReport) -> Categorization {
        Categorization {
            transactions: categorize_all(loaded.transactions, &self.mapping),
            skipped: loaded.skipped,
        }
    }

    pub fn categorize_reader<R: Read>(&self, reader: R) -> Result<Categorization, TallyError> {
        Ok(self.categorize(load_transactions(reader, &self.load)?))
    }

    pub fn categorize_path(&self, path: impl AsRef<Path>) -> Result<Categorization, TallyError> {
        Ok(self.categorize(load_transactions_path(path, &self.load)?))
    }

    /// Aggregate and shape already-categorized transactions.
    pub fn report(&self, categorized: Categorization) -> Report {
        let months = aggregate(&categorized.transactions, self.as_of, &self.window);
        let window = WindowSummary::from_months(&months, self.as_of, &self.window);
        let windowed = in_window_transactions(&categorized.transactions, self.as_of, &self.window);
        let dashboard = Dashboard::build(&months, window, &windowed);

        info!(
            as_of = %self.as_of,
            parsed = categorized.transactions.len(),
            skipped = categorized.skipped.len(),
            in_window = windowed.len(),
            months = months.len(),
            "report built"
        );

        Report {
            as_of: self.as_of,
            window: self.window,
            parsed_rows: categorized.transactions.len(),
            skipped_rows: categorized.skipped.len(),
            skipped: categorized.skipped,
            months,
            dashboard,
        }
    }

    pub fn run<R: Read>(&self, reader: R) -> Result<Report, TallyError> {
        Ok(self.report(self.categorize_reader(reader)?))
    }

    pub fn run_path(&self, path: impl AsRef<Path>) -> Result<Report, TallyError> {
        Ok(self.report(self.categorize_path(path)?))
    }
}
