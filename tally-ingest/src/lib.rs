//! tally-ingest: load bank-export CSVs into typed transactions.

pub mod csv_loader;
pub mod parsers;
pub mod types;

pub use csv_loader::{load_transactions, load_transactions_path, load_transactions_str};
pub use types::{LoadOptions, LoadReport, RowPolicy, DEFAULT_DATE_FORMATS};
