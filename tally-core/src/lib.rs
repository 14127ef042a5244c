//! tally-core: domain types, error taxonomy and month arithmetic shared by
//! the loader, mapper, aggregator and presenter.

pub mod error;
pub mod finance;
pub mod time;

pub use error::{FileFormatError, MappingLoadError, RowErrorKind, RowParseError, TallyError};
pub use finance::{CategorizedTransaction, MatchKind, MonthlyAggregate, Transaction, UNCATEGORIZED};
pub use time::{in_window, today_in, window_start, YearMonth};
