//! Field-level parsers for bank-export cells.

pub mod amount;
pub mod date;

pub use amount::{parse_amount, MAX_ABS_AMOUNT};
pub use date::parse_date;
