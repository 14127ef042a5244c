//! tally-finance: category mapping, categorization, monthly aggregation and
//! the dashboard shape adapter.

pub mod aggregator;
pub mod category_rules;
pub mod mapping;
pub mod pipeline;
pub mod presenter;

pub use aggregator::{
    aggregate, WindowOptions, WindowPolicy, WindowSummary, DEFAULT_WINDOW_MONTHS,
    MAX_WINDOW_MONTHS,
};
pub use category_rules::{categorize, categorize_all};
pub use mapping::{CategoryMapping, MappingRule};
pub use pipeline::{Categorization, Report, Session};
pub use presenter::Dashboard;
