//! Trailing-window monthly aggregation.
//!
//! Window: first day of the month `months - 1` before the as-of month,
//! through the as-of date inclusive. Net change is `credits + debits`, with
//! debits kept negative.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tally_core::{in_window, window_start, CategorizedTransaction, MonthlyAggregate, YearMonth};

pub const DEFAULT_WINDOW_MONTHS: u32 = 12;
/// Upper bound on the window length (100 years). Dense output allocates one
/// row per month, so the length is clamped rather than trusted.
pub const MAX_WINDOW_MONTHS: u32 = 1200;

/// Whether months without transactions appear in the output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowPolicy {
    /// Only months that have at least one transaction
    #[default]
    Sparse,
    /// Every month of the window, zero-filled
    Dense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowOptions {
    pub months: u32,
    pub policy: WindowPolicy,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            months: DEFAULT_WINDOW_MONTHS,
            policy: WindowPolicy::Sparse,
        }
    }
}

impl WindowOptions {
    pub fn dense(mut self) -> Self {
        self.policy = WindowPolicy::Dense;
        self
    }

    pub fn with_months(mut self, months: u32) -> Self {
        self.months = months.clamp(1, MAX_WINDOW_MONTHS);
        self
    }
}

/// Transactions that fall inside the window, in input order.
pub fn in_window_transactions<'a>(
    txns: &'a [CategorizedTransaction],
    as_of: NaiveDate,
    options: &WindowOptions,
) -> Vec<&'a CategorizedTransaction> {
    txns.iter()
        .filter(|t| in_window(t.transaction.date, as_of, options.months))
        .collect()
}

/// Group windowed transactions by month and category.
///
/// Output is chronological. Pure: identical inputs give identical output.
pub fn aggregate(
    txns: &[CategorizedTransaction],
    as_of: NaiveDate,
    options: &WindowOptions,
) -> Vec<MonthlyAggregate> {
    let mut months: BTreeMap<YearMonth, MonthlyAggregate> = BTreeMap::new();

    if options.policy == WindowPolicy::Dense {
        let start = window_start(as_of, options.months);
        for month in start.range_inclusive(YearMonth::of(as_of)) {
            months.insert(month, MonthlyAggregate::empty(month));
        }
    }

    for txn in in_window_transactions(txns, as_of, options) {
        let month = txn.transaction.month();
        months
            .entry(month)
            .or_insert_with(|| MonthlyAggregate::empty(month))
            .record(txn);
    }

    months.into_values().collect()
}

/// Totals across the whole window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSummary {
    pub start: YearMonth,
    pub end: YearMonth,
    pub as_of: NaiveDate,
    pub total_debits: Decimal,
    pub total_credits: Decimal,
    pub net_change: Decimal,
    pub transaction_count: usize,
    pub category_totals: BTreeMap<String, Decimal>,
}

impl WindowSummary {
    pub fn from_months(months: &[MonthlyAggregate], as_of: NaiveDate, options: &WindowOptions) -> Self {
        let mut summary = Self {
            start: window_start(as_of, options.months),
            end: YearMonth::of(as_of),
            as_of,
            total_debits: Decimal::ZERO,
            total_credits: Decimal::ZERO,
            net_change: Decimal::ZERO,
            transaction_count: 0,
            category_totals: BTreeMap::new(),
        };

        for m in months {
            summary.total_debits += m.total_debits;
            summary.total_credits += m.total_credits;
            summary.transaction_count += m.transaction_count;
            for (cat, total) in &m.category_totals {
                *summary
                    .category_totals
                    .entry(cat.clone())
                    .or_insert(Decimal::ZERO) += *total;
            }
        }
        summary.net_change = summary.total_credits + summary.total_debits;
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tally_core::{MatchKind, Transaction, UNCATEGORIZED};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ct(d: NaiveDate, desc: &str, amount: Decimal, cat: Option<&str>) -> CategorizedTransaction {
        let t = Transaction::new(d, desc, amount);
        match cat {
            Some(c) => CategorizedTransaction::matched(t, c, MatchKind::Exact),
            None => CategorizedTransaction::uncategorized(t),
        }
    }

    fn sample() -> Vec<CategorizedTransaction> {
        vec![
            ct(date(2024, 1, 5), "Coffee Shop", dec!(-4.50), Some("Dining")),
            ct(date(2024, 1, 10), "Paycheck", dec!(2000.00), None),
        ]
    }

    #[test]
    fn test_single_month_scenario() {
        let out = aggregate(&sample(), date(2024, 1, 31), &WindowOptions::default());
        assert_eq!(out.len(), 1);
        let jan = &out[0];
        assert_eq!(jan.month, YearMonth::new(2024, 1).unwrap());
        assert_eq!(jan.total_debits, dec!(-4.50));
        assert_eq!(jan.total_credits, dec!(2000.00));
        assert_eq!(jan.net_change, dec!(1995.50));
        assert_eq!(jan.category_totals.len(), 2);
        assert_eq!(jan.category_totals["Dining"], dec!(-4.50));
        assert_eq!(jan.category_totals[UNCATEGORIZED], dec!(2000.00));
    }

    #[test]
    fn test_window_excludes_old_and_future() {
        let txns = vec![
            ct(date(2023, 1, 31), "Too old", dec!(-1), None),
            ct(date(2023, 2, 1), "Oldest kept", dec!(-2), None),
            ct(date(2024, 1, 31), "As of", dec!(3), None),
            ct(date(2024, 2, 1), "Future", dec!(100), None),
        ];
        let out = aggregate(&txns, date(2024, 1, 31), &WindowOptions::default());
        let months: Vec<_> = out.iter().map(|m| m.month.to_string()).collect();
        assert_eq!(months, vec!["2023-02", "2024-01"]);
        let count: usize = out.iter().map(|m| m.transaction_count).sum();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_output_is_chronological() {
        let txns = vec![
            ct(date(2024, 3, 1), "c", dec!(1), None),
            ct(date(2023, 11, 1), "a", dec!(1), None),
            ct(date(2024, 1, 1), "b", dec!(1), None),
        ];
        let out = aggregate(&txns, date(2024, 3, 31), &WindowOptions::default());
        for w in out.windows(2) {
            assert!(w[0].month < w[1].month);
        }
    }

    #[test]
    fn test_dense_window_zero_fills() {
        let out = aggregate(&sample(), date(2024, 1, 31), &WindowOptions::default().dense());
        assert_eq!(out.len(), 12);
        assert_eq!(out[0].month, YearMonth::new(2023, 2).unwrap());
        assert_eq!(out[11].month, YearMonth::new(2024, 1).unwrap());
        assert!(out[..11].iter().all(|m| m.is_empty() && m.net_change.is_zero()));
        assert_eq!(out[11].net_change, dec!(1995.50));
    }

    #[test]
    fn test_empty_input() {
        let as_of = date(2024, 1, 31);
        assert!(aggregate(&[], as_of, &WindowOptions::default()).is_empty());
        let dense = aggregate(&[], as_of, &WindowOptions::default().dense());
        assert_eq!(dense.len(), 12);
        assert!(dense.iter().all(MonthlyAggregate::is_empty));
    }

    #[test]
    fn test_custom_window_length() {
        let txns = vec![
            ct(date(2023, 12, 15), "dec", dec!(-10), None),
            ct(date(2024, 1, 15), "jan", dec!(-20), None),
        ];
        let out = aggregate(&txns, date(2024, 1, 31), &WindowOptions::default().with_months(1));
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].total_debits, dec!(-20));
    }

    #[test]
    fn test_category_totals_sum_to_month_totals() {
        let txns = vec![
            ct(date(2024, 1, 1), "rent", dec!(-1200), Some("Housing")),
            ct(date(2024, 1, 2), "pay", dec!(3000), Some("Income")),
            ct(date(2024, 1, 3), "refund", dec!(15.25), Some("Dining")),
            ct(date(2024, 1, 4), "lunch", dec!(-12.75), Some("Dining")),
            ct(date(2024, 2, 1), "misc", dec!(-3.33), None),
        ];
        for m in aggregate(&txns, date(2024, 2, 29), &WindowOptions::default()) {
            assert_eq!(m.category_sum(), m.total_debits + m.total_credits);
            assert_eq!(m.net_change, m.total_debits + m.total_credits);
        }
    }

    #[test]
    fn test_idempotent() {
        let txns = sample();
        let as_of = date(2024, 1, 31);
        let opts = WindowOptions::default().dense();
        assert_eq!(aggregate(&txns, as_of, &opts), aggregate(&txns, as_of, &opts));
    }

    #[test]
    fn test_window_summary() {
        let txns = vec![
            ct(date(2023, 12, 1), "coffee", dec!(-4.50), Some("Dining")),
            ct(date(2024, 1, 10), "pay", dec!(2000), None),
            ct(date(2024, 1, 11), "coffee", dec!(-5.50), Some("Dining")),
        ];
        let as_of = date(2024, 1, 31);
        let opts = WindowOptions::default();
        let months = aggregate(&txns, as_of, &opts);
        let summary = WindowSummary::from_months(&months, as_of, &opts);
        assert_eq!(summary.start, YearMonth::new(2023, 2).unwrap());
        assert_eq!(summary.end, YearMonth::new(2024, 1).unwrap());
        assert_eq!(summary.total_debits, dec!(-10.00));
        assert_eq!(summary.total_credits, dec!(2000));
        assert_eq!(summary.net_change, dec!(1990.00));
        assert_eq!(summary.transaction_count, 3);
        assert_eq!(summary.category_totals["Dining"], dec!(-10.00));
    }

    #[test]
    fn test_window_length_is_clamped() {
        assert_eq!(WindowOptions::default().with_months(0).months, 1);
        assert_eq!(
            WindowOptions::default().with_months(u32::MAX).months,
            MAX_WINDOW_MONTHS
        );

        let opts = WindowOptions::default().with_months(u32::MAX).dense();
        let out = aggregate(&[], date(2024, 12, 31), &opts);
        assert_eq!(out.len(), MAX_WINDOW_MONTHS as usize);
        assert_eq!(out[0].month, YearMonth::new(1925, 1).unwrap());
    }
}
