//! Shape adapter: monthly aggregates and windowed transactions into the rows
//! and series a display layer consumes. No business rules live here.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeSet;
use tally_core::{CategorizedTransaction, MonthlyAggregate, YearMonth};

use crate::aggregator::WindowSummary;

/// One line of the month-by-month summary table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthRow {
    pub month: YearMonth,
    pub label: String,
    pub debits: Decimal,
    pub credits: Decimal,
    pub net: Decimal,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub month: YearMonth,
    pub total: Decimal,
}

/// Per-category totals aligned with the summary's months
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySeries {
    pub category: String,
    pub points: Vec<SeriesPoint>,
    pub total: Decimal,
}

/// Running balance after each transaction, in date order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalancePoint {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerRow {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub category: String,
    pub raw_category: Option<String>,
}

impl From<&CategorizedTransaction> for LedgerRow {
    fn from(ct: &CategorizedTransaction) -> Self {
        Self {
            date: ct.transaction.date,
            description: ct.transaction.description.clone(),
            amount: ct.transaction.amount,
            category: ct.category.clone(),
            raw_category: ct.transaction.raw_category.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub window: WindowSummary,
    pub summary: Vec<MonthRow>,
    pub category_series: Vec<CategorySeries>,
    pub cumulative_balance: Vec<BalancePoint>,
    pub debits: Vec<LedgerRow>,
    pub credits: Vec<LedgerRow>,
}

impl Dashboard {
    /// `in_window` must already be filtered to the aggregation window.
    pub fn build(
        months: &[MonthlyAggregate],
        window: WindowSummary,
        in_window: &[&CategorizedTransaction],
    ) -> Self {
        let summary = months
            .iter()
            .map(|m| MonthRow {
                month: m.month,
                label: m.month.label(),
                debits: m.total_debits,
                credits: m.total_credits,
                net: m.net_change,
                count: m.transaction_count,
            })
            .collect();

        let categories: BTreeSet<&str> = months
            .iter()
            .flat_map(|m| m.category_totals.keys().map(String::as_str))
            .collect();
        let category_series = categories
            .into_iter()
            .map(|cat| {
                let points: Vec<SeriesPoint> = months
                    .iter()
                    .map(|m| SeriesPoint {
                        month: m.month,
                        total: m.category_totals.get(cat).copied().unwrap_or(Decimal::ZERO),
                    })
                    .collect();
                let total = points.iter().map(|p| p.total).sum();
                CategorySeries {
                    category: cat.to_string(),
                    points,
                    total,
                }
            })
            .collect();

        let mut ordered: Vec<&CategorizedTransaction> = in_window.to_vec();
        ordered.sort_by_key(|t| t.transaction.date);

        let mut balance = Decimal::ZERO;
        let cumulative_balance = ordered
            .iter()
            .map(|t| {
                balance += t.transaction.amount;
                BalancePoint {
                    date: t.transaction.date,
                    amount: t.transaction.amount,
                    balance,
                }
            })
            .collect();

        let (debits, credits): (Vec<&CategorizedTransaction>, Vec<&CategorizedTransaction>) =
            ordered.iter().copied().partition(|t| t.transaction.is_debit());

        Self {
            window,
            summary,
            category_series,
            cumulative_balance,
            debits: debits.into_iter().map(LedgerRow::from).collect(),
            credits: credits.into_iter().map(LedgerRow::from).collect(),
        }
    }

    /// Category names in series order
    pub fn categories(&self) -> Vec<&str> {
        self.category_series.iter().map(|s| s.category.as_str()).collect()
    }
}
