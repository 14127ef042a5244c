//! Transaction and aggregate types shared by every pipeline stage

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::time::YearMonth;

/// Label assigned when no mapping rule matches a description.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// One row of a bank export, validated at parse time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    /// Calendar date of the transaction
    pub date: NaiveDate,
    /// Free-text description as exported by the bank
    pub description: String,
    /// Negative = debit (outflow), positive = credit (inflow)
    pub amount: Decimal,
    /// Category column from the export, if it had one
    pub raw_category: Option<String>,
    /// 1-based line in the source file
    pub line: u64,
}

impl Transaction {
    pub fn new(date: NaiveDate, description: impl Into<String>, amount: Decimal) -> Self {
        Self {
            date,
            description: description.into(),
            amount,
            raw_category: None,
            line: 0,
        }
    }

    pub fn with_raw_category(mut self, category: impl Into<String>) -> Self {
        self.raw_category = Some(category.into());
        self
    }

    pub fn with_line(mut self, line: u64) -> Self {
        self.line = line;
        self
    }

    /// Returns true for outflows (negative amount)
    pub fn is_debit(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }

    /// Returns true for inflows. Zero-amount rows count as credits.
    pub fn is_credit(&self) -> bool {
        !self.is_debit()
    }

    pub fn month(&self) -> YearMonth {
        YearMonth::of(self.date)
    }
}

/// How a mapping rule matched a description
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MatchKind {
    #[serde(rename = "exact")]
    Exact,
    #[serde(rename = "contains")]
    Contains,
}

/// A transaction with its resolved category label
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategorizedTransaction {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub category: String,
    /// `None` when the category is the Uncategorized fallback
    pub matched_by: Option<MatchKind>,
}

impl CategorizedTransaction {
    pub fn matched(transaction: Transaction, category: impl Into<String>, kind: MatchKind) -> Self {
        Self {
            transaction,
            category: category.into(),
            matched_by: Some(kind),
        }
    }

    pub fn uncategorized(transaction: Transaction) -> Self {
        Self {
            transaction,
            category: UNCATEGORIZED.to_string(),
            matched_by: None,
        }
    }

    pub fn is_uncategorized(&self) -> bool {
        self.matched_by.is_none()
    }
}

/// Totals for one calendar month
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyAggregate {
    pub month: YearMonth,
    /// Sum of negative amounts (zero or negative)
    pub total_debits: Decimal,
    /// Sum of non-negative amounts
    pub total_credits: Decimal,
    /// `total_credits + total_debits`
    pub net_change: Decimal,
    pub transaction_count: usize,
    pub category_totals: BTreeMap<String, Decimal>,
}

impl MonthlyAggregate {
    pub fn empty(month: YearMonth) -> Self {
        Self {
            month,
            total_debits: Decimal::ZERO,
            total_credits: Decimal::ZERO,
            net_change: Decimal::ZERO,
            transaction_count: 0,
            category_totals: BTreeMap::new(),
        }
    }

    /// Fold one categorized transaction into this month's totals.
    pub fn record(&mut self, txn: &CategorizedTransaction) {
        let amount = txn.transaction.amount;
        if txn.transaction.is_debit() {
            self.total_debits += amount;
        } else {
            self.total_credits += amount;
        }
        self.net_change = self.total_credits + self.total_debits;
        self.transaction_count += 1;
        *self
            .category_totals
            .entry(txn.category.clone())
            .or_insert(Decimal::ZERO) += amount;
    }

    pub fn is_empty(&self) -> bool {
        self.transaction_count == 0
    }

    /// Sum of every category subtotal; always equals debits + credits
    pub fn category_sum(&self) -> Decimal {
        self.category_totals.values().copied().sum()
    }
}
