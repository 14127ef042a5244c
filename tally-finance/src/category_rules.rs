//! Deterministic categorization of transactions against a [`CategoryMapping`].
//!
//! Priority: exact description match > substring match > Uncategorized.
//! Within each pass the first rule in mapping order wins.

use tally_core::{CategorizedTransaction, MatchKind, Transaction};

use crate::mapping::{normalize, CategoryMapping, MappingRule};

/// Find the rule that decides `description`, if any.
pub fn resolve<'m>(description: &str, mapping: &'m CategoryMapping) -> Option<(&'m MappingRule, MatchKind)> {
    let desc = normalize(description);

    mapping
        .rules()
        .iter()
        .find(|rule| rule.matches_exact(&desc))
        .map(|rule| (rule, MatchKind::Exact))
        .or_else(|| {
            mapping
                .rules()
                .iter()
                .find(|rule| rule.matches_contains(&desc))
                .map(|rule| (rule, MatchKind::Contains))
        })
}

/// Assign exactly one category to a transaction.
pub fn categorize(txn: Transaction, mapping: &CategoryMapping) -> CategorizedTransaction {
    match resolve(&txn.description, mapping) {
        Some((rule, kind)) => {
            let category = rule.category.clone();
            CategorizedTransaction::matched(txn, category, kind)
        }
        None => CategorizedTransaction::uncategorized(txn),
    }
}

/// Categorize every transaction, preserving order.
pub fn categorize_all(
    txns: impl IntoIterator<Item = Transaction>,
    mapping: &CategoryMapping,
) -> Vec<CategorizedTransaction> {
    txns.into_iter().map(|t| categorize(t, mapping)).collect()
}
