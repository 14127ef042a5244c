//! User-supplied category mapping, loaded from JSON.
//!
//! Two entry shapes are accepted and may be mixed in one file:
//!
//! ```json
//! {
//!   "Coffee Shop": "Dining",
//!   "Groceries": ["whole foods", "h-e-b"]
//! }
//! ```
//!
//! A string value maps one keyword to a category. An array value maps a
//! category to a list of keywords. Rules keep file order, which decides ties.

use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tally_core::{MappingLoadError, UNCATEGORIZED};
use tracing::{debug, warn};

/// One keyword → category rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingRule {
    pub key: String,
    pub category: String,
    #[serde(skip)]
    needle: String,
}

impl MappingRule {
    pub fn new(key: impl Into<String>, category: impl Into<String>) -> Self {
        let key = key.into().trim().to_string();
        let needle = key.to_lowercase();
        Self {
            key,
            category: category.into().trim().to_string(),
            needle,
        }
    }

    /// Case-insensitive, whitespace-trimmed equality with a description
    pub fn matches_exact(&self, normalized_description: &str) -> bool {
        normalized_description == self.needle
    }

    /// Case-insensitive substring match against a description
    pub fn matches_contains(&self, normalized_description: &str) -> bool {
        normalized_description.contains(&self.needle)
    }
}

/// Lowercase + trim, the form descriptions are compared in.
pub fn normalize(description: &str) -> String {
    description.trim().to_lowercase()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CategoryMapping {
    rules: Vec<MappingRule>,
}

impl CategoryMapping {
    /// Build from rules. Blank keys and rules targeting the Uncategorized
    /// label are dropped, since neither can change a result.
    pub fn new(rules: impl IntoIterator<Item = MappingRule>) -> Self {
        let mut mapping = Self::default();
        for rule in rules {
            mapping.push(rule);
        }
        mapping
    }

    /// Build from `(keyword, category)` pairs in order.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(pairs.into_iter().map(|(k, v)| MappingRule::new(k, v)))
    }

    fn push(&mut self, rule: MappingRule) {
        if rule.needle.is_empty() {
            warn!(category = %rule.category, "ignoring blank keyword in category mapping");
            return;
        }
        if rule.category.trim().eq_ignore_ascii_case(UNCATEGORIZED) {
            debug!(key = %rule.key, "ignoring rule that maps to {UNCATEGORIZED}");
            return;
        }
        self.rules.push(rule);
    }

    pub fn from_json_str(text: &str) -> Result<Self, MappingLoadError> {
        let value: Value = serde_json::from_str(text)?;
        let Value::Object(entries) = value else {
            return Err(MappingLoadError::NotAnObject);
        };

        let mut mapping = Self::default();
        for (key, value) in entries {
            match value {
                Value::String(category) => {
                    if category.trim().is_empty() {
                        return Err(MappingLoadError::InvalidEntry { key });
                    }
                    mapping.push(MappingRule::new(key, category));
                }
                Value::Array(keywords) => {
                    for keyword in keywords {
                        let Value::String(keyword) = keyword else {
                            return Err(MappingLoadError::InvalidEntry { key });
                        };
                        mapping.push(MappingRule::new(keyword, key.as_str()));
                    }
                }
                _ => return Err(MappingLoadError::InvalidEntry { key }),
            }
        }

        debug!(rules = mapping.len(), "loaded category mapping");
        Ok(mapping)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, MappingLoadError> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    pub fn rules(&self) -> &[MappingRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Distinct category labels in first-appearance order
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for rule in &self.rules {
            if !seen.contains(&rule.category.as_str()) {
                seen.push(&rule.category);
            }
        }
        seen
    }
}
