use serde::{Deserialize, Serialize};

use crate::classify::Category;

/// Lexical variants accepted for one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynonymEntry {
    pub category: Category,
    /// Lower-case variants, matched as a prefix of the normalized line
    pub variants: Vec<String>,
}

/// Versioned table driving both production classification and evaluation.
///
/// Entries are checked in declared order and the first matching variant
/// wins, so precedence is part of the data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynonymTable {
    pub version: u32,
    /// Literal prefixes models sometimes emit before the category word
    #[serde(default)]
    pub strip_prefixes: Vec<String>,
    pub entries: Vec<SynonymEntry>,
}

impl SynonymTable {
    /// Find the first entry with a variant that `normalized` starts with.
    ///
    /// `normalized` must already be trimmed and lower-cased.
    #[must_use]
    pub fn detect(&self, normalized: &str) -> Option<(Category, &str)> {
        self.entries.iter().find_map(|entry| {
            entry
                .variants
                .iter()
                .find(|v| !v.is_empty() && normalized.starts_with(v.as_str()))
                .map(|v| (entry.category, v.as_str()))
        })
    }
}

impl Default for SynonymTable {
    fn default() -> Self {
        let entry = |category, variants: &[&str]| SynonymEntry {
            category,
            variants: variants.iter().map(|v| (*v).to_string()).collect(),
        };

        Self {
            version: 1,
            strip_prefixes: vec!["reason:".to_string()],
            entries: vec![
                entry(Category::Weather, &["weather", "rain", "storm", "snow"]),
                entry(Category::Traffic, &["traffic", "congestion", "road"]),
                entry(Category::Inventory, &["inventory", "stock", "out-of-stock"]),
                entry(Category::Unknown, &["unknown"]),
            ],
        }
    }
}
