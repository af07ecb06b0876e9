//! Answer classification
//!
//! The prompt asks the model to open with a single category word, but models
//! drift: odd casing, a stray `Reason:` label, a synonym instead of the
//! category name. Classification tolerates that by normalizing the first
//! line and matching it against a fixed [`SynonymTable`], in declared order.
//!
//! Classification is total and pure: every input, including the empty
//! string, yields exactly one [`Category`] and an explanation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed set of delay causes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Weather,
    Traffic,
    Inventory,
    Unknown,
}

impl Category {
    /// Every category, in the order the prompt lists them.
    pub const ALL: [Category; 4] = [
        Category::Weather,
        Category::Traffic,
        Category::Inventory,
        Category::Unknown,
    ];

    /// The exact token the model is asked to emit.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Weather => "Weather",
            Self::Traffic => "Traffic",
            Self::Inventory => "Inventory",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying one model response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub category: Category,
    /// Response text after the leading category token
    pub explanation: String,
    /// `false` when no variant matched and the category fell back to Unknown
    pub detected: bool,
}

/// Stateless classifier over a synonym table.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    table: SynonymTable,
}

impl Classifier {
    #[must_use]
    pub fn new(table: SynonymTable) -> Self {
        Self { table }
    }

    #[must_use]
    pub fn table(&self) -> &SynonymTable {
        &self.table
    }

    /// Classify a raw model response.
    #[must_use]
    pub fn classify(&self, raw: &str) -> Classification {
        let body = raw.trim_start();
        let first_line = body.lines().next().unwrap_or_default();
        let normalized = self.normalize(first_line);
        let body = self.strip_prefix(body);

        match self.table.detect(&normalized) {
            Some((category, variant)) => Classification {
                category,
                explanation: explanation_after(body, variant),
                detected: true,
            },
            None => Classification {
                category: Category::Unknown,
                explanation: body.trim().to_string(),
                detected: false,
            },
        }
    }

    /// Resolve a free-form label (e.g. an expected category in an eval set)
    /// through the same table used for model responses.
    #[must_use]
    pub fn resolve(&self, label: &str) -> Option<Category> {
        self.table
            .detect(&self.normalize(label))
            .map(|(category, _)| category)
    }

    /// Whether a response classifies as the expected category.
    #[must_use]
    pub fn judge(&self, answer: &str, expected: Category) -> bool {
        self.classify(answer).category == expected
    }

    /// Trim, lower-case, and drop one leading noise prefix.
    fn normalize(&self, line: &str) -> String {
        let lowered = line.trim().to_lowercase();
        self.table
            .strip_prefixes
            .iter()
            .find_map(|p| lowered.strip_prefix(p.to_lowercase().as_str()))
            .map_or_else(|| lowered.clone(), |rest| rest.trim().to_string())
    }

    /// Drop one leading noise prefix from raw text, preserving its casing.
    fn strip_prefix<'a>(&self, text: &'a str) -> &'a str {
        self.table
            .strip_prefixes
            .iter()
            .find_map(|p| {
                text.get(..p.len())
                    .filter(|head| head.eq_ignore_ascii_case(p))
                    .map(|_| text[p.len()..].trim_start())
            })
            .unwrap_or(text)
    }
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, '-' | '\u{2013}' | '\u{2014}')
}

/// Cut the category word off the front of `body`.
///
/// The word runs from the matched variant to the next separator, so
/// `Weather:` and `Rainfall` are removed whole while `Weather—snow` keeps
/// `snow`.
fn explanation_after(body: &str, variant: &str) -> String {
    let Some(rest) = body
        .get(..variant.len())
        .filter(|head| head.eq_ignore_ascii_case(variant))
        .map(|_| &body[variant.len()..])
    else {
        // lower-casing changed byte offsets; keep the whole response
        return body.trim().to_string();
    };

    rest.trim_start_matches(|c: char| !is_separator(c))
        .trim_start_matches(is_separator)
        .trim_end()
        .to_string()
}

mod synonyms;

pub use synonyms::*;
