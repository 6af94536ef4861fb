//! Case-insensitive substring search over café names.
//!
//! # Invariants
//! - Results keep the relative order of the input sequence.
//! - Only the empty query matches every record ("no filter active").
//!   Whitespace is part of the needle and is never trimmed.
//! - Results are fresh clones; the input is never mutated.

use crate::model::cafe::CafeRecord;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalized search needle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameQuery {
    needle: Option<String>,
}

impl NameQuery {
    pub fn new(text: &str) -> Self {
        let needle = if text.is_empty() {
            None
        } else {
            Some(fold_case(text))
        };
        Self { needle }
    }

    /// Returns whether this query filters nothing.
    pub fn is_match_all(&self) -> bool {
        self.needle.is_none()
    }

    pub fn matches(&self, name: &str) -> bool {
        match &self.needle {
            Some(needle) => fold_case(name).contains(needle.as_str()),
            None => true,
        }
    }
}

/// Returns every record whose name contains `query`, ignoring case.
pub fn filter_by_name(records: &[CafeRecord], query: &str) -> Vec<CafeRecord> {
    let query = NameQuery::new(query);
    if query.is_match_all() {
        return records.to_vec();
    }

    records
        .iter()
        .filter(|record| query.matches(&record.name))
        .cloned()
        .collect()
}

/// Unicode lowercase folding used for matching.
pub fn fold_case(value: &str) -> String {
    value.to_lowercase()
}

/// Primary ordering key: accents stripped (NFD minus combining marks), then
/// lowercased. "Éclair" and "eclair" share a key.
pub fn collation_key(value: &str) -> String {
    value
        .nfd()
        .filter(|ch| !is_combining_mark(*ch))
        .flat_map(char::to_lowercase)
        .collect()
}
