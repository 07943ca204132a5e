//! CloudFront-style header collections.
//!
//! CloudFront groups headers by lower-cased name and keeps every value with
//! its original spelling:
//!
//! ```json
//! { "x-forwarded-for": [{ "key": "X-Forwarded-For", "value": "203.0.113.1" }] }
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single header value with the key as it was originally spelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderEntry {
    /// Header name in its original case.
    pub key: String,
    /// Header value.
    pub value: String,
}

/// Ordered, case-insensitive, multi-valued header map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeaderCollection {
    entries: IndexMap<String, Vec<HeaderEntry>>,
}

impl HeaderCollection {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a header value.
    ///
    /// Key and value are trimmed; empty strings are kept. A name seen before
    /// (compared case-insensitively) gains another entry instead of being
    /// overwritten.
    pub fn add(&mut self, key: impl AsRef<str>, value: impl AsRef<str>) {
        let key = key.as_ref().trim();
        let value = value.as_ref().trim();

        self.entries
            .entry(key.to_lowercase())
            .or_default()
            .push(HeaderEntry {
                key: key.to_string(),
                value: value.to_string(),
            });
    }

    /// Returns every entry stored under `name`, compared case-insensitively.
    pub fn get(&self, name: &str) -> Option<&[HeaderEntry]> {
        self.entries
            .get(&name.trim().to_lowercase())
            .map(Vec::as_slice)
    }

    /// Iterates names (lower-cased) with their entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[HeaderEntry])> {
        self.entries
            .iter()
            .map(|(name, entries)| (name.as_str(), entries.as_slice()))
    }

    /// Number of distinct header names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no header has been added.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
