//! The ordered original→replacement text map.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Cow;

/// Ordered mapping from original text to replacement text.
///
/// Entries keep their first insertion position; re-inserting a key only
/// updates its value. The map has no public mutators: it is built once by a
/// recognizer (or collected from pairs) and read thereafter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ModificationMap {
    entries: IndexMap<String, String>,
}

impl ModificationMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or update an entry. Empty keys are ignored.
    pub(crate) fn insert(&mut self, original: impl Into<String>, replacement: impl Into<String>) {
        let original = original.into();
        if original.is_empty() {
            return;
        }
        self.entries.insert(original, replacement.into());
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replacement for an exact original, if present.
    pub fn get(&self, original: &str) -> Option<&str> {
        self.entries.get(original).map(String::as_str)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Apply the map to `text`. See [`crate::edit::apply_modifications`].
    pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        crate::edit::apply_modifications(text, self)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ModificationMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = ModificationMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<'de> Deserialize<'de> for ModificationMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // through `insert`, so empty keys are dropped here too
        let entries = IndexMap::<String, String>::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}
