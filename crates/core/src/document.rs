//! Ordered sub-document type
//!
//! A [`Document`] is an ordered mapping from field name to [`DocValue`].
//! Insertion order is kept so that a document is written and read back with
//! its fields in the same order.
//!
//! Equality is order-sensitive: two documents are equal when they hold the
//! same names bound to equal values in the same order.

use serde::{Deserialize, Serialize};

use crate::value::DocValue;

/// Ordered name to value mapping
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    entries: Vec<(String, DocValue)>,
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Document {
            entries: Vec::new(),
        }
    }

    /// Create an empty document with room for `capacity` fields
    pub fn with_capacity(capacity: usize) -> Self {
        Document {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the document has no fields
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert a field
    ///
    /// A field that already exists keeps its position and gets the new value;
    /// the old value is returned.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<DocValue>) -> Option<DocValue> {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<DocValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Get a field value by name
    pub fn get(&self, name: &str) -> Option<&DocValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    /// Whether a field exists
    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Remove a field, returning its value
    pub fn remove(&mut self, name: &str) -> Option<DocValue> {
        let pos = self.entries.iter().position(|(k, _)| k == name)?;
        Some(self.entries.remove(pos).1)
    }

    /// Field names in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Fields in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DocValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Maximum nesting depth, counting this document as one level
    pub fn nesting_depth(&self) -> usize {
        1 + self
            .entries
            .iter()
            .map(|(_, v)| v.nesting_depth())
            .max()
            .unwrap_or(0)
    }
}

impl IntoIterator for Document {
    type Item = (String, DocValue);
    type IntoIter = std::vec::IntoIter<(String, DocValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<String>, V: Into<DocValue>> FromIterator<(K, V)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut doc = Document::new();
        for (k, v) in iter {
            doc.insert(k, v);
        }
        doc
    }
}
