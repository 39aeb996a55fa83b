mod asset;
mod link_item;

pub use asset::{Asset, AssetKind, Page};
pub use link_item::{
    LinkItem, LinkSummary, LinkType, DEFAULT_SORT, PLURAL_NAME, SINGULAR_NAME, SUMMARY_FIELDS,
};

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Insertion-ordered `key -> label` pairs, as shown in a CMS dropdown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Choices(Vec<(String, String)>);

impl Choices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a choice, replacing the label in place if the key already exists
    pub fn insert(&mut self, key: impl Into<String>, label: impl Into<String>) {
        let key = key.into();
        let label = label.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = label,
            None => self.0.push((key, label)),
        }
    }

    /// Remove a choice, returning its label
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let pos = self.0.iter().position(|(k, _)| k == key)?;
        Some(self.0.remove(pos).1)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, label)| label.as_str())
    }

    pub fn keys(&self) -> Vec<&str> {
        self.0.iter().map(|(k, _)| k.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Choices {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut choices = Choices::new();
        for (k, v) in iter {
            choices.insert(k, v);
        }
        choices
    }
}

// Serialized as a JSON object whose keys keep insertion order.
impl Serialize for Choices {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}
