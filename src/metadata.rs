//! Event metadata types.
//!
//! Metadata is an ordered list of key/value pairs. Keys are not unique:
//! duplicates are kept, in insertion order, so that a stored document decodes
//! back to exactly what was written.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single metadata record.
///
/// Serialized as `{"key": "...", "value": "..."}`. Unknown fields are
/// rejected on decode so a stored record always has exactly this shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

impl<K: Into<String>, V: Into<String>> From<(K, V)> for KeyValue {
    fn from((key, value): (K, V)) -> Self {
        Self::new(key, value)
    }
}

/// Ordered sequence of [`KeyValue`] records attached to an event.
///
/// Serializes transparently as a JSON array. An empty `Metadata` encodes to
/// `[]`, never to `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(Vec<KeyValue>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, keeping any existing record with the same key.
    pub fn push(&mut self, pair: impl Into<KeyValue>) {
        self.0.push(pair.into());
    }

    /// Builder-style [`push`](Self::push).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.push(KeyValue::new(key, value));
        self
    }

    /// First value recorded under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|kv| kv.key == key)
            .map(|kv| kv.value.as_str())
    }

    /// Whether an identical record is present, regardless of position.
    pub fn contains(&self, pair: &KeyValue) -> bool {
        self.0.iter().any(|kv| kv == pair)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, KeyValue> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<KeyValue> {
        self.0
    }
}

impl From<Vec<KeyValue>> for Metadata {
    fn from(pairs: Vec<KeyValue>) -> Self {
        Self(pairs)
    }
}

impl<P: Into<KeyValue>> FromIterator<P> for Metadata {
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl IntoIterator for Metadata {
    type Item = KeyValue;
    type IntoIter = std::vec::IntoIter<KeyValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Metadata {
    type Item = &'a KeyValue;
    type IntoIter = std::slice::Iter<'a, KeyValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, kv) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", kv)?;
        }
        f.write_str("]")
    }
}
