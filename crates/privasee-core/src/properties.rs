//! Key/value metadata attached to a record.
//!
//! Properties are held as an ordered list of pairs. The store persists them as
//! a single string of the form `key1:value1,key2:value2`, and the JSON API
//! returns that same string. Encoding and decoding only happen through
//! [`Properties::encode`] and [`Properties::decode`].
//!
//! The encoding has no escaping: a key or value containing `:` or `,` will
//! not survive a round trip.

use serde::{Deserialize, Serialize};

const PAIR_SEPARATOR: &str = ",";
const KEY_VALUE_SEPARATOR: &str = ":";

/// A single key/value pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    /// Property name.
    pub key: String,
    /// Property value.
    pub value: String,
}

impl Property {
    /// Create a new pair.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Ordered key/value metadata of a record.
///
/// Serializes as the encoded string. Deserializes from either the encoded
/// string or an array of `{"key": ..., "value": ...}` objects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PropertiesRepr", into = "String")]
pub struct Properties(Vec<Property>);

impl Properties {
    /// Create an empty set of properties.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Decode the persisted string form.
    ///
    /// Empty segments are skipped. Each segment is split at its first `:`;
    /// a segment without one becomes a key with an empty value.
    #[must_use]
    pub fn decode(encoded: &str) -> Self {
        let pairs = encoded
            .split(PAIR_SEPARATOR)
            .filter(|segment| !segment.is_empty())
            .map(|segment| match segment.split_once(KEY_VALUE_SEPARATOR) {
                Some((key, value)) => Property::new(key, value),
                None => Property::new(segment, ""),
            })
            .collect();
        Self(pairs)
    }

    /// Encode into the persisted string form.
    #[must_use]
    pub fn encode(&self) -> String {
        self.0
            .iter()
            .map(|p| format!("{}{KEY_VALUE_SEPARATOR}{}", p.key, p.value))
            .collect::<Vec<_>>()
            .join(PAIR_SEPARATOR)
    }

    /// Append a pair.
    pub fn push(&mut self, property: Property) {
        self.0.push(property);
    }

    /// Look up the first value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|p| p.key == key)
            .map(|p| p.value.as_str())
    }

    /// Iterate over the pairs in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Property> {
        self.0.iter()
    }

    /// Number of pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no pairs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Property>> for Properties {
    fn from(pairs: Vec<Property>) -> Self {
        Self(pairs)
    }
}

impl FromIterator<Property> for Properties {
    fn from_iter<I: IntoIterator<Item = Property>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Properties {
    type Item = &'a Property;
    type IntoIter = std::slice::Iter<'a, Property>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Properties> for String {
    fn from(properties: Properties) -> Self {
        properties.encode()
    }
}

/// Accepted input representations.
#[derive(Deserialize)]
#[serde(untagged)]
enum PropertiesRepr {
    Encoded(String),
    Pairs(Vec<Property>),
    Null(()),
}

impl From<PropertiesRepr> for Properties {
    fn from(repr: PropertiesRepr) -> Self {
        match repr {
            PropertiesRepr::Encoded(s) => Self::decode(&s),
            PropertiesRepr::Pairs(pairs) => Self(pairs),
            PropertiesRepr::Null(()) => Self::new(),
        }
    }
}
