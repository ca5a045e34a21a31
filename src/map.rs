//! Ordered map type for JSON objects.
//!
//! [`Map`] wraps [`IndexMap`] so members are written in the order they were
//! inserted, unless the encoder is configured with
//! [`KeyOrder::Sorted`](crate::KeyOrder::Sorted).
//!
//! ## Examples
//!
//! ```rust
//! use json_gen::{Map, Value};
//!
//! let mut map = Map::new();
//! map.insert("name".to_string(), Value::from("Alice"));
//! map.insert("age".to_string(), Value::from(30));
//!
//! assert_eq!(map.len(), 2);
//! assert_eq!(map.get("name").and_then(|v| v.as_str()), Some("Alice"));
//! ```

use indexmap::IndexMap;
use std::collections::HashMap;

/// An insertion-ordered map of string keys to values.
///
/// # Examples
///
/// ```rust
/// use json_gen::{Map, Value};
///
/// let mut map = Map::new();
/// map.insert("first".to_string(), Value::from(1));
/// map.insert("second".to_string(), Value::from(2));
///
/// let keys: Vec<_> = map.keys().cloned().collect();
/// assert_eq!(keys, vec!["first", "second"]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Map(IndexMap<String, crate::Value>);

impl Map {
    #[must_use]
    pub fn new() -> Self {
        Map(IndexMap::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Map(IndexMap::with_capacity(capacity))
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map already contained this key, the value is replaced in place
    /// (keeping the original position) and the old value is returned.
    pub fn insert(&mut self, key: String, value: crate::Value) -> Option<crate::Value> {
        self.0.insert(key, value)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&crate::Value> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut crate::Value> {
        self.0.get_mut(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Removes a key, shifting later members down to keep their order.
    pub fn remove(&mut self, key: &str) -> Option<crate::Value> {
        self.0.shift_remove(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over the keys of the map, in insertion order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, crate::Value> {
        self.0.keys()
    }

    /// Returns an iterator over the values of the map, in insertion order.
    pub fn values(&self) -> indexmap::map::Values<'_, String, crate::Value> {
        self.0.values()
    }

    /// Returns an iterator over the key-value pairs of the map, in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, crate::Value> {
        self.0.iter()
    }
}

impl From<HashMap<String, crate::Value>> for Map {
    fn from(map: HashMap<String, crate::Value>) -> Self {
        Map(map.into_iter().collect())
    }
}

impl IntoIterator for Map {
    type Item = (String, crate::Value);
    type IntoIter = indexmap::map::IntoIter<String, crate::Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Map {
    type Item = (&'a String, &'a crate::Value);
    type IntoIter = indexmap::map::Iter<'a, String, crate::Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, crate::Value)> for Map {
    fn from_iter<T: IntoIterator<Item = (String, crate::Value)>>(iter: T) -> Self {
        Map(IndexMap::from_iter(iter))
    }
}
