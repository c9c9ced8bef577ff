//! Thread-safe annotation bag shared by the steps of one item.

use crate::errors::SluiceError;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;

/// Scratch space middleware use to pass data to later steps and to the
/// source's done hook.
///
/// Keys and value shapes are defined by the middleware that use them.
#[derive(Debug, Default)]
pub struct Annotations {
    data: RwLock<HashMap<String, serde_json::Value>>,
}

impl Annotations {
    /// Creates an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets a value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.data.read().get(key).cloned()
    }

    /// Gets a value and deserializes it into `V`.
    ///
    /// Returns `Ok(None)` when the key is absent.
    pub fn get_as<V: DeserializeOwned>(&self, key: &str) -> Result<Option<V>, SluiceError> {
        match self.get(key) {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Checks if a key exists.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.read().contains_key(key)
    }

    /// Sets a value, returning the one it replaced.
    pub fn insert(
        &self,
        key: impl Into<String>,
        value: serde_json::Value,
    ) -> Option<serde_json::Value> {
        self.data.write().insert(key.into(), value)
    }

    /// Serializes `value` and stores it under `key`.
    pub fn set_as<V: Serialize>(
        &self,
        key: impl Into<String>,
        value: &V,
    ) -> Result<Option<serde_json::Value>, SluiceError> {
        let value = serde_json::to_value(value)?;
        Ok(self.insert(key, value))
    }

    /// Sets a value only if the key is not present yet.
    ///
    /// # Errors
    ///
    /// Returns `SluiceError::AnnotationConflict` if the key already exists.
    pub fn try_insert(
        &self,
        key: impl Into<String>,
        value: serde_json::Value,
    ) -> Result<(), SluiceError> {
        let key = key.into();
        let mut data = self.data.write();

        if data.contains_key(&key) {
            return Err(SluiceError::AnnotationConflict { key });
        }

        data.insert(key, value);
        Ok(())
    }

    /// Removes a value.
    pub fn remove(&self, key: &str) -> Option<serde_json::Value> {
        self.data.write().remove(key)
    }

    /// Returns a copy of all entries.
    #[must_use]
    pub fn to_map(&self) -> HashMap<String, serde_json::Value> {
        self.data.read().clone()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Returns true if the bag is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Returns all keys.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.data.read().keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Route {
        topic: String,
        partition: u32,
    }

    #[test]
    fn test_insert_and_get() {
        let bag = Annotations::new();
        assert!(bag.insert("key", serde_json::json!("value")).is_none());

        assert_eq!(bag.get("key"), Some(serde_json::json!("value")));
        assert!(bag.contains_key("key"));
        assert!(!bag.contains_key("other"));
    }

    #[test]
    fn test_insert_overwrites() {
        let bag = Annotations::new();
        bag.insert("key", serde_json::json!(1));
        let previous = bag.insert("key", serde_json::json!(2));

        assert_eq!(previous, Some(serde_json::json!(1)));
        assert_eq!(bag.get("key"), Some(serde_json::json!(2)));
    }

    #[test]
    fn test_try_insert_conflict() {
        let bag = Annotations::new();
        bag.try_insert("key", serde_json::json!(1)).unwrap();

        let result = bag.try_insert("key", serde_json::json!(2));
        assert!(matches!(result, Err(SluiceError::AnnotationConflict { ref key }) if key == "key"));
        assert_eq!(bag.get("key"), Some(serde_json::json!(1)));
    }

    #[test]
    fn test_typed_access() {
        let bag = Annotations::new();
        let route = Route {
            topic: "orders".to_string(),
            partition: 3,
        };
        bag.set_as("route", &route).unwrap();

        let back: Option<Route> = bag.get_as("route").unwrap();
        assert_eq!(back, Some(route));

        let missing: Option<Route> = bag.get_as("nope").unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_typed_access_shape_mismatch() {
        let bag = Annotations::new();
        bag.insert("route", serde_json::json!("not a route"));

        let result: Result<Option<Route>, _> = bag.get_as("route");
        assert!(matches!(result, Err(SluiceError::Serialization(_))));
    }

    #[test]
    fn test_remove_and_listing() {
        let bag = Annotations::new();
        bag.insert("a", serde_json::json!(1));
        bag.insert("b", serde_json::json!(2));
        assert_eq!(bag.len(), 2);

        let mut keys = bag.keys();
        keys.sort();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);

        assert_eq!(bag.remove("a"), Some(serde_json::json!(1)));
        assert_eq!(bag.to_map().len(), 1);
        bag.remove("b");
        assert!(bag.is_empty());
    }
}
