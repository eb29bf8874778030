use std::collections::HashMap;

use crate::log::Error;

use serde::Serialize;
use serde_json::{to_value, Value};

/// Provides storage for the data that expressions are evaluated against.
#[derive(Debug, Default)]
pub struct Store {
    data: HashMap<String, Value>,
}

impl Store {
    /// Create a new [`Store`].
    ///
    /// # Examples
    ///
    /// ```
    /// use ribosome::Store;
    ///
    /// let store = Store::new();
    /// ```
    #[inline]
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
        }
    }

    /// Inserts a key-value pair into the [`Store`].
    ///
    /// # Errors
    ///
    /// Returns an error if the serialization fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use ribosome::Store;
    ///
    /// let mut store = Store::new();
    /// let result = store.insert("name", "taylor");
    ///
    /// assert!(result.is_ok());
    /// ```
    pub fn insert<S, T>(&mut self, key: S, value: T) -> Result<(), Error>
    where
        S: Into<String>,
        T: Serialize,
    {
        let value = to_value(&value)
            .map_err(|e| Error::build(format!("value is unserializable: {e}")))?;
        self.data.insert(key.into(), value);

        Ok(())
    }

    /// Inserts a key-value pair into the [`Store`].
    ///
    /// # Panics
    ///
    /// Panics if the serialization fails.
    #[inline]
    pub fn insert_must<S, T>(&mut self, key: S, value: T)
    where
        S: Into<String>,
        T: Serialize,
    {
        self.data.insert(key.into(), to_value(value).unwrap());
    }

    /// Inserts a key-value pair into the [`Store`].
    ///
    /// Returns the `Store`, so additional methods may be chained.
    ///
    /// # Errors
    ///
    /// Returns an error if the serialization fails.
    #[inline]
    pub fn with<S, T>(mut self, key: S, value: T) -> Result<Self, Error>
    where
        S: Into<String>,
        T: Serialize,
    {
        self.insert(key, value)?;

        Ok(self)
    }

    /// Inserts a key-value pair into the [`Store`].
    ///
    /// Returns the `Store`, so additional methods may be chained.
    ///
    /// # Panics
    ///
    /// Panics if the serialization fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use ribosome::Store;
    ///
    /// let store = Store::new().with_must("name", "taylor");
    ///
    /// assert_eq!(store.get("name").unwrap(), "taylor")
    /// ```
    #[inline]
    pub fn with_must<S, T>(mut self, key: S, value: T) -> Self
    where
        S: Into<String>,
        T: Serialize,
    {
        self.insert_must(key, value);

        self
    }

    /// Returns a reference to the [`Value`] corresponding to the key.
    #[inline]
    pub fn get(&self, index: &str) -> Option<&Value> {
        self.data.get(index)
    }
}

/// Layered variable bindings over a [`Store`].
///
/// Functions that loop or branch push a frame, bind their own variables and
/// expand fragments against the `Shadow`. Lookups search the frames from
/// the top down before falling back to the `Store`.
#[derive(Debug, Clone)]
pub struct Shadow<'store> {
    pub store: &'store Store,
    data: Vec<HashMap<String, Value>>,
}

impl<'store> Shadow<'store> {
    /// Create a new [`Shadow`] over the given [`Store`].
    #[inline]
    pub fn new(store: &'store Store) -> Self {
        Self {
            store,
            data: vec![HashMap::new()],
        }
    }

    /// Push a new frame onto the [`Shadow`].
    #[inline]
    pub fn push(&mut self) {
        self.data.push(HashMap::new());
    }


    /// Insert the value into the top frame of the [`Shadow`].
    ///
    /// # Panics
    ///
    /// Panics if the serialization fails.
    #[inline]
    pub fn insert_must<S, T>(&mut self, key: S, value: T)
    where
        S: Into<String>,
        T: Serialize,
    {
        self.data
            .last_mut()
            .expect("stack must not be empty when shadowing value")
            .insert(key.into(), to_value(value).unwrap());
    }

    /// Insert the value into the top frame of the [`Shadow`].
    ///
    /// Returns the `Shadow`, so additional methods may be chained.
    #[inline]
    pub fn with_must<S, T>(mut self, key: S, value: T) -> Self
    where
        S: Into<String>,
        T: Serialize,
    {
        self.insert_must(key, value);

        self
    }

    /// Get the [`Value`] of the given key.
    ///
    /// If the key is not found within the [`Shadow`], the store will be
    /// searched.
    #[inline]
    pub fn get(&self, index: &str) -> Option<&Value> {
        for frame in self.data.iter().rev() {
            if let Some(value) = frame.get(index) {
                return Some(value);
            }
        }
        self.store.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::{Shadow, Store};
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_store_insert() {
        let mut store = Store::new();
        store.insert_must("one", "two");

        assert!(store
            .get("one")
            .is_some_and(|t| t.as_str().unwrap() == "two"));
    }

    #[test]
    fn test_store_insert_fluent() {
        assert!(Store::new()
            .with_must("three", "four")
            .get("three")
            .is_some_and(|t| t.as_str().unwrap() == "four"))
    }

    #[test]
    fn test_shadow_insert_and_get() {
        let mut store = Store::new();
        store.insert_must("one", "one");
        store.insert_must("two", "two");
        let shadow = Shadow::new(&store);
        let mut inner = shadow.clone();
        inner.push();
        inner.insert_must("one", "shadowed one");

        assert_eq!(inner.get("one"), Some(&json!("shadowed one")));
        assert_eq!(inner.get("two"), Some(&json!("two")));
        assert_eq!(shadow.get("one"), Some(&json!("one")));
        assert_eq!(shadow.get("two"), Some(&json!("two")));
    }

    #[test]
    fn test_shadow_clone_is_independent() {
        let store = Store::new().with_must("name", "root");
        let shadow = Shadow::new(&store);
        let child = shadow.clone().with_must("name", "child");

        assert_eq!(shadow.get("name"), Some(&json!("root")));
        assert_eq!(child.get("name"), Some(&json!("child")));
    }

    #[test]
    fn test_store_insert_structured() {
        let mut store = Store::new();
        store.insert("fields", vec!["x", "y"]).unwrap();
        store
            .insert("point", HashMap::from([("x", 1), ("y", 2)]))
            .unwrap();

        assert_eq!(store.get("fields"), Some(&json!(["x", "y"])));
        assert_eq!(store.get("point"), Some(&json!({"x": 1, "y": 2})));
    }

    #[test]
    fn test_store_insert_unserializable() {
        let mut store = Store::new();
        let error = store
            .insert("bad", HashMap::from([((1, 2), "tuple key")]))
            .unwrap_err();

        assert!(error.get_reason().starts_with("value is unserializable"));
    }
}
