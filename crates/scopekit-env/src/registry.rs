//! Object registry
//!
//! Keyed store of type-erased values shared across one environment.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use crate::error::RegistryError;

/// Keyed store of arbitrary values
#[derive(Default)]
pub struct Registry {
    entries: HashMap<String, Box<dyn Any>>,
}

impl Registry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `value` under `key`
    ///
    /// With `graceful` set, an existing key is left untouched instead of
    /// failing.
    ///
    /// # Errors
    /// Returns [`RegistryError::KeyExists`] if the key is taken and
    /// `graceful` is not set
    pub fn register<T: Any>(
        &mut self,
        key: &str,
        value: T,
        graceful: bool,
    ) -> Result<(), RegistryError> {
        if self.entries.contains_key(key) {
            if graceful {
                return Ok(());
            }
            return Err(RegistryError::KeyExists(key.to_string()));
        }
        self.entries.insert(key.to_string(), Box::new(value));
        Ok(())
    }

    /// Value under `key`, if present with type `T`
    #[inline]
    #[must_use]
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.entries.get(key).and_then(|v| v.downcast_ref::<T>())
    }

    /// Remove `key`; returns whether it was present
    #[inline]
    pub fn unregister(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Whether `key` is registered
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&String> = self.entries.keys().collect();
        keys.sort();
        f.debug_struct("Registry").field("keys", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_get() {
        let mut registry = Registry::new();
        registry.register("current_product", 42_u32, false).unwrap();

        assert_eq!(registry.get::<u32>("current_product"), Some(&42));
        assert_eq!(registry.get::<String>("current_product"), None);
        assert!(registry.contains("current_product"));
    }

    #[test]
    fn duplicate_key_rejected_unless_graceful() {
        let mut registry = Registry::new();
        registry.register("key", "first", false).unwrap();

        assert_eq!(
            registry.register("key", "second", false),
            Err(RegistryError::KeyExists("key".to_string()))
        );
        assert!(registry.register("key", "third", true).is_ok());
        assert_eq!(registry.get::<&str>("key"), Some(&"first"));
    }

    #[test]
    fn unregister_frees_key() {
        let mut registry = Registry::new();
        registry.register("key", 1_i32, false).unwrap();

        assert!(registry.unregister("key"));
        assert!(!registry.unregister("key"));
        assert!(registry.is_empty());
    }
}
