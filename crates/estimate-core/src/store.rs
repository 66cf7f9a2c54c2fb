//! Key-value storage abstraction
//!
//! The counter and the snapshot both live in a single string-keyed store.
//! In the browser that is `localStorage`; natively (and in tests) it is
//! [`MemoryStore`].

use crate::error::EstimateError;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// A string-keyed, string-valued store
pub trait KvStore {
    /// Read a value, `Ok(None)` when the key is absent
    fn get(&self, key: &str) -> Result<Option<String>, EstimateError>;

    /// Write a value, replacing whatever was there
    fn set(&self, key: &str, value: &str) -> Result<(), EstimateError>;

    /// Remove a key; removing an absent key is not an error
    fn remove(&self, key: &str) -> Result<(), EstimateError>;
}

impl<S: KvStore + ?Sized> KvStore for &S {
    fn get(&self, key: &str) -> Result<Option<String>, EstimateError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), EstimateError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), EstimateError> {
        (**self).remove(key)
    }
}

impl<S: KvStore + ?Sized> KvStore for Rc<S> {
    fn get(&self, key: &str) -> Result<Option<String>, EstimateError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), EstimateError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), EstimateError> {
        (**self).remove(key)
    }
}

/// In-memory store. Clones share the same underlying map, so a counter and
/// a snapshot store built from clones see each other's writes.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, EstimateError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), EstimateError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), EstimateError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_absent_key_is_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get("missing").unwrap(), None);
    }

    #[test]
    fn test_set_overwrites() {
        let store = MemoryStore::new();
        store.set("k", "1").unwrap();
        store.set("k", "2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("2"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_clones_share_entries() {
        let store = MemoryStore::new();
        let other = store.clone();
        other.set("shared", "yes").unwrap();
        assert_eq!(store.get("shared").unwrap().as_deref(), Some("yes"));
    }

    #[test]
    fn test_remove_absent_is_ok() {
        let store = MemoryStore::new();
        assert!(store.remove("nothing").is_ok());
        assert!(store.is_empty());
    }
}
