//! PropertyStore — the lock-guarded key-value store on nodes and edges.

use hashbrown::HashMap;
use parking_lot::RwLock;

/// A plain map of property names to values.
pub type PropertyMap = HashMap<String, String>;

/// String properties behind a reader-writer lock.
///
/// Reads share the lock, writes take it exclusively. The lock is a leaf:
/// nothing else is acquired while it is held.
#[derive(Debug, Default)]
pub struct PropertyStore {
    map: RwLock<PropertyMap>,
}

impl PropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `key`.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.map.write().insert(key.into(), value.into());
    }

    /// Remove `key`, returning the previous value if there was one.
    pub fn remove(&self, key: &str) -> Option<String> {
        self.map.write().remove(key)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.map.read().get(key).cloned()
    }

    /// True only for a stored, non-empty value.
    ///
    /// An explicitly stored `""` reads as absent here, while `get` still
    /// returns it.
    pub fn has(&self, key: &str) -> bool {
        self.map.read().get(key).is_some_and(|v| !v.is_empty())
    }

    /// Compare the stored value without cloning it.
    pub fn matches(&self, key: &str, value: &str) -> bool {
        self.map.read().get(key).is_some_and(|v| v == value)
    }

    /// Snapshot of every property.
    pub fn snapshot(&self) -> PropertyMap {
        self.map.read().clone()
    }

    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.read().is_empty()
    }
}
