//! Per-object resolution cache for Houndstooth.
//!
//! Every model object (site, collection) owns exactly one [`Cache`] that maps
//! a logical key (e.g. `"config"`, `"items"`, or a repository path) to the
//! last value resolved from the remote service.
//!
//! Entries never expire on their own. They are dropped only through the
//! explicit invalidation API:
//!
//! - [`Cache::invalidate`]: drop a single key
//! - [`Cache::invalidate_all`]: drop every key
//!
//! # Example
//!
//! ```
//! use ht_cache::Cache;
//!
//! let cache = Cache::new();
//! cache.insert("config", 42);
//! assert_eq!(cache.get("config"), Some(42));
//!
//! cache.invalidate("config");
//! assert_eq!(cache.get("config"), None);
//! ```

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use tracing::info;

/// Keyed cache of resolved values with explicit invalidation.
///
/// Values are cloned out on read, so `V` is usually cheap to clone
/// (an `Arc`, a handle, or a small struct).
#[derive(Debug)]
pub struct Cache<V> {
    entries: RwLock<HashMap<String, V>>,
}

impl<V> Default for Cache<V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<V: Clone> Cache<V> {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieve the cached value for `key`.
    ///
    /// Returns `None` when the key was never resolved or has been invalidated.
    pub fn get(&self, key: &str) -> Option<V> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let value = entries.get(key).cloned();
        if value.is_some() {
            info!("Loading cached key: {key}");
        }
        value
    }

    /// Check whether `key` currently holds a value.
    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// Returns the stored value so callers can cache and return in one step.
    pub fn insert(&self, key: impl Into<String>, value: V) -> V {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.clone());
        value
    }

    /// Drop the value stored under `key`.
    ///
    /// Returns `true` if a value was present.
    pub fn invalidate(&self, key: &str) -> bool {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
            .is_some()
    }

    /// Drop every cached value.
    pub fn invalidate_all(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of cached keys.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the cache holds no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
