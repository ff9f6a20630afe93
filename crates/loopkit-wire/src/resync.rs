//! Local resync cache: state a client pushed to its peer.
//!
//! A sync-capable client records every binding the remote side accepted so
//! the whole set can be replayed after a reconnect. The cache is never
//! persisted and never read by the codec.
//!
//! The lock discipline is two-phase: [`SyncCache::snapshot`] copies the
//! entries under the read lock and releases it before any replay call is
//! made; [`SyncCache::record`] takes the write lock only around the insert,
//! after the remote call has already succeeded. No lock is ever held across
//! a remote call.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, RwLock};

/// Thread-safe record of successfully synced bindings.
///
/// Cheap to clone; clones share the same entries.
#[derive(Clone)]
pub struct SyncCache<K, V> {
    entries: Arc<RwLock<BTreeMap<K, V>>>,
}

impl<K: Ord + Clone, V: Clone> SyncCache<K, V> {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Remember a binding the remote side accepted. A later binding for the
    /// same key replaces the earlier one.
    pub fn record(&self, key: K, value: V) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key, value);
    }

    /// Point-in-time copy of every binding, in key order.
    pub fn snapshot(&self) -> Vec<(K, V)> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    pub fn contains(&self, key: &K) -> bool {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Ord + Clone, V: Clone> Default for SyncCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for SyncCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = self
            .entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len();
        f.debug_struct("SyncCache").field("entries", &len).finish()
    }
}
