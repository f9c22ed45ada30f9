//! Fixed-capacity LRU cache safe for concurrent readers.

use lru::LruCache;
use parking_lot::RwLock;
use std::{hash::Hash, num::NonZeroUsize};

/// Entries evicted per write-lock acquisition during compaction,
/// so readers are never starved by a long eviction pass.
const EVICTION_BATCH: usize = 32;

/// LRU cache behind a read-write lock.
///
/// Hits take the read lock and then try (without waiting) to bump the entry's
/// recency; a contended promote is simply skipped.
#[derive(Debug)]
pub struct BoundedCache<K: Hash + Eq, V> {
    entries: RwLock<LruCache<K, V>>,
}

impl<K: Hash + Eq + Clone, V: Clone> BoundedCache<K, V> {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(capacity)),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let value = self.entries.read().peek(key).cloned()?;
        if let Some(mut entries) = self.entries.try_write() {
            entries.promote(key);
        }
        Some(value)
    }

    /// Insert, evicting the least recently used entry when full.
    pub fn insert(&self, key: K, value: V) {
        self.entries.write().put(key, value);
    }

    /// Evict `ratio` (0..=1) of the entries, least recently used first.
    ///
    /// Returns the number of entries evicted.
    pub fn compact(&self, ratio: f64) -> usize {
        let len = self.len();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
        let target = ((len as f64) * ratio.clamp(0.0, 1.0)).ceil() as usize;

        let mut evicted = 0;
        while evicted < target {
            let mut entries = self.entries.write();
            let batch = EVICTION_BATCH.min(target - evicted);
            for _ in 0..batch {
                if entries.pop_lru().is_none() {
                    return evicted;
                }
                evicted += 1;
            }
        }
        evicted
    }

    /// Remove every entry whose key fails `keep`. Returns the number removed.
    pub fn retain(&self, mut keep: impl FnMut(&K) -> bool) -> usize {
        let mut entries = self.entries.write();
        let stale: Vec<K> = entries
            .iter()
            .filter(|(key, _)| !keep(key))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &stale {
            entries.pop(key);
        }
        stale.len()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.entries.read().cap().get()
    }
}
