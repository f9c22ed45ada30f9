//! String interning for tags, categories and author names.

use parking_lot::RwLock;
use rustc_hash::FxHashSet;
use std::sync::Arc;

/// Deduplicates equal strings to one shared allocation.
///
/// Lookups of already-interned values only take the read lock.
#[derive(Debug, Default)]
pub struct Interner {
    strings: RwLock<FxHashSet<Arc<str>>>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the shared copy of `value`, inserting it on first sight.
    pub fn intern(&self, value: &str) -> Arc<str> {
        // Fast path: already interned (read lock only)
        if let Some(existing) = self.strings.read().get(value) {
            return Arc::clone(existing);
        }

        // Slow path: double-check under the write lock
        let mut strings = self.strings.write();
        if let Some(existing) = strings.get(value) {
            return Arc::clone(existing);
        }
        let interned: Arc<str> = Arc::from(value);
        strings.insert(Arc::clone(&interned));
        interned
    }

    /// Drop entries nobody outside the table references any more.
    ///
    /// Returns the number of entries removed.
    pub fn purge_unused(&self) -> usize {
        let mut strings = self.strings.write();
        let before = strings.len();
        strings.retain(|s| Arc::strong_count(s) > 1);
        before - strings.len()
    }

    pub fn len(&self) -> usize {
        self.strings.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
