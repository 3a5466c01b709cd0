//! Bounded recency list for ghost entries.
//!
//! Tracks recently evicted *keys* without their values, so an adaptive
//! policy can detect re-references to entries it gave up on. Used by the
//! ARC engine for its B1/B2 lists. Implemented as an [`IntrusiveList`] plus
//! a hash index for O(1) membership.
//!
//! ```text
//!   record("d") when full (capacity = 3):
//!     1. index miss for "d"
//!     2. at capacity → pop_back() evicts LRU key, drop from index
//!     3. push_front("d"), insert into index
//!
//!   record("a") when present:
//!     move_to_front(id): promotion only, no eviction
//! ```
//!
//! A ghost hit is `contains(&key)`; the caller typically follows it with
//! `remove(&key)` so the hit is not counted twice.

use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::intrusive_list::IntrusiveList;
use crate::ds::slot_arena::SlotId;

/// Bounded, key-only recency list (MRU at front, LRU at back).
#[derive(Debug)]
pub struct GhostList<K> {
    list: IntrusiveList<K>,
    index: FxHashMap<K, SlotId>,
    capacity: usize,
}

impl<K> GhostList<K>
where
    K: Eq + Hash + Clone,
{
    /// Creates a ghost list holding at most `capacity` keys.
    ///
    /// A capacity of 0 creates a no-op list that ignores all records.
    pub fn new(capacity: usize) -> Self {
        Self {
            list: IntrusiveList::with_capacity(capacity),
            index: FxHashMap::default(),
            capacity,
        }
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of keys currently tracked.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Returns `true` if no keys are tracked.
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Ghost-hit check: `true` if `key` was recently recorded.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Records `key` as most recently seen, evicting the least recent key
    /// if the list is full. Re-recording an existing key promotes it.
    pub fn record(&mut self, key: K) {
        if self.capacity == 0 {
            return;
        }

        if let Some(&id) = self.index.get(&key) {
            self.list.move_to_front(id);
            return;
        }

        if self.list.len() >= self.capacity {
            if let Some(old_key) = self.list.pop_back() {
                self.index.remove(&old_key);
            }
        }

        let id = self.list.push_front(key.clone());
        self.index.insert(key, id);
    }

    /// Removes `key`; returns `true` if it was present.
    pub fn remove(&mut self, key: &K) -> bool {
        match self.index.remove(key) {
            Some(id) => {
                self.list.remove(id);
                true
            },
            None => false,
        }
    }

    /// Drops the least recently recorded key, if any, and returns it.
    pub fn evict_oldest(&mut self) -> Option<K> {
        let key = self.list.pop_back()?;
        self.index.remove(&key);
        Some(key)
    }

    /// Drops all tracked keys.
    pub fn clear(&mut self) {
        self.list.clear();
        self.index.clear();
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        assert_eq!(self.list.len(), self.index.len());
        assert!(self.list.len() <= self.capacity);
        for key in self.list.iter() {
            assert!(self.index.contains_key(key), "listed key missing in index");
        }
        self.list.debug_validate_invariants();
    }
}
