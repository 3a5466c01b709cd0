//! Least Frequently Used (LFU) replacement policy.
//!
//! Entries carry a frequency count starting at 1 and live in per-frequency
//! bucket lists ([`FrequencyBuckets`]); `min_freq` tracks the smallest
//! non-empty bucket so the eviction victim (the oldest entry of that
//! bucket) is found in O(1).
//!
//! ```text
//!   get(x) / put(existing x):
//!     unlink x from buckets[f], append to tail of buckets[f+1]
//!     bucket f emptied and f == min_freq  →  min_freq += 1
//!
//!   put(new) when full:
//!     victim = head (oldest) of buckets[min_freq]
//!     insert new entry at freq 1, min_freq = 1
//!
//!   remove(x):
//!     unlink; emptied bucket was min_freq → rescan non-empty buckets
//! ```
//!
//! The two `min_freq` paths differ on purpose: a touch moves its entry to
//! exactly min+1, so the emptied bucket was the unique minimum and the
//! advance-by-one is sound; an explicit removal guarantees nothing about
//! neighboring buckets, so only a rescan is correct there.

use std::fmt;
use std::hash::Hash;

use crate::ds::FrequencyBuckets;
use crate::error::CacheError;
use crate::traits::CachePolicy;

/// LFU cache engine.
///
/// # Example
///
/// ```
/// use cachemux::policy::lfu::LfuCache;
/// use cachemux::traits::CachePolicy;
///
/// let mut cache = LfuCache::new(2).unwrap();
/// cache.put("a", 1);
/// cache.put("b", 2);
/// cache.get(&"a");
/// cache.get(&"a");
/// cache.put("c", 3);          // "b" has the lowest frequency: evicted
///
/// assert_eq!(cache.get(&"b"), None);
/// assert_eq!(cache.get(&"a"), Some(1));
/// assert_eq!(cache.get(&"c"), Some(3));
/// ```
pub struct LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    buckets: FrequencyBuckets<K, V>,
    capacity: usize,
}

impl<K, V> LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an LFU cache holding at most `capacity` entries.
    ///
    /// # Errors
    ///
    /// [`CacheError::InvalidCapacity`] if `capacity` is 0.
    pub fn new(capacity: usize) -> Result<Self, CacheError> {
        if capacity == 0 {
            return Err(CacheError::invalid_capacity("lfu capacity must be > 0"));
        }
        Ok(LfuCache {
            buckets: FrequencyBuckets::new(),
            capacity,
        })
    }

    /// Returns `true` if `key` is resident, without a frequency bump.
    pub fn contains(&self, key: &K) -> bool {
        self.buckets.contains(key)
    }

    /// Current frequency of `key`, if resident.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.buckets.frequency(key)
    }

    /// Smallest non-empty frequency, or 0 when the cache is empty.
    pub fn min_freq(&self) -> u64 {
        self.buckets.min_freq()
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        assert!(self.buckets.len() <= self.capacity);
        self.buckets.debug_validate_invariants();
    }
}

impl<K, V> CachePolicy<K, V> for LfuCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn put(&mut self, key: K, value: V) -> Option<V> {
        if self.buckets.contains(&key) {
            let previous = self.buckets.set_value(&key, value);
            self.buckets.touch(&key);
            return previous;
        }

        if self.buckets.len() >= self.capacity {
            self.buckets.evict_min();
        }
        self.buckets.insert_new(key, value);
        None
    }

    fn get(&mut self, key: &K) -> Option<V> {
        let value = self.buckets.value(key)?.clone();
        self.buckets.touch(key);
        Some(value)
    }

    fn remove(&mut self, key: &K) {
        self.buckets.remove(key);
    }

    fn remove_all(&mut self) {
        self.buckets.clear();
    }

    fn len(&self) -> usize {
        self.buckets.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<K, V> fmt::Debug for LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LfuCache")
            .field("len", &self.buckets.len())
            .field("capacity", &self.capacity)
            .field("min_freq", &self.buckets.min_freq())
            .finish_non_exhaustive()
    }
}
