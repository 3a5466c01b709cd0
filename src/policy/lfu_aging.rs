//! LFU with aging: frequency decay that unpins stale hot entries.
//!
//! Plain LFU lets an entry that was hot long ago keep a towering frequency
//! forever, so newly hot keys can never dislodge it. This engine tracks the
//! running sum of all resident frequencies and, whenever the average
//! frequency exceeds a configured limit after an insertion or touch, ages
//! the whole cache:
//!
//! ```text
//!   delta = floor(max_avg_freq_limit / 2)
//!   for every resident entry: freq' = max(1, freq - delta)
//!   buckets rebuilt, min_freq and total_freq_sum recomputed
//! ```
//!
//! Aging compresses the frequency distribution; it never evicts. Eviction
//! stays pure LFU: oldest entry of the minimum-frequency bucket.

use std::fmt;
use std::hash::Hash;

use crate::ds::FrequencyBuckets;
use crate::error::CacheError;
use crate::traits::CachePolicy;

/// Default average-frequency limit, matching the common deployment value.
pub const DEFAULT_MAX_AVG_FREQ: f64 = 10.0;

/// LFU engine with average-triggered frequency decay.
///
/// # Example
///
/// ```
/// use cachemux::policy::lfu_aging::LfuAgingCache;
/// use cachemux::traits::CachePolicy;
///
/// let mut cache = LfuAgingCache::new(3, 2.0).unwrap();
/// cache.put("a", 1);
/// for _ in 0..5 {
///     cache.get(&"a");        // would reach freq 6 without aging
/// }
/// // The average-frequency trigger kept the count compressed:
/// assert!(cache.frequency(&"a").unwrap() <= 3);
/// ```
pub struct LfuAgingCache<K, V>
where
    K: Eq + Hash + Clone,
{
    buckets: FrequencyBuckets<K, V>,
    capacity: usize,
    max_avg_freq_limit: f64,
    total_freq_sum: u64,
}

impl<K, V> LfuAgingCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an aging LFU cache.
    ///
    /// `max_avg_freq_limit` is the average frequency above which a decay
    /// pass runs; values at or below 1.0 make aging nearly continuous.
    ///
    /// # Errors
    ///
    /// [`CacheError::InvalidCapacity`] if `capacity` is 0.
    pub fn new(capacity: usize, max_avg_freq_limit: f64) -> Result<Self, CacheError> {
        if capacity == 0 {
            return Err(CacheError::invalid_capacity(
                "lfu-aging capacity must be > 0",
            ));
        }
        Ok(LfuAgingCache {
            buckets: FrequencyBuckets::new(),
            capacity,
            max_avg_freq_limit,
            total_freq_sum: 0,
        })
    }

    /// Creates an aging LFU cache with [`DEFAULT_MAX_AVG_FREQ`].
    pub fn with_default_limit(capacity: usize) -> Result<Self, CacheError> {
        Self::new(capacity, DEFAULT_MAX_AVG_FREQ)
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

    /// Sum of all resident frequencies.
    pub fn total_freq_sum(&self) -> u64 {
        self.total_freq_sum
    }

    /// Configured average-frequency limit.
    pub fn max_avg_freq_limit(&self) -> f64 {
        self.max_avg_freq_limit
    }

    /// Runs a decay pass if the average frequency exceeds the limit.
    fn maybe_age(&mut self) {
        if self.buckets.is_empty() {
            return;
        }
        let avg = self.total_freq_sum as f64 / self.buckets.len() as f64;
        if avg > self.max_avg_freq_limit {
            let delta = (self.max_avg_freq_limit / 2.0).floor() as u64;
            self.total_freq_sum = self.buckets.age(delta);
        }
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        assert!(self.buckets.len() <= self.capacity);
        self.buckets.debug_validate_invariants();

        // With a delta of 0 (limit < 2) aging cannot lower anything, so the
        // bound only holds for effective deltas.
        let delta = (self.max_avg_freq_limit / 2.0).floor();
        if !self.buckets.is_empty() && delta >= 1.0 {
            let avg = self.total_freq_sum as f64 / self.buckets.len() as f64;
            assert!(
                avg <= self.max_avg_freq_limit + delta,
                "average frequency {avg} escaped the aging trigger"
            );
        }
    }
}

impl<K, V> CachePolicy<K, V> for LfuAgingCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn put(&mut self, key: K, value: V) -> Option<V> {
        if self.buckets.contains(&key) {
            let previous = self.buckets.set_value(&key, value);
            self.buckets.touch(&key);
            self.total_freq_sum += 1;
            self.maybe_age();
            return previous;
        }

        if self.buckets.len() >= self.capacity {
            if let Some((_, _, freq)) = self.buckets.evict_min() {
                self.total_freq_sum -= freq;
            }
        }
        self.buckets.insert_new(key, value);
        self.total_freq_sum += 1;
        self.maybe_age();
        None
    }

    fn get(&mut self, key: &K) -> Option<V> {
        let value = self.buckets.value(key)?.clone();
        self.buckets.touch(key);
        self.total_freq_sum += 1;
        self.maybe_age();
        Some(value)
    }

    fn remove(&mut self, key: &K) {
        if let Some((_, freq)) = self.buckets.remove(key) {
            self.total_freq_sum -= freq;
        }
    }

    fn remove_all(&mut self) {
        self.buckets.clear();
        self.total_freq_sum = 0;
    }

    fn len(&self) -> usize {
        self.buckets.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<K, V> fmt::Debug for LfuAgingCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LfuAgingCache")
            .field("len", &self.buckets.len())
            .field("capacity", &self.capacity)
            .field("min_freq", &self.buckets.min_freq())
            .field("total_freq_sum", &self.total_freq_sum)
            .field("max_avg_freq_limit", &self.max_avg_freq_limit)
            .finish_non_exhaustive()
    }
}
