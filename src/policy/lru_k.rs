//! LRU-K replacement policy: two-tier admission.
//!
//! A key must be touched K times before it earns a slot in the main cache,
//! which keeps one-off scans from flushing the resident working set. The
//! engine composes two LRU structures plus a value side-map:
//!
//! ```text
//!   ┌───────────────────────────┐      count reaches K      ┌────────────────────┐
//!   │ history: LruCache<K,usize>│ ────────promote──────────►│ resident:          │
//!   │ (touch counts)            │                           │ LruCache<K, V>     │
//!   │ history_values: K → V     │                           │ (the real cache)   │
//!   └───────────────────────────┘                           └────────────────────┘
//! ```
//!
//! A key lives in at most one tier: promotion removes it from history.
//! `history_values` remembers the most recent value seen for a key still in
//! history, so a pure `get`-driven workload can materialize the value at
//! promotion time without refetching from upstream. A key seen only through
//! `get` misses has a count but no remembered value; it cannot be promoted
//! until a `put` supplies one.
//!
//! History is itself an LRU with its own capacity: keys that stop being
//! touched age out of it, and their remembered values are dropped with
//! them, so the side map never outgrows the history capacity.

use std::fmt;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::error::CacheError;
use crate::policy::lru::LruCache;
use crate::traits::CachePolicy;

/// LRU-K cache engine.
///
/// # Example
///
/// ```
/// use cachemux::policy::lru_k::LruKCache;
/// use cachemux::traits::CachePolicy;
///
/// let mut cache = LruKCache::new(2, 8, 4).unwrap();
///
/// cache.put(1, 100);               // first touch: history only
/// assert_eq!(cache.resident_len(), 0);
///
/// // The second touch reaches K = 2: promoted with the remembered value,
/// // and the promoting lookup is already a hit.
/// assert_eq!(cache.get(&1), Some(100));
/// assert_eq!(cache.resident_len(), 1);
/// ```
pub struct LruKCache<K, V>
where
    K: Eq + Hash + Clone,
{
    k: usize,
    history: LruCache<K, usize>,
    history_values: FxHashMap<K, V>,
    resident: LruCache<K, V>,
}

impl<K, V> LruKCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates an LRU-K cache.
    ///
    /// * `k`: touches required for admission to the resident cache.
    /// * `history_capacity`: how many not-yet-admitted keys to track.
    /// * `main_capacity`: resident cache capacity.
    ///
    /// # Errors
    ///
    /// [`CacheError::InvalidCapacity`] if `k`, `history_capacity`, or
    /// `main_capacity` is 0.
    pub fn new(
        k: usize,
        history_capacity: usize,
        main_capacity: usize,
    ) -> Result<Self, CacheError> {
        if k == 0 {
            return Err(CacheError::invalid_capacity("lru-k requires k >= 1"));
        }
        Ok(LruKCache {
            k,
            history: LruCache::new(history_capacity)
                .map_err(|_| CacheError::invalid_capacity("lru-k history capacity must be > 0"))?,
            history_values: FxHashMap::default(),
            resident: LruCache::new(main_capacity)
                .map_err(|_| CacheError::invalid_capacity("lru-k main capacity must be > 0"))?,
        })
    }

    /// Admission threshold K.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Number of keys currently tracked in history.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Number of resident entries.
    pub fn resident_len(&self) -> usize {
        self.resident.len()
    }

    /// Returns `true` if `key` is resident (history entries don't count).
    pub fn contains(&self, key: &K) -> bool {
        self.resident.contains(key)
    }

    /// Bumps the history count for `key`; promotes to resident when the
    /// count reaches K, carrying `value` forward.
    fn touch_and_maybe_promote(&mut self, key: K, value: V) {
        let count = self.history.get(&key).unwrap_or(0) + 1;
        if count >= self.k {
            self.resident.put(key.clone(), value);
            self.history.remove(&key);
            self.history_values.remove(&key);
        } else {
            self.record_history(key.clone(), count);
            self.history_values.insert(key, value);
        }
    }

    /// Bumps the history count without remembering a value (get-miss path).
    fn touch_count_only(&mut self, key: &K) {
        let count = self.history.get(key).unwrap_or(0) + 1;
        self.record_history(key.clone(), count);
    }

    /// Writes a count into history, dropping the side-map entry of any key
    /// the history LRU pushes out to do it.
    fn record_history(&mut self, key: K, count: usize) {
        if self.history.len() >= self.history.capacity() && !self.history.contains(&key) {
            if let Some((evicted_key, _)) = self.history.pop_lru() {
                self.history_values.remove(&evicted_key);
            }
        }
        self.history.put(key, count);
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        self.history.debug_validate_invariants();
        self.resident.debug_validate_invariants();
        assert!(self.history_values.len() <= self.history.len());
        for key in self.history_values.keys() {
            assert!(
                self.history.contains(key),
                "remembered value for a key history no longer tracks"
            );
            assert!(
                !self.resident.contains(key),
                "key is in both history and resident"
            );
        }
    }
}

impl<K, V> CachePolicy<K, V> for LruKCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn put(&mut self, key: K, value: V) -> Option<V> {
        if self.resident.contains(&key) {
            return self.resident.put(key, value);
        }
        self.touch_and_maybe_promote(key, value);
        None
    }

    fn get(&mut self, key: &K) -> Option<V> {
        if let Some(value) = self.resident.get(key) {
            return Some(value);
        }

        if let Some(remembered) = self.history_values.get(key).cloned() {
            self.touch_and_maybe_promote(key.clone(), remembered);
            // A hit only if the touch crossed the admission threshold.
            return self.resident.get(key);
        }

        self.touch_count_only(key);
        None
    }

    fn remove(&mut self, key: &K) {
        self.resident.remove(key);
        self.history.remove(key);
        self.history_values.remove(key);
    }

    fn remove_all(&mut self) {
        self.resident.remove_all();
        self.history.remove_all();
        self.history_values.clear();
    }

    fn len(&self) -> usize {
        self.resident.len()
    }

    fn capacity(&self) -> usize {
        self.resident.capacity()
    }
}

impl<K, V> fmt::Debug for LruKCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruKCache")
            .field("k", &self.k)
            .field("history_len", &self.history.len())
            .field("resident_len", &self.resident.len())
            .field("capacity", &self.resident.capacity())
            .finish_non_exhaustive()
    }
}
