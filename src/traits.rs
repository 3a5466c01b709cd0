//! # Cache Policy Interface
//!
//! This module defines the two traits every engine in this crate satisfies:
//! a mutable single-threaded interface and a shared (`&self`) interface for
//! concurrent wrappers.
//!
//! ## Architecture
//!
//! ```text
//!            ┌──────────────────────────────────────────────┐
//!            │             CachePolicy<K, V>                │
//!            │                                              │
//!            │  put(&mut, K, V) → Option<V>                 │
//!            │  get(&mut, &K) → Option<V>                   │
//!            │  try_get(&mut, &K) → Result<V, CacheError>   │
//!            │  get_or_default(&mut, &K) → V                │
//!            │  remove(&mut, &K)                            │
//!            │  remove_all(&mut)                            │
//!            │  len(&) / is_empty(&) / capacity(&)          │
//!            └──────────────┬───────────────────────────────┘
//!                           │ implemented by
//!        ┌─────────┬────────┼─────────┬──────────┬──────────┐
//!        ▼         ▼        ▼         ▼          ▼          ▼
//!    LruCache  LfuCache  LfuAging  LruKCache  ArcCache  builder::Cache
//!
//!            ┌──────────────────────────────────────────────┐
//!            │        ConcurrentPolicy<K, V>: Send+Sync     │
//!            │                                              │
//!            │  same operation set with &self receivers     │
//!            └──────────────┬───────────────────────────────┘
//!                           │ implemented by
//!                  ┌────────┴────────┐
//!                  ▼                 ▼
//!          ConcurrentCache<P>  ShardedCache<P>
//! ```
//!
//! ## Design Notes
//!
//! Values cross the interface **by value**: `get` clones the stored value
//! instead of handing out a reference, because any reference into the cache
//! could dangle across a subsequent eviction. This is why `V: Clone` is
//! required on the lookup operations.
//!
//! `try_get` and `get_or_default` are provided methods over `get`, so from
//! inside an engine the three lookup forms are indistinguishable: one code
//! path performs the promotion / frequency bump.
//!
//! `ConcurrentPolicy` is dyn-compatible; harnesses can hold
//! `Box<dyn ConcurrentPolicy<u64, u64>>` and drive any wrapped engine.

use crate::error::CacheError;

/// Uniform interface over every eviction engine.
///
/// All operations are total: a successfully constructed engine never fails
/// at runtime. A miss is `None` (or `Err(KeyNotFound)` in the `try_get`
/// form), not an error condition inside the engine.
///
/// # Example
///
/// ```
/// use cachemux::traits::CachePolicy;
/// use cachemux::policy::lru::LruCache;
///
/// fn warm<C: CachePolicy<u64, String>>(cache: &mut C, data: &[(u64, &str)]) {
///     for (key, value) in data {
///         cache.put(*key, value.to_string());
///     }
/// }
///
/// let mut cache = LruCache::new(8).unwrap();
/// warm(&mut cache, &[(1, "one"), (2, "two")]);
/// assert_eq!(cache.len(), 2);
/// ```
pub trait CachePolicy<K, V> {
    /// Inserts or overwrites `key`, returning the previous value on
    /// overwrite.
    ///
    /// Always succeeds; at most one *other* key is evicted to make room.
    fn put(&mut self, key: K, value: V) -> Option<V>;

    /// Looks up `key` with policy side effects (promotion, frequency bump).
    ///
    /// Returns a clone of the stored value; the stored value itself is
    /// never mutated by a lookup.
    fn get(&mut self, key: &K) -> Option<V>;

    /// Single-return lookup form: a miss is a distinguishable failure.
    ///
    /// # Example
    ///
    /// ```
    /// use cachemux::error::CacheError;
    /// use cachemux::traits::CachePolicy;
    /// use cachemux::policy::lru::LruCache;
    ///
    /// let mut cache = LruCache::new(4).unwrap();
    /// cache.put(1, "one");
    /// assert_eq!(cache.try_get(&1), Ok("one"));
    /// assert_eq!(cache.try_get(&2), Err(CacheError::KeyNotFound));
    /// ```
    fn try_get(&mut self, key: &K) -> Result<V, CacheError> {
        self.get(key).ok_or(CacheError::KeyNotFound)
    }

    /// Convenience lookup returning `V::default()` on a miss.
    ///
    /// Delegates to [`get`](Self::get), so the policy side effects are
    /// identical; the engine cannot tell the two forms apart.
    fn get_or_default(&mut self, key: &K) -> V
    where
        V: Default,
    {
        self.get(key).unwrap_or_default()
    }

    /// Removes `key` if present. Idempotent; removing an absent key is a
    /// no-op.
    fn remove(&mut self, key: &K);

    /// Drops all entries, returning the engine to its post-construction
    /// state. Capacity and tuning parameters are preserved.
    fn remove_all(&mut self);

    /// Current number of resident entries.
    fn len(&self) -> usize;

    /// Returns `true` if no entries are resident.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of resident entries.
    fn capacity(&self) -> usize;
}

/// Shared-reference interface for engines behind a lock.
///
/// The same operation set as [`CachePolicy`] with `&self` receivers, so a
/// cache can be driven from multiple threads. Implementors serialize each
/// operation internally (one mutex per engine, or per shard); no operation
/// blocks on anything but that lock.
///
/// Operations on the same key through the same engine linearize with the
/// lock order. A [sharded](crate::policy::sharded::ShardedCache) cache gives
/// no cross-shard ordering guarantee; each shard linearizes independently.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use cachemux::traits::ConcurrentPolicy;
/// use cachemux::policy::lru::LruCache;
/// use cachemux::policy::sharded::ConcurrentCache;
///
/// let cache = Arc::new(ConcurrentCache::new(LruCache::new(64).unwrap()));
/// let worker = {
///     let cache = Arc::clone(&cache);
///     std::thread::spawn(move || {
///         cache.put(1, 100u64);
///     })
/// };
/// worker.join().unwrap();
/// assert_eq!(cache.get(&1), Some(100));
/// ```
pub trait ConcurrentPolicy<K, V>: Send + Sync {
    /// Inserts or overwrites `key`, returning the previous value on
    /// overwrite.
    fn put(&self, key: K, value: V) -> Option<V>;

    /// Looks up `key` with policy side effects; returns a clone of the
    /// stored value.
    fn get(&self, key: &K) -> Option<V>;

    /// Single-return lookup form: a miss is a distinguishable failure.
    fn try_get(&self, key: &K) -> Result<V, CacheError> {
        self.get(key).ok_or(CacheError::KeyNotFound)
    }

    /// Convenience lookup returning `V::default()` on a miss.
    fn get_or_default(&self, key: &K) -> V
    where
        V: Default,
    {
        self.get(key).unwrap_or_default()
    }

    /// Removes `key` if present; idempotent.
    fn remove(&self, key: &K);

    /// Drops all entries. For sharded implementations, shard locks are
    /// acquired in index order.
    fn remove_all(&self);

    /// Current number of resident entries (summed across shards).
    fn len(&self) -> usize;

    /// Returns `true` if no entries are resident.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of resident entries (summed across shards).
    fn capacity(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimal vec-backed policy to exercise the provided methods without
    // pulling in a real engine.
    struct TinyCache {
        data: Vec<(u32, String)>,
        capacity: usize,
    }

    impl CachePolicy<u32, String> for TinyCache {
        fn put(&mut self, key: u32, value: String) -> Option<String> {
            if let Some((_, existing)) = self.data.iter_mut().find(|(k, _)| *k == key) {
                return Some(std::mem::replace(existing, value));
            }
            if self.data.len() >= self.capacity {
                self.data.remove(0);
            }
            self.data.push((key, value));
            None
        }

        fn get(&mut self, key: &u32) -> Option<String> {
            self.data
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        }

        fn remove(&mut self, key: &u32) {
            self.data.retain(|(k, _)| k != key);
        }

        fn remove_all(&mut self) {
            self.data.clear();
        }

        fn len(&self) -> usize {
            self.data.len()
        }

        fn capacity(&self) -> usize {
            self.capacity
        }
    }

    fn tiny() -> TinyCache {
        TinyCache {
            data: Vec::new(),
            capacity: 4,
        }
    }

    #[test]
    fn try_get_maps_miss_to_key_not_found() {
        let mut cache = tiny();
        cache.put(1, "one".to_string());

        assert_eq!(cache.try_get(&1), Ok("one".to_string()));
        assert_eq!(cache.try_get(&2), Err(CacheError::KeyNotFound));
    }

    #[test]
    fn get_or_default_returns_default_on_miss() {
        let mut cache = tiny();
        cache.put(1, "one".to_string());

        assert_eq!(cache.get_or_default(&1), "one".to_string());
        assert_eq!(cache.get_or_default(&9), String::new());
    }

    #[test]
    fn is_empty_tracks_len() {
        let mut cache = tiny();
        assert!(cache.is_empty());
        cache.put(1, "one".to_string());
        assert!(!cache.is_empty());
        cache.remove_all();
        assert!(cache.is_empty());
    }
}
