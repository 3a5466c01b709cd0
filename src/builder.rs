//! Unified cache builder: one entry point, any eviction policy.
//!
//! The engines are ordinary structs with their own constructors; this
//! module adds runtime policy selection for callers (like the benchmark
//! harness) that pick a policy from configuration rather than at the type
//! level.
//!
//! ## Example
//!
//! ```
//! use cachemux::builder::{CacheBuilder, PolicyKind};
//! use cachemux::traits::CachePolicy;
//!
//! let mut cache = CacheBuilder::new(100)
//!     .policy(PolicyKind::Arc)
//!     .build::<u64, String>()
//!     .unwrap();
//!
//! cache.put(1, "hello".to_string());
//! assert_eq!(cache.get(&1), Some("hello".to_string()));
//! ```

use std::hash::Hash;

use crate::error::CacheError;
use crate::policy::arc::ArcCache;
use crate::policy::lfu::LfuCache;
use crate::policy::lfu_aging::{LfuAgingCache, DEFAULT_MAX_AVG_FREQ};
use crate::policy::lru::LruCache;
use crate::policy::lru_k::LruKCache;
use crate::traits::CachePolicy;

/// Which eviction policy to build.
#[derive(Debug, Clone, PartialEq)]
pub enum PolicyKind {
    /// Least Recently Used.
    Lru,
    /// Least Frequently Used.
    Lfu,
    /// LFU with average-triggered frequency decay.
    LfuAging { max_avg_freq_limit: f64 },
    /// Two-tier admission: K touches before entering the main cache.
    /// `history_capacity` bounds the not-yet-admitted tier.
    LruK { k: usize, history_capacity: usize },
    /// Adaptive Replacement Cache.
    Arc,
}

/// Builder carrying the capacity and policy choice.
#[derive(Debug, Clone)]
pub struct CacheBuilder {
    capacity: usize,
    kind: PolicyKind,
}

impl CacheBuilder {
    /// Starts a builder for a cache of `capacity` entries (LRU by default).
    pub fn new(capacity: usize) -> Self {
        CacheBuilder {
            capacity,
            kind: PolicyKind::Lru,
        }
    }

    /// Selects the eviction policy.
    pub fn policy(mut self, kind: PolicyKind) -> Self {
        self.kind = kind;
        self
    }

    /// Builds the cache.
    ///
    /// # Errors
    ///
    /// [`CacheError::InvalidCapacity`] under the same rules as the direct
    /// constructors (zero capacity, zero K, zero history capacity).
    pub fn build<K, V>(self) -> Result<Cache<K, V>, CacheError>
    where
        K: Eq + Hash + Clone,
        V: Clone,
    {
        let inner = match self.kind {
            PolicyKind::Lru => CacheInner::Lru(LruCache::new(self.capacity)?),
            PolicyKind::Lfu => CacheInner::Lfu(LfuCache::new(self.capacity)?),
            PolicyKind::LfuAging { max_avg_freq_limit } => {
                CacheInner::LfuAging(LfuAgingCache::new(self.capacity, max_avg_freq_limit)?)
            },
            PolicyKind::LruK {
                k,
                history_capacity,
            } => CacheInner::LruK(LruKCache::new(k, history_capacity, self.capacity)?),
            PolicyKind::Arc => CacheInner::Arc(ArcCache::new(self.capacity)?),
        };
        Ok(Cache { inner })
    }
}

impl Default for PolicyKind {
    fn default() -> Self {
        PolicyKind::Lru
    }
}

/// Default parameters for [`PolicyKind::LfuAging`].
pub fn lfu_aging_default() -> PolicyKind {
    PolicyKind::LfuAging {
        max_avg_freq_limit: DEFAULT_MAX_AVG_FREQ,
    }
}

/// Policy-erased cache: enum dispatch over the five engines.
pub struct Cache<K, V>
where
    K: Eq + Hash + Clone,
{
    inner: CacheInner<K, V>,
}

enum CacheInner<K, V>
where
    K: Eq + Hash + Clone,
{
    Lru(LruCache<K, V>),
    Lfu(LfuCache<K, V>),
    LfuAging(LfuAgingCache<K, V>),
    LruK(LruKCache<K, V>),
    Arc(ArcCache<K, V>),
}

macro_rules! dispatch {
    (ref $self:expr, $cache:ident => $body:expr) => {
        match &$self.inner {
            CacheInner::Lru($cache) => $body,
            CacheInner::Lfu($cache) => $body,
            CacheInner::LfuAging($cache) => $body,
            CacheInner::LruK($cache) => $body,
            CacheInner::Arc($cache) => $body,
        }
    };
    ($self:expr, $cache:ident => $body:expr) => {
        match &mut $self.inner {
            CacheInner::Lru($cache) => $body,
            CacheInner::Lfu($cache) => $body,
            CacheInner::LfuAging($cache) => $body,
            CacheInner::LruK($cache) => $body,
            CacheInner::Arc($cache) => $body,
        }
    };
}

impl<K, V> CachePolicy<K, V> for Cache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn put(&mut self, key: K, value: V) -> Option<V> {
        dispatch!(self, cache => cache.put(key, value))
    }

    fn get(&mut self, key: &K) -> Option<V> {
        dispatch!(self, cache => cache.get(key))
    }

    fn remove(&mut self, key: &K) {
        dispatch!(self, cache => cache.remove(key))
    }

    fn remove_all(&mut self) {
        dispatch!(self, cache => cache.remove_all())
    }

    fn len(&self) -> usize {
        dispatch!(ref self, cache => cache.len())
    }

    fn capacity(&self) -> usize {
        dispatch!(ref self, cache => cache.capacity())
    }
}
