//! Deterministic key-to-shard mapping.
//!
//! Maps any `Hash`able key to a shard index in `[0, shards)` with a seeded
//! `DefaultHasher`: same `(key, seed, shards)` always yields the same shard.
//! The sharded cache wrapper uses this to pick which shard's lock to take.
//!
//! ```text
//!   key ──hash(seed, key)──► h ──► h % shards ──► shard index
//!
//!   ┌─────────┬─────────┬─────────┬─────────┐
//!   │ shard 0 │ shard 1 │ shard 2 │ shard 3 │
//!   └─────────┴─────────┴─────────┴─────────┘
//! ```

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Seeded, deterministic shard selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardSelector {
    shards: usize,
    seed: u64,
}

impl ShardSelector {
    /// Creates a selector for `shards` shards (clamped to at least 1) with
    /// the given seed.
    pub fn new(shards: usize, seed: u64) -> Self {
        Self {
            shards: shards.max(1),
            seed,
        }
    }

    /// Number of shards.
    pub fn shard_count(&self) -> usize {
        self.shards
    }

    /// Maps a key to a shard index in `[0, shards)`.
    ///
    /// # Example
    ///
    /// ```
    /// use cachemux::ds::ShardSelector;
    ///
    /// let selector = ShardSelector::new(4, 0);
    /// let shard = selector.shard_for_key(&"user:alice");
    /// assert!(shard < 4);
    /// assert_eq!(selector.shard_for_key(&"user:alice"), shard);
    /// ```
    pub fn shard_for_key<K: Hash>(&self, key: &K) -> usize {
        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        key.hash(&mut hasher);
        (hasher.finish() as usize) % self.shards
    }
}

impl Default for ShardSelector {
    /// Single-shard selector with seed 0.
    fn default() -> Self {
        Self::new(1, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_is_deterministic() {
        let selector = ShardSelector::new(8, 123);
        let a = selector.shard_for_key(&"key");
        let b = selector.shard_for_key(&"key");
        assert_eq!(a, b);
        assert!(a < selector.shard_count());
    }

    #[test]
    fn zero_shards_clamped_to_one() {
        let selector = ShardSelector::new(0, 0);
        assert_eq!(selector.shard_count(), 1);
        for key in 0..16u32 {
            assert_eq!(selector.shard_for_key(&key), 0);
        }
    }

    #[test]
    fn keys_spread_over_multiple_shards() {
        let selector = ShardSelector::new(4, 0);
        let mut used = [false; 4];
        for key in 0..256u64 {
            used[selector.shard_for_key(&key)] = true;
        }
        assert!(used.iter().filter(|&&u| u).count() > 1);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Same key always returns the same shard.
        #[test]
        fn prop_deterministic_mapping(
            shard_count in 1usize..64,
            seed in any::<u64>(),
            key in any::<u32>()
        ) {
            let selector = ShardSelector::new(shard_count, seed);
            prop_assert_eq!(selector.shard_for_key(&key), selector.shard_for_key(&key));
        }

        /// Shard index is always in range.
        #[test]
        fn prop_shard_in_range(
            shard_count in 1usize..128,
            seed in any::<u64>(),
            key in any::<u64>()
        ) {
            let selector = ShardSelector::new(shard_count, seed);
            prop_assert!(selector.shard_for_key(&key) < shard_count);
        }
    }
}
