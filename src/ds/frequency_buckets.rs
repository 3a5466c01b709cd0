//! Per-frequency bucket lists with a running minimum-frequency pointer.
//!
//! The shared substrate of the LFU and LFU-Aging engines: a map from
//! frequency count to a doubly linked list of entries at that frequency,
//! plus `min_freq`, the smallest non-empty bucket (0 when empty).
//!
//! ## Architecture
//!
//! ```text
//!   buckets: FxHashMap<u64, IntrusiveList<(K, V)>>
//!
//!   freq 1: head ──► [d] ◄──► [e] ◄── tail      ← min_freq = 1
//!   freq 3: head ──► [a] ◄── tail
//!   freq 7: head ──► [b] ◄──► [c] ◄── tail
//!
//!   Within a bucket: head = oldest arrival, tail = newest.
//!   Eviction victim: head of buckets[min_freq].
//! ```
//!
//! ## min_freq maintenance
//!
//! Two paths, deliberately different:
//!
//! - `touch` empties the min bucket → advance `min_freq` by one. Sound
//!   because a touch raises the entry's frequency by exactly one, so the
//!   entry now lives at min+1 and nothing can sit below it.
//! - `remove` empties the min bucket → rescan the non-empty buckets. An
//!   arbitrary removal gives no guarantee about neighboring buckets, so the
//!   cheap advance is not available here.

use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::intrusive_list::IntrusiveList;
use crate::ds::slot_arena::SlotId;

#[derive(Debug)]
struct BucketEntry<K, V> {
    key: K,
    value: V,
}

#[derive(Debug, Clone, Copy)]
struct EntrySlot {
    freq: u64,
    id: SlotId,
}

/// Frequency-ordered entry storage: freq → list map, key index, `min_freq`.
#[derive(Debug)]
pub struct FrequencyBuckets<K, V> {
    buckets: FxHashMap<u64, IntrusiveList<BucketEntry<K, V>>>,
    index: FxHashMap<K, EntrySlot>,
    min_freq: u64,
}

impl<K, V> FrequencyBuckets<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty structure.
    pub fn new() -> Self {
        Self {
            buckets: FxHashMap::default(),
            index: FxHashMap::default(),
            min_freq: 0,
        }
    }

    /// Number of resident entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if no entries are resident.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Smallest non-empty frequency, or 0 when empty.
    pub fn min_freq(&self) -> u64 {
        self.min_freq
    }

    /// Returns `true` if `key` is resident.
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Frequency of `key`, if resident.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.index.get(key).map(|slot| slot.freq)
    }

    /// Shared reference to the value of `key`, if resident.
    pub fn value(&self, key: &K) -> Option<&V> {
        let slot = self.index.get(key)?;
        self.buckets
            .get(&slot.freq)
            .and_then(|list| list.get(slot.id))
            .map(|entry| &entry.value)
    }

    /// Replaces the value of `key` without touching its frequency;
    /// returns the previous value.
    pub fn set_value(&mut self, key: &K, value: V) -> Option<V> {
        let slot = *self.index.get(key)?;
        let entry = self
            .buckets
            .get_mut(&slot.freq)
            .and_then(|list| list.get_mut(slot.id))?;
        Some(std::mem::replace(&mut entry.value, value))
    }

    /// Inserts a new key at frequency 1 (newest position of the bucket)
    /// and resets `min_freq` to 1. The key must not be resident.
    pub fn insert_new(&mut self, key: K, value: V) {
        debug_assert!(!self.index.contains_key(&key));
        let id = self
            .buckets
            .entry(1)
            .or_default()
            .push_back(BucketEntry {
                key: key.clone(),
                value,
            });
        self.index.insert(key, EntrySlot { freq: 1, id });
        self.min_freq = 1;
    }

    /// Moves `key` from its bucket to the next higher one, returning the
    /// new frequency. Advances `min_freq` by one if the touch emptied the
    /// minimum bucket.
    pub fn touch(&mut self, key: &K) -> Option<u64> {
        let slot = *self.index.get(key)?;
        let old_freq = slot.freq;
        let new_freq = old_freq + 1;

        let entry = {
            let list = self.buckets.get_mut(&old_freq)?;
            let entry = list.remove(slot.id)?;
            if list.is_empty() {
                self.buckets.remove(&old_freq);
                if old_freq == self.min_freq {
                    self.min_freq = new_freq;
                }
            }
            entry
        };

        let id = self.buckets.entry(new_freq).or_default().push_back(entry);
        self.index.insert(
            key.clone(),
            EntrySlot {
                freq: new_freq,
                id,
            },
        );
        Some(new_freq)
    }

    /// Evicts the oldest entry of the minimum-frequency bucket, returning
    /// `(key, value, freq)`.
    pub fn evict_min(&mut self) -> Option<(K, V, u64)> {
        if self.min_freq == 0 {
            return None;
        }
        let victim_freq = self.min_freq;

        let entry = {
            let list = self.buckets.get_mut(&victim_freq)?;
            let entry = list.pop_front()?;
            if list.is_empty() {
                self.buckets.remove(&victim_freq);
                self.rescan_min_freq();
            }
            entry
        };

        self.index.remove(&entry.key);
        Some((entry.key, entry.value, victim_freq))
    }

    /// Removes `key`, returning `(value, freq)`. Rescans for the new
    /// `min_freq` when the removal empties the minimum bucket.
    pub fn remove(&mut self, key: &K) -> Option<(V, u64)> {
        let slot = self.index.remove(key)?;
        let list = self.buckets.get_mut(&slot.freq)?;
        let entry = list.remove(slot.id)?;
        if list.is_empty() {
            self.buckets.remove(&slot.freq);
            if slot.freq == self.min_freq {
                self.rescan_min_freq();
            }
        }
        Some((entry.value, slot.freq))
    }

    /// Ages every entry: `freq' = max(1, freq - delta)`. Buckets are
    /// rebuilt in ascending frequency order so each entry keeps its
    /// relative age, `min_freq` is recomputed, and the new total frequency
    /// sum is returned. Never evicts.
    pub fn age(&mut self, delta: u64) -> u64 {
        let mut freqs: Vec<u64> = self.buckets.keys().copied().collect();
        freqs.sort_unstable();

        let mut old_buckets = std::mem::take(&mut self.buckets);
        self.min_freq = 0;
        let mut total = 0u64;

        for freq in freqs {
            let mut list = match old_buckets.remove(&freq) {
                Some(list) => list,
                None => continue,
            };
            let new_freq = freq.saturating_sub(delta).max(1);
            while let Some(entry) = list.pop_front() {
                let key = entry.key.clone();
                let id = self.buckets.entry(new_freq).or_default().push_back(entry);
                self.index.insert(
                    key,
                    EntrySlot {
                        freq: new_freq,
                        id,
                    },
                );
                total += new_freq;
            }
            if self.min_freq == 0 || new_freq < self.min_freq {
                self.min_freq = new_freq;
            }
        }

        total
    }

    /// Drops all entries and resets `min_freq` to 0.
    pub fn clear(&mut self) {
        self.buckets.clear();
        self.index.clear();
        self.min_freq = 0;
    }

    fn rescan_min_freq(&mut self) {
        self.min_freq = self
            .buckets
            .iter()
            .filter(|(_, list)| !list.is_empty())
            .map(|(&freq, _)| freq)
            .min()
            .unwrap_or(0);
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        let bucket_total: usize = self.buckets.values().map(|list| list.len()).sum();
        assert_eq!(bucket_total, self.index.len());

        let expected_min = self
            .buckets
            .iter()
            .filter(|(_, list)| !list.is_empty())
            .map(|(&freq, _)| freq)
            .min()
            .unwrap_or(0);
        assert_eq!(self.min_freq, expected_min, "stale min_freq");

        for (freq, list) in &self.buckets {
            assert!(!list.is_empty(), "empty bucket left behind for freq {freq}");
            for entry in list.iter() {
                let slot = self.index.get(&entry.key).expect("bucketed key not indexed");
                assert_eq!(slot.freq, *freq, "entry freq disagrees with its bucket");
            }
            list.debug_validate_invariants();
        }
    }
}

impl<K, V> Default for FrequencyBuckets<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_starts_at_freq_one() {
        let mut buckets = FrequencyBuckets::new();
        buckets.insert_new("a", 1);

        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets.min_freq(), 1);
        assert_eq!(buckets.frequency(&"a"), Some(1));
        buckets.debug_validate_invariants();
    }

    #[test]
    fn touch_advances_min_freq_by_one() {
        let mut buckets = FrequencyBuckets::new();
        buckets.insert_new("a", 1);

        assert_eq!(buckets.touch(&"a"), Some(2));
        assert_eq!(buckets.min_freq(), 2);
        assert_eq!(buckets.touch(&"a"), Some(3));
        assert_eq!(buckets.min_freq(), 3);
        buckets.debug_validate_invariants();
    }

    #[test]
    fn touch_keeps_min_when_bucket_still_populated() {
        let mut buckets = FrequencyBuckets::new();
        buckets.insert_new("a", 1);
        buckets.insert_new("b", 2);

        buckets.touch(&"a");
        assert_eq!(buckets.min_freq(), 1); // "b" still at 1
        buckets.debug_validate_invariants();
    }

    #[test]
    fn evict_min_takes_oldest_of_min_bucket() {
        let mut buckets = FrequencyBuckets::new();
        buckets.insert_new("a", 1);
        buckets.insert_new("b", 2);
        buckets.insert_new("c", 3);
        buckets.touch(&"c");

        let (key, value, freq) = buckets.evict_min().unwrap();
        assert_eq!((key, value, freq), ("a", 1, 1));

        let (key, _, _) = buckets.evict_min().unwrap();
        assert_eq!(key, "b");

        // Only "c" at freq 2 remains; rescan found it.
        assert_eq!(buckets.min_freq(), 2);
        buckets.debug_validate_invariants();
    }

    #[test]
    fn remove_rescans_min_freq() {
        let mut buckets = FrequencyBuckets::new();
        buckets.insert_new("a", 1);
        buckets.insert_new("b", 2);
        buckets.touch(&"b");
        buckets.touch(&"b");

        buckets.remove(&"a");
        assert_eq!(buckets.min_freq(), 3);

        buckets.remove(&"b");
        assert_eq!(buckets.min_freq(), 0);
        assert!(buckets.is_empty());
        buckets.debug_validate_invariants();
    }

    #[test]
    fn age_floors_at_one_and_preserves_order() {
        let mut buckets = FrequencyBuckets::new();
        buckets.insert_new("a", 1);
        buckets.insert_new("b", 2);
        for _ in 0..4 {
            buckets.touch(&"a");
        }
        // a: 5, b: 1

        let total = buckets.age(2);
        assert_eq!(buckets.frequency(&"a"), Some(3));
        assert_eq!(buckets.frequency(&"b"), Some(1));
        assert_eq!(total, 4);
        assert_eq!(buckets.min_freq(), 1);
        buckets.debug_validate_invariants();

        // Victim after aging is still the lowest-frequency entry.
        let (key, _, _) = buckets.evict_min().unwrap();
        assert_eq!(key, "b");
    }

    #[test]
    fn set_value_keeps_frequency() {
        let mut buckets = FrequencyBuckets::new();
        buckets.insert_new("a", 1);
        buckets.touch(&"a");

        assert_eq!(buckets.set_value(&"a", 9), Some(1));
        assert_eq!(buckets.value(&"a"), Some(&9));
        assert_eq!(buckets.frequency(&"a"), Some(2));
    }
}
