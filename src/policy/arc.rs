//! Adaptive Replacement Cache (ARC).
//!
//! ARC balances recency against frequency at run time by keeping two
//! resident lists and two key-only ghost lists, plus a target parameter `p`
//! that steers eviction between them.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────────┐
//! │                          ArcCache<K, V> layout                         │
//! │                                                                        │
//! │   index: FxHashMap<K, NonNull<Node>>   (resident keys only)            │
//! │                                                                        │
//! │   T1 (seen once, recency)           T2 (seen again, frequency)         │
//! │   ┌─────────────────────────┐       ┌─────────────────────────┐        │
//! │   │ MRU ──► ... ──► LRU     │       │ MRU ──► ... ──► LRU     │        │
//! │   │ insert here     evict   │       │ promote here    evict   │        │
//! │   └───────────┬─────────────┘       └───────────┬─────────────┘        │
//! │               │ evicted keys                    │ evicted keys         │
//! │               ▼                                 ▼                      │
//! │   B1 (ghost of T1, keys only)       B2 (ghost of T2, keys only)        │
//! │                                                                        │
//! │   p ∈ [0, capacity]: target share of T1                                │
//! │   • hit in B1 → p grows  (workload wants more recency room)            │
//! │   • hit in B2 → p shrinks (workload wants more frequency room)         │
//! └────────────────────────────────────────────────────────────────────────┘
//!
//! get(key):
//!   T1 hit → move node to T2 MRU (promotion), return value
//!   T2 hit → refresh node to T2 MRU, return value
//!   otherwise miss; ghost lists are never consulted by get
//!
//! put(key, value):
//!   resident      → overwrite; T1 node promotes to T2 MRU, T2 refreshes
//!   hit in B1     → p += max(1, |B2|/|B1|) (capped); replace(false);
//!                   drop key from B1; insert at T2 MRU
//!   hit in B2     → p -= max(1, |B1|/|B2|) (floored); replace(true);
//!                   drop key from B2; insert at T2 MRU
//!   full miss     → trim per the |T1|+|B1| and four-list totals,
//!                   then insert at T1 MRU
//!
//! replace(in_b2):
//!   evict T1 LRU into B1 when T1 is non-empty and |T1| > p
//!   (or in_b2 and |T1| == p); otherwise evict T2 LRU into B2
//! ```
//!
//! Ghost lists store keys only (historical feedback, not storage), so a
//! ghost hit always takes the caller's newly supplied value. Each ghost
//! list is bounded by the capacity, keeping peak memory O(capacity).
//!
//! ## References
//!
//! - Megiddo & Modha, "ARC: A Self-Tuning, Low Overhead Replacement
//!   Cache", FAST 2003

use std::fmt;
use std::hash::Hash;
use std::ptr::NonNull;

use rustc_hash::FxHashMap;

use crate::ds::GhostList;
use crate::error::CacheError;
use crate::traits::CachePolicy;

/// Which resident list a node lives in.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum ListKind {
    T1,
    T2,
}

/// Node in a resident list. Pointers first for locality.
#[repr(C)]
struct Node<K, V> {
    prev: Option<NonNull<Node<K, V>>>,
    next: Option<NonNull<Node<K, V>>>,
    list: ListKind,
    key: K,
    value: V,
}

/// ARC cache engine.
///
/// # Example
///
/// ```
/// use cachemux::policy::arc::ArcCache;
/// use cachemux::traits::CachePolicy;
///
/// let mut cache = ArcCache::new(8).unwrap();
/// cache.put("page", 1);
/// assert_eq!(cache.t1_len(), 1);   // first sighting lands in T1
///
/// cache.get(&"page");
/// assert_eq!(cache.t2_len(), 1);   // reuse promotes to T2
/// ```
pub struct ArcCache<K, V>
where
    K: Eq + Hash + Clone,
{
    index: FxHashMap<K, NonNull<Node<K, V>>>,

    t1_head: Option<NonNull<Node<K, V>>>,
    t1_tail: Option<NonNull<Node<K, V>>>,
    t1_len: usize,

    t2_head: Option<NonNull<Node<K, V>>>,
    t2_tail: Option<NonNull<Node<K, V>>>,
    t2_len: usize,

    b1: GhostList<K>,
    b2: GhostList<K>,

    /// Target share of the capacity for T1.
    p: usize,
    capacity: usize,
}

// SAFETY: the raw pointers only reference heap nodes exclusively owned by
// this struct.
unsafe impl<K, V> Send for ArcCache<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Send,
{
}

// SAFETY: no interior mutability behind &self.
unsafe impl<K, V> Sync for ArcCache<K, V>
where
    K: Eq + Hash + Clone + Sync,
    V: Sync,
{
}

impl<K, V> ArcCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an ARC cache with the given resident capacity.
    ///
    /// The target `p` starts at 0 (pure frequency preference) and adapts
    /// with ghost hits. Each ghost list holds at most `capacity` keys.
    ///
    /// # Errors
    ///
    /// [`CacheError::InvalidCapacity`] if `capacity` is 0.
    pub fn new(capacity: usize) -> Result<Self, CacheError> {
        if capacity == 0 {
            return Err(CacheError::invalid_capacity("arc capacity must be > 0"));
        }
        Ok(ArcCache {
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            t1_head: None,
            t1_tail: None,
            t1_len: 0,
            t2_head: None,
            t2_tail: None,
            t2_len: 0,
            b1: GhostList::new(capacity),
            b2: GhostList::new(capacity),
            p: 0,
            capacity,
        })
    }

    /// Entries in T1 (resident, seen once).
    pub fn t1_len(&self) -> usize {
        self.t1_len
    }

    /// Entries in T2 (resident, seen more than once).
    pub fn t2_len(&self) -> usize {
        self.t2_len
    }

    /// Keys in the B1 ghost list.
    pub fn b1_len(&self) -> usize {
        self.b1.len()
    }

    /// Keys in the B2 ghost list.
    pub fn b2_len(&self) -> usize {
        self.b2.len()
    }

    /// Current target share of T1.
    pub fn p_value(&self) -> usize {
        self.p
    }

    /// Returns `true` if `key` is resident (ghost entries don't count).
    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Detach a node from whichever resident list holds it.
    #[inline(always)]
    fn detach(&mut self, node_ptr: NonNull<Node<K, V>>) {
        unsafe {
            let node = node_ptr.as_ref();
            let prev = node.prev;
            let next = node.next;

            let (head, tail, len) = match node.list {
                ListKind::T1 => (&mut self.t1_head, &mut self.t1_tail, &mut self.t1_len),
                ListKind::T2 => (&mut self.t2_head, &mut self.t2_tail, &mut self.t2_len),
            };

            match prev {
                Some(mut p) => p.as_mut().next = next,
                None => *head = next,
            }
            match next {
                Some(mut n) => n.as_mut().prev = prev,
                None => *tail = prev,
            }
            *len -= 1;
        }
    }

    /// Attach a node at the T1 MRU end.
    #[inline(always)]
    fn attach_t1_mru(&mut self, mut node_ptr: NonNull<Node<K, V>>) {
        unsafe {
            let node = node_ptr.as_mut();
            node.prev = None;
            node.next = self.t1_head;
            node.list = ListKind::T1;

            match self.t1_head {
                Some(mut h) => h.as_mut().prev = Some(node_ptr),
                None => self.t1_tail = Some(node_ptr),
            }
            self.t1_head = Some(node_ptr);
            self.t1_len += 1;
        }
    }

    /// Attach a node at the T2 MRU end.
    #[inline(always)]
    fn attach_t2_mru(&mut self, mut node_ptr: NonNull<Node<K, V>>) {
        unsafe {
            let node = node_ptr.as_mut();
            node.prev = None;
            node.next = self.t2_head;
            node.list = ListKind::T2;

            match self.t2_head {
                Some(mut h) => h.as_mut().prev = Some(node_ptr),
                None => self.t2_tail = Some(node_ptr),
            }
            self.t2_head = Some(node_ptr);
            self.t2_len += 1;
        }
    }

    /// Evict the LRU node of T1, recording its key in B1.
    fn evict_t1_lru(&mut self) {
        if let Some(victim_ptr) = self.t1_tail {
            self.detach(victim_ptr);
            unsafe {
                let node = Box::from_raw(victim_ptr.as_ptr());
                self.index.remove(&node.key);
                self.b1.record(node.key);
            }
        }
    }

    /// Evict the LRU node of T2, recording its key in B2.
    fn evict_t2_lru(&mut self) {
        if let Some(victim_ptr) = self.t2_tail {
            self.detach(victim_ptr);
            unsafe {
                let node = Box::from_raw(victim_ptr.as_ptr());
                self.index.remove(&node.key);
                self.b2.record(node.key);
            }
        }
    }

    /// The single adaptation knob: frees one resident slot, choosing the
    /// victim list by the target `p`.
    ///
    /// The `in_b2` tie-break on `|T1| == p` keeps a B2 hit from
    /// immediately re-evicting from T2.
    fn replace(&mut self, in_b2: bool) {
        if self.t1_len > 0 && (self.t1_len > self.p || (in_b2 && self.t1_len == self.p)) {
            self.evict_t1_lru();
        } else if self.t2_len > 0 {
            self.evict_t2_lru();
        } else if self.t1_len > 0 {
            // T2 has nothing to give; a slot still has to come from somewhere.
            self.evict_t1_lru();
        }
    }

    /// Frees every node and resets all lists, ghosts, and the target.
    fn purge(&mut self) {
        for head in [self.t1_head, self.t2_head] {
            let mut current = head;
            while let Some(node_ptr) = current {
                unsafe {
                    current = node_ptr.as_ref().next;
                    drop(Box::from_raw(node_ptr.as_ptr()));
                }
            }
        }
        self.index.clear();
        self.t1_head = None;
        self.t1_tail = None;
        self.t1_len = 0;
        self.t2_head = None;
        self.t2_tail = None;
        self.t2_len = 0;
        self.b1.clear();
        self.b2.clear();
        self.p = 0;
    }

    /// Allocates a node and links it at the MRU end of the chosen list.
    fn insert_node(&mut self, key: K, value: V, list: ListKind) {
        let node = Box::new(Node {
            prev: None,
            next: None,
            list,
            key: key.clone(),
            value,
        });
        let node_ptr = NonNull::from(Box::leak(node));
        self.index.insert(key, node_ptr);
        match list {
            ListKind::T1 => self.attach_t1_mru(node_ptr),
            ListKind::T2 => self.attach_t2_mru(node_ptr),
        }
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        assert_eq!(self.index.len(), self.t1_len + self.t2_len);
        assert!(self.t1_len + self.t2_len <= self.capacity);
        assert!(self.p <= self.capacity);
        assert!(self.b1.len() <= self.capacity);
        assert!(self.b2.len() <= self.capacity);

        let walk = |mut current: Option<NonNull<Node<K, V>>>,
                    expected_kind: ListKind,
                    expected_len: usize| {
            let mut count = 0usize;
            while let Some(ptr) = current {
                count += 1;
                assert!(count <= expected_len, "cycle or length drift in list");
                unsafe {
                    let node = ptr.as_ref();
                    assert_eq!(node.list, expected_kind);
                    assert!(self.index.contains_key(&node.key));
                    assert!(!self.b1.contains(&node.key), "resident key also in B1");
                    assert!(!self.b2.contains(&node.key), "resident key also in B2");
                    current = node.next;
                }
            }
            assert_eq!(count, expected_len);
        };

        walk(self.t1_head, ListKind::T1, self.t1_len);
        walk(self.t2_head, ListKind::T2, self.t2_len);
        self.b1.debug_validate_invariants();
        self.b2.debug_validate_invariants();
    }
}

impl<K, V> CachePolicy<K, V> for ArcCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn get(&mut self, key: &K) -> Option<V> {
        let node_ptr = *self.index.get(key)?;
        // T1 hit promotes; T2 hit refreshes. Either way the node ends at
        // the T2 MRU end.
        self.detach(node_ptr);
        self.attach_t2_mru(node_ptr);
        Some(unsafe { (*node_ptr.as_ptr()).value.clone() })
    }

    fn put(&mut self, key: K, value: V) -> Option<V> {
        // Case A: resident update.
        if let Some(&node_ptr) = self.index.get(&key) {
            let previous = unsafe {
                let node = &mut *node_ptr.as_ptr();
                std::mem::replace(&mut node.value, value)
            };
            self.detach(node_ptr);
            self.attach_t2_mru(node_ptr);
            return Some(previous);
        }

        // Case B: ghost hit in B1. Grow T1's target share.
        if self.b1.contains(&key) {
            let delta = (self.b2.len() / self.b1.len()).max(1);
            self.p = (self.p + delta).min(self.capacity);
            self.replace(false);
            self.b1.remove(&key);
            self.insert_node(key, value, ListKind::T2);
            return None;
        }

        // Case C: ghost hit in B2. Shrink T1's target share.
        if self.b2.contains(&key) {
            let delta = (self.b1.len() / self.b2.len()).max(1);
            self.p = self.p.saturating_sub(delta);
            self.replace(true);
            self.b2.remove(&key);
            self.insert_node(key, value, ListKind::T2);
            return None;
        }

        // Case D: full miss.
        if self.t1_len + self.b1.len() == self.capacity {
            if self.t1_len < self.capacity {
                self.b2.evict_oldest();
                self.replace(false);
            } else {
                self.evict_t1_lru();
            }
        } else {
            let total = self.t1_len + self.t2_len + self.b1.len() + self.b2.len();
            if total >= self.capacity {
                if total == 2 * self.capacity {
                    self.b2.evict_oldest();
                }
                self.replace(false);
            }
        }

        self.insert_node(key, value, ListKind::T1);
        None
    }

    fn remove(&mut self, key: &K) {
        if let Some(node_ptr) = self.index.remove(key) {
            self.detach(node_ptr);
            unsafe {
                drop(Box::from_raw(node_ptr.as_ptr()));
            }
            return;
        }
        self.b1.remove(key);
        self.b2.remove(key);
    }

    fn remove_all(&mut self) {
        self.purge();
    }

    fn len(&self) -> usize {
        self.t1_len + self.t2_len
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<K, V> Drop for ArcCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn drop(&mut self) {
        self.purge();
    }
}

impl<K, V> fmt::Debug for ArcCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArcCache")
            .field("capacity", &self.capacity)
            .field("t1_len", &self.t1_len)
            .field("t2_len", &self.t2_len)
            .field("b1_len", &self.b1.len())
            .field("b2_len", &self.b2.len())
            .field("p", &self.p)
            .finish_non_exhaustive()
    }
}
