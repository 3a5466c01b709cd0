//! Least Recently Used (LRU) replacement policy.
//!
//! Doubly linked recency list plus a key → node index. Head is the MRU end,
//! tail is the LRU end; every operation is O(1) apart from amortized hash
//! cost.
//!
//! ## Operations Flow
//!
//! ```text
//!   INSERT new key (cache full, capacity = 3)
//!   ═══════════════════════════════════════════════
//!   before:  head ──► [A] ◄──► [B] ◄──► [C] ◄── tail
//!                     MRU                LRU
//!   put(D):  1. pop tail [C], drop from index
//!            2. attach [D] at head
//!   after:   head ──► [D] ◄──► [A] ◄──► [B] ◄── tail
//!
//!   ACCESS existing key
//!   ═══════════════════════════════════════════════
//!   get(B):  1. index lookup: O(1)
//!            2. detach [B], attach at head
//!   after:   head ──► [B] ◄──► [A] ◄──► [C] ◄── tail
//! ```
//!
//! | Method        | Complexity | Notes                                 |
//! |---------------|------------|---------------------------------------|
//! | `put`         | O(1)*      | overwrite promotes; may evict the LRU |
//! | `get`         | O(1)*      | moves the entry to the MRU position   |
//! | `peek`        | O(1)*      | no reordering                         |
//! | `remove`      | O(1)*      | unlink + index erase                  |
//! | `pop_lru`     | O(1)       | explicit eviction of the tail         |
//! | `remove_all`  | O(n)       | returns to post-construction state    |
//!
//! (* amortized hash-table cost)
//!
//! ## Safety
//!
//! Nodes are heap-allocated and tracked through `NonNull` pointers owned by
//! this struct; the index is the only way in, every unlink goes through
//! `detach`, and `Drop` walks the list to free every node. The engine is
//! single-threaded; thread safety comes from the wrappers in
//! [`policy::sharded`](crate::policy::sharded).

use std::fmt;
use std::hash::Hash;
use std::ptr::NonNull;

use rustc_hash::FxHashMap;

use crate::error::CacheError;
use crate::traits::CachePolicy;

/// Node in the recency list. Pointers first for locality.
#[repr(C)]
struct Node<K, V> {
    prev: Option<NonNull<Node<K, V>>>,
    next: Option<NonNull<Node<K, V>>>,
    key: K,
    value: V,
}

/// LRU cache engine.
///
/// # Example
///
/// ```
/// use cachemux::policy::lru::LruCache;
/// use cachemux::traits::CachePolicy;
///
/// let mut cache = LruCache::new(2).unwrap();
/// cache.put("a", 1);
/// cache.put("b", 2);
/// cache.get(&"a");        // refresh "a"
/// cache.put("c", 3);      // evicts "b", the least recent
///
/// assert_eq!(cache.get(&"a"), Some(1));
/// assert_eq!(cache.get(&"b"), None);
/// assert_eq!(cache.get(&"c"), Some(3));
/// ```
pub struct LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    map: FxHashMap<K, NonNull<Node<K, V>>>,
    head: Option<NonNull<Node<K, V>>>,
    tail: Option<NonNull<Node<K, V>>>,
    capacity: usize,
}

// SAFETY: the raw pointers only reference heap nodes exclusively owned by
// this struct, so ownership transfers with the struct.
unsafe impl<K, V> Send for LruCache<K, V>
where
    K: Eq + Hash + Clone + Send,
    V: Send,
{
}

// SAFETY: no interior mutability; &self methods never mutate through the
// pointers.
unsafe impl<K, V> Sync for LruCache<K, V>
where
    K: Eq + Hash + Clone + Sync,
    V: Sync,
{
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an LRU cache holding at most `capacity` entries.
    ///
    /// # Errors
    ///
    /// [`CacheError::InvalidCapacity`] if `capacity` is 0.
    pub fn new(capacity: usize) -> Result<Self, CacheError> {
        if capacity == 0 {
            return Err(CacheError::invalid_capacity("lru capacity must be > 0"));
        }
        Ok(LruCache {
            map: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            head: None,
            tail: None,
            capacity,
        })
    }

    /// Returns `true` if `key` is resident, without touching recency order.
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Read-only lookup: clones the value without promoting the entry.
    pub fn peek(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.map
            .get(key)
            .map(|&ptr| unsafe { (*ptr.as_ptr()).value.clone() })
    }

    /// Removes and returns the least recently used entry.
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        let node = self.pop_tail()?;
        self.map.remove(&node.key);
        Some((node.key, node.value))
    }

    /// Detach a node from the list without removing it from the index.
    #[inline(always)]
    fn detach(&mut self, node_ptr: NonNull<Node<K, V>>) {
        unsafe {
            let node = node_ptr.as_ref();
            let prev = node.prev;
            let next = node.next;

            match prev {
                Some(mut p) => p.as_mut().next = next,
                None => self.head = next,
            }
            match next {
                Some(mut n) => n.as_mut().prev = prev,
                None => self.tail = prev,
            }
        }
    }

    /// Attach a node at the head (MRU position).
    #[inline(always)]
    fn attach_front(&mut self, mut node_ptr: NonNull<Node<K, V>>) {
        unsafe {
            let node = node_ptr.as_mut();
            node.prev = None;
            node.next = self.head;

            match self.head {
                Some(mut h) => h.as_mut().prev = Some(node_ptr),
                None => self.tail = Some(node_ptr),
            }
            self.head = Some(node_ptr);
        }
    }

    /// Unlink and take ownership of the tail (LRU) node.
    #[inline(always)]
    fn pop_tail(&mut self) -> Option<Box<Node<K, V>>> {
        self.tail.map(|tail_ptr| unsafe {
            let node = Box::from_raw(tail_ptr.as_ptr());
            self.tail = node.prev;
            match self.tail {
                Some(mut t) => t.as_mut().next = None,
                None => self.head = None,
            }
            node
        })
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if self.map.is_empty() {
            assert!(self.head.is_none());
            assert!(self.tail.is_none());
            return;
        }

        let mut count = 0usize;
        let mut current = self.head;
        while let Some(ptr) = current {
            count += 1;
            assert!(count <= self.map.len(), "cycle detected in recency list");
            unsafe {
                let node = ptr.as_ref();
                assert!(
                    self.map.contains_key(&node.key),
                    "listed key missing from index"
                );
                if node.next.is_none() {
                    assert_eq!(self.tail, Some(ptr));
                }
                current = node.next;
            }
        }
        assert_eq!(count, self.map.len());
        assert!(self.map.len() <= self.capacity);
    }
}

impl<K, V> CachePolicy<K, V> for LruCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn put(&mut self, key: K, value: V) -> Option<V> {
        if let Some(&node_ptr) = self.map.get(&key) {
            let previous = unsafe {
                let node = &mut *node_ptr.as_ptr();
                std::mem::replace(&mut node.value, value)
            };
            self.detach(node_ptr);
            self.attach_front(node_ptr);
            return Some(previous);
        }

        if self.map.len() >= self.capacity {
            if let Some(evicted) = self.pop_tail() {
                self.map.remove(&evicted.key);
            }
        }

        let node = Box::new(Node {
            prev: None,
            next: None,
            key: key.clone(),
            value,
        });
        let node_ptr = NonNull::from(Box::leak(node));
        self.map.insert(key, node_ptr);
        self.attach_front(node_ptr);
        None
    }

    fn get(&mut self, key: &K) -> Option<V> {
        let node_ptr = *self.map.get(key)?;
        self.detach(node_ptr);
        self.attach_front(node_ptr);
        Some(unsafe { (*node_ptr.as_ptr()).value.clone() })
    }

    fn remove(&mut self, key: &K) {
        if let Some(node_ptr) = self.map.remove(key) {
            self.detach(node_ptr);
            unsafe {
                drop(Box::from_raw(node_ptr.as_ptr()));
            }
        }
    }

    fn remove_all(&mut self) {
        while self.pop_tail().is_some() {}
        self.map.clear();
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}

impl<K, V> Drop for LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn drop(&mut self) {
        while self.pop_tail().is_some() {}
    }
}

impl<K, V> fmt::Debug for LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("len", &self.map.len())
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}
