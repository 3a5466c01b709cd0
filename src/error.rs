//! Error types for the cachemux library.
//!
//! ## Key Components
//!
//! - [`CacheError::InvalidCapacity`]: returned by engine constructors when a
//!   capacity (or shard count, or K) of zero is requested. Fatal at the
//!   construction site; a successfully constructed engine never produces it.
//! - [`CacheError::KeyNotFound`]: returned by the single-return
//!   [`try_get`](crate::traits::CachePolicy::try_get) form when the key is
//!   absent. The two-value `get` form conveys the same condition as `None`.
//!
//! Ordinary misses, removal of an absent key, and clearing an empty cache
//! are not errors and never surface here.
//!
//! ## Example Usage
//!
//! ```
//! use cachemux::error::CacheError;
//! use cachemux::policy::lru::LruCache;
//! use cachemux::traits::CachePolicy;
//!
//! let cache: Result<LruCache<u64, String>, CacheError> = LruCache::new(0);
//! assert!(matches!(cache, Err(CacheError::InvalidCapacity(_))));
//!
//! let ok: LruCache<u64, String> = LruCache::new(16).unwrap();
//! assert_eq!(ok.capacity(), 16);
//! ```

use std::fmt;

/// Error produced by cache construction and the fallible lookup form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// A constructor was given a capacity, shard count, or K of zero.
    ///
    /// Carries a description of which parameter failed validation.
    InvalidCapacity(String),

    /// `try_get` was called for a key that is not resident.
    KeyNotFound,
}

impl CacheError {
    /// Creates an `InvalidCapacity` error with the given description.
    #[inline]
    pub fn invalid_capacity(msg: impl Into<String>) -> Self {
        CacheError::InvalidCapacity(msg.into())
    }
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::InvalidCapacity(msg) => write!(f, "invalid capacity: {msg}"),
            CacheError::KeyNotFound => f.write_str("key not found"),
        }
    }
}

impl std::error::Error for CacheError {}
