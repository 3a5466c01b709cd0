//! Convenience re-exports of the public surface.

pub use crate::builder::{Cache, CacheBuilder, PolicyKind};
pub use crate::error::CacheError;
pub use crate::policy::arc::ArcCache;
pub use crate::policy::lfu::LfuCache;
pub use crate::policy::lfu_aging::LfuAgingCache;
pub use crate::policy::lru::LruCache;
pub use crate::policy::lru_k::LruKCache;
pub use crate::policy::sharded::{ConcurrentCache, ShardedCache};
pub use crate::traits::{CachePolicy, ConcurrentPolicy};
