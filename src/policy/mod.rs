//! The eviction engines and their concurrency wrappers.
//!
//! | Policy | Module | Evicts | Best for |
//! |---|---|---|---|
//! | LRU | [`lru`] | least recently used | temporal locality |
//! | LFU | [`lfu`] | least frequently used | stable hot sets |
//! | LFU-Aging | [`lfu_aging`] | least frequent, decayed | shifting hot sets |
//! | LRU-K | [`lru_k`] | coldest by K-touch admission | scan resistance |
//! | ARC | [`arc`] | self-tuned recency/frequency mix | unknown workloads |
//! | Sharded | [`sharded`] | shard-local policy | multi-thread throughput |

pub mod arc;
pub mod lfu;
pub mod lfu_aging;
pub mod lru;
pub mod lru_k;
pub mod sharded;
