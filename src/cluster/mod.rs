//! Memoized partitioning of the vocabulary into word clusters.
//!
//! Clustering a large vocabulary is expensive, so partitions are stored under
//! a [`CacheKey`] derived from (dimension, vocabulary size, cluster count)
//! and read back verbatim on later requests with the same parameters.
//!
//! - [`ClusterCache`]: "give me k clusters for this vocabulary"
//! - [`CacheStore`]: "where do finished partitions live?"
//!
//! A cache hit is not checked against the vocabulary contents. Two different
//! embedding files with the same dimension and word count share a key, and
//! the second one is served the first one's clusters.

mod cache;
mod key;
pub mod memo;
pub mod persist;

pub use cache::{CacheSource, ClusterCache, ClusterOutcome, ClusterPartition};
pub use key::{CacheKey, InvalidCacheKey};
pub use memo::MemoryCacheStore;
pub use persist::JsonCacheStore;

use crate::error::CacheResult;

/// Storage backend for finished cluster partitions.
///
/// Entries are written once per key and never updated in place.
pub trait CacheStore {
    /// Whether a partition is stored under `key`.
    fn exists(&self, key: &CacheKey) -> bool;

    /// Reads the partition stored under `key`; `Ok(None)` is a miss.
    fn load(&self, key: &CacheKey) -> CacheResult<Option<ClusterPartition>>;

    /// Stores `partition` under `key`.
    fn save(&self, key: &CacheKey, partition: &ClusterPartition) -> CacheResult<()>;
}
