//! Cache keys for cluster partitions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifies a partition by the parameters that produced it.
///
/// Renders as `{dimension}D_{vocabulary_size}-words_{cluster_count}-clusters`,
/// e.g. `100D_10000-words_1000-clusters`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub dimension: usize,
    pub vocabulary_size: usize,
    pub cluster_count: usize,
}

impl CacheKey {
    pub const fn new(dimension: usize, vocabulary_size: usize, cluster_count: usize) -> Self {
        Self {
            dimension,
            vocabulary_size,
            cluster_count,
        }
    }

    /// File name used by [`JsonCacheStore`](super::JsonCacheStore).
    pub fn file_name(&self) -> String {
        format!("{self}.json")
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}D_{}-words_{}-clusters",
            self.dimension, self.vocabulary_size, self.cluster_count
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a cache key (expected '<D>D_<N>-words_<K>-clusters')")]
pub struct InvalidCacheKey(String);

impl FromStr for CacheKey {
    type Err = InvalidCacheKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidCacheKey(s.to_string());

        let (dimension, rest) = s.split_once("D_").ok_or_else(invalid)?;
        let (vocabulary_size, rest) = rest.split_once("-words_").ok_or_else(invalid)?;
        let cluster_count = rest.strip_suffix("-clusters").ok_or_else(invalid)?;

        let number = |part: &str| part.parse::<usize>().map_err(|_| invalid());
        Ok(Self {
            dimension: number(dimension)?,
            vocabulary_size: number(vocabulary_size)?,
            cluster_count: number(cluster_count)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_rendering_is_stable() {
        let key = CacheKey::new(100, 10_000, 1_000);
        assert_eq!(key.to_string(), "100D_10000-words_1000-clusters");
        assert_eq!(key.file_name(), "100D_10000-words_1000-clusters.json");
    }

    #[test]
    fn test_key_parses_back() {
        let key = CacheKey::new(50, 400_000, 7);
        assert_eq!(key.to_string().parse::<CacheKey>().unwrap(), key);
    }

    #[test]
    fn test_distinct_parameters_give_distinct_keys() {
        let a = CacheKey::new(50, 100, 10);
        assert_ne!(a.to_string(), CacheKey::new(100, 50, 10).to_string());
        assert_ne!(a.to_string(), CacheKey::new(50, 100, 11).to_string());
    }

    #[test]
    fn test_rejects_foreign_names() {
        assert!("settings".parse::<CacheKey>().is_err());
        assert!("50D_x-words_3-clusters".parse::<CacheKey>().is_err());
        assert!("50D_10-words_3".parse::<CacheKey>().is_err());
    }
}
