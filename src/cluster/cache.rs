//! Compute-or-reuse logic for cluster partitions.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{CacheKey, CacheStore};
use crate::error::{CacheError, ClusterError, ClusterResult};
use crate::vector::{Clusterer, VectorStore};

/// Clusters of words; each cluster keeps vocabulary order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterPartition(Vec<Vec<String>>);

impl ClusterPartition {
    /// Groups `words` by their cluster label.
    ///
    /// Clusters appear in order of the first word carrying each label, and
    /// words within a cluster keep their order in `words`. Labels that no word
    /// carries produce no cluster.
    pub fn from_assignments(words: &[String], labels: &[usize]) -> Self {
        debug_assert_eq!(words.len(), labels.len());

        let mut bucket_of: HashMap<usize, usize> = HashMap::new();
        let mut clusters: Vec<Vec<String>> = Vec::new();
        for (word, &label) in words.iter().zip(labels) {
            let bucket = *bucket_of.entry(label).or_insert_with(|| {
                clusters.push(Vec::new());
                clusters.len() - 1
            });
            clusters[bucket].push(word.clone());
        }
        Self(clusters)
    }

    pub fn clusters(&self) -> &[Vec<String>] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &[String]> {
        self.0.iter().map(Vec::as_slice)
    }

    /// Number of clusters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of words across all clusters.
    pub fn word_count(&self) -> usize {
        self.0.iter().map(Vec::len).sum()
    }

    /// Index of the cluster containing `word`.
    pub fn cluster_of(&self, word: &str) -> Option<usize> {
        self.0
            .iter()
            .position(|cluster| cluster.iter().any(|w| w == word))
    }
}

impl From<Vec<Vec<String>>> for ClusterPartition {
    fn from(clusters: Vec<Vec<String>>) -> Self {
        Self(clusters)
    }
}

/// Where a partition came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheSource {
    Cached,
    Computed,
}

/// A partition together with how it was obtained.
#[derive(Debug)]
pub struct ClusterOutcome {
    pub key: CacheKey,
    pub partition: ClusterPartition,
    pub source: CacheSource,
    /// Set when the partition was computed but could not be persisted
    pub write_warning: Option<CacheError>,
}

/// Memoizes vocabulary partitions in a [`CacheStore`].
#[derive(Debug)]
pub struct ClusterCache<S> {
    store: S,
}

impl<S: CacheStore> ClusterCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the partition of `vocabulary` into `cluster_count` clusters,
    /// computing it with `clusterer` only when the store has no entry for
    /// the key.
    ///
    /// A cached partition is returned as stored, without checking it against
    /// the words currently loaded. Unreadable cache entries are logged and
    /// recomputed. A failure to persist a fresh partition is reported in
    /// [`ClusterOutcome::write_warning`] and the partition is still returned.
    pub fn get_or_compute(
        &self,
        vocabulary: &VectorStore,
        cluster_count: usize,
        clusterer: &dyn Clusterer,
    ) -> ClusterResult<ClusterOutcome> {
        if cluster_count == 0 || cluster_count > vocabulary.len() {
            return Err(ClusterError::InvalidArgument {
                reason: format!(
                    "cluster count must be between 1 and the vocabulary size ({}), got {cluster_count}",
                    vocabulary.len()
                ),
            });
        }

        let key = CacheKey::new(
            vocabulary.dimension().get(),
            vocabulary.len(),
            cluster_count,
        );

        if self.store.exists(&key) {
            match self.store.load(&key) {
                Ok(Some(partition)) => {
                    info!(%key, clusters = partition.len(), "cached clusters found");
                    return Ok(ClusterOutcome {
                        key,
                        partition,
                        source: CacheSource::Cached,
                        write_warning: None,
                    });
                }
                Ok(None) => {}
                Err(e) => warn!(%key, error = %e, "unreadable cluster cache, recomputing"),
            }
        }

        info!(
            %key,
            clusterer = clusterer.name(),
            "no cached clusters, clustering vocabulary"
        );
        let labels = clusterer
            .cluster(&vocabulary.rows(), cluster_count)
            .map_err(|source| ClusterError::Clustering {
                clusterer: clusterer.name().to_string(),
                source,
            })?;
        validate_labels(clusterer, &labels, vocabulary.len(), cluster_count)?;

        let partition = ClusterPartition::from_assignments(vocabulary.words(), &labels);

        let write_warning = match self.store.save(&key, &partition) {
            Ok(()) => {
                info!(%key, clusters = partition.len(), "saved clusters to cache");
                None
            }
            Err(e) => {
                warn!(%key, error = %e, "could not cache clusters");
                Some(e)
            }
        };

        Ok(ClusterOutcome {
            key,
            partition,
            source: CacheSource::Computed,
            write_warning,
        })
    }
}

fn validate_labels(
    clusterer: &dyn Clusterer,
    labels: &[usize],
    expected_len: usize,
    cluster_count: usize,
) -> ClusterResult<()> {
    let invalid = |reason: String| ClusterError::InvalidAssignment {
        clusterer: clusterer.name().to_string(),
        reason,
    };

    if labels.len() != expected_len {
        return Err(invalid(format!(
            "expected {expected_len} labels, got {}",
            labels.len()
        )));
    }
    if let Some((position, label)) = labels
        .iter()
        .enumerate()
        .find(|(_, label)| **label >= cluster_count)
    {
        return Err(invalid(format!(
            "label {label} at position {position} is outside [0, {cluster_count})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::MemoryCacheStore;
    use crate::vector::ClusteringError;
    use std::cell::Cell;
    use std::io::Cursor;

    /// Labels vectors round-robin and counts invocations.
    struct RoundRobin {
        calls: Cell<usize>,
    }

    impl RoundRobin {
        fn new() -> Self {
            Self {
                calls: Cell::new(0),
            }
        }
    }

    impl Clusterer for RoundRobin {
        fn name(&self) -> &str {
            "round-robin"
        }

        fn cluster(&self, vectors: &[&[f32]], k: usize) -> Result<Vec<usize>, ClusteringError> {
            self.calls.set(self.calls.get() + 1);
            Ok((0..vectors.len()).map(|i| i % k).collect())
        }
    }

    struct Fixed(Vec<usize>);

    impl Clusterer for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn cluster(&self, _: &[&[f32]], _: usize) -> Result<Vec<usize>, ClusteringError> {
            Ok(self.0.clone())
        }
    }

    fn vocabulary() -> VectorStore {
        VectorStore::load(
            Cursor::new("a 1 0\nb 0 1\nc 1 1\nd -1 0\ne 0 -1\n"),
            100,
        )
        .unwrap()
    }

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_from_assignments_groups_in_first_seen_order() {
        let partition =
            ClusterPartition::from_assignments(&words(&["a", "b", "c", "d", "e"]), &[2, 0, 2, 5, 0]);
        assert_eq!(
            partition.clusters(),
            &[words(&["a", "c"]), words(&["b", "e"]), words(&["d"])]
        );
        assert_eq!(partition.cluster_of("e"), Some(1));
        assert_eq!(partition.cluster_of("z"), None);
    }

    #[test]
    fn test_computes_then_reuses() {
        let cache = ClusterCache::new(MemoryCacheStore::new());
        let vocab = vocabulary();
        let clusterer = RoundRobin::new();

        let first = cache.get_or_compute(&vocab, 2, &clusterer).unwrap();
        assert_eq!(first.source, CacheSource::Computed);
        assert!(first.write_warning.is_none());
        assert_eq!(first.key, CacheKey::new(2, 5, 2));
        assert_eq!(clusterer.calls.get(), 1);

        let second = cache.get_or_compute(&vocab, 2, &clusterer).unwrap();
        assert_eq!(second.source, CacheSource::Cached);
        assert_eq!(second.partition, first.partition);
        assert_eq!(clusterer.calls.get(), 1);
    }

    #[test]
    fn test_new_cluster_count_is_a_new_entry() {
        let cache = ClusterCache::new(MemoryCacheStore::new());
        let vocab = vocabulary();
        let clusterer = RoundRobin::new();

        cache.get_or_compute(&vocab, 2, &clusterer).unwrap();
        let three = cache.get_or_compute(&vocab, 3, &clusterer).unwrap();
        assert_eq!(three.source, CacheSource::Computed);
        assert_eq!(three.partition.len(), 3);
        assert_eq!(cache.store().len(), 2);
        assert_eq!(clusterer.calls.get(), 2);
    }

    #[test]
    fn test_partition_is_complete_and_disjoint() {
        let cache = ClusterCache::new(MemoryCacheStore::new());
        let vocab = vocabulary();
        let outcome = cache.get_or_compute(&vocab, 3, &RoundRobin::new()).unwrap();

        let mut seen: Vec<&str> = outcome
            .partition
            .iter()
            .flat_map(|cluster| cluster.iter().map(String::as_str))
            .collect();
        assert_eq!(seen.len(), vocab.len());
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen, vec!["a", "b", "c", "d", "e"]);
        assert_eq!(outcome.partition.clusters()[0], words(&["a", "d"]));
    }

    #[test]
    fn test_invalid_cluster_count_skips_clusterer() {
        let cache = ClusterCache::new(MemoryCacheStore::new());
        let vocab = vocabulary();
        let clusterer = RoundRobin::new();

        assert!(matches!(
            cache.get_or_compute(&vocab, 0, &clusterer),
            Err(ClusterError::InvalidArgument { .. })
        ));
        assert!(matches!(
            cache.get_or_compute(&vocab, 6, &clusterer),
            Err(ClusterError::InvalidArgument { .. })
        ));
        assert_eq!(clusterer.calls.get(), 0);
    }

    #[test]
    fn test_rejects_bad_assignments() {
        let cache = ClusterCache::new(MemoryCacheStore::new());
        let vocab = vocabulary();

        let short = Fixed(vec![0, 1]);
        assert!(matches!(
            cache.get_or_compute(&vocab, 2, &short),
            Err(ClusterError::InvalidAssignment { .. })
        ));

        let out_of_range = Fixed(vec![0, 1, 2, 0, 1]);
        assert!(matches!(
            cache.get_or_compute(&vocab, 2, &out_of_range),
            Err(ClusterError::InvalidAssignment { .. })
        ));
        assert!(cache.store().is_empty());
    }

    #[test]
    fn test_stale_cache_is_served_verbatim() {
        let store = MemoryCacheStore::new();
        let key = CacheKey::new(2, 5, 2);
        let stale = ClusterPartition::from(vec![words(&["x", "y"]), words(&["z"])]);
        store.save(&key, &stale).unwrap();

        let cache = ClusterCache::new(store);
        let clusterer = RoundRobin::new();
        let outcome = cache.get_or_compute(&vocabulary(), 2, &clusterer).unwrap();
        assert_eq!(outcome.source, CacheSource::Cached);
        assert_eq!(outcome.partition, stale);
        assert_eq!(clusterer.calls.get(), 0);
    }
}
