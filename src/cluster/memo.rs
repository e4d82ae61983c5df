use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use super::{CacheKey, CacheStore, ClusterPartition};
use crate::error::CacheResult;

/// Thread-safe in-memory cache store keyed by `CacheKey`.
///
/// Partitions are kept behind `Arc` so repeated reads do not copy the map.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    inner: RwLock<HashMap<CacheKey, Arc<ClusterPartition>>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<Arc<ClusterPartition>> {
        let map = self.inner.read();
        map.get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

impl CacheStore for MemoryCacheStore {
    fn exists(&self, key: &CacheKey) -> bool {
        self.inner.read().contains_key(key)
    }

    fn load(&self, key: &CacheKey) -> CacheResult<Option<ClusterPartition>> {
        Ok(self.get(key).map(|partition| partition.as_ref().clone()))
    }

    fn save(&self, key: &CacheKey, partition: &ClusterPartition) -> CacheResult<()> {
        let mut map = self.inner.write();
        map.insert(*key, Arc::new(partition.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trips() {
        let store = MemoryCacheStore::new();
        let key = CacheKey::new(2, 3, 2);
        assert!(!store.exists(&key));
        assert!(store.load(&key).unwrap().is_none());

        let partition = ClusterPartition::from(vec![
            vec!["a".to_string(), "c".to_string()],
            vec!["b".to_string()],
        ]);
        store.save(&key, &partition).unwrap();

        assert!(store.exists(&key));
        assert_eq!(store.load(&key).unwrap(), Some(partition));
        assert_eq!(store.len(), 1);
        assert!(!store.is_empty());
    }
}
