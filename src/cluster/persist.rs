//! On-disk cluster cache
//!
//! One JSON file per key under the cache directory, named
//! `<key>.json` (e.g. `data/cache/100D_10000-words_1000-clusters.json`).
//! The body is an array of clusters, each an array of words.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{CacheKey, CacheStore, ClusterPartition};
use crate::error::{CacheError, CacheResult};

/// Persistence manager for cluster partitions
#[derive(Debug, Clone)]
pub struct JsonCacheStore {
    base_dir: PathBuf,
}

impl JsonCacheStore {
    /// Create a store rooted at `base_dir`; the directory is created on first save.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Get the file path for a key
    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.base_dir.join(key.file_name())
    }

    /// Keys of every partition present on disk, sorted.
    ///
    /// Files whose names are not cache keys are ignored. A missing cache
    /// directory has no keys.
    pub fn keys(&self) -> CacheResult<Vec<CacheKey>> {
        let entries = match fs::read_dir(&self.base_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CacheError::io(self.base_dir.clone(), e)),
        };

        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| CacheError::io(self.base_dir.clone(), e))?;
            let name = entry.file_name();
            let Some(stem) = name.to_str().and_then(|n| n.strip_suffix(".json")) else {
                continue;
            };
            if let Ok(key) = stem.parse::<CacheKey>() {
                keys.push(key);
            }
        }
        keys.sort_by_key(|k| (k.dimension, k.vocabulary_size, k.cluster_count));
        Ok(keys)
    }
}

impl CacheStore for JsonCacheStore {
    fn exists(&self, key: &CacheKey) -> bool {
        self.path_for(key).is_file()
    }

    fn load(&self, key: &CacheKey) -> CacheResult<Option<ClusterPartition>> {
        let path = self.path_for(key);

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::io(path, e)),
        };

        let partition: ClusterPartition = serde_json::from_str(&content)
            .map_err(|e| CacheError::format(path.clone(), format!("Failed to parse clusters: {e}")))?;

        debug!(path = %path.display(), clusters = partition.len(), "read cached partition");
        Ok(Some(partition))
    }

    /// Writes to a temporary file next to the target and renames it into place,
    /// so readers never see a partial file.
    fn save(&self, key: &CacheKey, partition: &ClusterPartition) -> CacheResult<()> {
        fs::create_dir_all(&self.base_dir).map_err(|e| CacheError::io(self.base_dir.clone(), e))?;

        let path = self.path_for(key);
        let content = serde_json::to_string(partition).map_err(|e| {
            CacheError::format(path.clone(), format!("Failed to serialize clusters: {e}"))
        })?;

        let mut tmp = tempfile::NamedTempFile::new_in(&self.base_dir)
            .map_err(|e| CacheError::io(self.base_dir.clone(), e))?;
        tmp.write_all(content.as_bytes())
            .map_err(|e| CacheError::io(tmp.path().to_path_buf(), e))?;
        tmp.persist(&path)
            .map_err(|e| CacheError::io(path.clone(), e.error))?;

        debug!(path = %path.display(), clusters = partition.len(), "wrote cached partition");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> ClusterPartition {
        ClusterPartition::from(vec![
            vec!["king".to_string(), "queen".to_string()],
            vec!["man".to_string(), "woman".to_string()],
        ])
    }

    #[test]
    fn test_missing_file_is_a_miss() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonCacheStore::new(temp_dir.path().join("cache"));
        let key = CacheKey::new(2, 4, 2);

        assert!(!store.exists(&key));
        assert!(store.load(&key).unwrap().is_none());
        assert!(store.keys().unwrap().is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonCacheStore::new(temp_dir.path().join("nested").join("cache"));
        let key = CacheKey::new(2, 4, 2);

        store.save(&key, &sample()).unwrap();

        assert!(store.exists(&key));
        assert_eq!(store.load(&key).unwrap(), Some(sample()));
        assert!(
            store
                .path_for(&key)
                .ends_with("2D_4-words_2-clusters.json")
        );
    }

    #[test]
    fn test_file_format_is_array_of_arrays() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonCacheStore::new(temp_dir.path());
        let key = CacheKey::new(2, 4, 2);
        store.save(&key, &sample()).unwrap();

        let raw = fs::read_to_string(store.path_for(&key)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            value,
            serde_json::json!([["king", "queen"], ["man", "woman"]])
        );
    }

    #[test]
    fn test_reads_hand_written_cache() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonCacheStore::new(temp_dir.path());
        let key = CacheKey::new(50, 3, 2);
        fs::write(store.path_for(&key), r#"[["a", "b"], ["c"]]"#).unwrap();

        let partition = store.load(&key).unwrap().unwrap();
        assert_eq!(partition.len(), 2);
        assert_eq!(partition.word_count(), 3);
    }

    #[test]
    fn test_corrupted_file_is_format_error() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonCacheStore::new(temp_dir.path());
        let key = CacheKey::new(2, 4, 2);
        fs::write(store.path_for(&key), "{not json").unwrap();

        assert!(matches!(store.load(&key), Err(CacheError::Format { .. })));
    }

    #[test]
    fn test_keys_lists_only_cache_files() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonCacheStore::new(temp_dir.path());
        store.save(&CacheKey::new(100, 10, 3), &sample()).unwrap();
        store.save(&CacheKey::new(50, 10, 3), &sample()).unwrap();
        fs::write(temp_dir.path().join("notes.json"), "[]").unwrap();
        fs::write(temp_dir.path().join("README"), "hi").unwrap();

        let keys = store.keys().unwrap();
        assert_eq!(
            keys,
            vec![CacheKey::new(50, 10, 3), CacheKey::new(100, 10, 3)]
        );
    }
}
