//! Local-disk backend: one pretty-printed JSON file per key.

use std::io::Write;
use std::path::{Path, PathBuf};

use super::IndexStore;
use crate::error::StorageError;
use crate::graph::DependencyIndex;

const EXTENSION: &str = "json";

/// Stores each index as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    /// The directory is created lazily on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", key, EXTENSION))
    }
}

fn io_error(key: &str, source: std::io::Error) -> StorageError {
    StorageError::Io {
        key: key.to_string(),
        source,
    }
}

impl IndexStore for LocalStore {
    fn save(&self, key: &str, index: &DependencyIndex) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec_pretty(index).map_err(|source| StorageError::Serialization {
            key: key.to_string(),
            source,
        })?;

        std::fs::create_dir_all(&self.dir).map_err(|e| io_error(key, e))?;

        // Write to a temp file in the same directory, then rename over the target
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir).map_err(|e| io_error(key, e))?;
        tmp.write_all(&bytes).map_err(|e| io_error(key, e))?;
        tmp.as_file().sync_all().map_err(|e| io_error(key, e))?;
        tmp.persist(self.path_for(key))
            .map_err(|e| io_error(key, e.error))?;

        tracing::debug!("Saved index '{}' ({} bytes)", key, bytes.len());
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<DependencyIndex>, StorageError> {
        let path = self.path_for(key);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(key, e)),
        };
        let index = serde_json::from_slice(&bytes).map_err(|source| StorageError::Serialization {
            key: key.to_string(),
            source,
        })?;
        Ok(Some(index))
    }

    fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.path_for(key).is_file())
    }

    fn list(&self) -> Result<Vec<String>, StorageError> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error("*", e)),
        };

        let mut keys = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| io_error("*", e))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_key_is_absent() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalStore::new(temp_dir.path().join("store"));
        assert!(store.load("nothing").unwrap().is_none());
        assert!(!store.exists("nothing").unwrap());
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_save_overwrites_and_lists() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalStore::new(temp_dir.path());

        let mut first = DependencyIndex::new("acme/shop");
        first.metadata.total_files = 1;
        store.save("acme_shop", &first).unwrap();

        let mut second = DependencyIndex::new("acme/shop");
        second.metadata.total_files = 7;
        store.save("acme_shop", &second).unwrap();
        store.save("other", &DependencyIndex::new("other")).unwrap();

        let loaded = store.load("acme_shop").unwrap().unwrap();
        assert_eq!(loaded.metadata.total_files, 7);
        assert_eq!(store.list().unwrap(), vec!["acme_shop", "other"]);
        assert!(temp_dir.path().join("acme_shop.json").is_file());
    }

    #[test]
    fn test_corrupt_file_is_serialization_error() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("bad.json"), "{not json").unwrap();
        let store = LocalStore::new(temp_dir.path());
        let err = store.load("bad").unwrap_err();
        assert!(matches!(err, StorageError::Serialization { .. }));
    }
}
