//! In-process backend.
//!
//! Holds serialized indexes in memory, so a save/load cycle goes through the
//! same JSON encoding as the disk backend.

use std::collections::HashMap;
use std::sync::RwLock;

use super::IndexStore;
use crate::error::StorageError;
use crate::graph::DependencyIndex;

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(key: &str) -> StorageError {
    StorageError::Io {
        key: key.to_string(),
        source: std::io::Error::new(std::io::ErrorKind::Other, "memory store lock poisoned"),
    }
}

impl IndexStore for MemoryStore {
    fn save(&self, key: &str, index: &DependencyIndex) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec(index).map_err(|source| StorageError::Serialization {
            key: key.to_string(),
            source,
        })?;
        let mut entries = self.entries.write().map_err(|_| poisoned(key))?;
        entries.insert(key.to_string(), bytes);
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<DependencyIndex>, StorageError> {
        let entries = self.entries.read().map_err(|_| poisoned(key))?;
        match entries.get(key) {
            Some(bytes) => serde_json::from_slice(bytes)
                .map(Some)
                .map_err(|source| StorageError::Serialization {
                    key: key.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let entries = self.entries.read().map_err(|_| poisoned(key))?;
        Ok(entries.contains_key(key))
    }

    fn list(&self) -> Result<Vec<String>, StorageError> {
        let entries = self.entries.read().map_err(|_| poisoned("*"))?;
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_contract() {
        let store = MemoryStore::new();
        assert!(store.load("k").unwrap().is_none());

        store.save("k", &DependencyIndex::new("repo")).unwrap();
        assert!(store.exists("k").unwrap());
        assert_eq!(store.list().unwrap(), vec!["k"]);
        assert_eq!(store.load("k").unwrap().unwrap().repository, "repo");
    }
}
