//! Storage contract for persisted indexes.
//!
//! The builder writes through [`IndexStore::save`] exactly once per build and
//! the query engine reads through [`IndexStore::load`]. Callers never depend on
//! which backend is active.

pub mod local;
pub mod memory;

pub use local::LocalStore;
pub use memory::MemoryStore;

use crate::error::StorageError;
use crate::graph::DependencyIndex;

/// Durable key/value store of dependency indexes.
///
/// `save` overwrites whatever the key held before. There is no concurrency
/// control: two concurrent saves to one key race, last write wins.
pub trait IndexStore: Send + Sync {
    fn save(&self, key: &str, index: &DependencyIndex) -> Result<(), StorageError>;

    /// `Ok(None)` when nothing is stored under `key`.
    fn load(&self, key: &str) -> Result<Option<DependencyIndex>, StorageError>;

    fn exists(&self, key: &str) -> Result<bool, StorageError>;

    /// All stored keys, sorted.
    fn list(&self) -> Result<Vec<String>, StorageError>;
}

/// Derive the storage key for a repository identifier.
///
/// Path separators become `_`, so `acme/shop` is stored as `acme_shop`.
pub fn storage_key(repository: &str) -> String {
    repository.replace(['/', '\\'], "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_key_replaces_separators() {
        assert_eq!(storage_key("acme/shop"), "acme_shop");
        assert_eq!(storage_key(r"team\svc/api"), "team_svc_api");
        assert_eq!(storage_key("plain"), "plain");
    }
}
