//! Repository-wide dependency index
//!
//! A [`DependencyIndex`] is one immutable snapshot per repository: built by
//! [`builder::IndexBuilder`], persisted through [`crate::storage::IndexStore`],
//! and read back by [`query::QueryEngine`]. It is replaced wholesale on every
//! rebuild.

pub mod builder;
pub mod filter;
pub mod query;
pub mod scan;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ingest::{ClassInfo, DependencyRelation, Language};

pub use builder::{BuildOutcome, BuildReport, FileFailure, IndexBuilder};
pub use filter::{FileFilter, SkipReason};
pub use query::{ImpactAnalysis, IndexStats, QueryEngine};
pub use scan::scan_repository;

/// Progress callback for builds
///
/// Receives (current_count, total_count) as files are analyzed
pub type BuildProgress<'a> = dyn Fn(usize, usize) + Send + Sync + 'a;

/// Per-file record kept in the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    /// Relative path, `/`-separated
    pub path: String,
    pub language: Language,
    /// Size in bytes
    pub size: u64,
    pub last_modified: DateTime<Utc>,
    /// Names of types declared in the file
    pub classes: Vec<String>,
}

/// Keyed tables of an index.
///
/// Keys collide silently: a later write for the same class name or the same
/// `"<from> -> <to>"` pair replaces the earlier entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexTables {
    /// Simple type name → type
    pub classes: BTreeMap<String, ClassInfo>,
    /// `"<from> -> <to>"` → edge
    pub dependencies: BTreeMap<String, DependencyRelation>,
    /// Relative path → file record
    pub files: BTreeMap<String, FileMetadata>,
}

/// Summary of one build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexMetadata {
    /// Detected source files, analyzed or not
    pub total_files: usize,
    /// Every detected source language, sorted
    pub languages: Vec<Language>,
    /// Build wall time in milliseconds
    pub indexing_duration: u64,
}

/// The unit of persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyIndex {
    pub repository: String,
    pub last_updated: DateTime<Utc>,
    pub index: IndexTables,
    pub metadata: IndexMetadata,
}

impl DependencyIndex {
    /// Empty index stamped with the current time.
    pub fn new(repository: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            last_updated: Utc::now(),
            index: IndexTables::default(),
            metadata: IndexMetadata::default(),
        }
    }

    /// Whether two indexes hold the same tables, ignoring timestamps and duration.
    pub fn same_content(&self, other: &DependencyIndex) -> bool {
        self.repository == other.repository
            && self.index == other.index
            && self.metadata.total_files == other.metadata.total_files
            && self.metadata.languages == other.metadata.languages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persisted_field_names() {
        let mut index = DependencyIndex::new("acme/shop");
        index.metadata.total_files = 3;
        index.metadata.languages = vec![Language::Java];
        index.metadata.indexing_duration = 42;

        let json = serde_json::to_value(&index).unwrap();
        assert_eq!(json["repository"], "acme/shop");
        assert!(json["lastUpdated"].is_string());
        assert!(json["index"]["classes"].is_object());
        assert!(json["index"]["dependencies"].is_object());
        assert!(json["index"]["files"].is_object());
        assert_eq!(json["metadata"]["totalFiles"], 3);
        assert_eq!(json["metadata"]["languages"][0], "java");
        assert_eq!(json["metadata"]["indexingDuration"], 42);
    }

    #[test]
    fn test_same_content_ignores_timing() {
        let a = DependencyIndex::new("r");
        let mut b = a.clone();
        b.last_updated = a.last_updated + chrono::Duration::seconds(5);
        b.metadata.indexing_duration = 999;
        assert!(a.same_content(&b));

        b.metadata.total_files = 1;
        assert!(!a.same_content(&b));
    }
}
