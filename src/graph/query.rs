//! Read-only queries over a loaded index.
//!
//! A [`QueryEngine`] owns at most one [`DependencyIndex`] snapshot. Loading
//! another repository replaces it; nothing mutates a snapshot once held.
//! Queries issued before any successful load return empty results.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::{DependencyIndex, FileMetadata};
use crate::error::IndexError;
use crate::ingest::{BreakingChange, ClassInfo, Language};
use crate::storage::{storage_key, IndexStore, MemoryStore};

/// Two-hop impact of changing one type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactAnalysis {
    pub target: String,
    pub direct_dependents: Vec<String>,
    /// Dependents of each direct dependent, concatenated without deduplication
    pub indirect_dependents: Vec<String>,
    /// Files declaring any direct or indirect dependent, sorted and deduplicated
    pub affected_files: Vec<String>,
    /// `direct_dependents.len() + indirect_dependents.len()`
    ///
    /// An edge count: a type reachable along two paths counts twice.
    pub total_impact: usize,
}

/// Summary of the loaded snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    pub repository: String,
    pub last_updated: DateTime<Utc>,
    pub classes: usize,
    pub dependencies: usize,
    pub files: usize,
    pub total_files: usize,
    pub languages: Vec<Language>,
    pub indexing_duration_ms: u64,
    /// Time spent in the last `load`; `None` when the index was handed in directly
    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_latency_ms: Option<f64>,
}

pub struct QueryEngine {
    store: Arc<dyn IndexStore>,
    index: Option<DependencyIndex>,
    load_latency: Option<Duration>,
}

impl QueryEngine {
    /// Engine reading from `store`, with nothing loaded yet.
    pub fn new(store: Arc<dyn IndexStore>) -> Self {
        Self {
            store,
            index: None,
            load_latency: None,
        }
    }

    /// Engine over an index already in memory.
    pub fn from_index(index: DependencyIndex) -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            index: Some(index),
            load_latency: None,
        }
    }

    /// Load the persisted index for `repository`, replacing any held snapshot.
    ///
    /// Returns `Ok(None)` when no index exists; the previous snapshot is then dropped.
    pub fn load(&mut self, repository: &str) -> Result<Option<&DependencyIndex>, IndexError> {
        let started = Instant::now();
        let loaded = self.store.load(&storage_key(repository))?;
        let elapsed = started.elapsed();

        match &loaded {
            Some(index) => tracing::info!(
                "Loaded index for {} ({} classes, {} dependencies) in {:.2} ms",
                repository,
                index.index.classes.len(),
                index.index.dependencies.len(),
                elapsed.as_secs_f64() * 1000.0
            ),
            None => tracing::debug!("No index stored for {}", repository),
        }

        self.load_latency = loaded.as_ref().map(|_| elapsed);
        self.index = loaded;
        Ok(self.index.as_ref())
    }

    /// Like [`Self::load`], but a missing index is an error.
    pub fn load_required(&mut self, repository: &str) -> Result<&DependencyIndex, IndexError> {
        self.load(repository)?
            .ok_or_else(|| IndexError::NotFound(repository.to_string()))
    }

    pub fn index(&self) -> Option<&DependencyIndex> {
        self.index.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.index.is_some()
    }

    pub fn find_class(&self, name: &str) -> Option<&ClassInfo> {
        self.index.as_ref()?.index.classes.get(name)
    }

    /// Direct dependency targets recorded on the type.
    pub fn find_dependencies(&self, name: &str) -> &[String] {
        self.find_class(name)
            .map(|class| class.dependencies.as_slice())
            .unwrap_or(&[])
    }

    /// Sources of every edge pointing at `name`, sorted.
    pub fn find_dependents(&self, name: &str) -> Vec<String> {
        let Some(index) = &self.index else {
            return Vec::new();
        };
        let dependents: BTreeSet<&str> = index
            .index
            .dependencies
            .values()
            .filter(|relation| relation.to == name)
            .map(|relation| relation.from.as_str())
            .collect();
        dependents.into_iter().map(String::from).collect()
    }

    pub fn find_files_by_language(&self, language: Language) -> Vec<&FileMetadata> {
        match &self.index {
            Some(index) => index
                .index
                .files
                .values()
                .filter(|file| file.language == language)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Types in the index whose declaring file is `path`.
    pub fn find_classes_in_file(&self, path: &str) -> Vec<&ClassInfo> {
        match &self.index {
            Some(index) => index
                .index
                .classes
                .values()
                .filter(|class| class.file_path == path)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Direct dependents, then dependents of those, with the files they live in.
    pub fn analyze_impact(&self, name: &str) -> ImpactAnalysis {
        let direct_dependents = self.find_dependents(name);
        let indirect_dependents: Vec<String> = direct_dependents
            .iter()
            .flat_map(|dependent| self.find_dependents(dependent))
            .collect();

        let affected_files: BTreeSet<String> = direct_dependents
            .iter()
            .chain(indirect_dependents.iter())
            .filter_map(|dependent| self.find_class(dependent))
            .map(|class| class.file_path.clone())
            .collect();

        ImpactAnalysis {
            target: name.to_string(),
            total_impact: direct_dependents.len() + indirect_dependents.len(),
            direct_dependents,
            indirect_dependents,
            affected_files: affected_files.into_iter().collect(),
        }
    }

    /// Fill `affected_files` on each change from the impact of its type.
    pub fn annotate(&self, changes: &mut [BreakingChange]) {
        for change in changes {
            change.affected_files = Some(self.analyze_impact(&change.symbol).affected_files);
        }
    }

    pub fn stats(&self) -> Option<IndexStats> {
        let index = self.index.as_ref()?;
        Some(IndexStats {
            repository: index.repository.clone(),
            last_updated: index.last_updated,
            classes: index.index.classes.len(),
            dependencies: index.index.dependencies.len(),
            files: index.index.files.len(),
            total_files: index.metadata.total_files,
            languages: index.metadata.languages.clone(),
            indexing_duration_ms: index.metadata.indexing_duration,
            load_latency_ms: self.load_latency.map(|d| d.as_secs_f64() * 1000.0),
        })
    }
}
