//! Index building: scan, analyze in parallel, merge, persist.
//!
//! Per-file analysis runs on a bounded rayon pool with one analyzer instance
//! per worker. Results are collected and folded into the index by a single
//! sequential pass in relative-path order, so collisions resolve the same way
//! on every run: the lexicographically later path wins.

use rayon::prelude::*;
use serde::Serialize;
use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;

use super::filter::FileFilter;
use super::scan::scan_repository;
use super::{BuildProgress, DependencyIndex, FileMetadata};
use crate::config::BuildConfig;
use crate::error::{AnalyzeError, IndexError};
use crate::ingest::{
    detect_language, AnalyzerRegistry, Extraction, Language, LanguageAnalyzer, SourceFile,
};
use crate::storage::{storage_key, IndexStore};

/// A file whose analysis failed and was left out of the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub path: String,
    pub language: Language,
    pub message: String,
}

/// What happened to the scanned files during one build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildReport {
    /// Text files read by the scanner
    pub scanned: usize,
    /// Files detected as source code
    pub source_files: usize,
    /// Source files successfully analyzed and merged
    pub analyzed: usize,
    /// Source files in a language with no registered analyzer
    pub unsupported: usize,
    pub failures: Vec<FileFailure>,
}

/// Result of [`IndexBuilder::build`].
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    /// Key the index was saved under
    pub key: String,
    pub index: DependencyIndex,
    pub report: BuildReport,
}

/// Builds and persists repository indexes.
pub struct IndexBuilder {
    registry: AnalyzerRegistry,
    store: Arc<dyn IndexStore>,
    config: BuildConfig,
}

type WorkerAnalyzers = HashMap<Language, Box<dyn LanguageAnalyzer>>;
type FileResult = Result<Extraction, AnalyzeError>;

impl IndexBuilder {
    /// Builder with the bundled analyzers and default options.
    pub fn new(store: Arc<dyn IndexStore>) -> Self {
        Self {
            registry: AnalyzerRegistry::with_defaults(),
            store,
            config: BuildConfig::default(),
        }
    }

    pub fn with_registry(mut self, registry: AnalyzerRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_config(mut self, config: BuildConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Build the index for the tree under `root` and persist it.
    ///
    /// # Errors
    /// Fatal: unreadable root, invalid filter patterns, analyzer setup,
    /// worker pool creation, and the final save. Per-file analysis failures
    /// are logged and listed in the report instead.
    pub fn build(
        &self,
        root: &Path,
        repository: &str,
        progress: Option<&BuildProgress<'_>>,
    ) -> Result<BuildOutcome, IndexError> {
        let started = Instant::now();

        let filter = FileFilter::from_config(root, &self.config)?;
        let files = scan_repository(root, &filter, self.config.max_file_bytes)?;
        tracing::debug!("Scanned {} files under {}", files.len(), root.display());

        let (mut index, report) = self.assemble(repository, files, progress)?;
        index.metadata.indexing_duration = started.elapsed().as_millis() as u64;

        let key = storage_key(repository);
        self.store.save(&key, &index)?;

        tracing::info!(
            "Indexed {}: {} classes, {} dependencies from {} of {} source files in {} ms ({} failed)",
            repository,
            index.index.classes.len(),
            index.index.dependencies.len(),
            report.analyzed,
            report.source_files,
            index.metadata.indexing_duration,
            report.failures.len()
        );

        Ok(BuildOutcome { key, index, report })
    }

    /// Analyze and merge already-read files without touching storage.
    pub fn assemble(
        &self,
        repository: &str,
        mut files: Vec<SourceFile>,
        progress: Option<&BuildProgress<'_>>,
    ) -> Result<(DependencyIndex, BuildReport), IndexError> {
        files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

        let mut report = BuildReport {
            scanned: files.len(),
            ..Default::default()
        };
        let mut languages = BTreeSet::new();
        let mut jobs: Vec<(&SourceFile, Language)> = Vec::new();

        for file in &files {
            let Some(language) = detect_language(Path::new(&file.relative_path)) else {
                continue;
            };
            if language.is_config_only() {
                continue;
            }
            report.source_files += 1;
            languages.insert(language);

            if self.registry.is_registered(language) {
                jobs.push((file, language));
            } else {
                tracing::debug!("No analyzer for {} ({})", file.relative_path, language);
                report.unsupported += 1;
            }
        }

        let results = self.analyze_all(&jobs, progress)?;

        let mut index = DependencyIndex::new(repository);
        for ((file, language), result) in jobs.iter().zip(results) {
            match result {
                Ok(extraction) => {
                    merge_file(&mut index, file, *language, extraction);
                    report.analyzed += 1;
                }
                Err(e) => {
                    tracing::warn!("Failed to analyze {}: {}", file.relative_path, e);
                    report.failures.push(FileFailure {
                        path: file.relative_path.clone(),
                        language: *language,
                        message: e.to_string(),
                    });
                }
            }
        }

        index.last_updated = Utc::now();
        index.metadata.total_files = report.source_files;
        index.metadata.languages = languages.into_iter().collect();

        Ok((index, report))
    }

    fn analyze_all(
        &self,
        jobs: &[(&SourceFile, Language)],
        progress: Option<&BuildProgress<'_>>,
    ) -> Result<Vec<FileResult>, IndexError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.workers.unwrap_or(0))
            .build()
            .map_err(|e| IndexError::WorkerPool(e.to_string()))?;

        let total = jobs.len();
        let done = AtomicUsize::new(0);
        let registry = &self.registry;

        pool.install(|| {
            jobs.par_iter()
                .map_init(
                    WorkerAnalyzers::new,
                    |analyzers, (file, language)| -> Result<FileResult, IndexError> {
                        let analyzer = analyzer_for(analyzers, registry, *language)?;
                        let result = analyzer.analyze(file);

                        let current = done.fetch_add(1, Ordering::Relaxed) + 1;
                        if let Some(cb) = progress {
                            cb(current, total);
                        }
                        Ok(result)
                    },
                )
                .collect()
        })
    }
}

/// This worker's analyzer for `language`, created on first use.
fn analyzer_for<'a>(
    analyzers: &'a mut WorkerAnalyzers,
    registry: &AnalyzerRegistry,
    language: Language,
) -> Result<&'a mut Box<dyn LanguageAnalyzer>, IndexError> {
    match analyzers.entry(language) {
        Entry::Occupied(entry) => Ok(entry.into_mut()),
        Entry::Vacant(entry) => {
            let created = registry
                .create(language)
                .unwrap_or_else(|| {
                    Err(AnalyzeError::Grammar {
                        language,
                        message: "no analyzer registered".to_string(),
                    })
                })
                .map_err(|source| IndexError::Analyzer { language, source })?;
            Ok(entry.insert(created))
        }
    }
}

/// Fold one file's extraction into the index. Later calls overwrite earlier keys.
fn merge_file(index: &mut DependencyIndex, file: &SourceFile, language: Language, extraction: Extraction) {
    let class_names = extraction.classes.iter().map(|c| c.name.clone()).collect();

    for class in extraction.classes {
        index.index.classes.insert(class.name.clone(), class);
    }
    for relation in extraction.dependencies {
        index.index.dependencies.insert(relation.key(), relation);
    }
    index.index.files.insert(
        file.relative_path.clone(),
        FileMetadata {
            path: file.relative_path.clone(),
            language,
            size: file.size,
            last_modified: file.last_modified,
            classes: class_names,
        },
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::RelationKind;
    use crate::storage::MemoryStore;

    fn builder() -> IndexBuilder {
        IndexBuilder::new(Arc::new(MemoryStore::new())).with_config(BuildConfig {
            workers: Some(2),
            ..Default::default()
        })
    }

    #[test]
    fn test_later_path_wins_on_class_collision() {
        let files = vec![
            SourceFile::from_text("b/Util.java", "public class Util { public void second() {} }"),
            SourceFile::from_text("a/Util.java", "public class Util { public void first() {} }"),
        ];
        let (index, report) = builder().assemble("repo", files, None).unwrap();

        assert_eq!(report.analyzed, 2);
        let util = &index.index.classes["Util"];
        assert_eq!(util.file_path, "b/Util.java");
        assert_eq!(util.methods[0].name, "second");
        assert_eq!(index.index.files.len(), 2);
    }

    #[test]
    fn test_relation_key_collision_keeps_last_edge() {
        let files = vec![SourceFile::from_text(
            "Child.java",
            "class Child extends Parent {\n    private Parent parent;\n}\n",
        )];
        let (index, _) = builder().assemble("repo", files, None).unwrap();

        assert_eq!(index.index.dependencies.len(), 1);
        let edge = &index.index.dependencies["Child -> Parent"];
        assert_eq!(edge.kind, RelationKind::Injection);
        assert_eq!(edge.line, 2);
    }

    #[test]
    fn test_unregistered_languages_are_counted_only() {
        let files = vec![
            SourceFile::from_text("App.java", "class App {}"),
            SourceFile::from_text("tool.py", "def main(): pass"),
            SourceFile::from_text("pom.xml", "<project/>"),
            SourceFile::from_text("notes.txt", "hello"),
        ];
        let (index, report) = builder().assemble("repo", files, None).unwrap();

        assert_eq!(report.scanned, 4);
        assert_eq!(report.source_files, 2);
        assert_eq!(report.unsupported, 1);
        assert_eq!(index.metadata.total_files, 2);
        assert_eq!(index.metadata.languages, vec![Language::Java, Language::Python]);
        assert_eq!(index.index.files.keys().collect::<Vec<_>>(), vec!["App.java"]);
    }

    #[test]
    fn test_failed_file_is_reported_not_fatal() {
        let files = vec![
            SourceFile::from_text("Good.java", "class Good {}"),
            SourceFile::from_text("Bad.java", "class Bad { void x( {"),
        ];
        let (index, report) = builder().assemble("repo", files, None).unwrap();

        assert!(index.index.classes.contains_key("Good"));
        assert!(!index.index.classes.contains_key("Bad"));
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].path, "Bad.java");
    }

    #[test]
    fn test_progress_reaches_total() {
        let files: Vec<_> = (0..5)
            .map(|i| SourceFile::from_text(format!("C{}.java", i), format!("class C{} {{}}", i)))
            .collect();
        let max_seen = AtomicUsize::new(0);
        let progress = |current: usize, total: usize| {
            assert_eq!(total, 5);
            max_seen.fetch_max(current, Ordering::Relaxed);
        };

        builder().assemble("repo", files, Some(&progress)).unwrap();
        assert_eq!(max_seen.load(Ordering::Relaxed), 5);
    }
}
