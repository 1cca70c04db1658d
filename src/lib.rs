//! depindex: a dependency index and breaking-change detector for source repositories
//!
//! depindex scans a repository, parses each source file with tree-sitter, and
//! assembles a repository-wide index of types, their public members, and the
//! lexical dependency edges between them. The index is persisted through a
//! swappable [`storage::IndexStore`] and queried by [`graph::QueryEngine`].
//! Two extractions of the same file can be compared to report API-breaking
//! edits.
//!
//! # Position Conventions
//!
//! All line numbers are 1-indexed (line 1 is the first line). Paths stored in
//! an index are relative to the repository root and `/`-separated.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use depindex::graph::{IndexBuilder, QueryEngine};
//! use depindex::storage::{IndexStore, LocalStore};
//!
//! # fn main() -> Result<(), depindex::IndexError> {
//! let store: Arc<dyn IndexStore> = Arc::new(LocalStore::new(".depindex"));
//! IndexBuilder::new(store.clone()).build("./shop".as_ref(), "acme/shop", None)?;
//!
//! let mut engine = QueryEngine::new(store);
//! engine.load_required("acme/shop")?;
//! let impact = engine.analyze_impact("EventPublisher");
//! println!("{} dependents", impact.total_impact);
//! # Ok(())
//! # }
//! ```

pub mod common;
pub mod config;
pub mod error;
pub mod error_codes;
pub mod graph;
pub mod ingest;
pub mod output;
pub mod storage;
pub mod validation;
pub mod version;

pub use config::{BuildConfig, StoreConfig};
pub use error::{AnalyzeError, IndexError, StorageError};
pub use graph::{
    BuildOutcome, BuildReport, DependencyIndex, FileFilter, FileMetadata, ImpactAnalysis,
    IndexBuilder, IndexStats, QueryEngine,
};
pub use ingest::{
    detect_breaking_changes, detect_language, AnalyzerRegistry, BreakingChange, ClassInfo,
    DependencyRelation, Extraction, JavaAnalyzer, Language, LanguageAnalyzer, MethodInfo,
    SourceFile,
};
pub use output::{generate_execution_id, output_json, JsonResponse, OutputFormat};
pub use storage::{storage_key, IndexStore, LocalStore, MemoryStore};
