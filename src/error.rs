//! Error types for indexing, analysis, and storage.
//!
//! Three layers, matching how failures propagate:
//! - [`AnalyzeError`] is per-file and recoverable: the builder logs it and moves on.
//! - [`StorageError`] is raised by [`crate::storage::IndexStore`] backends.
//! - [`IndexError`] is what build and load operations return to callers.

use std::path::PathBuf;

use crate::error_codes;
use crate::ingest::Language;

/// Failure while analyzing a single source file.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    /// The tree-sitter grammar could not be loaded into the parser
    #[error("failed to load {language} grammar: {message}")]
    Grammar { language: Language, message: String },

    /// The parser returned no tree at all
    #[error("parser produced no syntax tree for {0}")]
    ParseAborted(String),

    /// The syntax tree contains error or missing nodes
    #[error("syntax error in {path} at line {line}")]
    Syntax { path: String, line: usize },
}

/// Failure reading from or writing to an index store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O failed for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not (de)serialize index for key '{key}': {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure of a whole build or load operation.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The repository root could not be read
    #[error("cannot read repository root {}: {source}", path.display())]
    Discovery {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// No index has been persisted for this repository yet
    #[error("no dependency index found for repository '{0}'")]
    NotFound(String),

    /// A registered analyzer could not be instantiated
    #[error("analyzer for {language} could not be created: {source}")]
    Analyzer {
        language: Language,
        #[source]
        source: AnalyzeError,
    },

    /// An include/exclude glob or ignore file could not be compiled
    #[error("invalid filter pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("worker pool could not be created: {0}")]
    WorkerPool(String),
}

impl IndexError {
    /// Stable error code for machine-readable output.
    pub fn code(&self) -> &'static str {
        match self {
            IndexError::Discovery { .. } => error_codes::DEP_IO_001_ROOT_UNREADABLE,
            IndexError::Storage(StorageError::Io { .. }) => error_codes::DEP_STO_001_IO,
            IndexError::Storage(StorageError::Serialization { .. }) => {
                error_codes::DEP_STO_002_CORRUPT_INDEX
            }
            IndexError::NotFound(_) => error_codes::DEP_QRY_001_INDEX_NOT_FOUND,
            IndexError::Analyzer { .. } => error_codes::DEP_ANA_001_ANALYZER_INIT,
            IndexError::InvalidPattern { .. } => error_codes::DEP_CFG_001_INVALID_PATTERN,
            IndexError::WorkerPool(_) => error_codes::DEP_SYS_001_WORKER_POOL,
        }
    }
}
