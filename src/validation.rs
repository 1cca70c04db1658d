//! Path normalization for repository-relative paths.
//!
//! Every path stored in an index is relative to the repository root and uses
//! `/` separators, regardless of the host platform.

use camino::{Utf8Path, Utf8PathBuf};
use std::path::Path;

/// Error types for path normalization.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PathValidationError {
    /// Path does not live under the repository root
    #[error("path {0} is not under root {1}")]
    OutsideRoot(String, String),

    /// Path cannot be represented as UTF-8
    #[error("path is not valid UTF-8: {0}")]
    NonUtf8(String),
}

/// Compute the `/`-separated path of `path` relative to `root`.
///
/// `root` itself maps to the empty path.
pub fn relative_path(root: &Path, path: &Path) -> Result<Utf8PathBuf, PathValidationError> {
    let rel = path.strip_prefix(root).map_err(|_| {
        PathValidationError::OutsideRoot(
            path.to_string_lossy().to_string(),
            root.to_string_lossy().to_string(),
        )
    })?;
    let utf8 = Utf8Path::from_path(rel)
        .ok_or_else(|| PathValidationError::NonUtf8(rel.to_string_lossy().to_string()))?;
    Ok(Utf8PathBuf::from(normalize_separators(utf8.as_str())))
}

/// Replace Windows separators with `/`.
pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}
