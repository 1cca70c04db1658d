//! Repository scanning.
//!
//! Walks the tree under a root and reads every regular text file that passes
//! the [`FileFilter`]. Nothing is written to disk.

use chrono::{DateTime, Utc};
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

use super::filter::FileFilter;
use crate::error::IndexError;
use crate::ingest::SourceFile;
use crate::validation::relative_path;

/// Scan a directory tree and read its text files.
///
/// # Behavior
/// 1. Verify the root is a readable directory (fatal if not)
/// 2. Walk recursively without following symlinks, pruning filtered directories
/// 3. Read each remaining regular file as UTF-8 text
///
/// # Guarantees
/// - Files are returned sorted by relative path
/// - Files that are unreadable, not UTF-8, contain NUL bytes, or exceed
///   `max_file_bytes` are skipped silently
pub fn scan_repository(
    root: &Path,
    filter: &FileFilter,
    max_file_bytes: u64,
) -> Result<Vec<SourceFile>, IndexError> {
    std::fs::read_dir(root).map_err(|source| IndexError::Discovery {
        path: root.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| keep_entry(root, filter, entry));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(file) = read_source_file(root, entry.path(), max_file_bytes) {
            files.push(file);
        }
    }

    files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    Ok(files)
}

fn keep_entry(root: &Path, filter: &FileFilter, entry: &DirEntry) -> bool {
    // The root itself is always walked
    if entry.depth() == 0 {
        return true;
    }
    let Ok(rel) = relative_path(root, entry.path()) else {
        return false;
    };
    let reason = if entry.file_type().is_dir() {
        filter.should_skip_dir(&rel)
    } else {
        filter.should_skip_file(&rel)
    };
    match reason {
        Some(reason) => {
            tracing::debug!("Skipping {} ({:?})", rel, reason);
            false
        }
        None => true,
    }
}

fn read_source_file(root: &Path, path: &Path, max_file_bytes: u64) -> Option<SourceFile> {
    let metadata = std::fs::metadata(path).ok()?;
    if metadata.len() > max_file_bytes {
        tracing::debug!("Skipping {} ({} bytes, over limit)", path.display(), metadata.len());
        return None;
    }

    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!("Skipping unreadable {}: {}", path.display(), e);
            return None;
        }
    };
    if bytes.contains(&0) {
        return None;
    }
    let content = String::from_utf8(bytes).ok()?;

    let relative_path = relative_path(root, path).ok()?.into_string();
    let last_modified = metadata
        .modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now());

    Some(SourceFile {
        path: path.to_path_buf(),
        relative_path,
        size: metadata.len(),
        content,
        last_modified,
    })
}
