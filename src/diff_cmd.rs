//! Diff command implementation
//!
//! Analyzes two versions of one file and reports API-breaking edits,
//! optionally annotated with the files affected according to a stored index.

use anyhow::{Context, Result};
use depindex::graph::QueryEngine;
use depindex::ingest::{detect_language, AnalyzerRegistry, BreakingChange, SourceFile};
use depindex::output::{generate_execution_id, output_json, JsonResponse};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::cli::CommonArgs;

#[derive(Debug, Serialize)]
struct DiffResponse {
    path: String,
    changes: Vec<BreakingChange>,
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

pub fn run_diff(
    old: PathBuf,
    new: PathBuf,
    path: Option<String>,
    repository: Option<&str>,
    common: &CommonArgs,
) -> Result<()> {
    let rel_path = path.unwrap_or_else(|| {
        new.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| new.display().to_string())
    });
    let language = detect_language(Path::new(&rel_path))
        .ok_or_else(|| anyhow::anyhow!("Cannot detect language of {}", rel_path))?;

    let registry = AnalyzerRegistry::with_defaults();
    let mut analyzer = registry
        .create(language)
        .ok_or_else(|| anyhow::anyhow!("No analyzer registered for {}", language))??;

    let old_file = SourceFile::from_text(rel_path.as_str(), read_text(&old)?);
    let new_file = SourceFile::from_text(rel_path.as_str(), read_text(&new)?);
    let old_extraction = analyzer
        .analyze(&old_file)
        .with_context(|| format!("Failed to analyze {}", old.display()))?;
    let new_extraction = analyzer
        .analyze(&new_file)
        .with_context(|| format!("Failed to analyze {}", new.display()))?;

    let mut changes = analyzer.detect_breaking_changes(&old_extraction, &new_extraction);

    if let Some(repository) = repository {
        let (store, _) = crate::open_store(common);
        let mut engine = QueryEngine::new(store);
        engine
            .load_required(repository)
            .with_context(|| format!("Cannot annotate changes from {}", repository))?;
        engine.annotate(&mut changes);
    }

    if common.output_format.is_json() {
        let response = DiffResponse {
            path: rel_path,
            changes,
        };
        return output_json(
            &JsonResponse::new(response, &generate_execution_id()),
            common.output_format,
        );
    }

    if changes.is_empty() {
        println!("{}: no breaking changes", rel_path);
        return Ok(());
    }

    println!("{}: {} breaking change(s)", rel_path, changes.len());
    for change in &changes {
        println!(
            "  [{:?}] {} ({}:{})",
            change.severity, change.description, change.location.file, change.location.line
        );
        if let Some(files) = &change.affected_files {
            for file in files {
                println!("      affects {}", file);
            }
        }
    }
    Ok(())
}
