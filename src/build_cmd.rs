//! Build command implementation
//!
//! Scans a repository, builds its dependency index, and persists it.

use anyhow::{Context, Result};
use depindex::config::BuildConfig;
use depindex::graph::{BuildReport, IndexBuilder};
use depindex::output::{generate_execution_id, output_json, JsonResponse};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::cli::CommonArgs;

/// Response for `build` in JSON mode
#[derive(Debug, Serialize)]
struct BuildResponse {
    repository: String,
    key: String,
    store: String,
    classes: usize,
    dependencies: usize,
    files: usize,
    duration_ms: u64,
    report: BuildReport,
}

/// Repository id from the root's directory name when not given.
fn default_repository(root: &Path) -> String {
    root.canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
        .unwrap_or_else(|| "repository".to_string())
}

fn progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(0);
    if let Ok(style) =
        ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} files ({elapsed})")
    {
        bar.set_style(style.progress_chars("=> "));
    }
    bar
}

pub fn run_build(
    root: PathBuf,
    repository: Option<String>,
    config: BuildConfig,
    show_progress: bool,
    common: &CommonArgs,
) -> Result<()> {
    let repository = repository.unwrap_or_else(|| default_repository(&root));
    let (store, store_dir) = crate::open_store(common);
    let builder = IndexBuilder::new(store).with_config(config);

    let bar = show_progress.then(progress_bar);
    let on_progress = |current: usize, total: usize| {
        if let Some(bar) = &bar {
            bar.set_length(total as u64);
            bar.set_position(current as u64);
        }
    };

    let outcome = builder
        .build(&root, &repository, Some(&on_progress))
        .with_context(|| format!("Failed to build index for {}", root.display()))?;

    if let Some(bar) = &bar {
        bar.finish_and_clear();
    }

    let index = &outcome.index;
    let report = &outcome.report;

    if common.output_format.is_json() {
        let response = BuildResponse {
            repository: index.repository.clone(),
            key: outcome.key.clone(),
            store: store_dir.display().to_string(),
            classes: index.index.classes.len(),
            dependencies: index.index.dependencies.len(),
            files: index.index.files.len(),
            duration_ms: index.metadata.indexing_duration,
            report: report.clone(),
        };
        let json = JsonResponse::new(response, &generate_execution_id())
            .with_partial(!report.failures.is_empty());
        return output_json(&json, common.output_format);
    }

    println!(
        "Indexed {}: {} classes, {} dependencies, {} files",
        index.repository,
        index.index.classes.len(),
        index.index.dependencies.len(),
        index.index.files.len()
    );
    println!(
        "  {} scanned, {} source, {} analyzed, {} unsupported, {} failed in {} ms",
        report.scanned,
        report.source_files,
        report.analyzed,
        report.unsupported,
        report.failures.len(),
        index.metadata.indexing_duration
    );
    for failure in &report.failures {
        println!("  failed: {}: {}", failure.path, failure.message);
    }
    println!("  saved as '{}' in {}", outcome.key, store_dir.display());

    Ok(())
}
