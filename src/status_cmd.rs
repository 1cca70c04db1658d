//! Stats and list commands

use anyhow::{Context, Result};
use depindex::graph::QueryEngine;
use depindex::ingest::primary_language;
use depindex::output::{generate_execution_id, output_json, JsonResponse};
use serde::Serialize;

use crate::cli::CommonArgs;

#[derive(Debug, Serialize)]
struct ListResponse {
    store: String,
    keys: Vec<String>,
}

pub fn run_stats(repository: &str, common: &CommonArgs) -> Result<()> {
    let (store, _) = crate::open_store(common);
    let mut engine = QueryEngine::new(store);
    engine
        .load_required(repository)
        .with_context(|| format!("Cannot read stats for {}", repository))?;
    let stats = engine
        .stats()
        .ok_or_else(|| anyhow::anyhow!("No index loaded for {}", repository))?;

    if common.output_format.is_json() {
        return output_json(
            &JsonResponse::new(&stats, &generate_execution_id()),
            common.output_format,
        );
    }

    let languages: Vec<&str> = stats.languages.iter().map(|l| l.as_str()).collect();
    let indexed_paths: Vec<&String> = engine
        .index()
        .map(|index| index.index.files.keys().collect())
        .unwrap_or_default();
    println!("repository:    {}", stats.repository);
    println!("last updated:  {}", stats.last_updated.to_rfc3339());
    println!("classes:       {}", stats.classes);
    println!("dependencies:  {}", stats.dependencies);
    println!("indexed files: {}", stats.files);
    println!("source files:  {}", stats.total_files);
    println!("languages:     {}", languages.join(", "));
    if let Some(primary) = primary_language(&indexed_paths) {
        println!("primary:       {}", primary);
    }
    println!("build time:    {} ms", stats.indexing_duration_ms);
    if let Some(latency) = stats.load_latency_ms {
        println!("load time:     {:.2} ms", latency);
    }
    Ok(())
}

pub fn run_list(common: &CommonArgs) -> Result<()> {
    let (store, store_dir) = crate::open_store(common);
    let keys = store.list().context("Failed to list stored indexes")?;

    if common.output_format.is_json() {
        let response = ListResponse {
            store: store_dir.display().to_string(),
            keys,
        };
        return output_json(
            &JsonResponse::new(response, &generate_execution_id()),
            common.output_format,
        );
    }

    if keys.is_empty() {
        println!("No indexes in {}", store_dir.display());
    }
    for key in keys {
        println!("{}", key);
    }
    Ok(())
}
