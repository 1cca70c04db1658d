//! Files command implementation
//!
//! Lists indexed files, optionally filtered by language, or the types declared in one file.

use anyhow::{Context, Result};
use depindex::graph::{FileMetadata, QueryEngine};
use depindex::ingest::Language;
use depindex::output::{generate_execution_id, output_json, JsonResponse};

use crate::cli::CommonArgs;

pub fn run_files(
    repository: &str,
    language: Option<Language>,
    file: Option<&str>,
    common: &CommonArgs,
) -> Result<()> {
    let (store, _) = crate::open_store(common);
    let mut engine = QueryEngine::new(store);
    engine
        .load_required(repository)
        .with_context(|| format!("Cannot list files of {}", repository))?;
    let exec_id = generate_execution_id();

    if let Some(path) = file {
        let classes = engine.find_classes_in_file(path);
        if common.output_format.is_json() {
            return output_json(&JsonResponse::new(&classes, &exec_id), common.output_format);
        }
        println!("{} ({} types)", path, classes.len());
        for class in classes {
            println!("  {:>5}  {} ({} public members)", class.line, class.name, class.methods.len());
        }
        return Ok(());
    }

    let files: Vec<&FileMetadata> = match (language, engine.index()) {
        (Some(language), _) => engine.find_files_by_language(language),
        (None, Some(index)) => index.index.files.values().collect(),
        (None, None) => Vec::new(),
    };

    if common.output_format.is_json() {
        return output_json(&JsonResponse::new(&files, &exec_id), common.output_format);
    }

    println!("{} files", files.len());
    for meta in files {
        println!(
            "  {} [{}] {} bytes, {}",
            meta.path,
            meta.language,
            meta.size,
            if meta.classes.is_empty() {
                "no types".to_string()
            } else {
                meta.classes.join(", ")
            }
        );
    }
    Ok(())
}
