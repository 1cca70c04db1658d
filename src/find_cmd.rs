//! Point-query commands: find, deps, dependents, impact

use anyhow::{Context, Result};
use depindex::graph::QueryEngine;
use depindex::ingest::ClassInfo;
use depindex::output::{generate_execution_id, output_json, JsonResponse};
use serde::Serialize;

use crate::cli::{CommonArgs, QueryKind};

/// Names related to a type, for `deps` and `dependents`
#[derive(Debug, Serialize)]
struct RelatedResponse<'a> {
    name: &'a str,
    direction: &'static str,
    types: Vec<String>,
}

fn print_class(class: &ClassInfo) {
    let qualified = match &class.namespace {
        Some(ns) => format!("{}.{}", ns, class.name),
        None => class.name.clone(),
    };
    let kind = match class.kind {
        depindex::ingest::TypeKind::Class => "class",
        depindex::ingest::TypeKind::Interface => "interface",
    };
    println!("{} {} ({}:{})", kind, qualified, class.file_path, class.line);
    if class.methods.is_empty() {
        println!("  (no public members)");
    }
    for method in &class.methods {
        println!("  {:>5}  {}", method.line, method.signature);
    }
    if !class.dependencies.is_empty() {
        println!("  depends on: {}", class.dependencies.join(", "));
    }
}

fn print_names(header: &str, names: &[String]) {
    println!("{} ({})", header, names.len());
    for name in names {
        println!("  {}", name);
    }
}

pub fn run_query(kind: QueryKind, repository: &str, name: &str, common: &CommonArgs) -> Result<()> {
    let (store, _) = crate::open_store(common);
    let mut engine = QueryEngine::new(store);
    engine
        .load_required(repository)
        .with_context(|| format!("Cannot query {}", repository))?;

    let exec_id = generate_execution_id();
    let json = common.output_format.is_json();

    match kind {
        QueryKind::Find => {
            let class = engine
                .find_class(name)
                .ok_or_else(|| anyhow::anyhow!("Type '{}' not found in {}", name, repository))?;
            if json {
                return output_json(&JsonResponse::new(class, &exec_id), common.output_format);
            }
            print_class(class);
        }
        QueryKind::Deps | QueryKind::Dependents => {
            let (direction, types) = if kind == QueryKind::Deps {
                ("dependencies", engine.find_dependencies(name).to_vec())
            } else {
                ("dependents", engine.find_dependents(name))
            };
            if json {
                let response = RelatedResponse {
                    name,
                    direction,
                    types,
                };
                return output_json(&JsonResponse::new(response, &exec_id), common.output_format);
            }
            print_names(&format!("{} of {}", direction, name), &types);
        }
        QueryKind::Impact => {
            let impact = engine.analyze_impact(name);
            if json {
                return output_json(&JsonResponse::new(impact, &exec_id), common.output_format);
            }
            println!("Impact of {}: {}", impact.target, impact.total_impact);
            print_names("direct dependents", &impact.direct_dependents);
            print_names("indirect dependents", &impact.indirect_dependents);
            print_names("affected files", &impact.affected_files);
        }
    }

    Ok(())
}
