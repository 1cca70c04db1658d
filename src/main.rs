//! depindex CLI - dependency indexing and breaking-change detection
//!
//! Usage: depindex <command> [arguments]

mod build_cmd;
mod cli;
mod diff_cmd;
mod files_cmd;
mod find_cmd;
mod status_cmd;

use anyhow::Result;
use depindex::config::StoreConfig;
use depindex::output::{output_json, ErrorResponse};
use depindex::storage::{IndexStore, LocalStore};
use depindex::{IndexError, OutputFormat};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use cli::{Command, CommonArgs};

/// Open the local store named by `--store`, `DEPINDEX_STORE_DIR`, or the default.
pub(crate) fn open_store(common: &CommonArgs) -> (Arc<dyn IndexStore>, PathBuf) {
    let config = StoreConfig::resolve(common.store.as_deref());
    let store: Arc<dyn IndexStore> = Arc::new(LocalStore::new(&config.dir));
    (store, config.dir)
}

/// Logs go to stderr so stdout stays parseable.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Build {
            root,
            repository,
            config,
            progress,
            common,
        } => build_cmd::run_build(root, repository, config, progress, &common),
        Command::Query {
            kind,
            repository,
            name,
            common,
        } => find_cmd::run_query(kind, &repository, &name, &common),
        Command::Files {
            repository,
            language,
            file,
            common,
        } => files_cmd::run_files(&repository, language, file.as_deref(), &common),
        Command::Stats { repository, common } => status_cmd::run_stats(&repository, &common),
        Command::List { common } => status_cmd::run_list(&common),
        Command::Diff {
            old,
            new,
            path,
            repository,
            common,
        } => diff_cmd::run_diff(old, new, path, repository.as_deref(), &common),
        Command::Help => {
            cli::print_usage();
            Ok(())
        }
        Command::Version => {
            println!("{}", depindex::version::version());
            Ok(())
        }
    }
}

/// Report a failed command on stderr, or as a JSON error envelope on stdout.
fn report_error(err: &anyhow::Error, output_format: OutputFormat) {
    if output_format.is_json() {
        let code = err
            .chain()
            .find_map(|cause| cause.downcast_ref::<IndexError>())
            .map(|e| e.code().to_string());
        let response = ErrorResponse {
            error: if code.is_some() { "index_error" } else { "command_error" }.to_string(),
            code,
            message: format!("{:#}", err),
        };
        if output_json(&response, output_format).is_ok() {
            return;
        }
    }
    eprintln!("Error: {:#}", err);
}

fn main() -> ExitCode {
    let command = match cli::parse_args() {
        Ok(command) => command,
        Err(e) => {
            eprintln!("Error: {}", e);
            cli::print_usage();
            return ExitCode::from(1);
        }
    };

    let common = command.common().cloned().unwrap_or_default();
    init_tracing(common.verbose);

    match run(command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e, common.output_format);
            ExitCode::from(1)
        }
    }
}
