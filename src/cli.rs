//! CLI argument parsing for depindex
//!
//! Defines the Command enum and parse_args_impl() for all CLI commands.

use anyhow::Result;
use depindex::config::BuildConfig;
use depindex::ingest::Language;
use depindex::OutputFormat;
use std::path::PathBuf;

pub fn print_usage() {
    eprintln!("depindex - dependency index and breaking-change detection");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  depindex <command> [arguments]");
    eprintln!("  depindex --help");
    eprintln!("  depindex --version");
    eprintln!();
    eprintln!("  depindex build --root <DIR> [--repo <ID>] [--workers <N>] [--include <GLOB>]... [--exclude <GLOB>]... [--gitignore] [--max-file-bytes <N>] [--progress]");
    eprintln!("  depindex find --repo <ID> --name <TYPE>");
    eprintln!("  depindex deps --repo <ID> --name <TYPE>");
    eprintln!("  depindex dependents --repo <ID> --name <TYPE>");
    eprintln!("  depindex impact --repo <ID> --name <TYPE>");
    eprintln!("  depindex files --repo <ID> [--language <LANG>] [--file <PATH>]");
    eprintln!("  depindex stats --repo <ID>");
    eprintln!("  depindex list");
    eprintln!("  depindex diff --old <FILE> --new <FILE> [--path <REL_PATH>] [--repo <ID>]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  build       Scan a repository and persist its dependency index");
    eprintln!("  find        Show a type and its public members");
    eprintln!("  deps        List a type's direct dependencies");
    eprintln!("  dependents  List types that depend on a type");
    eprintln!("  impact      Two-hop impact analysis for a type");
    eprintln!("  files       List indexed files");
    eprintln!("  stats       Show index statistics");
    eprintln!("  list        List stored repository indexes");
    eprintln!("  diff        Report breaking changes between two versions of a file");
    eprintln!();
    eprintln!("Global arguments:");
    eprintln!("  --store <DIR>       Index store directory (default: $DEPINDEX_STORE_DIR or ./.depindex)");
    eprintln!("  --output <FORMAT>   Output format: human (default), json, or pretty");
    eprintln!("  --verbose           Log build and load summaries to stderr");
    eprintln!();
    eprintln!("Build arguments:");
    eprintln!("  --root <DIR>          Repository root to scan");
    eprintln!("  --repo <ID>           Repository identifier (default: root directory name)");
    eprintln!("  --workers <N>         Analysis threads (default: one per CPU)");
    eprintln!("  --include <GLOB>      Only index files matching this glob (repeatable)");
    eprintln!("  --exclude <GLOB>      Skip files matching this glob (repeatable)");
    eprintln!("  --gitignore           Honor .gitignore and .ignore at the root");
    eprintln!("  --max-file-bytes <N>  Skip files larger than N bytes (default: 4194304)");
    eprintln!("  --progress            Show a progress bar");
    eprintln!();
    eprintln!("Diff arguments:");
    eprintln!("  --old <FILE>          Previous version of the file");
    eprintln!("  --new <FILE>          Current version of the file");
    eprintln!("  --path <REL_PATH>     Repository-relative path recorded in the report");
    eprintln!("  --repo <ID>           Annotate changes with affected files from this index");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  RUST_LOG              Log filter (default: warn)");
    eprintln!("  DEPINDEX_STORE_DIR    Index store directory");
}

/// Arguments every command accepts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommonArgs {
    pub store: Option<PathBuf>,
    pub output_format: OutputFormat,
    pub verbose: bool,
}

/// Point queries against a loaded index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Find,
    Deps,
    Dependents,
    Impact,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Build {
        root: PathBuf,
        repository: Option<String>,
        config: BuildConfig,
        progress: bool,
        common: CommonArgs,
    },
    Query {
        kind: QueryKind,
        repository: String,
        name: String,
        common: CommonArgs,
    },
    Files {
        repository: String,
        language: Option<Language>,
        file: Option<String>,
        common: CommonArgs,
    },
    Stats {
        repository: String,
        common: CommonArgs,
    },
    List {
        common: CommonArgs,
    },
    Diff {
        old: PathBuf,
        new: PathBuf,
        path: Option<String>,
        repository: Option<String>,
        common: CommonArgs,
    },
    Help,
    Version,
}

impl Command {
    pub fn common(&self) -> Option<&CommonArgs> {
        match self {
            Command::Build { common, .. }
            | Command::Query { common, .. }
            | Command::Files { common, .. }
            | Command::Stats { common, .. }
            | Command::List { common }
            | Command::Diff { common, .. } => Some(common),
            Command::Help | Command::Version => None,
        }
    }
}

/// Value following `args[*i]`; advances past both.
fn take_value<'a>(args: &'a [String], i: &mut usize) -> Result<&'a str> {
    let flag = &args[*i];
    let value = args
        .get(*i + 1)
        .ok_or_else(|| anyhow::anyhow!("{} requires an argument", flag))?;
    *i += 2;
    Ok(value)
}

/// Consume a global flag at `args[*i]`, if it is one.
fn take_common(args: &[String], i: &mut usize, common: &mut CommonArgs) -> Result<bool> {
    match args[*i].as_str() {
        "--store" => {
            common.store = Some(PathBuf::from(take_value(args, i)?));
        }
        "--output" => {
            let value = take_value(args, i)?;
            common.output_format = OutputFormat::parse(value)
                .ok_or_else(|| anyhow::anyhow!("Invalid output format: {}", value))?;
        }
        "--verbose" | "-v" => {
            common.verbose = true;
            *i += 1;
        }
        _ => return Ok(false),
    }
    Ok(true)
}

/// Parse CLI arguments (including the program name at index 0) into a Command
pub fn parse_args_impl(args: &[String]) -> Result<Command> {
    if args.len() < 2 {
        return Err(anyhow::anyhow!("Missing command"));
    }

    let command = args[1].as_str();
    let mut common = CommonArgs::default();
    let mut i = 2;

    match command {
        "--version" | "-V" => Ok(Command::Version),
        "--help" | "-h" | "help" => Ok(Command::Help),
        "build" => {
            let mut root: Option<PathBuf> = None;
            let mut repository: Option<String> = None;
            let mut config = BuildConfig::default();
            let mut progress = false;

            while i < args.len() {
                if take_common(args, &mut i, &mut common)? {
                    continue;
                }
                match args[i].as_str() {
                    "--root" => root = Some(PathBuf::from(take_value(args, &mut i)?)),
                    "--repo" => repository = Some(take_value(args, &mut i)?.to_string()),
                    "--workers" => {
                        let n: usize = take_value(args, &mut i)?.parse()?;
                        config.workers = Some(n);
                    }
                    "--include" => config.include.push(take_value(args, &mut i)?.to_string()),
                    "--exclude" => config.exclude.push(take_value(args, &mut i)?.to_string()),
                    "--max-file-bytes" => {
                        config.max_file_bytes = take_value(args, &mut i)?.parse()?;
                    }
                    "--gitignore" => {
                        config.respect_gitignore = true;
                        i += 1;
                    }
                    "--progress" => {
                        progress = true;
                        i += 1;
                    }
                    other => return Err(anyhow::anyhow!("Unknown argument: {}", other)),
                }
            }

            let root = root.ok_or_else(|| anyhow::anyhow!("--root is required"))?;
            Ok(Command::Build {
                root,
                repository,
                config,
                progress,
                common,
            })
        }
        "find" | "deps" | "dependents" | "impact" => {
            let kind = match command {
                "find" => QueryKind::Find,
                "deps" => QueryKind::Deps,
                "dependents" => QueryKind::Dependents,
                _ => QueryKind::Impact,
            };
            let mut repository: Option<String> = None;
            let mut name: Option<String> = None;

            while i < args.len() {
                if take_common(args, &mut i, &mut common)? {
                    continue;
                }
                match args[i].as_str() {
                    "--repo" => repository = Some(take_value(args, &mut i)?.to_string()),
                    "--name" => name = Some(take_value(args, &mut i)?.to_string()),
                    other => return Err(anyhow::anyhow!("Unknown argument: {}", other)),
                }
            }

            Ok(Command::Query {
                kind,
                repository: repository.ok_or_else(|| anyhow::anyhow!("--repo is required"))?,
                name: name.ok_or_else(|| anyhow::anyhow!("--name is required"))?,
                common,
            })
        }
        "files" => {
            let mut repository: Option<String> = None;
            let mut language: Option<Language> = None;
            let mut file: Option<String> = None;

            while i < args.len() {
                if take_common(args, &mut i, &mut common)? {
                    continue;
                }
                match args[i].as_str() {
                    "--repo" => repository = Some(take_value(args, &mut i)?.to_string()),
                    "--language" => {
                        let tag = take_value(args, &mut i)?;
                        language = Some(
                            Language::from_tag(tag)
                                .ok_or_else(|| anyhow::anyhow!("Unknown language: {}", tag))?,
                        );
                    }
                    "--file" => file = Some(take_value(args, &mut i)?.to_string()),
                    other => return Err(anyhow::anyhow!("Unknown argument: {}", other)),
                }
            }

            Ok(Command::Files {
                repository: repository.ok_or_else(|| anyhow::anyhow!("--repo is required"))?,
                language,
                file,
                common,
            })
        }
        "stats" => {
            let mut repository: Option<String> = None;
            while i < args.len() {
                if take_common(args, &mut i, &mut common)? {
                    continue;
                }
                match args[i].as_str() {
                    "--repo" => repository = Some(take_value(args, &mut i)?.to_string()),
                    other => return Err(anyhow::anyhow!("Unknown argument: {}", other)),
                }
            }
            Ok(Command::Stats {
                repository: repository.ok_or_else(|| anyhow::anyhow!("--repo is required"))?,
                common,
            })
        }
        "list" => {
            while i < args.len() {
                if !take_common(args, &mut i, &mut common)? {
                    return Err(anyhow::anyhow!("Unknown argument: {}", args[i]));
                }
            }
            Ok(Command::List { common })
        }
        "diff" => {
            let mut old: Option<PathBuf> = None;
            let mut new: Option<PathBuf> = None;
            let mut path: Option<String> = None;
            let mut repository: Option<String> = None;

            while i < args.len() {
                if take_common(args, &mut i, &mut common)? {
                    continue;
                }
                match args[i].as_str() {
                    "--old" => old = Some(PathBuf::from(take_value(args, &mut i)?)),
                    "--new" => new = Some(PathBuf::from(take_value(args, &mut i)?)),
                    "--path" => path = Some(take_value(args, &mut i)?.to_string()),
                    "--repo" => repository = Some(take_value(args, &mut i)?.to_string()),
                    other => return Err(anyhow::anyhow!("Unknown argument: {}", other)),
                }
            }

            Ok(Command::Diff {
                old: old.ok_or_else(|| anyhow::anyhow!("--old is required"))?,
                new: new.ok_or_else(|| anyhow::anyhow!("--new is required"))?,
                path,
                repository,
                common,
            })
        }
        _ => Err(anyhow::anyhow!("Unknown command: {}", command)),
    }
}

/// Parse the process arguments
pub fn parse_args() -> Result<Command> {
    let args: Vec<String> = std::env::args().collect();
    parse_args_impl(&args)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<Command> {
        let args: Vec<String> = std::iter::once("depindex")
            .chain(line.split_whitespace())
            .map(String::from)
            .collect();
        parse_args_impl(&args)
    }

    #[test]
    fn test_parse_build() {
        let cmd = parse(
            "build --root /src/shop --repo acme/shop --workers 4 --exclude **/gen/** --gitignore --output json",
        )
        .unwrap();
        match cmd {
            Command::Build {
                root,
                repository,
                config,
                progress,
                common,
            } => {
                assert_eq!(root, PathBuf::from("/src/shop"));
                assert_eq!(repository.as_deref(), Some("acme/shop"));
                assert_eq!(config.workers, Some(4));
                assert_eq!(config.exclude, vec!["**/gen/**"]);
                assert!(config.respect_gitignore);
                assert!(!progress);
                assert_eq!(common.output_format, OutputFormat::Json);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_queries() {
        let cmd = parse("impact --repo r --name EventPublisher --store /tmp/s").unwrap();
        assert_eq!(
            cmd,
            Command::Query {
                kind: QueryKind::Impact,
                repository: "r".to_string(),
                name: "EventPublisher".to_string(),
                common: CommonArgs {
                    store: Some(PathBuf::from("/tmp/s")),
                    ..Default::default()
                },
            }
        );
        assert!(matches!(
            parse("dependents --repo r --name X").unwrap(),
            Command::Query {
                kind: QueryKind::Dependents,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_files_language() {
        let cmd = parse("files --repo r --language java").unwrap();
        assert!(matches!(
            cmd,
            Command::Files {
                language: Some(Language::Java),
                ..
            }
        ));
        assert!(parse("files --repo r --language cobol").is_err());
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse("").is_err());
        assert!(parse("frobnicate").is_err());
        assert!(parse("build").is_err());
        assert!(parse("find --repo r").is_err());
        assert!(parse("find --repo").is_err());
        assert!(parse("stats --repo r --output xml").is_err());
        assert!(parse("list --bogus").is_err());
    }

    #[test]
    fn test_parse_help_and_version() {
        assert_eq!(parse("--help").unwrap(), Command::Help);
        assert_eq!(parse("-V").unwrap(), Command::Version);
        assert!(parse("--version").unwrap().common().is_none());
    }

    #[test]
    fn test_parse_diff() {
        let cmd = parse("diff --old a.java --new b.java --path src/A.java --verbose").unwrap();
        match cmd {
            Command::Diff { path, common, .. } => {
                assert_eq!(path.as_deref(), Some("src/A.java"));
                assert!(common.verbose);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
