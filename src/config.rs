//! Build and store configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming the local store directory.
pub const STORE_DIR_ENV: &str = "DEPINDEX_STORE_DIR";

/// Store directory used when neither a flag nor the environment names one.
pub const DEFAULT_STORE_DIR: &str = ".depindex";

/// Files larger than this are treated as generated noise and skipped.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 4 * 1024 * 1024;

/// Options for one index build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BuildConfig {
    /// Analysis worker threads; `None` uses one per logical CPU
    pub workers: Option<usize>,
    /// Relative-path globs a file must match (empty = all files)
    pub include: Vec<String>,
    /// Relative-path globs that exclude a file
    pub exclude: Vec<String>,
    /// Honor `.gitignore` / `.ignore` at the repository root
    pub respect_gitignore: bool,
    pub max_file_bytes: u64,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            workers: None,
            include: Vec::new(),
            exclude: Vec::new(),
            respect_gitignore: false,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }
}

/// Where the local-disk store keeps its files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub dir: PathBuf,
}

impl StoreConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Resolve the store directory: explicit flag, then environment, then default.
    pub fn resolve(flag: Option<&Path>) -> Self {
        Self::resolve_with(flag, std::env::var_os(STORE_DIR_ENV).map(PathBuf::from))
    }

    fn resolve_with(flag: Option<&Path>, env: Option<PathBuf>) -> Self {
        let dir = match (flag, env) {
            (Some(flag), _) => flag.to_path_buf(),
            (None, Some(env)) if !env.as_os_str().is_empty() => env,
            _ => PathBuf::from(DEFAULT_STORE_DIR),
        };
        Self { dir }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_config_defaults() {
        let config = BuildConfig::default();
        assert_eq!(config.workers, None);
        assert!(!config.respect_gitignore);
        assert_eq!(config.max_file_bytes, 4 * 1024 * 1024);
    }

    #[test]
    fn test_build_config_partial_json() {
        let config: BuildConfig = serde_json::from_str(r#"{"exclude": ["**/gen/**"]}"#).unwrap();
        assert_eq!(config.exclude, vec!["**/gen/**"]);
        assert_eq!(config.max_file_bytes, DEFAULT_MAX_FILE_BYTES);
    }

    #[test]
    fn test_store_resolution_order() {
        let flag = PathBuf::from("/flag");
        let env = Some(PathBuf::from("/env"));

        assert_eq!(StoreConfig::resolve_with(Some(&flag), env.clone()).dir, flag);
        assert_eq!(StoreConfig::resolve_with(None, env).dir, PathBuf::from("/env"));
        assert_eq!(
            StoreConfig::resolve_with(None, None).dir,
            PathBuf::from(DEFAULT_STORE_DIR)
        );
        assert_eq!(
            StoreConfig::resolve_with(None, Some(PathBuf::new())).dir,
            PathBuf::from(DEFAULT_STORE_DIR)
        );
    }
}
