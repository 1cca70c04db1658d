//! File filtering for the repository scan.
//!
//! Precedence, first match wins:
//! 1. Fixed noise directories (version control, dependency caches, IDE, virtualenvs),
//!    plus build output directories found outside `src` trees
//! 2. Gitignore-style rules (`.gitignore`, `.ignore`), only when enabled
//! 3. Include globs (if any provided)
//! 4. Exclude globs
//!
//! Matching works on `/`-separated paths relative to the repository root, so
//! the same inputs always produce the same decision.

use camino::Utf8Path;
use globset::{Glob, GlobMatcher};
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::Path;

use crate::config::BuildConfig;
use crate::error::IndexError;

/// Directory names that are never descended into, at any depth.
pub const NOISE_DIRS: &[&str] = &[
    ".git",
    ".svn",
    ".hg",
    "node_modules",
    "bower_components",
    ".gradle",
    ".idea",
    ".vscode",
    ".vs",
    "venv",
    ".venv",
    "__pycache__",
    ".tox",
    ".next",
];

/// Build output and vendored code. These are also valid package names, so a
/// directory under a `src` component is kept.
pub const OUTPUT_DIRS: &[&str] = &[
    "vendor", "target", "build", "dist", "out", "bin", "obj", "coverage",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoiseDirectory,
    IgnoredByGitignore,
    ExcludedByGlob,
}

/// Filter configuration for one scan.
pub struct FileFilter {
    gitignore: Option<Gitignore>,
    /// Empty = include all
    include_patterns: Vec<GlobMatcher>,
    exclude_patterns: Vec<GlobMatcher>,
}

impl FileFilter {
    /// Filter that only prunes the fixed noise directories.
    pub fn noise_only() -> Self {
        Self {
            gitignore: None,
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
        }
    }

    /// Create a filter for `root` from build options.
    pub fn from_config(root: &Path, config: &BuildConfig) -> Result<Self, IndexError> {
        let gitignore = if config.respect_gitignore {
            Some(Self::load_gitignore(root)?)
        } else {
            None
        };

        Ok(Self {
            gitignore,
            include_patterns: Self::compile_globs(&config.include)?,
            exclude_patterns: Self::compile_globs(&config.exclude)?,
        })
    }

    fn load_gitignore(root: &Path) -> Result<Gitignore, IndexError> {
        let mut builder = GitignoreBuilder::new(root);

        for name in [".gitignore", ".ignore"] {
            let path = root.join(name);
            if path.exists() {
                // A malformed ignore file shouldn't abort the build
                if let Some(err) = builder.add(&path) {
                    tracing::warn!("Failed to load {}: {}", path.display(), err);
                }
            }
        }

        builder.build().map_err(|e| IndexError::InvalidPattern {
            pattern: root.join(".gitignore").display().to_string(),
            message: e.to_string(),
        })
    }

    fn compile_globs(patterns: &[String]) -> Result<Vec<GlobMatcher>, IndexError> {
        patterns
            .iter()
            .map(|pattern| {
                Glob::new(pattern)
                    .map(|g| g.compile_matcher())
                    .map_err(|e| IndexError::InvalidPattern {
                        pattern: pattern.clone(),
                        message: e.to_string(),
                    })
            })
            .collect()
    }

    /// Whether the directory at `rel_path` is one of the fixed noise directories.
    pub fn is_noise_dir(rel_path: &Utf8Path) -> bool {
        let Some(name) = rel_path.file_name() else {
            return false;
        };
        if NOISE_DIRS.contains(&name) {
            return true;
        }
        OUTPUT_DIRS.contains(&name)
            && !rel_path
                .parent()
                .is_some_and(|parent| parent.components().any(|c| c.as_str() == "src"))
    }

    /// Decide whether to descend into a directory.
    pub fn should_skip_dir(&self, rel_path: &Utf8Path) -> Option<SkipReason> {
        if Self::is_noise_dir(rel_path) {
            return Some(SkipReason::NoiseDirectory);
        }
        if let Some(gitignore) = &self.gitignore {
            if gitignore.matched(rel_path.as_std_path(), true).is_ignore() {
                return Some(SkipReason::IgnoredByGitignore);
            }
        }
        None
    }

    /// Decide whether to read a regular file.
    ///
    /// Ancestor directories are assumed to have passed [`Self::should_skip_dir`].
    pub fn should_skip_file(&self, rel_path: &Utf8Path) -> Option<SkipReason> {
        if let Some(gitignore) = &self.gitignore {
            if gitignore.matched(rel_path.as_std_path(), false).is_ignore() {
                return Some(SkipReason::IgnoredByGitignore);
            }
        }

        if !self.include_patterns.is_empty()
            && !self.include_patterns.iter().any(|m| m.is_match(rel_path.as_str()))
        {
            return Some(SkipReason::ExcludedByGlob);
        }

        if self.exclude_patterns.iter().any(|m| m.is_match(rel_path.as_str())) {
            return Some(SkipReason::ExcludedByGlob);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_noise_dirs() {
        let filter = FileFilter::noise_only();
        for dir in ["node_modules", "a/b/.git", "target", "service/build", ".idea"] {
            assert_eq!(
                filter.should_skip_dir(Utf8Path::new(dir)),
                Some(SkipReason::NoiseDirectory),
                "{}",
                dir
            );
        }
        assert_eq!(filter.should_skip_dir(Utf8Path::new("src/main")), None);
        assert_eq!(filter.should_skip_dir(Utf8Path::new("builder")), None);
    }

    #[test]
    fn test_output_names_kept_inside_source_trees() {
        let filter = FileFilter::noise_only();
        for dir in [
            "src/main/java/com/acme/build",
            "src/main/java/com/acme/out",
            "core/src/main/java/com/acme/bin",
        ] {
            assert_eq!(filter.should_skip_dir(Utf8Path::new(dir)), None, "{}", dir);
        }
        assert_eq!(
            filter.should_skip_dir(Utf8Path::new("build")),
            Some(SkipReason::NoiseDirectory)
        );
        assert_eq!(
            filter.should_skip_dir(Utf8Path::new("src/main/java/.git")),
            Some(SkipReason::NoiseDirectory)
        );
    }

    #[test]
    fn test_include_and_exclude_globs() {
        let config = BuildConfig {
            include: vec!["src/**".to_string()],
            exclude: vec!["**/generated/**".to_string()],
            ..Default::default()
        };
        let temp_dir = TempDir::new().unwrap();
        let filter = FileFilter::from_config(temp_dir.path(), &config).unwrap();

        assert_eq!(filter.should_skip_file(Utf8Path::new("src/App.java")), None);
        assert_eq!(
            filter.should_skip_file(Utf8Path::new("docs/App.java")),
            Some(SkipReason::ExcludedByGlob)
        );
        assert_eq!(
            filter.should_skip_file(Utf8Path::new("src/generated/Proto.java")),
            Some(SkipReason::ExcludedByGlob)
        );
    }

    #[test]
    fn test_invalid_glob_is_config_error() {
        let config = BuildConfig {
            exclude: vec!["src/[".to_string()],
            ..Default::default()
        };
        let temp_dir = TempDir::new().unwrap();
        let err = FileFilter::from_config(temp_dir.path(), &config).err().unwrap();
        assert_eq!(err.code(), "DEP-CFG-001");
    }

    #[test]
    fn test_gitignore_only_when_enabled() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join(".gitignore"), "generated/\n*.tmp.java\n").unwrap();

        let off = FileFilter::from_config(root, &BuildConfig::default()).unwrap();
        assert_eq!(off.should_skip_dir(Utf8Path::new("generated")), None);

        let config = BuildConfig {
            respect_gitignore: true,
            ..Default::default()
        };
        let on = FileFilter::from_config(root, &config).unwrap();
        assert_eq!(
            on.should_skip_dir(Utf8Path::new("generated")),
            Some(SkipReason::IgnoredByGitignore)
        );
        assert_eq!(
            on.should_skip_file(Utf8Path::new("src/Foo.tmp.java")),
            Some(SkipReason::IgnoredByGitignore)
        );
        assert_eq!(on.should_skip_file(Utf8Path::new("src/Foo.java")), None);
    }
}
