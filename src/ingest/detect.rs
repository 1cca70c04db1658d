//! Language detection from file paths.
//!
//! Maps file extensions (case-insensitive) and a handful of well-known bare
//! file names to a [`Language`] tag. Build and manifest formats are detected
//! too, but they are never treated as analyzable source.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Language tag assigned to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Java,
    Kotlin,
    Scala,
    Groovy,
    TypeScript,
    JavaScript,
    Python,
    Go,
    Rust,
    C,
    Cpp,
    CSharp,
    Ruby,
    Php,
    Swift,
    // Configuration-only formats below: detected, never analyzed
    Maven,
    Gradle,
    Npm,
    Cargo,
    GoMod,
    Pip,
    Xml,
    Json,
    Yaml,
    Toml,
    Properties,
}

impl Language {
    /// Stable lowercase tag, as stored in the index.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Java => "java",
            Language::Kotlin => "kotlin",
            Language::Scala => "scala",
            Language::Groovy => "groovy",
            Language::TypeScript => "typescript",
            Language::JavaScript => "javascript",
            Language::Python => "python",
            Language::Go => "go",
            Language::Rust => "rust",
            Language::C => "c",
            Language::Cpp => "cpp",
            Language::CSharp => "csharp",
            Language::Ruby => "ruby",
            Language::Php => "php",
            Language::Swift => "swift",
            Language::Maven => "maven",
            Language::Gradle => "gradle",
            Language::Npm => "npm",
            Language::Cargo => "cargo",
            Language::GoMod => "gomod",
            Language::Pip => "pip",
            Language::Xml => "xml",
            Language::Json => "json",
            Language::Yaml => "yaml",
            Language::Toml => "toml",
            Language::Properties => "properties",
        }
    }

    /// Parse a tag produced by [`Language::as_str`] (case-insensitive).
    pub fn from_tag(tag: &str) -> Option<Self> {
        let lang = match tag.to_ascii_lowercase().as_str() {
            "java" => Language::Java,
            "kotlin" => Language::Kotlin,
            "scala" => Language::Scala,
            "groovy" => Language::Groovy,
            "typescript" => Language::TypeScript,
            "javascript" => Language::JavaScript,
            "python" => Language::Python,
            "go" => Language::Go,
            "rust" => Language::Rust,
            "c" => Language::C,
            "cpp" => Language::Cpp,
            "csharp" => Language::CSharp,
            "ruby" => Language::Ruby,
            "php" => Language::Php,
            "swift" => Language::Swift,
            "maven" => Language::Maven,
            "gradle" => Language::Gradle,
            "npm" => Language::Npm,
            "cargo" => Language::Cargo,
            "gomod" => Language::GoMod,
            "pip" => Language::Pip,
            "xml" => Language::Xml,
            "json" => Language::Json,
            "yaml" => Language::Yaml,
            "toml" => Language::Toml,
            "properties" => Language::Properties,
            _ => return None,
        };
        Some(lang)
    }

    /// True for manifest/build-descriptor formats that carry no types.
    pub fn is_config_only(&self) -> bool {
        matches!(
            self,
            Language::Maven
                | Language::Gradle
                | Language::Npm
                | Language::Cargo
                | Language::GoMod
                | Language::Pip
                | Language::Xml
                | Language::Json
                | Language::Yaml
                | Language::Toml
                | Language::Properties
        )
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bare file names that identify a build or manifest file.
const SPECIAL_FILE_NAMES: &[(&str, Language)] = &[
    ("pom.xml", Language::Maven),
    ("build.gradle", Language::Gradle),
    ("build.gradle.kts", Language::Gradle),
    ("settings.gradle", Language::Gradle),
    ("settings.gradle.kts", Language::Gradle),
    ("package.json", Language::Npm),
    ("cargo.toml", Language::Cargo),
    ("go.mod", Language::GoMod),
    ("requirements.txt", Language::Pip),
];

const EXTENSIONS: &[(&str, Language)] = &[
    ("java", Language::Java),
    ("kt", Language::Kotlin),
    ("kts", Language::Kotlin),
    ("scala", Language::Scala),
    ("groovy", Language::Groovy),
    ("ts", Language::TypeScript),
    ("tsx", Language::TypeScript),
    ("js", Language::JavaScript),
    ("jsx", Language::JavaScript),
    ("mjs", Language::JavaScript),
    ("cjs", Language::JavaScript),
    ("py", Language::Python),
    ("go", Language::Go),
    ("rs", Language::Rust),
    ("c", Language::C),
    ("h", Language::C),
    ("cpp", Language::Cpp),
    ("cc", Language::Cpp),
    ("cxx", Language::Cpp),
    ("hpp", Language::Cpp),
    ("cs", Language::CSharp),
    ("rb", Language::Ruby),
    ("php", Language::Php),
    ("swift", Language::Swift),
    ("xml", Language::Xml),
    ("json", Language::Json),
    ("yml", Language::Yaml),
    ("yaml", Language::Yaml),
    ("toml", Language::Toml),
    ("properties", Language::Properties),
];

/// Detect the language of a file from its path.
///
/// Special bare file names win over the extension table, so `pom.xml` is
/// `maven` rather than `xml`.
pub fn detect_language(path: &Path) -> Option<Language> {
    let file_name = path.file_name()?.to_str()?.to_ascii_lowercase();

    if let Some((_, lang)) = SPECIAL_FILE_NAMES
        .iter()
        .find(|(name, _)| *name == file_name)
    {
        return Some(*lang);
    }

    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    EXTENSIONS
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, lang)| *lang)
}

/// True iff a language is detected and it is not configuration-only.
pub fn is_source_file(path: &Path) -> bool {
    detect_language(path).is_some_and(|lang| !lang.is_config_only())
}

/// Count files per detected language. Undetected files are not counted.
pub fn count_by_language<P: AsRef<Path>>(paths: &[P]) -> BTreeMap<Language, usize> {
    let mut counts = BTreeMap::new();
    for path in paths {
        if let Some(lang) = detect_language(path.as_ref()) {
            *counts.entry(lang).or_insert(0) += 1;
        }
    }
    counts
}

/// The most common source language in a file set.
///
/// Configuration-only formats never win. Ties resolve to the language that
/// sorts first, which keeps the result deterministic.
pub fn primary_language<P: AsRef<Path>>(paths: &[P]) -> Option<Language> {
    let mut best: Option<(Language, usize)> = None;
    for (lang, count) in count_by_language(paths) {
        if lang.is_config_only() {
            continue;
        }
        match best {
            Some((_, best_count)) if best_count >= count => {}
            _ => best = Some((lang, count)),
        }
    }
    best.map(|(lang, _)| lang)
}
