pub mod compat;
pub mod detect;
pub mod java;
pub mod synthesis;

pub use compat::{detect_breaking_changes, BreakingChange, ChangeKind, ChangeLocation, Severity};
pub use detect::{count_by_language, detect_language, is_source_file, primary_language, Language};
pub use java::JavaAnalyzer;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::error::AnalyzeError;

/// A file read from the repository during one analysis pass.
///
/// Owned by the scanner and dropped once the build finishes. Never persisted.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Absolute path on disk
    pub path: PathBuf,
    /// Path relative to the repository root, `/`-separated
    pub relative_path: String,
    /// Full text content
    pub content: String,
    /// Size in bytes
    pub size: u64,
    pub last_modified: DateTime<Utc>,
}

impl SourceFile {
    /// Build an in-memory source file (no disk access).
    ///
    /// Used when analyzing text that did not come from a scan, such as the
    /// old and new versions of a changed file.
    pub fn from_text(relative_path: impl Into<String>, content: impl Into<String>) -> Self {
        let relative_path = relative_path.into();
        let content = content.into();
        Self {
            path: PathBuf::from(&relative_path),
            size: content.len() as u64,
            relative_path,
            content,
            last_modified: Utc::now(),
        }
    }
}

/// A declared method parameter. The type is kept as written, not resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

/// A public member of a type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodInfo {
    pub name: String,
    /// Canonical form `"<returnType> name(type name, ...)"`; constructors omit the return type
    pub signature: String,
    /// Declaration line (1-indexed)
    pub line: usize,
    /// `None` for constructors
    #[serde(default)]
    pub return_type: Option<String>,
    pub parameters: Vec<ParameterInfo>,
}

impl MethodInfo {
    /// Create a member and compute its canonical signature.
    pub fn new(
        name: impl Into<String>,
        return_type: Option<String>,
        parameters: Vec<ParameterInfo>,
        line: usize,
    ) -> Self {
        let name = name.into();
        let signature = canonical_signature(&name, return_type.as_deref(), &parameters);
        Self {
            name,
            signature,
            line,
            return_type,
            parameters,
        }
    }
}

/// Build the canonical signature string for a member.
pub fn canonical_signature(
    name: &str,
    return_type: Option<&str>,
    parameters: &[ParameterInfo],
) -> String {
    let params = parameters
        .iter()
        .map(|p| format!("{} {}", p.type_name, p.name))
        .collect::<Vec<_>>()
        .join(", ");
    match return_type {
        Some(ret) => format!("{} {}({})", ret, name, params),
        None => format!("{}({})", name, params),
    }
}

/// Kind of type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    #[default]
    Class,
    Interface,
}

/// A declared type and its public surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassInfo {
    /// Simple (unqualified) type name
    pub name: String,
    /// Relative path of the declaring file
    pub file_path: String,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub kind: TypeKind,
    /// Declaration line (1-indexed)
    #[serde(default)]
    pub line: usize,
    /// Public members only
    pub methods: Vec<MethodInfo>,
    /// Names of direct dependency targets
    pub dependencies: Vec<String>,
    /// Never populated by extraction; use `QueryEngine::find_dependents`
    #[serde(default)]
    pub dependents: Vec<String>,
}

impl ClassInfo {
    pub fn method(&self, name: &str) -> Option<&MethodInfo> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// Category of a dependency edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    /// Reference through an import
    Import,
    /// Inheritance from a supertype
    Extends,
    /// Interface implementation
    Implements,
    /// Field of a custom type
    Injection,
    Call,
}

impl RelationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::Import => "import",
            RelationKind::Extends => "extends",
            RelationKind::Implements => "implements",
            RelationKind::Injection => "injection",
            RelationKind::Call => "call",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed dependency edge between two type names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyRelation {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: RelationKind,
    /// Originating file (relative path)
    pub file: String,
    /// Line of the triggering declaration (1-indexed)
    pub line: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
}

impl DependencyRelation {
    /// Index key: `"<from> -> <to>"`. The kind is not part of the key.
    pub fn key(&self) -> String {
        relation_key(&self.from, &self.to)
    }
}

pub fn relation_key(from: &str, to: &str) -> String {
    format!("{} -> {}", from, to)
}

/// Everything extracted from one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    pub classes: Vec<ClassInfo>,
    pub dependencies: Vec<DependencyRelation>,
    /// Imported names, verbatim
    pub imports: Vec<String>,
    /// Publicly declared type names
    pub exports: Vec<String>,
}

impl Extraction {
    pub fn class(&self, name: &str) -> Option<&ClassInfo> {
        self.classes.iter().find(|c| c.name == name)
    }
}

/// Per-language analyzer.
///
/// Instances hold a parser and are reusable across files, but one instance
/// must not be shared between threads; parallel callers create one per worker
/// through [`AnalyzerRegistry::create`].
pub trait LanguageAnalyzer: Send {
    fn language(&self) -> Language;

    /// Parse one file and extract its types, public members, and edges.
    fn analyze(&mut self, file: &SourceFile) -> Result<Extraction, AnalyzeError>;

    /// Compare two extractions of the same logical file.
    fn detect_breaking_changes(&self, old: &Extraction, new: &Extraction) -> Vec<BreakingChange> {
        detect_breaking_changes(old, new)
    }
}

type AnalyzerFactory =
    Box<dyn Fn() -> Result<Box<dyn LanguageAnalyzer>, AnalyzeError> + Send + Sync>;

/// Maps languages to analyzer factories.
#[derive(Default)]
pub struct AnalyzerRegistry {
    factories: BTreeMap<Language, AnalyzerFactory>,
}

impl AnalyzerRegistry {
    /// Empty registry: every detected file is counted but none analyzed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the bundled analyzers (Java).
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Language::Java, || {
            Ok(Box::new(JavaAnalyzer::new()?) as Box<dyn LanguageAnalyzer>)
        });
        registry
    }

    /// Register or replace the factory for a language.
    pub fn register<F>(&mut self, language: Language, factory: F)
    where
        F: Fn() -> Result<Box<dyn LanguageAnalyzer>, AnalyzeError> + Send + Sync + 'static,
    {
        self.factories.insert(language, Box::new(factory));
    }

    pub fn is_registered(&self, language: Language) -> bool {
        self.factories.contains_key(&language)
    }

    pub fn languages(&self) -> Vec<Language> {
        self.factories.keys().copied().collect()
    }

    /// Create a fresh analyzer instance, or `None` if the language is not registered.
    pub fn create(
        &self,
        language: Language,
    ) -> Option<Result<Box<dyn LanguageAnalyzer>, AnalyzeError>> {
        self.factories.get(&language).map(|factory| factory())
    }
}

impl fmt::Debug for AnalyzerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyzerRegistry")
            .field("languages", &self.languages())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_signature_formats() {
        let params = vec![ParameterInfo {
            name: "id".to_string(),
            type_name: "Long".to_string(),
        }];
        assert_eq!(
            canonical_signature("findById", Some("User"), &params),
            "User findById(Long id)"
        );
        assert_eq!(canonical_signature("UserService", None, &[]), "UserService()");

        let two = vec![
            ParameterInfo {
                name: "a".to_string(),
                type_name: "int".to_string(),
            },
            ParameterInfo {
                name: "b".to_string(),
                type_name: "List<String>".to_string(),
            },
        ];
        assert_eq!(
            canonical_signature("merge", Some("void"), &two),
            "void merge(int a, List<String> b)"
        );
    }

    #[test]
    fn test_relation_key_ignores_kind() {
        let rel = DependencyRelation {
            from: "OrderService".to_string(),
            to: "OrderRepository".to_string(),
            kind: RelationKind::Injection,
            file: "src/OrderService.java".to_string(),
            line: 7,
            usage: None,
        };
        assert_eq!(rel.key(), "OrderService -> OrderRepository");
    }

    #[test]
    fn test_relation_serializes_kind_as_type() {
        let rel = DependencyRelation {
            from: "A".to_string(),
            to: "B".to_string(),
            kind: RelationKind::Extends,
            file: "A.java".to_string(),
            line: 1,
            usage: None,
        };
        let json = serde_json::to_value(&rel).unwrap();
        assert_eq!(json["type"], "extends");
        assert!(json.get("usage").is_none());
    }

    #[test]
    fn test_registry_defaults() {
        let registry = AnalyzerRegistry::with_defaults();
        assert!(registry.is_registered(Language::Java));
        assert!(!registry.is_registered(Language::Python));
        assert!(registry.create(Language::Python).is_none());

        let analyzer = registry.create(Language::Java).unwrap().unwrap();
        assert_eq!(analyzer.language(), Language::Java);
    }
}
