//! Breaking-change detection between two extractions of the same file.
//!
//! Types are matched by simple name and members by simple name only. The
//! first declared member of each name represents it on both sides, so later
//! overloads are not compared and each name yields at most one change.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::{ClassInfo, Extraction, MethodInfo};

/// Kind of API-breaking edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// A type that existed is gone
    ClassRemoved,
    /// A public member that existed is gone
    MethodRemoved,
    /// A public member kept its name but its signature changed
    SignatureChanged,
    /// Reserved for interface contract changes; not produced by the name-based comparator
    InterfaceChanged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Minor,
    Major,
    Critical,
}

/// Where a change was detected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeLocation {
    pub file: String,
    pub line: usize,
}

/// One API-breaking edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakingChange {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    pub severity: Severity,
    pub description: String,
    pub location: ChangeLocation,
    /// Type the change belongs to
    pub symbol: String,
    /// Member name for member-level changes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member: Option<String>,
    /// Filled in by impact analysis, never by the comparator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affected_files: Option<Vec<String>>,
}

/// Compare an old and a new extraction and report breaking edits.
///
/// Never fails: empty inputs yield an empty change set.
pub fn detect_breaking_changes(old: &Extraction, new: &Extraction) -> Vec<BreakingChange> {
    let mut changes = Vec::new();

    for old_class in &old.classes {
        match new.class(&old_class.name) {
            None => changes.push(BreakingChange {
                kind: ChangeKind::ClassRemoved,
                severity: Severity::Critical,
                description: format!("Class '{}' was removed", old_class.name),
                location: ChangeLocation {
                    file: old_class.file_path.clone(),
                    line: old_class.line,
                },
                symbol: old_class.name.clone(),
                member: None,
                affected_files: None,
            }),
            Some(new_class) => compare_members(old_class, new_class, &mut changes),
        }
    }

    changes
}

/// First declared member per name, in declaration order.
///
/// Both sides use the same representative, so identical member lists always
/// compare equal even when a name is overloaded.
fn members_by_name(class: &ClassInfo) -> Vec<&MethodInfo> {
    let mut seen = HashSet::new();
    class
        .methods
        .iter()
        .filter(|m| seen.insert(m.name.as_str()))
        .collect()
}

fn compare_members(
    old_class: &ClassInfo,
    new_class: &ClassInfo,
    changes: &mut Vec<BreakingChange>,
) {
    let new_members: HashMap<&str, &MethodInfo> = members_by_name(new_class)
        .into_iter()
        .map(|m| (m.name.as_str(), m))
        .collect();

    for old_method in members_by_name(old_class) {
        match new_members.get(old_method.name.as_str()) {
            None => changes.push(BreakingChange {
                kind: ChangeKind::MethodRemoved,
                severity: Severity::Major,
                description: format!(
                    "Public method '{}.{}' was removed",
                    old_class.name, old_method.name
                ),
                location: ChangeLocation {
                    file: old_class.file_path.clone(),
                    line: old_method.line,
                },
                symbol: old_class.name.clone(),
                member: Some(old_method.name.clone()),
                affected_files: None,
            }),
            Some(new_method) if new_method.signature != old_method.signature => {
                changes.push(BreakingChange {
                    kind: ChangeKind::SignatureChanged,
                    severity: Severity::Major,
                    description: format!(
                        "Signature of '{}.{}' changed from '{}' to '{}'",
                        old_class.name, old_method.name, old_method.signature, new_method.signature
                    ),
                    location: ChangeLocation {
                        file: new_class.file_path.clone(),
                        line: new_method.line,
                    },
                    symbol: old_class.name.clone(),
                    member: Some(old_method.name.clone()),
                    affected_files: None,
                });
            }
            Some(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{MethodInfo, ParameterInfo, TypeKind};

    fn param(type_name: &str, name: &str) -> ParameterInfo {
        ParameterInfo {
            name: name.to_string(),
            type_name: type_name.to_string(),
        }
    }

    fn class(name: &str, methods: Vec<MethodInfo>) -> ClassInfo {
        ClassInfo {
            name: name.to_string(),
            file_path: format!("src/{}.java", name),
            namespace: None,
            kind: TypeKind::Class,
            line: 3,
            methods,
            dependencies: Vec::new(),
            dependents: Vec::new(),
        }
    }

    fn extraction(classes: Vec<ClassInfo>) -> Extraction {
        Extraction {
            classes,
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_inputs_yield_nothing() {
        assert!(detect_breaking_changes(&Extraction::default(), &Extraction::default()).is_empty());
        let added = extraction(vec![class("Foo", vec![])]);
        assert!(detect_breaking_changes(&Extraction::default(), &added).is_empty());
    }

    #[test]
    fn test_removed_class_is_critical() {
        let old = extraction(vec![class("Foo", vec![])]);
        let changes = detect_breaking_changes(&old, &Extraction::default());
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind, ChangeKind::ClassRemoved);
        assert_eq!(changes[0].severity, Severity::Critical);
        assert_eq!(changes[0].location.file, "src/Foo.java");
        assert_eq!(changes[0].location.line, 3);
    }

    #[test]
    fn test_removed_and_changed_methods() {
        let old = extraction(vec![class(
            "UserService",
            vec![
                MethodInfo::new("findById", Some("User".into()), vec![param("Long", "id")], 5),
                MethodInfo::new("deleteUser", Some("void".into()), vec![param("Long", "id")], 9),
            ],
        )]);
        let new = extraction(vec![class(
            "UserService",
            vec![MethodInfo::new(
                "findById",
                Some("Optional<User>".into()),
                vec![param("Long", "id")],
                5,
            )],
        )]);

        let changes = detect_breaking_changes(&old, &new);
        assert_eq!(changes.len(), 2);

        let removed: Vec<_> = changes
            .iter()
            .filter(|c| c.kind == ChangeKind::MethodRemoved)
            .collect();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].member.as_deref(), Some("deleteUser"));
        assert_eq!(removed[0].severity, Severity::Major);

        let changed: Vec<_> = changes
            .iter()
            .filter(|c| c.kind == ChangeKind::SignatureChanged)
            .collect();
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].member.as_deref(), Some("findById"));
        assert!(changed[0].description.contains("Optional<User> findById(Long id)"));
    }

    #[test]
    fn test_identical_overloads_are_unchanged() {
        let old = extraction(vec![class(
            "Repo",
            vec![
                MethodInfo::new("Repo", None, vec![], 2),
                MethodInfo::new("Repo", None, vec![param("String", "url")], 3),
                MethodInfo::new("find", Some("Item".into()), vec![param("int", "id")], 4),
                MethodInfo::new("find", Some("Item".into()), vec![param("String", "key")], 5),
            ],
        )]);
        let new = old.clone();

        assert!(detect_breaking_changes(&old, &new).is_empty());
    }

    #[test]
    fn test_overloads_compare_first_declaration_only() {
        let old = extraction(vec![class(
            "Repo",
            vec![
                MethodInfo::new("find", Some("Item".into()), vec![param("int", "id")], 2),
                MethodInfo::new("find", Some("Item".into()), vec![param("String", "key")], 3),
            ],
        )]);
        // The String overload is gone, but one `find` with the same first signature remains
        let new = extraction(vec![class(
            "Repo",
            vec![MethodInfo::new("find", Some("Item".into()), vec![param("int", "id")], 2)],
        )]);
        assert!(detect_breaking_changes(&old, &new).is_empty());

        let reordered = extraction(vec![class(
            "Repo",
            vec![MethodInfo::new("find", Some("Item".into()), vec![param("String", "key")], 2)],
        )]);
        let changes = detect_breaking_changes(&old, &reordered);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind, ChangeKind::SignatureChanged);
        assert_eq!(changes[0].member.as_deref(), Some("find"));
    }

    #[test]
    fn test_removed_overloaded_name_reported_once() {
        let old = extraction(vec![class(
            "Repo",
            vec![
                MethodInfo::new("drop", Some("void".into()), vec![], 2),
                MethodInfo::new("drop", Some("void".into()), vec![param("int", "n")], 3),
            ],
        )]);
        let new = extraction(vec![class("Repo", vec![])]);

        let changes = detect_breaking_changes(&old, &new);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind, ChangeKind::MethodRemoved);
        assert_eq!(changes[0].location.line, 2);
    }

    #[test]
    fn test_serialized_shape() {
        let old = extraction(vec![class("Foo", vec![])]);
        let change = &detect_breaking_changes(&old, &Extraction::default())[0];
        let json = serde_json::to_value(change).unwrap();
        assert_eq!(json["type"], "class_removed");
        assert_eq!(json["severity"], "critical");
        assert_eq!(json["location"]["file"], "src/Foo.java");
        assert!(json.get("affectedFiles").is_none());
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::Major);
        assert!(Severity::Major > Severity::Minor);
    }
}
