//! Accessor synthesis for annotation-generated members.
//!
//! Runs after extraction, over the already-built [`ClassInfo`]. Fields marked
//! (directly or through their type) with an accessor-generating annotation get
//! a getter and/or setter added to the public surface, so removing the
//! annotation shows up as removed methods.

use super::{ClassInfo, MethodInfo, ParameterInfo};

/// A field declaration as seen by the synthesis pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: String,
    /// Declared type, as written
    pub type_name: String,
    pub line: usize,
    /// Simple annotation names (qualifiers stripped)
    pub annotations: Vec<String>,
    pub is_static: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Accessors {
    getter: bool,
    setter: bool,
}

impl Accessors {
    fn from_annotations(annotations: &[String]) -> Self {
        let mut acc = Accessors::default();
        for annotation in annotations {
            match annotation.as_str() {
                "Data" => {
                    acc.getter = true;
                    acc.setter = true;
                }
                "Getter" | "Value" => acc.getter = true,
                "Setter" => acc.setter = true,
                _ => {}
            }
        }
        acc
    }

    fn union(self, other: Accessors) -> Self {
        Accessors {
            getter: self.getter || other.getter,
            setter: self.setter || other.setter,
        }
    }
}

/// Add synthesized accessors to `class` for every marked field.
///
/// Type-level markers cover non-static fields only. A synthesized member is
/// skipped when a method of the same name is already on the public surface or
/// listed in `written`, the names of every hand-written method of any visibility.
pub fn synthesize_accessors(
    class: &mut ClassInfo,
    type_annotations: &[String],
    fields: &[FieldDecl],
    written: &[String],
) {
    let type_level = Accessors::from_annotations(type_annotations);

    for field in fields {
        let inherited = if field.is_static {
            Accessors::default()
        } else {
            type_level
        };
        let acc = inherited.union(Accessors::from_annotations(&field.annotations));

        if acc.getter {
            let name = getter_name(field);
            if !is_declared(class, written, &name) {
                class.methods.push(MethodInfo::new(
                    name,
                    Some(field.type_name.clone()),
                    Vec::new(),
                    field.line,
                ));
            }
        }
        if acc.setter {
            let name = format!("set{}", capitalize(&field.name));
            if !is_declared(class, written, &name) {
                class.methods.push(MethodInfo::new(
                    name,
                    Some("void".to_string()),
                    vec![ParameterInfo {
                        name: field.name.clone(),
                        type_name: field.type_name.clone(),
                    }],
                    field.line,
                ));
            }
        }
    }
}

fn is_declared(class: &ClassInfo, written: &[String], name: &str) -> bool {
    written.iter().any(|w| w == name) || class.method(name).is_some()
}

fn getter_name(field: &FieldDecl) -> String {
    let prefix = if field.type_name == "boolean" { "is" } else { "get" };
    format!("{}{}", prefix, capitalize(&field.name))
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::TypeKind;

    fn empty_class() -> ClassInfo {
        ClassInfo {
            name: "User".to_string(),
            file_path: "User.java".to_string(),
            namespace: None,
            kind: TypeKind::Class,
            line: 1,
            methods: Vec::new(),
            dependencies: Vec::new(),
            dependents: Vec::new(),
        }
    }

    fn field(name: &str, type_name: &str, annotations: &[&str]) -> FieldDecl {
        FieldDecl {
            name: name.to_string(),
            type_name: type_name.to_string(),
            line: 4,
            annotations: annotations.iter().map(|a| a.to_string()).collect(),
            is_static: false,
        }
    }

    fn names(class: &ClassInfo) -> Vec<&str> {
        class.methods.iter().map(|m| m.name.as_str()).collect()
    }

    #[test]
    fn test_type_level_data_generates_both() {
        let mut class = empty_class();
        let fields = vec![field("email", "String", &[]), field("active", "boolean", &[])];
        synthesize_accessors(&mut class, &["Data".to_string()], &fields, &[]);

        assert_eq!(names(&class), vec!["getEmail", "setEmail", "isActive", "setActive"]);
        assert_eq!(class.methods[0].signature, "String getEmail()");
        assert_eq!(class.methods[1].signature, "void setEmail(String email)");
    }

    #[test]
    fn test_field_level_getter_only() {
        let mut class = empty_class();
        let fields = vec![field("id", "Long", &["Getter"]), field("secret", "String", &[])];
        synthesize_accessors(&mut class, &[], &fields, &[]);
        assert_eq!(names(&class), vec!["getId"]);
    }

    #[test]
    fn test_static_fields_skip_type_level_marker() {
        let mut class = empty_class();
        let mut constant = field("COUNT", "int", &[]);
        constant.is_static = true;
        synthesize_accessors(&mut class, &["Getter".to_string()], &[constant], &[]);
        assert!(class.methods.is_empty());
    }

    #[test]
    fn test_written_method_is_not_duplicated() {
        let mut class = empty_class();
        class
            .methods
            .push(MethodInfo::new("getName", Some("String".into()), Vec::new(), 9));
        let fields = vec![field("name", "String", &[])];
        synthesize_accessors(&mut class, &["Data".to_string()], &fields, &[]);
        assert_eq!(names(&class), vec!["getName", "setName"]);
        assert_eq!(class.methods[0].line, 9);
    }

    #[test]
    fn test_private_written_method_blocks_synthesis() {
        let mut class = empty_class();
        let written = vec!["getName".to_string()];
        synthesize_accessors(
            &mut class,
            &["Data".to_string()],
            &[field("name", "String", &[])],
            &written,
        );
        assert_eq!(names(&class), vec!["setName"]);
    }

    #[test]
    fn test_unrelated_annotations_ignored() {
        let mut class = empty_class();
        let fields = vec![field("id", "Long", &["Id"])];
        synthesize_accessors(&mut class, &["Entity".to_string()], &fields, &[]);
        assert!(class.methods.is_empty());
    }
}
