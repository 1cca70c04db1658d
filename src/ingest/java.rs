//! Java analysis using tree-sitter-java.
//!
//! Extracts the package, imports, type declarations, their public surface, and
//! lexical dependency edges (supertypes, implemented interfaces, custom-typed
//! fields and record components). Enums and records are recorded as classes.

use crate::common::{collapse_whitespace, node_text};
use crate::error::AnalyzeError;
use crate::ingest::synthesis::{synthesize_accessors, FieldDecl};
use crate::ingest::{
    ClassInfo, DependencyRelation, Extraction, Language, LanguageAnalyzer, MethodInfo,
    ParameterInfo, RelationKind, SourceFile, TypeKind,
};
use tree_sitter::Node;

/// Annotations that expose a method as a web endpoint.
const ENDPOINT_ANNOTATIONS: &[&str] = &[
    "GetMapping",
    "PostMapping",
    "PutMapping",
    "DeleteMapping",
    "PatchMapping",
    "RequestMapping",
];

/// Annotations that mark a whole type as a web controller.
const CONTROLLER_ANNOTATIONS: &[&str] = &["RestController", "Controller"];

/// Capitalized type names that are never treated as project dependencies.
const BUILTIN_TYPES: &[&str] = &[
    "String",
    "Object",
    "Integer",
    "Long",
    "Short",
    "Byte",
    "Double",
    "Float",
    "Boolean",
    "Character",
    "Number",
    "Void",
    "BigDecimal",
    "BigInteger",
    "List",
    "ArrayList",
    "LinkedList",
    "Map",
    "HashMap",
    "LinkedHashMap",
    "TreeMap",
    "ConcurrentHashMap",
    "Set",
    "HashSet",
    "LinkedHashSet",
    "TreeSet",
    "Collection",
    "Iterable",
    "Queue",
    "Deque",
    "Optional",
    "Stream",
    "Date",
    "LocalDate",
    "LocalDateTime",
    "LocalTime",
    "Instant",
    "Duration",
    "ZonedDateTime",
    "UUID",
    "Class",
    "StringBuilder",
    "AtomicInteger",
    "AtomicLong",
    "CompletableFuture",
    "Future",
    "Function",
    "Supplier",
    "Consumer",
    "Predicate",
    "Runnable",
    "Callable",
    "Logger",
];

/// Analyzer for Java source files.
///
/// Holds one tree-sitter parser; reuse it sequentially, never across threads.
pub struct JavaAnalyzer {
    parser: tree_sitter::Parser,
}

/// One type declaration before the synthesis pass runs.
struct TypeDecl {
    class: ClassInfo,
    annotations: Vec<String>,
    fields: Vec<FieldDecl>,
    /// Names of every method written in the body, whatever its visibility
    written: Vec<String>,
    relations: Vec<DependencyRelation>,
    public: bool,
}

/// Per-file values every declaration needs.
struct FileContext<'a> {
    source: &'a [u8],
    relative_path: &'a str,
    namespace: Option<String>,
}

impl JavaAnalyzer {
    /// Create a new analyzer with the Java grammar loaded.
    pub fn new() -> Result<Self, AnalyzeError> {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_java::language())
            .map_err(|e| AnalyzeError::Grammar {
                language: Language::Java,
                message: e.to_string(),
            })?;
        Ok(Self { parser })
    }

    /// Analyze Java text directly.
    ///
    /// `relative_path` is recorded on every extracted item; the file is not read.
    pub fn analyze_source(
        &mut self,
        relative_path: &str,
        source: &str,
    ) -> Result<Extraction, AnalyzeError> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| AnalyzeError::ParseAborted(relative_path.to_string()))?;
        let root = tree.root_node();

        if root.has_error() {
            return Err(AnalyzeError::Syntax {
                path: relative_path.to_string(),
                line: first_error_line(&root).unwrap_or(1),
            });
        }

        let source = source.as_bytes();
        let mut imports = Vec::new();
        let mut namespace = None;

        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            match child.kind() {
                "package_declaration" => namespace = package_name(&child, source),
                "import_declaration" => {
                    if let Some(import) = import_path(&child, source) {
                        imports.push(import);
                    }
                }
                _ => {}
            }
        }

        let ctx = FileContext {
            source,
            relative_path,
            namespace,
        };
        let mut decls = Vec::new();
        collect_types(&root, &ctx, &mut decls);

        // Synthesis runs over the finished model, after the tree walk.
        let mut extraction = Extraction {
            imports,
            ..Default::default()
        };
        for mut decl in decls {
            synthesize_accessors(&mut decl.class, &decl.annotations, &decl.fields, &decl.written);
            if decl.public {
                extraction.exports.push(decl.class.name.clone());
            }
            extraction.dependencies.extend(decl.relations);
            extraction.classes.push(decl.class);
        }

        Ok(extraction)
    }
}

impl LanguageAnalyzer for JavaAnalyzer {
    fn language(&self) -> Language {
        Language::Java
    }

    fn analyze(&mut self, file: &SourceFile) -> Result<Extraction, AnalyzeError> {
        self.analyze_source(&file.relative_path, &file.content)
    }
}

/// Walk the tree and extract every type declaration, nested ones included.
fn collect_types(node: &Node, ctx: &FileContext, decls: &mut Vec<TypeDecl>) {
    match node.kind() {
        "class_declaration" | "enum_declaration" | "record_declaration" => {
            if let Some(decl) = extract_type(node, ctx, TypeKind::Class) {
                decls.push(decl);
            }
        }
        "interface_declaration" => {
            if let Some(decl) = extract_type(node, ctx, TypeKind::Interface) {
                decls.push(decl);
            }
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_types(&child, ctx, decls);
    }
}

fn extract_type(node: &Node, ctx: &FileContext, kind: TypeKind) -> Option<TypeDecl> {
    let name = node_text(&node.child_by_field_name("name")?, ctx.source)?.to_string();
    let modifiers = Modifiers::of(node, ctx.source);
    let is_controller = modifiers.has_annotation(CONTROLLER_ANNOTATIONS);

    let mut decl = TypeDecl {
        class: ClassInfo {
            name: name.clone(),
            file_path: ctx.relative_path.to_string(),
            namespace: ctx.namespace.clone(),
            kind,
            line: line_of(node),
            methods: Vec::new(),
            dependencies: Vec::new(),
            dependents: Vec::new(),
        },
        public: modifiers.has_keyword("public"),
        annotations: modifiers.annotations,
        fields: Vec::new(),
        written: Vec::new(),
        relations: Vec::new(),
    };
    let is_enum = node.kind() == "enum_declaration";

    match kind {
        TypeKind::Class => {
            if let Some(superclass) = node.child_by_field_name("superclass") {
                for target in type_list(&superclass) {
                    push_relation(&mut decl, ctx, &target, RelationKind::Extends, "extends");
                }
            }
            if let Some(interfaces) = node.child_by_field_name("interfaces") {
                for target in type_list(&interfaces) {
                    push_relation(&mut decl, ctx, &target, RelationKind::Implements, "implements");
                }
            }
        }
        TypeKind::Interface => {
            let mut cursor = node.walk();
            let extends = node
                .children(&mut cursor)
                .find(|c| c.kind() == "extends_interfaces");
            if let Some(extends) = extends {
                for target in type_list(&extends) {
                    push_relation(&mut decl, ctx, &target, RelationKind::Extends, "extends");
                }
            }
        }
    }

    if let Some(body) = node.child_by_field_name("body") {
        for member in body_members(&body) {
            match member.kind() {
                "method_declaration" => {
                    let mods = Modifiers::of(&member, ctx.source);
                    let public = match kind {
                        TypeKind::Interface => true,
                        TypeKind::Class => {
                            mods.has_keyword("public")
                                || is_controller
                                || mods.has_annotation(ENDPOINT_ANNOTATIONS)
                        }
                    };
                    let Some(method) = extract_method(&member, ctx.source) else {
                        continue;
                    };
                    decl.written.push(method.name.clone());
                    if public {
                        decl.class.methods.push(method);
                    }
                }
                // Enum constructors are always private
                "constructor_declaration" if !is_enum => {
                    let mods = Modifiers::of(&member, ctx.source);
                    if !mods.has_keyword("private") && !mods.has_keyword("protected") {
                        if let Some(ctor) = extract_constructor(&member, ctx.source) {
                            decl.class.methods.push(ctor);
                        }
                    }
                }
                "field_declaration" => extract_field(&member, ctx, &mut decl),
                _ => {}
            }
        }
    }

    if node.kind() == "record_declaration" {
        if let Some(components) = node.child_by_field_name("parameters") {
            extract_record_components(&components, ctx, &mut decl);
        }
    }

    Some(decl)
}

/// Member declarations of a type body. Enum members follow the constants in a
/// nested `enum_body_declarations` node.
fn body_members<'tree>(body: &Node<'tree>) -> Vec<Node<'tree>> {
    let mut members = Vec::new();
    let mut cursor = body.walk();
    for child in body.children(&mut cursor) {
        if child.kind() == "enum_body_declarations" {
            let mut inner = child.walk();
            members.extend(child.children(&mut inner));
        } else {
            members.push(child);
        }
    }
    members
}

/// Each record component gets its implicit public accessor, unless the body
/// already writes a method of that name.
fn extract_record_components(node: &Node, ctx: &FileContext, decl: &mut TypeDecl) {
    for component in extract_parameters(node, ctx.source) {
        let base = base_type_name(&component.type_name).to_string();
        if is_custom_type(&base) {
            add_dependency(&mut decl.class, &base);
            decl.relations.push(DependencyRelation {
                from: decl.class.name.clone(),
                to: base,
                kind: RelationKind::Injection,
                file: ctx.relative_path.to_string(),
                line: line_of(node),
                usage: Some(format!("component {}", component.name)),
            });
        }
        if decl.written.contains(&component.name) {
            continue;
        }
        decl.class.methods.push(MethodInfo::new(
            component.name,
            Some(component.type_name),
            Vec::new(),
            line_of(node),
        ));
    }
}

fn push_relation(
    decl: &mut TypeDecl,
    ctx: &FileContext,
    target: &Node,
    kind: RelationKind,
    verb: &str,
) {
    let Some(text) = node_text(target, ctx.source) else {
        return;
    };
    let to = base_type_name(text).to_string();
    if to.is_empty() {
        return;
    }
    add_dependency(&mut decl.class, &to);
    decl.relations.push(DependencyRelation {
        from: decl.class.name.clone(),
        to,
        kind,
        file: ctx.relative_path.to_string(),
        line: line_of(target),
        usage: Some(format!("{} {}", verb, collapse_whitespace(text))),
    });
}

fn extract_field(node: &Node, ctx: &FileContext, decl: &mut TypeDecl) {
    let Some(type_node) = node.child_by_field_name("type") else {
        return;
    };
    let Some(type_text) = node_text(&type_node, ctx.source) else {
        return;
    };
    let type_name = collapse_whitespace(type_text);
    let modifiers = Modifiers::of(node, ctx.source);
    let line = line_of(node);

    let mut names = Vec::new();
    let mut cursor = node.walk();
    for declarator in node.children_by_field_name("declarator", &mut cursor) {
        if let Some(name) = declarator
            .child_by_field_name("name")
            .and_then(|n| node_text(&n, ctx.source))
        {
            names.push(name.to_string());
        }
    }

    for name in &names {
        decl.fields.push(FieldDecl {
            name: name.clone(),
            type_name: type_name.clone(),
            line,
            annotations: modifiers.annotations.clone(),
            is_static: modifiers.has_keyword("static"),
        });
    }

    let base = base_type_name(&type_name);
    if is_custom_type(base) {
        let to = base.to_string();
        add_dependency(&mut decl.class, &to);
        decl.relations.push(DependencyRelation {
            from: decl.class.name.clone(),
            to,
            kind: RelationKind::Injection,
            file: ctx.relative_path.to_string(),
            line,
            usage: Some(format!("field {}", names.join(", "))),
        });
    }
}

fn extract_method(node: &Node, source: &[u8]) -> Option<MethodInfo> {
    let name = node_text(&node.child_by_field_name("name")?, source)?;
    let return_type = node
        .child_by_field_name("type")
        .and_then(|t| node_text(&t, source))
        .map(collapse_whitespace)?;
    let parameters = node
        .child_by_field_name("parameters")
        .map(|p| extract_parameters(&p, source))
        .unwrap_or_default();
    Some(MethodInfo::new(name, Some(return_type), parameters, line_of(node)))
}

fn extract_constructor(node: &Node, source: &[u8]) -> Option<MethodInfo> {
    let name = node_text(&node.child_by_field_name("name")?, source)?;
    let parameters = node
        .child_by_field_name("parameters")
        .map(|p| extract_parameters(&p, source))
        .unwrap_or_default();
    Some(MethodInfo::new(name, None, parameters, line_of(node)))
}

fn extract_parameters(node: &Node, source: &[u8]) -> Vec<ParameterInfo> {
    let mut params = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "formal_parameter" => {
                let type_name = child
                    .child_by_field_name("type")
                    .and_then(|t| node_text(&t, source));
                let name = child
                    .child_by_field_name("name")
                    .and_then(|n| node_text(&n, source));
                if let (Some(type_name), Some(name)) = (type_name, name) {
                    params.push(ParameterInfo {
                        name: name.to_string(),
                        type_name: collapse_whitespace(type_name),
                    });
                }
            }
            "spread_parameter" => {
                if let Some(param) = spread_parameter(&child, source) {
                    params.push(param);
                }
            }
            _ => {}
        }
    }
    params
}

/// `String... args` becomes type `String...`, name `args`.
fn spread_parameter(node: &Node, source: &[u8]) -> Option<ParameterInfo> {
    let mut type_name = None;
    let mut name = None;
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "modifiers" => {}
            "variable_declarator" => {
                name = child
                    .child_by_field_name("name")
                    .and_then(|n| node_text(&n, source));
            }
            _ if type_name.is_none() => type_name = node_text(&child, source),
            _ => {}
        }
    }
    Some(ParameterInfo {
        name: name?.to_string(),
        type_name: format!("{}...", collapse_whitespace(type_name?)),
    })
}

/// Keywords and simple annotation names from a declaration's `modifiers` child.
struct Modifiers {
    keywords: Vec<String>,
    annotations: Vec<String>,
}

impl Modifiers {
    fn of(node: &Node, source: &[u8]) -> Self {
        let mut modifiers = Modifiers {
            keywords: Vec::new(),
            annotations: Vec::new(),
        };
        let mut cursor = node.walk();
        let Some(mods) = node.children(&mut cursor).find(|c| c.kind() == "modifiers") else {
            return modifiers;
        };

        let mut mods_cursor = mods.walk();
        for child in mods.children(&mut mods_cursor) {
            match child.kind() {
                "marker_annotation" | "annotation" => {
                    if let Some(name) = child
                        .child_by_field_name("name")
                        .and_then(|n| node_text(&n, source))
                    {
                        let simple = name.rsplit('.').next().unwrap_or(name);
                        modifiers.annotations.push(simple.to_string());
                    }
                }
                _ => {
                    if let Some(text) = node_text(&child, source) {
                        modifiers.keywords.push(text.to_string());
                    }
                }
            }
        }
        modifiers
    }

    fn has_keyword(&self, keyword: &str) -> bool {
        self.keywords.iter().any(|k| k == keyword)
    }

    fn has_annotation(&self, names: &[&str]) -> bool {
        self.annotations.iter().any(|a| names.contains(&a.as_str()))
    }
}

/// Type nodes listed under `extends`/`implements` clauses.
fn type_list<'tree>(clause: &Node<'tree>) -> Vec<Node<'tree>> {
    let mut types = Vec::new();
    let mut cursor = clause.walk();
    for child in clause.named_children(&mut cursor) {
        if child.kind() == "type_list" {
            let mut list_cursor = child.walk();
            types.extend(child.named_children(&mut list_cursor));
        } else {
            types.push(child);
        }
    }
    types
}

fn package_name(node: &Node, source: &[u8]) -> Option<String> {
    let mut cursor = node.walk();
    let name = node
        .named_children(&mut cursor)
        .find(|c| matches!(c.kind(), "scoped_identifier" | "identifier"))?;
    node_text(&name, source).map(|s| s.to_string())
}

/// `import static a.b.C.d;` yields `a.b.C.d`; wildcard imports keep their `.*`.
fn import_path(node: &Node, source: &[u8]) -> Option<String> {
    let mut path = None;
    let mut wildcard = false;
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "scoped_identifier" | "identifier" => path = node_text(&child, source),
            "asterisk" => wildcard = true,
            _ => {}
        }
    }
    let path = path?;
    Some(if wildcard {
        format!("{}.*", path)
    } else {
        path.to_string()
    })
}

fn add_dependency(class: &mut ClassInfo, target: &str) {
    if !class.dependencies.iter().any(|d| d == target) {
        class.dependencies.push(target.to_string());
    }
}

/// Strip generic arguments, array brackets, and package qualifiers.
///
/// `java.util.List<Foo>` → `List`, `Foo[]` → `Foo`.
pub fn base_type_name(type_text: &str) -> &str {
    let unparameterized = type_text.split('<').next().unwrap_or(type_text);
    let element = unparameterized.split('[').next().unwrap_or(unparameterized).trim();
    element.rsplit('.').next().unwrap_or(element).trim()
}

/// Lexical "is this a project type" check: capitalized and not a known built-in.
pub fn is_custom_type(base_name: &str) -> bool {
    base_name.chars().next().is_some_and(|c| c.is_uppercase())
        && !BUILTIN_TYPES.contains(&base_name)
}

fn line_of(node: &Node) -> usize {
    node.start_position().row + 1 // tree-sitter is 0-indexed
}

fn first_error_line(node: &Node) -> Option<usize> {
    if node.is_error() || node.is_missing() {
        return Some(line_of(node));
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children.iter().find_map(first_error_line)
}
