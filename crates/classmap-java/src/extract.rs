//! Java declaration extraction.
//!
//! [`JavaExaminer`] walks a converted Java [`SyntaxTree`] with the query
//! algebra only: package, imports, top-level and nested type declarations,
//! their fields, methods, modifiers, annotations, and the raw type
//! identifiers their signatures and member bodies mention.
//!
//! Shapes the examiner does not recognize are skipped with a `debug` log, so
//! a file with syntax errors still yields whatever declarations are intact.

use std::path::Path;

use classmap_core::examiner::{ExaminedFile, Examiner};
use classmap_core::model::{
    Annotation, DeclaredType, Field, Import, IndexError, Method, Parameter, SourceFile, TypeKind,
};
use classmap_core::syntax::{Node, Nodes, SyntaxTree};
use tracing::debug;

use crate::kinds::{self, is_member_kind, is_type_kind};

/// Examiner for `.java` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaExaminer;

impl JavaExaminer {
    pub fn new() -> Self {
        JavaExaminer
    }
}

impl Examiner for JavaExaminer {
    fn extensions(&self) -> &[&str] {
        &["java"]
    }

    fn examine(&self, path: &Path, tree: &SyntaxTree) -> Result<ExaminedFile, IndexError> {
        let program = tree.root();
        if program.kind() != kinds::PROGRAM {
            debug!(path = %path.display(), kind = program.kind(), "unexpected root node");
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mut file = SourceFile::new(name, path);

        for import in program
            .children_of_field(kinds::IMPORT_DECLARATION)
            .iter()
            .filter_map(import_of)
        {
            file.add_import(import);
        }

        for child in program.children() {
            match type_kind_of(child.kind()) {
                Some(kind) => {
                    if let Some(declared) = examine_type(child, kind)? {
                        file.add_type(declared)?;
                    }
                }
                None => {
                    if child.kind() != kinds::PACKAGE_DECLARATION
                        && child.kind() != kinds::IMPORT_DECLARATION
                    {
                        debug!(kind = child.kind(), "skipping top-level node");
                    }
                }
            }
        }

        Ok(ExaminedFile {
            namespace: package_of(program),
            file,
        })
    }
}

// ============================================================================
// Package and Imports
// ============================================================================

/// Package segments; empty when the file declares no package.
fn package_of(program: Node<'_>) -> Vec<String> {
    program
        .children_of_field(kinds::PACKAGE_DECLARATION)
        .first()
        .and_then(qualified_name_of)
        .map(|name| name.split('.').map(String::from).collect())
        .unwrap_or_default()
}

/// `import a.b.C;` becomes `("a.b", "C")`, `import a.b.*;` becomes
/// `("a.b", "*")`.
fn import_of(declaration: Node<'_>) -> Option<Import> {
    let Some(path) = qualified_name_of(declaration) else {
        debug!(text = %declaration.text(), "import without a name");
        return None;
    };
    if !declaration.children_of_field(kinds::ASTERISK).is_empty() {
        return Some(Import::new(path, "*"));
    }
    Some(match path.rsplit_once('.') {
        Some((source, local)) => Import::new(source, local),
        None => Import::new("", path),
    })
}

/// Dotted name held by an `identifier` or `scoped_identifier` child.
fn qualified_name_of(node: Node<'_>) -> Option<String> {
    node.children()
        .iter()
        .find(|c| c.kind() == kinds::IDENTIFIER || c.kind() == kinds::SCOPED_IDENTIFIER)
        .map(|c| strip_whitespace(&c.text()))
}

// ============================================================================
// Type Declarations
// ============================================================================

fn type_kind_of(tag: &str) -> Option<TypeKind> {
    match tag {
        kinds::CLASS_DECLARATION => Some(TypeKind::Class),
        kinds::INTERFACE_DECLARATION => Some(TypeKind::Interface),
        kinds::ENUM_DECLARATION => Some(TypeKind::Enum),
        _ => None,
    }
}

fn examine_type(declaration: Node<'_>, kind: TypeKind) -> Result<Option<DeclaredType>, IndexError> {
    let Some(name) = declaration.children_of_field(kinds::IDENTIFIER).first() else {
        debug!(kind = declaration.kind(), "type declaration without a name");
        return Ok(None);
    };
    let mut declared = DeclaredType::new(name.text(), kind);
    let (modifiers, annotations) = modifiers_of(declaration);
    declared.modifiers = modifiers;
    declared.annotations = annotations;

    let supertypes = declaration
        .children_of_field(kinds::SUPERCLASS)
        .concat(declaration.children_of_field(kinds::SUPER_INTERFACES))
        .concat(declaration.children_of_field(kinds::EXTENDS_INTERFACES));
    collect_type_identifiers(&mut declared, &supertypes);

    for member in members_of(declaration) {
        match member.kind() {
            kinds::FIELD_DECLARATION | kinds::CONSTANT_DECLARATION => {
                for field in fields_of(member) {
                    declared.add_field(field);
                }
            }
            kinds::METHOD_DECLARATION => {
                if let Some(method) = method_of(member) {
                    declared.add_method(method);
                }
            }
            kinds::CONSTRUCTOR_DECLARATION => {
                if let Some(constructor) = constructor_of(member, &declared.name) {
                    declared.add_method(constructor);
                }
            }
            tag => {
                if let Some(nested_kind) = type_kind_of(tag) {
                    if let Some(nested) = examine_type(member, nested_kind)? {
                        declared.add_type(nested)?;
                    }
                    continue;
                }
                debug!(type_name = %declared.name, kind = tag, "skipping member");
            }
        }
        if is_member_kind(member.kind()) {
            collect_type_identifiers(&mut declared, &Nodes::from(member));
        }
    }

    Ok(Some(declared))
}

/// Member declarations of a class, interface, or enum body, in order.
fn members_of(declaration: Node<'_>) -> Nodes<'_> {
    let class_body = declaration.children_of_field(kinds::CLASS_BODY);
    let interface_body = declaration.children_of_field(kinds::INTERFACE_BODY);
    let enum_members = declaration
        .children_of_field(kinds::ENUM_BODY)
        .children_of_field(kinds::ENUM_BODY_DECLARATIONS);
    class_body
        .concat(interface_body)
        .concat(enum_members)
        .children()
}

/// Record every type identifier under `nodes`. Scoped names such as
/// `Map.Entry` are kept whole.
fn collect_type_identifiers(declared: &mut DeclaredType, nodes: &Nodes<'_>) {
    for found in nodes.search(kinds::TYPE_IDENTIFIER) {
        declared.add_type_identifier(strip_whitespace(&found.text()));
    }
}

// ============================================================================
// Members
// ============================================================================

/// One [`Field`] per declarator: `int a, b;` yields `a` and `b`.
fn fields_of(declaration: Node<'_>) -> Vec<Field> {
    let Some(type_name) = type_of(declaration) else {
        debug!(text = %declaration.text(), "field without a type");
        return Vec::new();
    };
    let (modifiers, annotations) = modifiers_of(declaration);
    declaration
        .children_of_field(kinds::VARIABLE_DECLARATOR)
        .iter()
        .filter_map(|declarator| declarator.children_of_field(kinds::IDENTIFIER).first())
        .map(|name| {
            let mut field = Field::new(name.text(), type_name.clone());
            field.modifiers = modifiers.clone();
            field.annotations = annotations.clone();
            field
        })
        .collect()
}

fn method_of(declaration: Node<'_>) -> Option<Method> {
    let name = declaration.children_of_field(kinds::IDENTIFIER).first()?;
    let Some(return_type) = type_of(declaration) else {
        debug!(method = %name.text(), "method without a return type");
        return None;
    };
    let mut method = Method::new(name.text(), return_type);
    fill_signature(&mut method, declaration);
    Some(method)
}

/// Constructors are stored as methods named and typed after their class.
fn constructor_of(declaration: Node<'_>, type_name: &str) -> Option<Method> {
    let name = declaration.children_of_field(kinds::IDENTIFIER).first()?;
    if name.text() != type_name {
        debug!(constructor = %name.text(), type_name, "constructor name differs from type");
    }
    let mut constructor = Method::new(name.text(), type_name);
    fill_signature(&mut constructor, declaration);
    Some(constructor)
}

fn fill_signature(method: &mut Method, declaration: Node<'_>) {
    let (modifiers, annotations) = modifiers_of(declaration);
    method.modifiers = modifiers;
    method.annotations = annotations;
    method.parameters = declaration
        .children_of_field(kinds::FORMAL_PARAMETERS)
        .children()
        .iter()
        .filter_map(parameter_of)
        .collect();
}

fn parameter_of(node: Node<'_>) -> Option<Parameter> {
    match node.kind() {
        kinds::FORMAL_PARAMETER => {
            let name = node.children_of_field(kinds::IDENTIFIER).first()?;
            Some(Parameter::new(name.text(), type_of(node)?))
        }
        kinds::SPREAD_PARAMETER => {
            let name = node
                .children_of_field(kinds::VARIABLE_DECLARATOR)
                .children_of_field(kinds::IDENTIFIER)
                .first()?;
            Some(Parameter::new(name.text(), format!("{}...", type_of(node)?)))
        }
        _ => None,
    }
}

/// Text of the first child in type position.
fn type_of(declaration: Node<'_>) -> Option<String> {
    declaration
        .children()
        .iter()
        .find(|c| is_type_kind(c.kind()))
        .map(|c| strip_whitespace(&c.text()))
}

// ============================================================================
// Modifiers and Annotations
// ============================================================================

/// Keyword modifiers and annotations of a declaration, in source order.
fn modifiers_of(declaration: Node<'_>) -> (Vec<String>, Vec<Annotation>) {
    let mut modifiers = Vec::new();
    let mut annotations = Vec::new();
    for child in declaration.children_of_field(kinds::MODIFIERS).children() {
        match child.kind() {
            kinds::MARKER_ANNOTATION | kinds::ANNOTATION => {
                if let Some(annotation) = annotation_of(child) {
                    annotations.push(annotation);
                }
            }
            _ if child.is_leaf() => modifiers.push(child.text().into_owned()),
            other => debug!(kind = other, "skipping modifier"),
        }
    }
    (modifiers, annotations)
}

fn annotation_of(node: Node<'_>) -> Option<Annotation> {
    let name = qualified_name_of(node)?;
    let arguments = node
        .children_of_field(kinds::ANNOTATION_ARGUMENT_LIST)
        .children()
        .map(|arg| arg.text().into_owned());
    Some(Annotation::new(name).with_arguments(arguments))
}

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

// ============================================================================
// Tests
// ============================================================================
