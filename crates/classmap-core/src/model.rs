//! Declared-type model: the records an examiner produces for one source file.
//!
//! A [`SourceFile`] owns its top-level [`DeclaredType`]s; each type owns its
//! fields, methods and nested types. Types also carry the raw type identifiers
//! seen in their signatures, which the resolution pass later maps onto other
//! declared types via [`TypeRef`] handles.
//!
//! All maps are `BTreeMap`/`BTreeSet` so iteration and serialization order are
//! deterministic.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Duplicate declarations found while ingesting files directly.
///
/// Snapshot merges overwrite instead of raising these.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// A file with the same name already lives in the namespace.
    #[error("file '{name}' already declared in namespace '{namespace}'")]
    DuplicateFile { namespace: String, name: String },

    /// A type with the same name already lives in the file or enclosing type.
    #[error("type '{name}' already declared in '{file}'")]
    DuplicateType { file: String, name: String },
}

// ============================================================================
// Members
// ============================================================================

/// Kind of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
            TypeKind::Enum => "enum",
        };
        f.write_str(s)
    }
}

/// An annotation with its arguments as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub name: String,
    #[serde(default)]
    pub arguments: Vec<String>,
}

impl Annotation {
    pub fn new(name: impl Into<String>) -> Self {
        Annotation {
            name: name.into(),
            arguments: Vec::new(),
        }
    }

    pub fn with_arguments(mut self, arguments: Vec<String>) -> Self {
        self.arguments = arguments;
        self
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}({})", self.name, self.arguments.join(","))
    }
}

/// A field declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    /// Declared type as source text.
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl Field {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Field {
            name: name.into(),
            type_name: type_name.into(),
            modifiers: Vec::new(),
            annotations: Vec::new(),
        }
    }

    /// Modifiers joined with single spaces, e.g. `private static final`.
    pub fn modifier_string(&self) -> String {
        self.modifiers.join(" ")
    }
}

/// A method parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

impl Parameter {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Parameter {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// A method or constructor declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    /// Return type as source text; constructors use the type's own name.
    pub return_type: String,
    pub parameters: Vec<Parameter>,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl Method {
    pub fn new(name: impl Into<String>, return_type: impl Into<String>) -> Self {
        Method {
            name: name.into(),
            return_type: return_type.into(),
            parameters: Vec::new(),
            modifiers: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn is_public(&self) -> bool {
        self.has_modifier("public")
    }

    pub fn is_static(&self) -> bool {
        self.has_modifier("static")
    }

    fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m == modifier)
    }
}

// ============================================================================
// Declared Types
// ============================================================================

/// A class, interface, or enum declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredType {
    pub name: String,
    pub kind: TypeKind,
    #[serde(default)]
    pub modifiers: Vec<String>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    pub fields: BTreeMap<String, Field>,
    /// Keyed by name only; overloads share one slot.
    pub methods: BTreeMap<String, Method>,
    /// Nested type declarations.
    pub types: BTreeMap<String, DeclaredType>,
    /// Raw type identifiers as written in this type's signatures.
    pub type_identifiers: BTreeSet<String>,
}

impl DeclaredType {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        DeclaredType {
            name: name.into(),
            kind,
            modifiers: Vec::new(),
            annotations: Vec::new(),
            fields: BTreeMap::new(),
            methods: BTreeMap::new(),
            types: BTreeMap::new(),
            type_identifiers: BTreeSet::new(),
        }
    }

    /// Add a field, replacing any field with the same name.
    pub fn add_field(&mut self, field: Field) {
        if let Some(previous) = self.fields.insert(field.name.clone(), field) {
            tracing::debug!(type_name = %self.name, field = %previous.name, "field redeclared");
        }
    }

    /// Add a method. A later method with the same name replaces the earlier one.
    pub fn add_method(&mut self, method: Method) {
        if let Some(previous) = self.methods.insert(method.name.clone(), method) {
            tracing::debug!(
                type_name = %self.name,
                method = %previous.name,
                "overloaded method replaced by later declaration"
            );
        }
    }

    /// Add a nested type; duplicate names are rejected.
    pub fn add_type(&mut self, nested: DeclaredType) -> Result<(), IndexError> {
        if self.types.contains_key(&nested.name) {
            return Err(IndexError::DuplicateType {
                file: self.name.clone(),
                name: nested.name,
            });
        }
        self.types.insert(nested.name.clone(), nested);
        Ok(())
    }

    pub fn add_type_identifier(&mut self, identifier: impl Into<String>) {
        self.type_identifiers.insert(identifier.into());
    }

    /// This type and every nested type, keyed by dotted nesting path
    /// (`Outer`, `Outer.Inner`, ...), in pre-order.
    pub fn with_nested(&self) -> Vec<(String, &DeclaredType)> {
        let mut out = Vec::new();
        self.collect_nested(self.name.clone(), &mut out);
        out
    }

    fn collect_nested<'a>(&'a self, key: String, out: &mut Vec<(String, &'a DeclaredType)>) {
        out.push((key.clone(), self));
        for nested in self.types.values() {
            nested.collect_nested(format!("{}.{}", key, nested.name), out);
        }
    }
}

// ============================================================================
// Resolution Handles
// ============================================================================

/// Non-owning handle to a top-level declared type in a namespace tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeRef {
    /// Namespace path segments.
    pub namespace: Vec<String>,
    /// Name of the file that declares the type.
    pub file: String,
    /// Type name.
    pub name: String,
}

impl TypeRef {
    /// Dotted qualified name, e.g. `a.b.C`.
    pub fn qualified_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace.join("."), self.name)
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified_name())
    }
}

/// A raw identifier together with the type it resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResolvedReference {
    pub identifier: String,
    pub target: TypeRef,
}

// ============================================================================
// Source Files
// ============================================================================

/// An import binding: `import a.b.C;` binds local name `C` from source `a.b`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "(String, String)", from = "(String, String)")]
pub struct Import {
    /// Dotted namespace path the name is imported from.
    pub source: String,
    /// Name bound in the importing file.
    pub local: String,
}

impl Import {
    pub fn new(source: impl Into<String>, local: impl Into<String>) -> Self {
        Import {
            source: source.into(),
            local: local.into(),
        }
    }

    /// Source path split into segments; the empty source is the root.
    pub fn source_segments(&self) -> Vec<&str> {
        if self.source.is_empty() {
            Vec::new()
        } else {
            self.source.split('.').collect()
        }
    }
}

impl From<Import> for (String, String) {
    fn from(import: Import) -> Self {
        (import.source, import.local)
    }
}

impl From<(String, String)> for Import {
    fn from((source, local): (String, String)) -> Self {
        Import { source, local }
    }
}

/// One ingested source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// Path of the owning namespace; set when the file is inserted.
    namespace: Vec<String>,
    /// Where the file was read from.
    locator: PathBuf,
    name: String,
    imports: Vec<Import>,
    types: BTreeMap<String, DeclaredType>,
    /// Derived by the resolution pass; never persisted.
    #[serde(skip)]
    resolved: BTreeMap<String, BTreeSet<ResolvedReference>>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, locator: impl Into<PathBuf>) -> Self {
        SourceFile {
            namespace: Vec::new(),
            locator: locator.into(),
            name: name.into(),
            imports: Vec::new(),
            types: BTreeMap::new(),
            resolved: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn locator(&self) -> &Path {
        &self.locator
    }

    pub fn namespace_path(&self) -> &[String] {
        &self.namespace
    }

    pub(crate) fn set_namespace_path(&mut self, path: Vec<String>) {
        self.namespace = path;
    }

    pub fn imports(&self) -> &[Import] {
        &self.imports
    }

    pub fn add_import(&mut self, import: Import) {
        self.imports.push(import);
    }

    /// Top-level declared types keyed by name.
    pub fn types(&self) -> &BTreeMap<String, DeclaredType> {
        &self.types
    }

    pub fn get_type(&self, name: &str) -> Option<&DeclaredType> {
        self.types.get(name)
    }

    /// Add a top-level type; duplicate names are rejected.
    pub fn add_type(&mut self, declared: DeclaredType) -> Result<(), IndexError> {
        if self.types.contains_key(&declared.name) {
            return Err(IndexError::DuplicateType {
                file: self.name.clone(),
                name: declared.name,
            });
        }
        self.types.insert(declared.name.clone(), declared);
        Ok(())
    }

    /// Every declared type in the file, top-level and nested, keyed by dotted
    /// nesting path.
    pub fn all_types(&self) -> Vec<(String, &DeclaredType)> {
        self.types.values().flat_map(|t| t.with_nested()).collect()
    }

    /// Resolved references from the last resolution pass, keyed by type path.
    pub fn resolved(&self) -> &BTreeMap<String, BTreeSet<ResolvedReference>> {
        &self.resolved
    }

    /// Resolved references for one type path, if the type has been resolved.
    pub fn resolved_for(&self, type_key: &str) -> Option<&BTreeSet<ResolvedReference>> {
        self.resolved.get(type_key)
    }

    pub(crate) fn replace_resolved(
        &mut self,
        resolved: BTreeMap<String, BTreeSet<ResolvedReference>>,
    ) {
        self.resolved = resolved;
    }
}

// ============================================================================
// Tests
// ============================================================================
