//! JSON output types and serialization for CLI responses.
//!
//! ## Principles
//!
//! 1. **Status first:** every response has `status` as its first field
//! 2. **Deterministic:** same input, same output (field order, array ordering)
//! 3. **Versioned:** `schema_version` lets consumers detect format changes

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{ClassmapError, OutputErrorCode};
use crate::examiner::{FileFailure, IndexSummary};
use crate::model::{Annotation, Field, Import, Method, SourceFile, TypeKind};
use crate::namespace::NamespaceTree;
use crate::resolve::{ImportScope, ResolveStats};

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

// ============================================================================
// Error Output
// ============================================================================

/// Error information for JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Numeric error code (matches the exit code).
    pub code: u8,
    /// Human-readable message.
    pub message: String,
    /// Error-specific structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorInfo {
    /// Create from a ClassmapError.
    pub fn from_error(err: &ClassmapError) -> Self {
        let code = OutputErrorCode::from(err).code();
        let message = err.to_string();

        let details = match err {
            ClassmapError::InvalidArguments { details, .. } => details.clone(),
            ClassmapError::FileNotFound { path } => Some(serde_json::json!({ "path": path })),
            ClassmapError::Snapshot { path, .. } => {
                path.as_ref().map(|p| serde_json::json!({ "path": p }))
            }
            _ => None,
        };

        ErrorInfo {
            code,
            message,
            details,
        }
    }
}

/// Error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Error information.
    pub error: ErrorInfo,
}

impl ErrorResponse {
    /// Create an error response from a ClassmapError.
    pub fn from_error(err: &ClassmapError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

// ============================================================================
// Command Responses
// ============================================================================

/// Tree totals reported after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeCounts {
    /// Namespaces, root included.
    pub namespaces: usize,
    pub files: usize,
    /// Declared types, nested types included.
    pub types: usize,
}

/// Response for `classmap examine`.
#[derive(Debug, Clone, Serialize)]
pub struct ExamineResponse {
    /// Status: "ok".
    pub status: String,
    pub schema_version: String,
    /// Path that was examined.
    pub root: PathBuf,
    /// Snapshot file loaded from and written to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_file: Option<PathBuf>,
    /// File records merged from the save file before examining.
    pub loaded_files: usize,
    pub import_scope: ImportScope,
    pub discovered: usize,
    pub examined: usize,
    pub skipped: usize,
    pub resolution: ResolveStats,
    pub totals: TreeCounts,
    pub failures: Vec<FileFailure>,
    /// Full symbol table, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbols: Option<Vec<NamespaceListing>>,
}

impl ExamineResponse {
    pub fn new(
        root: PathBuf,
        save_file: Option<PathBuf>,
        loaded_files: usize,
        import_scope: ImportScope,
        summary: IndexSummary,
        totals: TreeCounts,
    ) -> Self {
        ExamineResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            root,
            save_file,
            loaded_files,
            import_scope,
            discovered: summary.discovered,
            examined: summary.examined,
            skipped: summary.skipped,
            resolution: summary.resolve,
            totals,
            failures: summary.failures,
            symbols: None,
        }
    }

    pub fn with_symbols(mut self, symbols: Vec<NamespaceListing>) -> Self {
        self.symbols = Some(symbols);
        self
    }
}

/// Response for `classmap load`.
#[derive(Debug, Clone, Serialize)]
pub struct LoadResponse {
    /// Status: "ok".
    pub status: String,
    pub schema_version: String,
    /// Snapshot file that was loaded.
    pub file: PathBuf,
    /// Snapshot format version found in the file.
    pub snapshot_version: u32,
    pub import_scope: ImportScope,
    pub totals: TreeCounts,
    pub resolution: ResolveStats,
    /// Dotted names of every namespace holding files, sorted.
    pub namespaces: Vec<String>,
    pub symbols: Vec<NamespaceListing>,
}

impl LoadResponse {
    pub fn new(
        file: PathBuf,
        snapshot_version: u32,
        import_scope: ImportScope,
        totals: TreeCounts,
        resolution: ResolveStats,
        symbols: Vec<NamespaceListing>,
    ) -> Self {
        LoadResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            file,
            snapshot_version,
            import_scope,
            totals,
            resolution,
            namespaces: symbols.iter().map(|ns| ns.name.clone()).collect(),
            symbols,
        }
    }
}

// ============================================================================
// Symbol Listing
// ============================================================================

/// A namespace and the files it directly holds.
#[derive(Debug, Clone, Serialize)]
pub struct NamespaceListing {
    /// Dotted name; the root is the empty string.
    pub name: String,
    pub files: Vec<FileListing>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileListing {
    pub name: String,
    pub locator: PathBuf,
    pub imports: Vec<Import>,
    pub types: Vec<TypeListing>,
}

/// One declared type. Nested types get their own entry under a dotted key.
#[derive(Debug, Clone, Serialize)]
pub struct TypeListing {
    /// Nesting path, e.g. `Outer.Inner`.
    pub key: String,
    pub kind: TypeKind,
    pub modifiers: Vec<String>,
    pub annotations: Vec<Annotation>,
    pub fields: Vec<Field>,
    pub methods: Vec<Method>,
    pub type_identifiers: Vec<String>,
    /// Raw identifier to the qualified name of the type it resolved to.
    pub resolved: BTreeMap<String, String>,
}

/// The symbol table of every namespace that holds files, sorted by name.
pub fn list_symbols(tree: &NamespaceTree) -> Vec<NamespaceListing> {
    let mut listing: Vec<NamespaceListing> = tree
        .ids()
        .filter(|&id| tree.files(id).next().is_some())
        .map(|id| NamespaceListing {
            name: tree.full_name(id),
            files: tree.files(id).map(list_file).collect(),
        })
        .collect();
    listing.sort_by(|a, b| a.name.cmp(&b.name));
    listing
}

fn list_file(file: &SourceFile) -> FileListing {
    let types = file
        .all_types()
        .into_iter()
        .map(|(key, declared)| {
            let resolved = file
                .resolved_for(&key)
                .map(|refs| {
                    refs.iter()
                        .map(|r| (r.identifier.clone(), r.target.qualified_name()))
                        .collect()
                })
                .unwrap_or_default();
            TypeListing {
                kind: declared.kind,
                modifiers: declared.modifiers.clone(),
                annotations: declared.annotations.clone(),
                fields: declared.fields.values().cloned().collect(),
                methods: declared.methods.values().cloned().collect(),
                type_identifiers: declared.type_identifiers.iter().cloned().collect(),
                resolved,
                key,
            }
        })
        .collect();
    FileListing {
        name: file.name().to_string(),
        locator: file.locator().to_path_buf(),
        imports: file.imports().to_vec(),
        types,
    }
}

// ============================================================================
// Emit
// ============================================================================

/// Emit a response as pretty-printed JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

// ============================================================================
// Tests
// ============================================================================
