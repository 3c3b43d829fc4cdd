//! Snapshot persistence for the namespace tree.
//!
//! A snapshot is the serializable mirror of a [`NamespaceTree`]:
//!
//! ```json
//! {
//!   "schema_version": 1,
//!   "root": {
//!     "full_path": [],
//!     "files": {},
//!     "namespaces": {
//!       "test": { "full_path": ["test"], "files": { "TestClass.java": { ... } }, "namespaces": {} }
//!     }
//!   }
//! }
//! ```
//!
//! Every map and list in the record is required except modifiers,
//! annotations and annotation arguments; a record missing one fails to
//! deserialize.
//!
//! Loading merges a snapshot into an existing tree: namespaces are created as
//! needed and a file with the same name is overwritten wholesale. The whole
//! record is validated before the first write, so a rejected snapshot leaves
//! the target tree untouched. Resolved references are derived data and are
//! neither stored nor loaded.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::model::{DeclaredType, SourceFile};
use crate::namespace::{NamespaceId, NamespaceTree};

/// Snapshot format version written by this build.
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

// ============================================================================
// Error Types
// ============================================================================

/// Errors from reading, writing, or merging snapshots.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The snapshot file could not be read or written.
    #[error("cannot access snapshot {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The snapshot file is not valid snapshot JSON.
    #[error("malformed snapshot {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The snapshot was written by an incompatible format version.
    #[error("unsupported snapshot schema version {found} (expected {expected})")]
    SchemaVersion { found: u32, expected: u32 },

    /// The record contradicts itself (keys, names and paths disagree).
    #[error("inconsistent snapshot at '{location}': {reason}")]
    Inconsistent { location: String, reason: String },
}

/// Result type for snapshot operations.
pub type SnapshotResult<T> = Result<T, SnapshotError>;

// ============================================================================
// Records
// ============================================================================

/// Top-level snapshot record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub schema_version: u32,
    pub root: NamespaceRecord,
}

/// Serialized namespace node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceRecord {
    pub full_path: Vec<String>,
    pub files: BTreeMap<String, SourceFile>,
    pub namespaces: BTreeMap<String, NamespaceRecord>,
}

impl Snapshot {
    /// Number of file records in the snapshot.
    pub fn file_count(&self) -> usize {
        self.root.file_count()
    }
}

impl NamespaceRecord {
    fn file_count(&self) -> usize {
        self.files.len()
            + self
                .namespaces
                .values()
                .map(NamespaceRecord::file_count)
                .sum::<usize>()
    }
}

// ============================================================================
// Store
// ============================================================================

/// Capture the whole tree as a snapshot.
pub fn store(tree: &NamespaceTree) -> Snapshot {
    Snapshot {
        schema_version: SNAPSHOT_SCHEMA_VERSION,
        root: store_namespace(tree, tree.root()),
    }
}

fn store_namespace(tree: &NamespaceTree, id: NamespaceId) -> NamespaceRecord {
    NamespaceRecord {
        full_path: tree.path(id).to_vec(),
        files: tree
            .files(id)
            .map(|file| (file.name().to_string(), file.clone()))
            .collect(),
        namespaces: tree
            .children(id)
            .map(|(segment, child)| (segment.to_string(), store_namespace(tree, child)))
            .collect(),
    }
}

// ============================================================================
// Validate + Load
// ============================================================================

/// Check a snapshot for internal consistency without touching any tree.
pub fn validate(snapshot: &Snapshot) -> SnapshotResult<()> {
    if snapshot.schema_version != SNAPSHOT_SCHEMA_VERSION {
        return Err(SnapshotError::SchemaVersion {
            found: snapshot.schema_version,
            expected: SNAPSHOT_SCHEMA_VERSION,
        });
    }
    validate_namespace(&snapshot.root, &[])
}

fn validate_namespace(record: &NamespaceRecord, expected_path: &[String]) -> SnapshotResult<()> {
    let location = record.full_path.join(".");
    if record.full_path != expected_path {
        return Err(inconsistent(
            &location,
            format!("full_path does not match position '{}'", expected_path.join(".")),
        ));
    }
    for (key, file) in &record.files {
        let file_location = format!("{}/{}", location, key);
        if file.name() != key {
            return Err(inconsistent(
                &file_location,
                format!("file key differs from file name '{}'", file.name()),
            ));
        }
        if file.namespace_path() != record.full_path.as_slice() {
            return Err(inconsistent(
                &file_location,
                format!(
                    "file namespace '{}' differs from enclosing namespace",
                    file.namespace_path().join(".")
                ),
            ));
        }
        validate_types(file.types(), &file_location)?;
    }
    for (segment, child) in &record.namespaces {
        let mut child_path = expected_path.to_vec();
        child_path.push(segment.clone());
        validate_namespace(child, &child_path)?;
    }
    Ok(())
}

fn validate_types(types: &BTreeMap<String, DeclaredType>, location: &str) -> SnapshotResult<()> {
    for (key, declared) in types {
        let type_location = format!("{}#{}", location, key);
        if &declared.name != key {
            return Err(inconsistent(
                &type_location,
                format!("type key differs from type name '{}'", declared.name),
            ));
        }
        validate_types(&declared.types, &type_location)?;
    }
    Ok(())
}

fn inconsistent(location: &str, reason: String) -> SnapshotError {
    SnapshotError::Inconsistent {
        location: location.to_string(),
        reason,
    }
}

/// Validate `snapshot`, then merge it into `tree`.
///
/// Returns the number of file records merged. Same-name files already in the
/// tree are replaced; everything else in the tree is kept.
pub fn load(tree: &mut NamespaceTree, snapshot: Snapshot) -> SnapshotResult<usize> {
    validate(&snapshot)?;
    let root = tree.root();
    Ok(merge_namespace(tree, root, snapshot.root))
}

fn merge_namespace(tree: &mut NamespaceTree, root: NamespaceId, record: NamespaceRecord) -> usize {
    let id = tree.ensure_path(root, &record.full_path);
    let mut merged = 0;
    for (_, file) in record.files {
        let name = file.name().to_string();
        if tree.replace_file(id, file).is_some() {
            debug!(namespace = %tree.full_name(id), file = %name, "snapshot overwrote file");
        } else {
            debug!(namespace = %tree.full_name(id), file = %name, "snapshot added file");
        }
        merged += 1;
    }
    for (_, child) in record.namespaces {
        merged += merge_namespace(tree, root, child);
    }
    merged
}

// ============================================================================
// File helpers
// ============================================================================

/// Read a snapshot from a JSON file.
pub fn read_snapshot(path: &Path) -> SnapshotResult<Snapshot> {
    let content = fs::read_to_string(path).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| SnapshotError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a snapshot as pretty-printed JSON.
pub fn write_snapshot(path: &Path, snapshot: &Snapshot) -> SnapshotResult<()> {
    let json = serde_json::to_string_pretty(snapshot).map_err(|source| SnapshotError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ============================================================================
// Tests
// ============================================================================
