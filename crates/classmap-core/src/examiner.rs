//! Examiner seam and the indexing driver.
//!
//! An [`Examiner`] turns one parsed source file into a [`SourceFile`] record
//! plus the namespace it belongs to. The driver feeds discovered files through
//! a [`GrammarParser`] and an examiner, inserts the results into the
//! [`NamespaceTree`], and runs one resolution pass at the end.
//!
//! Per-file problems ([`ExamineError`]) are recorded in the [`IndexSummary`]
//! and the run continues.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::discovery::{DiscoveryError, SourceDiscovery};
use crate::model::{IndexError, SourceFile};
use crate::namespace::{canonical_path, FileLocation, NamespaceTree};
use crate::resolve::{resolve_type_identifiers, ResolveOptions, ResolveStats};
use crate::syntax::{GrammarParser, ParseError, SyntaxTree};

// ============================================================================
// Error Types
// ============================================================================

/// Why a single file could not be indexed.
#[derive(Debug, Error)]
pub enum ExamineError {
    #[error("cannot read file: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Index(#[from] IndexError),
}

// ============================================================================
// Examiner Seam
// ============================================================================

/// Output of examining one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExaminedFile {
    /// Namespace segments declared by the file; empty for the root.
    pub namespace: Vec<String>,
    pub file: SourceFile,
}

/// Language-specific extraction from a syntax tree.
pub trait Examiner {
    /// File extensions handled, without the dot.
    fn extensions(&self) -> &[&str];

    /// Extract the declarations of one parsed file.
    ///
    /// Irregular shapes degrade to partial records; only duplicate
    /// declarations within the file are reported as errors.
    fn examine(&self, path: &Path, tree: &SyntaxTree) -> Result<ExaminedFile, IndexError>;
}

// ============================================================================
// Driver
// ============================================================================

/// Options for an indexing run.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexOptions {
    /// Re-examine files already present in the tree, replacing their records.
    pub reindex: bool,
    pub resolve: ResolveOptions,
}

/// A file the run could not index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub message: String,
}

/// What an indexing run did.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IndexSummary {
    /// Files handed to the run.
    pub discovered: usize,
    /// Files examined and stored.
    pub examined: usize,
    /// Files skipped because the tree already had them.
    pub skipped: usize,
    pub failures: Vec<FileFailure>,
    pub resolve: ResolveStats,
}

/// Discover files under `root` and index them.
pub fn examine_path<P, E>(
    tree: &mut NamespaceTree,
    root: &Path,
    discovery: &SourceDiscovery,
    parser: &mut P,
    examiner: &E,
    options: &IndexOptions,
) -> Result<IndexSummary, DiscoveryError>
where
    P: GrammarParser + ?Sized,
    E: Examiner + ?Sized,
{
    let files = discovery.discover(root)?;
    info!(root = %root.display(), files = files.len(), "discovered source files");
    Ok(examine_files(tree, &files, parser, examiner, options))
}

/// Index the given files, then resolve the whole tree once.
pub fn examine_files<P, E>(
    tree: &mut NamespaceTree,
    files: &[PathBuf],
    parser: &mut P,
    examiner: &E,
    options: &IndexOptions,
) -> IndexSummary
where
    P: GrammarParser + ?Sized,
    E: Examiner + ?Sized,
{
    let mut summary = IndexSummary {
        discovered: files.len(),
        ..Default::default()
    };

    let mut known = tree.indexed_paths();
    for path in files {
        let key = canonical_path(path);
        let previous = known.get(&key).cloned();
        if previous.is_some() && !options.reindex {
            debug!(path = %path.display(), "already indexed, skipping");
            summary.skipped += 1;
            continue;
        }
        match examine_one(tree, path, parser, examiner, previous) {
            Ok(location) => {
                known.insert(key, location);
                summary.examined += 1;
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "file not indexed");
                summary.failures.push(FileFailure {
                    path: path.clone(),
                    message: err.to_string(),
                });
            }
        }
    }

    summary.resolve = resolve_type_identifiers(tree, &options.resolve);
    info!(
        examined = summary.examined,
        skipped = summary.skipped,
        failed = summary.failures.len(),
        "indexing complete"
    );
    summary
}

/// Examine one file and store it. `previous` is where an earlier record of
/// the same path lives; it is replaced in place, or dropped once the new
/// record is stored elsewhere.
fn examine_one<P, E>(
    tree: &mut NamespaceTree,
    path: &Path,
    parser: &mut P,
    examiner: &E,
    previous: Option<FileLocation>,
) -> Result<FileLocation, ExamineError>
where
    P: GrammarParser + ?Sized,
    E: Examiner + ?Sized,
{
    debug!(path = %path.display(), "examining");
    let source = fs::read(path)?;
    let syntax = parser.parse(&source)?;
    let examined = examiner.examine(path, &syntax)?;

    let namespace = tree.ensure_path(tree.root(), &examined.namespace);
    let location = FileLocation {
        namespace,
        name: examined.file.name().to_string(),
    };
    match previous {
        Some(old) if old == location => {
            tree.replace_file(namespace, examined.file);
        }
        Some(old) => {
            tree.insert_file(namespace, examined.file)?;
            tree.remove_file(old.namespace, &old.name);
            debug!(
                path = %path.display(),
                from = %tree.full_name(old.namespace),
                to = %tree.full_name(namespace),
                "file moved namespace"
            );
        }
        None => tree.insert_file(namespace, examined.file)?,
    }
    Ok(location)
}

// ============================================================================
// Tests
// ============================================================================
