//! Command implementations behind the `classmap` binary.
//!
//! Each command returns a response value; `main.rs` prints it. Keeping the
//! commands free of I/O to stdout makes them callable from tests.
//!
//! ## Commands
//!
//! - [`run_examine`]: merge the save file (if present), index a path, resolve,
//!   write the save file back
//! - [`run_load`]: read a save file into an empty tree, resolve it, and list
//!   the symbol table

use std::path::PathBuf;

use classmap_core::config::{CliOverrides, IndexConfig, ResolvedConfig};
use classmap_core::discovery::SourceDiscovery;
use classmap_core::error::ClassmapResult;
use classmap_core::examiner::{examine_path, Examiner, IndexOptions};
use classmap_core::namespace::NamespaceTree;
use classmap_core::output::{list_symbols, ExamineResponse, LoadResponse, TreeCounts};
use classmap_core::resolve::{resolve_type_identifiers, ResolveOptions};
use classmap_core::snapshot;
use classmap_java::{JavaExaminer, JavaGrammar, TreeSitterJavaParser};
use tracing::{debug, info};

/// Inputs to `classmap examine`.
#[derive(Debug, Clone, Default)]
pub struct ExamineArgs {
    /// File or directory to index.
    pub path: PathBuf,
    pub config: Option<PathBuf>,
    pub overrides: CliOverrides,
    /// Include the full symbol table in the response.
    pub list_symbols: bool,
}

/// Inputs to `classmap load`.
#[derive(Debug, Clone, Default)]
pub struct LoadArgs {
    /// Snapshot file to read.
    pub file: PathBuf,
    pub config: Option<PathBuf>,
    pub legacy_import_scope: bool,
}

/// Index `args.path`, merging with and updating the save file.
pub fn run_examine(args: &ExamineArgs) -> ClassmapResult<ExamineResponse> {
    let file_config = args.config.as_deref().map(IndexConfig::load).transpose()?;
    let examiner = JavaExaminer::new();
    let config =
        ResolvedConfig::resolve(examiner.extensions(), file_config.as_ref(), &args.overrides);
    debug!(
        extensions = ?config.extensions.value,
        extensions_source = ?config.extensions.source,
        reindex = config.reindex.value,
        import_scope = ?config.import_scope.value,
        "resolved configuration"
    );

    let discovery = SourceDiscovery::new(&config.extensions.value, &config.exclude_patterns())?;
    let save_file = config.save_file.as_ref().map(|v| v.value.clone());

    let mut tree = NamespaceTree::new();
    let mut loaded_files = 0;
    if let Some(ref save) = save_file {
        if save.exists() {
            loaded_files = snapshot::load(&mut tree, snapshot::read_snapshot(save)?)?;
            info!(file = %save.display(), files = loaded_files, "merged save file");
        } else {
            debug!(file = %save.display(), "save file does not exist yet");
        }
    }

    let mut parser = TreeSitterJavaParser::new(JavaGrammar::shared())?;
    let options = IndexOptions {
        reindex: config.reindex.value,
        resolve: ResolveOptions::default().with_import_scope(config.import_scope.value),
    };
    let summary = examine_path(
        &mut tree,
        &args.path,
        &discovery,
        &mut parser,
        &examiner,
        &options,
    )?;

    if let Some(ref save) = save_file {
        snapshot::write_snapshot(save, &snapshot::store(&tree))?;
        info!(file = %save.display(), files = tree.file_count(), "wrote save file");
    }

    let response = ExamineResponse::new(
        args.path.clone(),
        save_file,
        loaded_files,
        config.import_scope.value,
        summary,
        tree_counts(&tree),
    );
    if args.list_symbols {
        Ok(response.with_symbols(list_symbols(&tree)))
    } else {
        Ok(response)
    }
}

/// Load a save file into an empty tree, resolve it with the configured
/// import scope, and list what it holds.
pub fn run_load(args: &LoadArgs) -> ClassmapResult<LoadResponse> {
    let file_config = args.config.as_deref().map(IndexConfig::load).transpose()?;
    let overrides = CliOverrides {
        legacy_import_scope: args.legacy_import_scope,
        ..Default::default()
    };
    let config =
        ResolvedConfig::resolve(JavaExaminer.extensions(), file_config.as_ref(), &overrides);

    let record = snapshot::read_snapshot(&args.file)?;
    let version = record.schema_version;
    let mut tree = NamespaceTree::new();
    let files = snapshot::load(&mut tree, record)?;
    info!(file = %args.file.display(), files, "loaded save file");

    let import_scope = config.import_scope.value;
    let options = ResolveOptions::default().with_import_scope(import_scope);
    let stats = resolve_type_identifiers(&mut tree, &options);
    Ok(LoadResponse::new(
        args.file.clone(),
        version,
        import_scope,
        tree_counts(&tree),
        stats,
        list_symbols(&tree),
    ))
}

fn tree_counts(tree: &NamespaceTree) -> TreeCounts {
    TreeCounts {
        namespaces: tree.len(),
        files: tree.file_count(),
        types: tree.type_count(),
    }
}
