//! Binary entry point for the classmap CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Index a source tree, merging with and updating a save file
//! classmap examine src/ --save-file classmap.json
//!
//! # Re-read a save file and report what it holds
//! classmap load classmap.json
//! ```
//!
//! Responses and errors are JSON on stdout; logs go to stderr.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use classmap::cli::{run_examine, run_load, ExamineArgs, LoadArgs};
use classmap_core::config::CliOverrides;
use classmap_core::error::ClassmapError;
use classmap_core::output::{emit_response, ErrorResponse};

// ============================================================================
// CLI Structure
// ============================================================================

/// Index declared types and resolve cross-file type references.
#[derive(Parser, Debug)]
#[command(name = "classmap", version, about = "Index declared types and resolve type references")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Log level for tracing output.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Shorthand for `--log-level debug`.
    #[arg(short, long, global = true)]
    verbose: bool,
}

impl GlobalArgs {
    fn effective_level(&self) -> LogLevel {
        if self.verbose {
            LogLevel::Debug
        } else {
            self.log_level
        }
    }
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Index a file or directory.
    ///
    /// When a save file is given and exists, its records are merged first;
    /// the combined index is written back after resolution.
    Examine {
        /// File or directory to index.
        path: PathBuf,
        /// Snapshot file to load from and save to.
        #[arg(short, long)]
        save_file: Option<PathBuf>,
        /// Re-examine files already present in the save file.
        #[arg(long)]
        reindex: bool,
        /// Glob of paths to skip, relative to PATH. Repeatable.
        #[arg(long)]
        exclude: Vec<String>,
        /// Search imported names in the importing namespace instead of the
        /// import's own namespace.
        #[arg(long)]
        legacy_import_scope: bool,
        /// JSON config file.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Include the full symbol table in the output.
        #[arg(long)]
        symbols: bool,
    },
    /// Load a snapshot file, resolve it, and print its symbol table.
    Load {
        /// Snapshot file written by `examine`.
        file: PathBuf,
        /// Search imported names in the importing namespace instead of the
        /// import's own namespace.
        #[arg(long)]
        legacy_import_scope: bool,
        /// JSON config file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.effective_level());

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let error_code = err.error_code();
            let response = ErrorResponse::from_error(&err);

            // Errors go to stdout as JSON, like every other response.
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();

            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber. `RUST_LOG` takes precedence over flags.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Execute the CLI command.
fn execute(cli: Cli) -> Result<(), ClassmapError> {
    match cli.command {
        Command::Examine {
            path,
            save_file,
            reindex,
            exclude,
            legacy_import_scope,
            config,
            symbols,
        } => {
            let args = ExamineArgs {
                path,
                config,
                overrides: CliOverrides {
                    save_file,
                    reindex,
                    exclude,
                    legacy_import_scope,
                },
                list_symbols: symbols,
            };
            let response = run_examine(&args)?;
            emit(&response)
        }
        Command::Load {
            file,
            legacy_import_scope,
            config,
        } => {
            let args = LoadArgs {
                file,
                config,
                legacy_import_scope,
            };
            let response = run_load(&args)?;
            emit(&response)
        }
    }
}

fn emit<T: serde::Serialize>(response: &T) -> Result<(), ClassmapError> {
    emit_response(response, &mut io::stdout()).map_err(|e| ClassmapError::internal(e.to_string()))?;
    let _ = io::stdout().flush();
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
