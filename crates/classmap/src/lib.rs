//! Classmap: index declared types across a codebase and resolve the type
//! names each declaration mentions.
//!
//! This crate provides the `classmap` binary and the command functions it
//! calls.
//!
//! ## Modules
//!
//! - `cli` - command implementations

pub mod cli;

// Re-export core types for convenience
pub use classmap_core::error::{ClassmapError, ClassmapResult, OutputErrorCode};
pub use classmap_core::namespace::NamespaceTree;
pub use classmap_core::output::{
    ErrorInfo, ErrorResponse, ExamineResponse, LoadResponse, SCHEMA_VERSION,
};
pub use classmap_java::{JavaExaminer, JavaGrammar, TreeSitterJavaParser};
