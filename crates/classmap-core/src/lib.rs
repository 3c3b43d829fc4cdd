//! Core infrastructure for classmap.
//!
//! This crate provides the language-agnostic half of the indexer:
//! - Syntax tree arena and the query algebra extractors navigate it with
//! - Namespace tree holding files and their declared types
//! - Type-identifier resolution across files and packages
//! - Snapshot serialization for multi-run accumulation
//! - File discovery, configuration, and the indexing driver
//! - Error types, error codes, and JSON output types for the CLI

pub mod config;
pub mod discovery;
pub mod error;
pub mod examiner;
pub mod model;
pub mod namespace;
pub mod output;
pub mod resolve;
pub mod snapshot;
pub mod syntax;
