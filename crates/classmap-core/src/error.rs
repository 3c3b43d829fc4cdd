//! Error types and error code constants for classmap.
//!
//! This module provides a unified error type (`ClassmapError`) that bridges
//! domain-specific errors from the indexing subsystems (namespace tree,
//! snapshot, discovery, config, parsing) into a common format suitable for
//! JSON output.
//!
//! ## Error Code Mapping
//!
//! Exit codes:
//! - `2`: Invalid arguments (bad input from caller, bad config or glob)
//! - `3`: Resolution errors (file not found, duplicate declaration)
//! - `4`: Snapshot errors (unreadable, malformed or inconsistent save file)
//! - `10`: Internal errors (bugs, unexpected state)
//!
//! ## Design
//!
//! - **Unified type**: `ClassmapError` is the single error type for CLI output
//! - **Bridging**: `impl From<X> for ClassmapError` bridges domain errors
//! - **Code mapping**: `OutputErrorCode` provides stable integer codes for JSON

use std::fmt;

use thiserror::Error;

use crate::config::ConfigError;
use crate::discovery::DiscoveryError;
use crate::model::IndexError;
use crate::snapshot::SnapshotError;
use crate::syntax::ParseError;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for JSON output.
///
/// These codes map to CLI exit codes and appear in JSON error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Invalid arguments from caller (bad input, malformed request).
    InvalidArguments = 2,
    /// Resolution errors (file not found, duplicate declaration).
    ResolutionError = 3,
    /// Snapshot errors (read, parse, version, consistency).
    SnapshotError = 4,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for CLI output.
///
/// All subsystem errors are converted to this type before being rendered as
/// JSON output. Each variant carries enough context for a helpful message and
/// an optional `details` object.
#[derive(Debug, Error)]
pub enum ClassmapError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments {
        message: String,
        details: Option<serde_json::Value>,
    },

    /// File or directory not found.
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    /// A file or type was declared twice during direct ingestion.
    #[error("duplicate declaration: {message}")]
    DuplicateDeclaration { message: String },

    /// Snapshot could not be read, written, or merged.
    #[error("snapshot error: {message}")]
    Snapshot {
        message: String,
        path: Option<String>,
    },

    /// The grammar parser failed.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&ClassmapError> for OutputErrorCode {
    fn from(err: &ClassmapError) -> Self {
        match err {
            ClassmapError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            ClassmapError::FileNotFound { .. } => OutputErrorCode::ResolutionError,
            ClassmapError::DuplicateDeclaration { .. } => OutputErrorCode::ResolutionError,
            ClassmapError::Snapshot { .. } => OutputErrorCode::SnapshotError,
            ClassmapError::Parse { .. } => OutputErrorCode::InternalError,
            ClassmapError::InternalError { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<ClassmapError> for OutputErrorCode {
    fn from(err: ClassmapError) -> Self {
        OutputErrorCode::from(&err)
    }
}

// ============================================================================
// Bridges: subsystem errors -> ClassmapError
// ============================================================================

impl From<IndexError> for ClassmapError {
    fn from(err: IndexError) -> Self {
        ClassmapError::DuplicateDeclaration {
            message: err.to_string(),
        }
    }
}

impl From<SnapshotError> for ClassmapError {
    fn from(err: SnapshotError) -> Self {
        let message = err.to_string();
        match err {
            SnapshotError::Io { path, source } if source.kind() == std::io::ErrorKind::NotFound => {
                ClassmapError::FileNotFound {
                    path: path.display().to_string(),
                }
            }
            SnapshotError::Io { path, .. } | SnapshotError::Json { path, .. } => {
                ClassmapError::Snapshot {
                    message,
                    path: Some(path.display().to_string()),
                }
            }
            _ => ClassmapError::Snapshot {
                message,
                path: None,
            },
        }
    }
}

impl From<DiscoveryError> for ClassmapError {
    fn from(err: DiscoveryError) -> Self {
        let message = err.to_string();
        match err {
            DiscoveryError::RootNotFound { path } => ClassmapError::FileNotFound {
                path: path.display().to_string(),
            },
            DiscoveryError::InvalidPattern { pattern, .. } => {
                ClassmapError::invalid_args(message, serde_json::json!({ "pattern": pattern }))
            }
        }
    }
}

impl From<ConfigError> for ClassmapError {
    fn from(err: ConfigError) -> Self {
        let message = err.to_string();
        match err {
            ConfigError::Io { path, source } if source.kind() == std::io::ErrorKind::NotFound => {
                ClassmapError::FileNotFound {
                    path: path.display().to_string(),
                }
            }
            ConfigError::Io { path, .. } | ConfigError::Json { path, .. } => {
                ClassmapError::invalid_args(
                    message,
                    serde_json::json!({ "config": path.display().to_string() }),
                )
            }
        }
    }
}

impl From<ParseError> for ClassmapError {
    fn from(err: ParseError) -> Self {
        ClassmapError::Parse {
            message: err.to_string(),
        }
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl ClassmapError {
    /// Create an invalid arguments error naming the offending input.
    pub fn invalid_args(message: impl Into<String>, details: serde_json::Value) -> Self {
        ClassmapError::InvalidArguments {
            message: message.into(),
            details: Some(details),
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ClassmapError::InternalError {
            message: message.into(),
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

/// Result alias used at the CLI boundary.
pub type ClassmapResult<T> = Result<T, ClassmapError>;

// ============================================================================
// Tests
// ============================================================================
