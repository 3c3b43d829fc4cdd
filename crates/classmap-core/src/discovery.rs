//! Source file discovery.
//!
//! Walks a root directory and returns the files an examiner can handle,
//! sorted by path so runs are deterministic. A single file given as the root
//! is returned as-is.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

/// Directory names skipped during every walk.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] =
    &[".git", "target", "build", "node_modules", ".idea", "out"];

// ============================================================================
// Error Types
// ============================================================================

/// Errors from file discovery.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The root path does not exist.
    #[error("path not found: {}", path.display())]
    RootNotFound { path: PathBuf },

    /// An exclusion pattern is not a valid glob.
    #[error("invalid exclude pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}

// ============================================================================
// Discovery
// ============================================================================

/// Finds source files by extension under a root, honoring exclusions.
#[derive(Debug, Clone)]
pub struct SourceDiscovery {
    extensions: Vec<String>,
    excludes: GlobSet,
}

impl SourceDiscovery {
    /// Build a discovery for the given extensions (without the dot) and
    /// glob exclusions, matched against root-relative paths.
    pub fn new<E, P>(extensions: &[E], exclude_patterns: &[P]) -> Result<Self, DiscoveryError>
    where
        E: AsRef<str>,
        P: AsRef<str>,
    {
        let mut builder = GlobSetBuilder::new();
        for pattern in exclude_patterns {
            let pattern = pattern.as_ref();
            let glob = Glob::new(pattern).map_err(|source| DiscoveryError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
            builder.add(glob);
        }
        let excludes = builder
            .build()
            .map_err(|source| DiscoveryError::InvalidPattern {
                pattern: exclude_patterns
                    .iter()
                    .map(|p| p.as_ref())
                    .collect::<Vec<_>>()
                    .join(","),
                source,
            })?;
        Ok(SourceDiscovery {
            extensions: extensions.iter().map(|e| e.as_ref().to_string()).collect(),
            excludes,
        })
    }

    /// True if `path` has one of the configured extensions.
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e == ext))
    }

    /// Discover source files under `root`, sorted by path.
    pub fn discover(&self, root: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
        if !root.exists() {
            return Err(DiscoveryError::RootNotFound {
                path: root.to_path_buf(),
            });
        }
        if root.is_file() {
            return Ok(vec![root.to_path_buf()]);
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_excluded_dir(entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    debug!(error = %err, "skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() || !self.accepts(entry.path()) {
                continue;
            }
            let rel_path = match entry.path().strip_prefix(root) {
                Ok(p) => p,
                Err(_) => continue,
            };
            if self.excludes.is_match(rel_path) {
                debug!(path = %rel_path.display(), "excluded by pattern");
                continue;
            }
            files.push(entry.into_path());
        }

        files.sort();
        Ok(files)
    }
}

fn is_excluded_dir(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| DEFAULT_EXCLUDED_DIRS.contains(&name))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    fn rel_names(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    fn java() -> SourceDiscovery {
        SourceDiscovery::new::<&str, &str>(&["java"], &[]).unwrap()
    }

    #[test]
    fn finds_files_recursively_and_sorted() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "b/B.java");
        touch(temp.path(), "a/A.java");
        touch(temp.path(), "a/notes.txt");

        let files = java().discover(temp.path()).unwrap();
        assert_eq!(rel_names(temp.path(), &files), vec!["a/A.java", "b/B.java"]);
    }

    #[test]
    fn default_dirs_are_skipped() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "src/A.java");
        touch(temp.path(), "target/gen/G.java");
        touch(temp.path(), ".git/X.java");
        touch(temp.path(), "build/B.java");

        let files = java().discover(temp.path()).unwrap();
        assert_eq!(rel_names(temp.path(), &files), vec!["src/A.java"]);
    }

    #[test]
    fn glob_exclusions_apply_to_relative_paths() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "src/A.java");
        touch(temp.path(), "src/test/ATest.java");

        let discovery = SourceDiscovery::new(&["java"], &["**/test/**"]).unwrap();
        let files = discovery.discover(temp.path()).unwrap();
        assert_eq!(rel_names(temp.path(), &files), vec!["src/A.java"]);
    }

    #[test]
    fn single_file_root_is_returned_as_is() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "One.java");
        let file = temp.path().join("One.java");
        assert_eq!(java().discover(&file).unwrap(), vec![file]);
    }

    #[test]
    fn missing_root_is_an_error() {
        let temp = TempDir::new().unwrap();
        let err = java().discover(&temp.path().join("nope")).unwrap_err();
        assert!(matches!(err, DiscoveryError::RootNotFound { .. }));
    }

    #[test]
    fn bad_glob_is_an_error() {
        let err = SourceDiscovery::new(&["java"], &["src/[unclosed"]).unwrap_err();
        assert!(matches!(err, DiscoveryError::InvalidPattern { .. }));
    }
}
