//! Indexing configuration.
//!
//! Settings come from three layers, lowest precedence first:
//! 1. built-in defaults
//! 2. an optional JSON config file
//! 3. CLI flags
//!
//! Each resolved setting remembers which layer it came from so the CLI can
//! report it.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::resolve::ImportScope;

// ============================================================================
// Error Types
// ============================================================================

/// Errors from loading a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("cannot read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The config file is not valid JSON for [`IndexConfig`].
    #[error("malformed config {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

// ============================================================================
// Configuration Sources
// ============================================================================

/// Configuration value source (for precedence tracking).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigSource {
    /// Built-in default value.
    Default = 0,
    /// From the config file.
    ConfigFile = 1,
    /// From CLI flag (highest precedence).
    CliFlag = 2,
}

/// A configuration value with its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        ConfigValue { value, source }
    }

    /// Merge with another value, preferring higher precedence.
    pub fn merge(self, other: Self) -> Self {
        if other.source >= self.source {
            other
        } else {
            self
        }
    }
}

// ============================================================================
// File Format
// ============================================================================

/// On-disk config file. Every key is optional.
///
/// ```json
/// {
///   "extensions": ["java"],
///   "exclude": ["**/generated/**"],
///   "save_file": "classmap.json",
///   "reindex": false,
///   "import_scope": "target_namespace"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub extensions: Option<Vec<String>>,
    pub exclude: Vec<String>,
    pub save_file: Option<PathBuf>,
    pub reindex: Option<bool>,
    pub import_scope: Option<ImportScope>,
}

impl IndexConfig {
    /// Load a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// CLI configuration overrides.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// `--save-file`.
    pub save_file: Option<PathBuf>,
    /// `--reindex`; only a set flag overrides.
    pub reindex: bool,
    /// `--exclude`, appended to file exclusions.
    pub exclude: Vec<String>,
    /// `--legacy-import-scope`.
    pub legacy_import_scope: bool,
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolved configuration with precedence information.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub extensions: ConfigValue<Vec<String>>,
    /// Exclusion globs from every layer, in layer order.
    pub exclude: Vec<ConfigValue<String>>,
    pub save_file: Option<ConfigValue<PathBuf>>,
    pub reindex: ConfigValue<bool>,
    pub import_scope: ConfigValue<ImportScope>,
}

impl ResolvedConfig {
    /// Resolve configuration from defaults, an optional file, and CLI flags.
    pub fn resolve(
        default_extensions: &[&str],
        file: Option<&IndexConfig>,
        cli: &CliOverrides,
    ) -> Self {
        let mut config = ResolvedConfig::defaults(default_extensions);
        if let Some(file) = file {
            config.apply_file(file);
        }
        config.apply_cli_overrides(cli);
        config
    }

    fn defaults(default_extensions: &[&str]) -> Self {
        ResolvedConfig {
            extensions: ConfigValue::new(
                default_extensions.iter().map(|e| e.to_string()).collect(),
                ConfigSource::Default,
            ),
            exclude: Vec::new(),
            save_file: None,
            reindex: ConfigValue::new(false, ConfigSource::Default),
            import_scope: ConfigValue::new(ImportScope::default(), ConfigSource::Default),
        }
    }

    fn apply_file(&mut self, file: &IndexConfig) {
        if let Some(ref extensions) = file.extensions {
            self.extensions = self.extensions.clone().merge(ConfigValue::new(
                extensions.clone(),
                ConfigSource::ConfigFile,
            ));
        }
        self.exclude.extend(
            file.exclude
                .iter()
                .map(|p| ConfigValue::new(p.clone(), ConfigSource::ConfigFile)),
        );
        if let Some(ref save_file) = file.save_file {
            self.save_file = Some(ConfigValue::new(save_file.clone(), ConfigSource::ConfigFile));
        }
        if let Some(reindex) = file.reindex {
            self.reindex = self
                .reindex
                .clone()
                .merge(ConfigValue::new(reindex, ConfigSource::ConfigFile));
        }
        if let Some(scope) = file.import_scope {
            self.import_scope = self
                .import_scope
                .clone()
                .merge(ConfigValue::new(scope, ConfigSource::ConfigFile));
        }
    }

    fn apply_cli_overrides(&mut self, cli: &CliOverrides) {
        if let Some(ref save_file) = cli.save_file {
            self.save_file = Some(ConfigValue::new(save_file.clone(), ConfigSource::CliFlag));
        }
        if cli.reindex {
            self.reindex = ConfigValue::new(true, ConfigSource::CliFlag);
        }
        self.exclude.extend(
            cli.exclude
                .iter()
                .map(|p| ConfigValue::new(p.clone(), ConfigSource::CliFlag)),
        );
        if cli.legacy_import_scope {
            self.import_scope =
                ConfigValue::new(ImportScope::ResolvingNamespace, ConfigSource::CliFlag);
        }
    }

    /// Plain exclusion patterns.
    pub fn exclude_patterns(&self) -> Vec<String> {
        self.exclude.iter().map(|v| v.value.clone()).collect()
    }
}

// ============================================================================
// Tests
// ============================================================================
