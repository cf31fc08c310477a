//! Configuration management for the CLI
//!
//! This module handles loading configuration from:
//! - Default values
//! - Configuration files (YAML/JSON)
//! - Command-line arguments, which override file settings

use crate::cli::{FormatterKind, Mode, ValidateArgs};
use crate::error::{Error, Result};
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use vouch_core::{PartialConfig, TraversalMode};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Validation defaults applied to every `validate` run
    pub defaults: ValidationDefaults,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Validation defaults
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ValidationDefaults {
    /// Traversal mode: first, all or each
    pub mode: String,

    /// Error formatter: vanilla or jsonapi
    pub formatter: String,

    /// Strip undeclared fields from validated output
    pub remove_additional: bool,

    /// Run non-presence rules on empty strings
    pub existy_strict: bool,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Use colored output by default
    pub color: bool,

    /// Show a progress bar when validating several files
    pub progress: bool,
}

impl Default for ValidationDefaults {
    fn default() -> Self {
        Self {
            mode: Mode::First.name().to_string(),
            formatter: FormatterKind::Vanilla.name().to_string(),
            remove_additional: false,
            existy_strict: false,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: true,
            progress: true,
        }
    }
}

/// Settings for a single `validate` run after flags are applied
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub mode: TraversalMode,
    pub overrides: PartialConfig,
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;

        let config: Self = if is_yaml(path) {
            serde_yaml::from_str(&content)
                .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))?
        } else {
            serde_json::from_str(&content)
                .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the first default location that exists
    pub fn load() -> Result<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                tracing::debug!(path = %path.display(), "Loading configuration file");
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        match file {
            Some(path) => Self::from_file(path),
            None => Self::load(),
        }
    }

    /// Configuration file paths checked in order
    pub fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(".vouch.yaml"),
            PathBuf::from(".vouch.yml"),
            PathBuf::from(".vouch.json"),
        ];

        if let Some(path) = Self::user_config_path() {
            paths.push(path);
        }

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".vouch.yaml"));
            paths.push(home_dir.join(".vouch.json"));
        }

        paths
    }

    /// Location of the per-user configuration file
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("vouch").join("config.yaml"))
    }

    /// Reject unknown mode and formatter names
    pub fn validate(&self) -> Result<()> {
        if Mode::from_name(&self.defaults.mode).is_none() {
            return Err(Error::config(format!(
                "unknown mode '{}' (expected first, all or each)",
                self.defaults.mode
            )));
        }
        if vouch_core::FormatterFactory::by_name(&self.defaults.formatter).is_none() {
            return Err(Error::config(format!(
                "unknown formatter '{}' (expected vanilla or jsonapi)",
                self.defaults.formatter
            )));
        }
        Ok(())
    }

    /// Validator defaults described by this file, for `configure`
    pub fn validator_defaults(&self) -> Result<PartialConfig> {
        self.validate()?;
        let formatter = vouch_core::FormatterFactory::by_name(&self.defaults.formatter)
            .ok_or_else(|| Error::config(format!("unknown formatter '{}'", self.defaults.formatter)))?;

        Ok(PartialConfig::new()
            .formatter(formatter)
            .remove_additional(self.defaults.remove_additional)
            .existy_strict(self.defaults.existy_strict))
    }

    /// Resolve the mode and per-call overrides for a validate invocation
    pub fn run_settings(&self, args: &ValidateArgs) -> Result<RunSettings> {
        let mode = match args.mode {
            Some(mode) => mode,
            None => Mode::from_name(&self.defaults.mode)
                .ok_or_else(|| Error::config(format!("unknown mode '{}'", self.defaults.mode)))?,
        };

        let mut overrides = PartialConfig::new();
        if let Some(kind) = args.formatter {
            overrides = overrides.formatter(kind.factory());
        }
        if args.remove_additional {
            overrides = overrides.remove_additional(true);
        }
        if args.existy_strict {
            overrides = overrides.existy_strict(true);
        }

        Ok(RunSettings {
            mode: mode.into(),
            overrides,
        })
    }
}

/// Whether a path names a YAML document
pub fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("yaml") | Some("yml")
    )
}
