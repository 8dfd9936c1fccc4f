//! Configuration management for the CLI
//!
//! This module handles loading and merging configuration from:
//! - Default values
//! - Configuration files (YAML/JSON/TOML)
//! - Environment variables
//! - Command-line arguments

use crate::error::{Error, Result};
use pathmap_core::StrictMode;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Domain used when `--domain` is not given
    pub default_domain: Option<String>,

    /// Handling of untranslatable values when `--strict` is not given
    pub strict_mode: Option<StrictMode>,

    /// Directory searched for domain files referenced by name
    pub domains_dir: Option<PathBuf>,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Use colored output by default
    pub color: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: Option<String>,

    /// Log format (compact, full, json)
    pub format: Option<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { color: true }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let extension = path.extension().and_then(|s| s.to_str());

        let config = match extension {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
            Some("toml") => toml::from_str(&content)
                .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))?,
            _ => serde_json::from_str(&content)?,
        };

        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        for path in &Self::default_config_paths() {
            if path.exists() {
                match Self::from_file(path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        // Return default config if no config file found
        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        let mut config = match file {
            Some(path) if !path.exists() => {
                return Err(Error::FileNotFound {
                    path: path.to_path_buf(),
                })
            }
            Some(path) => Self::from_file(path)?,
            None => Self::load()?,
        };
        config.merge_with_env()?;
        Ok(config)
    }

    /// Get default configuration file paths to check
    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from("pathmap.yaml"),
            PathBuf::from("pathmap.json"),
            PathBuf::from("pathmap.toml"),
        ];

        // User config directory
        if let Some(config_dir) = dirs::config_dir() {
            let pathmap_dir = config_dir.join("pathmap");
            paths.push(pathmap_dir.join("config.yaml"));
            paths.push(pathmap_dir.join("config.json"));
            paths.push(pathmap_dir.join("config.toml"));
        }

        paths
    }

    /// Apply `PATHMAP_STRICT_MODE` and `PATHMAP_DOMAINS_DIR`
    pub fn merge_with_env(&mut self) -> Result<()> {
        self.apply_overrides(
            std::env::var("PATHMAP_STRICT_MODE").ok(),
            std::env::var("PATHMAP_DOMAINS_DIR").ok(),
        )
    }

    fn apply_overrides(&mut self, strict_mode: Option<String>, domains_dir: Option<String>) -> Result<()> {
        if let Some(mode) = strict_mode {
            let mode = mode
                .parse::<StrictMode>()
                .map_err(|e| Error::config(format!("PATHMAP_STRICT_MODE: {}", e)))?;
            self.strict_mode = Some(mode);
        }
        if let Some(dir) = domains_dir {
            self.domains_dir = Some(PathBuf::from(dir));
        }
        Ok(())
    }
}
