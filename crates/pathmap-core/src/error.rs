//! Error types for the Pathmap core library
//!
//! This module defines the error handling system for Pathmap, using thiserror
//! for ergonomic error definitions and anyhow for wrapping foreign sources.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Main error type for Pathmap operations
#[derive(Error, Debug)]
pub enum Error {
    /// A dot-path could not be parsed
    #[error("Invalid path '{path}': {message}")]
    InvalidPath { path: String, message: String },

    /// A resolved value has no entry in its value translation table
    #[error("Untranslatable value {value} at '{path}'")]
    Translation { path: String, value: Value },

    /// A callback rule reported a failure
    #[error("Callback '{callback}' failed at '{path}': {message}")]
    Callback {
        callback: String,
        path: String,
        message: String,
    },

    /// Invalid mapping domain or loader configuration
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Malformed recurrence rule text
    #[error("Invalid recurrence rule '{input}': {message}")]
    Rule { input: String, message: String },

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// YAML parsing errors
    #[error("YAML error: {message}")]
    Yaml {
        message: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// TOML parsing errors
    #[error("TOML error: {message}")]
    Toml {
        message: String,
        #[source]
        source: toml::de::Error,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a configuration error without a source
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a callback failure for the given callback and input path
    pub fn callback(
        callback: impl Into<String>,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Callback {
            callback: callback.into(),
            path: path.into(),
            message: message.into(),
        }
    }

    /// Whether the error stems from static configuration rather than input data
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidPath { .. }
                | Self::Configuration { .. }
                | Self::Json { .. }
                | Self::Yaml { .. }
                | Self::Toml { .. }
        )
    }
}

/// Strictness modes for untranslatable values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrictMode {
    /// Fail the transform on the first untranslatable value
    Strict,
    /// Drop the value, log a warning and keep going
    #[default]
    Warn,
    /// Pass the untranslated source value through
    Coerce,
}

/// Severity levels for lossiness items
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    /// Informational, no action required
    Info,
    /// Warning, should be reviewed
    Warning,
    /// Error, operation may fail
    Error,
}

/// Lossiness codes for transform deviations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LossinessCode {
    /// Untranslatable value removed from the output
    Drop,
    /// Untranslatable value passed through unchanged
    MapFallback,
}

impl fmt::Display for StrictMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrictMode::Strict => write!(f, "Strict"),
            StrictMode::Warn => write!(f, "Warn"),
            StrictMode::Coerce => write!(f, "Coerce"),
        }
    }
}

impl std::str::FromStr for StrictMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(StrictMode::Strict),
            "warn" => Ok(StrictMode::Warn),
            "coerce" => Ok(StrictMode::Coerce),
            other => Err(Error::configuration(format!(
                "unknown strict mode '{}', expected strict, warn or coerce",
                other
            ))),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl fmt::Display for LossinessCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LossinessCode::Drop => write!(f, "Drop"),
            LossinessCode::MapFallback => write!(f, "MapFallback"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_translation_error_names_path_and_value() {
        let err = Error::Translation {
            path: "freq".to_string(),
            value: json!("UNKNOWN"),
        };
        let text = err.to_string();
        assert!(text.contains("freq"));
        assert!(text.contains("\"UNKNOWN\""));
        assert!(!err.is_configuration());
    }

    #[test]
    fn test_strict_mode_parsing() {
        assert_eq!("Strict".parse::<StrictMode>().unwrap(), StrictMode::Strict);
        assert_eq!("warn".parse::<StrictMode>().unwrap(), StrictMode::Warn);
        assert_eq!("COERCE".parse::<StrictMode>().unwrap(), StrictMode::Coerce);
        assert!("lenient".parse::<StrictMode>().is_err());
        assert_eq!(StrictMode::default(), StrictMode::Warn);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
    }
}
