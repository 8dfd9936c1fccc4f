//! Mapping domain loading from JSON, YAML and TOML files
//!
//! A domain file names its rules per direction, keyed by input path, in the
//! order they are applied:
//!
//! ```toml
//! name = "recurrence-lite"
//!
//! [forward.rules]
//! "count" = "end.occurrenceCount"
//! "until" = { callback = "rrule_until_to_platform_end" }
//! "freq" = "frequency"
//!
//! [forward.translations.freq]
//! '"WEEKLY"' = 1
//! ```
//!
//! Translation keys are serialized JSON values. Callbacks are looked up by
//! name in a [`CallbackRegistry`].
//!
//! Copyright (c) 2025 Pathmap Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use crate::mapping::{
    Callback, DirectionBuilder, MappingDomain, MappingDomainBuilder, ValueTranslationTable,
};
use crate::recurrence;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Extensions tried when a domain is referenced by name
pub const DOMAIN_FILE_EXTENSIONS: [&str; 4] = ["yaml", "yml", "json", "toml"];

/// Named callbacks available to domain files
#[derive(Debug, Clone)]
pub struct CallbackRegistry {
    callbacks: HashMap<String, Callback>,
}

impl CallbackRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            callbacks: HashMap::new(),
        }
    }

    /// Create a registry holding the recurrence callbacks
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for callback in recurrence::callbacks() {
            registry.register(callback);
        }
        registry
    }

    /// Register a callback under its own name, replacing any previous one
    pub fn register(&mut self, callback: Callback) {
        self.callbacks.insert(callback.name().to_string(), callback);
    }

    pub fn get(&self, name: &str) -> Option<&Callback> {
        self.callbacks.get(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.callbacks.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

/// Serialization format of a domain file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainFormat {
    Json,
    Yaml,
    Toml,
}

impl DomainFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            Some("toml") => Ok(Self::Toml),
            _ => Err(Error::configuration(format!(
                "cannot tell the format of {:?}, expected .json, .yaml, .yml or .toml",
                path
            ))),
        }
    }
}

/// On-disk shape of a mapping domain
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DomainFile {
    pub name: String,
    #[serde(default)]
    pub forward: DirectionFile,
    #[serde(default)]
    pub inverse: DirectionFile,
}

/// On-disk shape of one direction
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DirectionFile {
    /// Rules in document order
    #[serde(default, deserialize_with = "ordered_rules")]
    pub rules: Vec<(String, RuleTarget)>,
    /// Serialized source value to target value, per input path
    #[serde(default)]
    pub translations: HashMap<String, HashMap<String, Value>>,
}

/// Output descriptor of a rule in a domain file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RuleTarget {
    Path(String),
    Callback { callback: String },
}

fn ordered_rules<'de, D>(deserializer: D) -> std::result::Result<Vec<(String, RuleTarget)>, D::Error>
where
    D: Deserializer<'de>,
{
    struct RulesVisitor;

    impl<'de> Visitor<'de> for RulesVisitor {
        type Value = Vec<(String, RuleTarget)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of input paths to output paths or callbacks")
        }

        fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut rules = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((input, target)) = map.next_entry::<String, RuleTarget>()? {
                rules.push((input, target));
            }
            Ok(rules)
        }
    }

    deserializer.deserialize_map(RulesVisitor)
}

impl DirectionFile {
    fn into_builder(self, registry: &CallbackRegistry) -> Result<DirectionBuilder> {
        let mut builder = DirectionBuilder::new();

        for (input, target) in self.rules {
            builder = match target {
                RuleTarget::Path(output) => builder.map(&input, &output),
                RuleTarget::Callback { callback } => {
                    let resolved = registry.get(&callback).ok_or_else(|| {
                        Error::configuration(format!(
                            "rule '{}' names unknown callback '{}'",
                            input, callback
                        ))
                    })?;
                    builder.callback(&input, resolved.clone())
                }
            };
        }

        for (input, entries) in self.translations {
            let mut table = ValueTranslationTable::new();
            for (key, target) in entries {
                table.insert_serialized(&key, target)?;
            }
            builder = builder.translation_table(&input, table);
        }

        Ok(builder)
    }
}

impl DomainFile {
    /// Parse a domain file body
    pub fn parse(content: &str, format: DomainFormat) -> Result<Self> {
        match format {
            DomainFormat::Json => serde_json::from_str(content).map_err(|e| Error::Json {
                message: format!("Failed to parse domain file: {}", e),
                source: e,
            }),
            DomainFormat::Yaml => serde_yaml::from_str(content).map_err(|e| Error::Yaml {
                message: format!("Failed to parse domain file: {}", e),
                source: e,
            }),
            DomainFormat::Toml => toml::from_str(content).map_err(|e| Error::Toml {
                message: format!("Failed to parse domain file: {}", e),
                source: e,
            }),
        }
    }

    /// Resolve callbacks and build the domain
    pub fn into_domain(self, registry: &CallbackRegistry) -> Result<MappingDomain> {
        MappingDomainBuilder::new(self.name)
            .forward(self.forward.into_builder(registry)?)
            .inverse(self.inverse.into_builder(registry)?)
            .build()
    }
}

/// Load a domain from a string in the given format
pub fn load_domain_from_str(
    content: &str,
    format: DomainFormat,
    registry: &CallbackRegistry,
) -> Result<MappingDomain> {
    DomainFile::parse(content, format)?.into_domain(registry)
}

/// Load a domain from a file, picking the format by extension
pub fn load_domain_from_path(path: &Path, registry: &CallbackRegistry) -> Result<MappingDomain> {
    let format = DomainFormat::from_path(path)?;
    let content = std::fs::read_to_string(path).map_err(|e| Error::Io {
        message: format!("Failed to read domain file from {:?}", path),
        source: e,
    })?;

    log::debug!("loading {:?} domain file {:?}", format, path);
    load_domain_from_str(&content, format, registry).map_err(|e| match e {
        Error::Configuration { message, source } => Error::Configuration {
            message: format!("{}: {}", path.display(), message),
            source,
        },
        other => other,
    })
}

/// Find `<name>.<ext>` inside `dir` for the known domain file extensions
pub fn find_domain_file(dir: &Path, name: &str) -> Option<PathBuf> {
    DOMAIN_FILE_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{}.{}", name, ext)))
        .find(|candidate| candidate.is_file())
}
