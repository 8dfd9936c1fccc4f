//! Fluent builders for mapping domains
//!
//! Path errors are collected while chaining and reported by `build()`, so a
//! static table definition reads as one expression.
//!
//! Copyright (c) 2025 Pathmap Team
//! Licensed under the Apache-2.0 license

use super::path::DotPath;
use super::table::{
    Callback, DirectionConfig, MappingDomain, MappingRule, OutputTarget, ValueTranslationTable,
};
use crate::error::{Error, Result};
use serde_json::Value;

/// Builder for one direction of a mapping domain
#[derive(Debug, Default)]
pub struct DirectionBuilder {
    config: DirectionConfig,
    error: Option<Error>,
}

impl DirectionBuilder {
    /// Create an empty direction builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy the value at `input` to the dot-path `output`
    pub fn map(mut self, input: &str, output: &str) -> Self {
        match (DotPath::parse(input), DotPath::parse(output)) {
            (Ok(input), Ok(output)) => self.config.table.insert(MappingRule {
                input,
                output: OutputTarget::Path(output),
            }),
            (Err(e), _) | (_, Err(e)) => self.record(e),
        }
        self
    }

    /// Hand the value at `input` to a callback
    pub fn callback(mut self, input: &str, callback: Callback) -> Self {
        match DotPath::parse(input) {
            Ok(input) => self.config.table.insert(MappingRule {
                input,
                output: OutputTarget::Callback(callback),
            }),
            Err(e) => self.record(e),
        }
        self
    }

    /// Shorthand for [`callback`](Self::callback) with an inline function
    pub fn map_with<F>(self, input: &str, name: &str, func: F) -> Self
    where
        F: Fn(&mut Value, &Value) -> Result<()> + Send + Sync + 'static,
    {
        self.callback(input, Callback::new(name, func))
    }

    /// Add one translation entry for the values read at `input`
    pub fn translate(mut self, input: &str, source: Value, target: Value) -> Self {
        self.config
            .translations
            .entry(input.to_string())
            .or_default()
            .insert(&source, target);
        self
    }

    /// Install a whole translation table for `input`
    pub fn translation_table(mut self, input: &str, table: ValueTranslationTable) -> Self {
        self.config.translations.insert(input.to_string(), table);
        self
    }

    /// Finish the direction
    pub fn build(self) -> Result<DirectionConfig> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.config),
        }
    }

    fn record(&mut self, error: Error) {
        // keep the first failure, it names the offending path
        if self.error.is_none() {
            self.error = Some(error);
        }
    }
}

/// Builder for a complete mapping domain
#[derive(Debug)]
pub struct MappingDomainBuilder {
    name: String,
    forward: DirectionBuilder,
    inverse: DirectionBuilder,
}

impl MappingDomainBuilder {
    /// Create a new domain builder
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            forward: DirectionBuilder::new(),
            inverse: DirectionBuilder::new(),
        }
    }

    /// Set the forward direction
    pub fn forward(mut self, direction: DirectionBuilder) -> Self {
        self.forward = direction;
        self
    }

    /// Set the inverse direction
    pub fn inverse(mut self, direction: DirectionBuilder) -> Self {
        self.inverse = direction;
        self
    }

    /// Build and validate the domain
    pub fn build(self) -> Result<MappingDomain> {
        let forward = self.forward.build()?;
        let inverse = self.inverse.build()?;
        MappingDomain::new(self.name, forward, inverse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::Verse;
    use serde_json::json;

    #[test]
    fn test_builder_assembles_both_directions() {
        let domain = MappingDomainBuilder::new("frequency")
            .forward(
                DirectionBuilder::new()
                    .map("freq", "frequency")
                    .translate("freq", json!("WEEKLY"), json!(1)),
            )
            .inverse(
                DirectionBuilder::new()
                    .map("frequency", "freq")
                    .translate("frequency", json!(1), json!("WEEKLY")),
            )
            .build()
            .unwrap();

        assert_eq!(domain.name(), "frequency");
        let forward = domain.direction(Verse::Forward);
        assert_eq!(forward.table.len(), 1);
        assert_eq!(
            forward.translation_for("freq").unwrap().lookup(&json!("WEEKLY")),
            Some(&json!(1))
        );
        assert!(domain.direction(Verse::Inverse).translation_for("freq").is_none());
    }

    #[test]
    fn test_builder_reports_first_bad_path() {
        let err = MappingDomainBuilder::new("bad")
            .forward(
                DirectionBuilder::new()
                    .map("ok", "fine")
                    .map("a..b", "out")
                    .map("c", "d."),
            )
            .build()
            .unwrap_err();

        assert!(err.is_configuration());
        assert!(err.to_string().contains("a..b"));
    }

    #[test]
    fn test_builder_rejects_translation_without_rule() {
        let err = MappingDomainBuilder::new("orphan")
            .inverse(DirectionBuilder::new().translate("frequency", json!(0), json!("DAILY")))
            .build()
            .unwrap_err();

        assert!(err.to_string().contains("frequency"));
    }

    #[test]
    fn test_empty_name_is_rejected() {
        assert!(MappingDomainBuilder::new("  ").build().is_err());
    }
}
