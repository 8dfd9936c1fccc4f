//! The transform engine
//!
//! [`PathMapper`] owns an immutable [`MappingDomain`] and turns input values
//! into freshly built output values, one rule at a time:
//!
//! 1. resolve the rule's input path; a missing or empty field skips the rule
//! 2. recode the value through the path's translation table, if any
//! 3. write it at the output dot-path, or hand it to the output callback
//!
//! The engine never mutates its input and keeps no state between calls, so a
//! mapper can be shared freely across threads.
//!
//! Copyright (c) 2025 Pathmap Team
//! Licensed under the Apache-2.0 license

use super::lossiness::LossinessTracker;
use super::table::{MappingDomain, MappingRule, OutputTarget, Verse};
use crate::error::{Error, Result};
use crate::types::MappingOutcome;
use crate::StrictMode;
use serde_json::{Map, Value};

/// Bidirectional mapper over one mapping domain
#[derive(Debug, Clone)]
pub struct PathMapper {
    domain: MappingDomain,
    strict_mode: StrictMode,
}

impl PathMapper {
    /// Create a mapper, validating the domain
    pub fn new(domain: MappingDomain) -> Result<Self> {
        domain.validate()?;

        for verse in [Verse::Forward, Verse::Inverse] {
            for lost in domain.unmatched_outputs(verse) {
                log::debug!(
                    "Domain '{}': {} output '{}' is not read back by the {} table",
                    domain.name(),
                    verse,
                    lost,
                    verse.opposite()
                );
            }
        }

        Ok(Self {
            domain,
            strict_mode: StrictMode::default(),
        })
    }

    /// Set how untranslatable values are handled
    pub fn with_strict_mode(mut self, strict_mode: StrictMode) -> Self {
        self.strict_mode = strict_mode;
        self
    }

    pub fn domain(&self) -> &MappingDomain {
        &self.domain
    }

    pub fn strict_mode(&self) -> StrictMode {
        self.strict_mode
    }

    /// Transform a value of the first shape into the second
    pub fn transform_forward(&self, input: &Value) -> Result<Value> {
        self.transform(Verse::Forward, input)
    }

    /// Transform a value of the second shape back into the first
    pub fn transform_inverse(&self, input: &Value) -> Result<Value> {
        self.transform(Verse::Inverse, input)
    }

    /// Transform in the given direction
    pub fn transform(&self, verse: Verse, input: &Value) -> Result<Value> {
        self.transform_with_report(verse, input)
            .map(|outcome| outcome.output)
    }

    /// Transform and report every value that could not be translated
    pub fn transform_with_report(&self, verse: Verse, input: &Value) -> Result<MappingOutcome> {
        let span = tracing::debug_span!(
            "transform",
            domain = %self.domain.name(),
            verse = %verse,
            strict_mode = %self.strict_mode,
        );
        let _guard = span.enter();

        let config = self.domain.direction(verse);
        let mut output = Value::Object(Map::new());
        let mut tracker = LossinessTracker::new(self.strict_mode);

        for rule in config.table.iter() {
            let Some(resolved) = rule.input.resolve(input) else {
                tracing::trace!(input = %rule.input, "input field missing, rule skipped");
                continue;
            };

            let value = match config.translation_for(rule.input.as_str()) {
                None => Some(resolved.clone()),
                Some(table) => match table.lookup(resolved) {
                    Some(translated) => Some(translated.clone()),
                    None => self.untranslatable(verse, rule, resolved, &mut tracker)?,
                },
            };

            apply_output(rule, value, &mut output)?;
        }

        Ok(MappingOutcome {
            output,
            verse,
            lossiness: tracker.build_report(),
        })
    }

    /// Decide what an untranslatable value becomes; `None` means dropped
    fn untranslatable(
        &self,
        verse: Verse,
        rule: &MappingRule,
        resolved: &Value,
        tracker: &mut LossinessTracker,
    ) -> Result<Option<Value>> {
        let path = rule.input.as_str();

        match self.strict_mode {
            StrictMode::Strict => Err(Error::Translation {
                path: path.to_string(),
                value: resolved.clone(),
            }),
            StrictMode::Warn => {
                log::warn!(
                    "No {} translation for {} at '{}' in domain '{}'; value dropped",
                    verse,
                    resolved,
                    path,
                    self.domain.name()
                );
                tracker.add_dropped(
                    path,
                    &format!("no {} translation for {}", verse, resolved),
                    Some(resolved.clone()),
                );
                Ok(None)
            }
            StrictMode::Coerce => {
                log::debug!("Passing untranslated {} through at '{}'", resolved, path);
                tracker.add_map_fallback(
                    path,
                    &format!("no {} translation for {}, passed through", verse, resolved),
                    Some(resolved.clone()),
                );
                Ok(Some(resolved.clone()))
            }
        }
    }
}

/// Write the rule's value into the output, or run its callback
///
/// A value dropped under `StrictMode::Warn` clears a path output, but a
/// callback output is not invoked at all: callbacks only ever see resolved
/// (and, when a table exists, translated) values, never an absent one.
fn apply_output(rule: &MappingRule, value: Option<Value>, output: &mut Value) -> Result<()> {
    match (&rule.output, value) {
        (OutputTarget::Path(path), Some(value)) => path.write(output, value),
        (OutputTarget::Path(path), None) => path.clear(output),
        (OutputTarget::Callback(callback), Some(value)) => {
            tracing::trace!(input = %rule.input, callback = callback.name(), "invoking callback");
            callback.invoke(output, &value)?;
        }
        (OutputTarget::Callback(callback), None) => {
            log::debug!(
                "Callback '{}' not invoked for dropped value at '{}'",
                callback.name(),
                rule.input
            );
        }
    }
    Ok(())
}
