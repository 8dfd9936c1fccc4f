//! Mapping tables, value translation tables and mapping domains
//!
//! A mapping domain holds one [`DirectionConfig`] per [`Verse`]. Each
//! direction owns a [`MappingTable`] (input path to output descriptor) and
//! the [`ValueTranslationTable`]s for the input paths that need recoding.
//! Both directions are maintained by the caller as logical inverses; nothing
//! here derives one from the other.
//!
//! Copyright (c) 2025 Pathmap Team
//! Licensed under the Apache-2.0 license

use super::path::DotPath;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Transform direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verse {
    /// First shape to second shape
    Forward,
    /// Second shape back to first shape
    Inverse,
}

impl Verse {
    /// The other direction
    pub fn opposite(self) -> Self {
        match self {
            Verse::Forward => Verse::Inverse,
            Verse::Inverse => Verse::Forward,
        }
    }
}

impl fmt::Display for Verse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verse::Forward => write!(f, "forward"),
            Verse::Inverse => write!(f, "inverse"),
        }
    }
}

/// Signature of a callback rule: mutate the output with the resolved value
pub type CallbackFn = dyn Fn(&mut Value, &Value) -> Result<()> + Send + Sync;

/// A named callback output
///
/// The callback is solely responsible for mutating the output object; the
/// engine writes nothing else for its rule.
#[derive(Clone)]
pub struct Callback {
    name: String,
    func: Arc<CallbackFn>,
}

impl Callback {
    /// Wrap a function as a named callback
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&mut Value, &Value) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Name used in logs and domain files
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the callback against the output being built
    pub fn invoke(&self, output: &mut Value, value: &Value) -> Result<()> {
        (self.func)(output, value)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback").field("name", &self.name).finish()
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        // Compare only by name for function pointers
        self.name == other.name
    }
}

/// Where a rule puts its value
#[derive(Debug, Clone, PartialEq)]
pub enum OutputTarget {
    /// Write the value at a dot-path of the output
    Path(DotPath),
    /// Hand the value to a callback
    Callback(Callback),
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputTarget::Path(path) => write!(f, "{}", path),
            OutputTarget::Callback(callback) => write!(f, "callback:{}", callback.name()),
        }
    }
}

/// A single `input path -> output` correspondence
#[derive(Debug, Clone, PartialEq)]
pub struct MappingRule {
    pub input: DotPath,
    pub output: OutputTarget,
}

/// Ordered rules of one direction, unique by input path
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappingTable {
    rules: Vec<MappingRule>,
}

impl MappingTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule, replacing any earlier rule for the same input path
    pub fn insert(&mut self, rule: MappingRule) {
        if let Some(existing) = self.rules.iter_mut().find(|r| r.input == rule.input) {
            log::debug!("Replacing mapping rule for input path '{}'", rule.input);
            *existing = rule;
        } else {
            self.rules.push(rule);
        }
    }

    /// Rules in table order
    pub fn iter(&self) -> impl Iterator<Item = &MappingRule> {
        self.rules.iter()
    }

    /// Look up the rule for an input path
    pub fn get(&self, input: &str) -> Option<&MappingRule> {
        self.rules.iter().find(|r| r.input.as_str() == input)
    }

    /// Check whether a rule reads the given input path
    pub fn contains_input(&self, input: &str) -> bool {
        self.get(input).is_some()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Canonical lookup key of a value: its compact JSON text with object keys sorted
pub fn serialized_key(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_unstable();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&map[key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Number(number) => match integral_float(number) {
            Some(text) => out.push_str(&text),
            None => out.push_str(&number.to_string()),
        },
        scalar => out.push_str(&scalar.to_string()),
    }
}

/// Integer text for a float with no fractional part, so `1.0` keys as `1`
fn integral_float(number: &serde_json::Number) -> Option<String> {
    if !number.is_f64() {
        return None;
    }
    let float = number.as_f64()?;
    if !float.is_finite() || float.fract() != 0.0 {
        return None;
    }
    if float >= i64::MIN as f64 && float < i64::MAX as f64 {
        Some((float as i64).to_string())
    } else if float >= 0.0 && float < u64::MAX as f64 {
        Some((float as u64).to_string())
    } else {
        None
    }
}

/// Enumerated-value recoding for one input path
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueTranslationTable {
    entries: HashMap<String, Value>,
}

impl ValueTranslationTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `source` to `target`
    pub fn insert(&mut self, source: &Value, target: Value) {
        self.entries.insert(serialized_key(source), target);
    }

    /// Map an already-serialized source value to `target`
    ///
    /// The key must be valid JSON text (`"\"WEEKLY\""`, `"2"`,
    /// `"{\"weekday\":0}"`); it is re-serialized into canonical form.
    pub fn insert_serialized(&mut self, key: &str, target: Value) -> Result<()> {
        let source: Value = serde_json::from_str(key).map_err(|e| Error::Configuration {
            message: format!("translation key {:?} is not valid JSON text", key),
            source: Some(e.into()),
        })?;
        self.insert(&source, target);
        Ok(())
    }

    /// Translate a resolved value
    pub fn lookup(&self, source: &Value) -> Option<&Value> {
        self.entries.get(&serialized_key(source))
    }

    /// Serialized source keys, sorted
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<const N: usize> From<[(Value, Value); N]> for ValueTranslationTable {
    fn from(pairs: [(Value, Value); N]) -> Self {
        let mut table = Self::new();
        for (source, target) in pairs {
            table.insert(&source, target);
        }
        table
    }
}

/// Everything one direction needs: its rules and its translation tables
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectionConfig {
    pub table: MappingTable,
    /// Translation tables keyed by input path
    pub translations: HashMap<String, ValueTranslationTable>,
}

impl DirectionConfig {
    /// Translation table for an input path, if any
    pub fn translation_for(&self, input: &str) -> Option<&ValueTranslationTable> {
        self.translations.get(input)
    }

    /// Check that every translation table belongs to a rule of this direction
    pub fn validate(&self, verse: Verse) -> Result<()> {
        for path in self.translations.keys() {
            DotPath::parse(path)?;
            if !self.table.contains_input(path) {
                return Err(Error::configuration(format!(
                    "{} translation table for '{}' has no matching rule",
                    verse, path
                )));
            }
        }
        Ok(())
    }
}

/// A named pair of direction configs
#[derive(Debug, Clone, PartialEq)]
pub struct MappingDomain {
    name: String,
    forward: DirectionConfig,
    inverse: DirectionConfig,
}

impl MappingDomain {
    /// Assemble a domain, validating both directions
    pub fn new(
        name: impl Into<String>,
        forward: DirectionConfig,
        inverse: DirectionConfig,
    ) -> Result<Self> {
        let domain = Self {
            name: name.into(),
            forward,
            inverse,
        };
        domain.validate()?;
        Ok(domain)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Config for one direction
    pub fn direction(&self, verse: Verse) -> &DirectionConfig {
        match verse {
            Verse::Forward => &self.forward,
            Verse::Inverse => &self.inverse,
        }
    }

    /// Validate both directions
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::configuration("mapping domain name is empty"));
        }
        self.forward.validate(Verse::Forward)?;
        self.inverse.validate(Verse::Inverse)
    }

    /// Dot-path outputs of one direction with no path rule reading them back
    ///
    /// Such fields are lost on a round trip. Callback outputs are opaque and
    /// not reported.
    pub fn unmatched_outputs(&self, verse: Verse) -> Vec<&DotPath> {
        let readable: HashSet<&str> = self
            .direction(verse.opposite())
            .table
            .iter()
            .map(|rule| rule.input.as_str())
            .collect();

        self.direction(verse)
            .table
            .iter()
            .filter_map(|rule| match &rule.output {
                OutputTarget::Path(path) if !readable.contains(path.as_str()) => Some(path),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rule(input: &str, output: &str) -> MappingRule {
        MappingRule {
            input: DotPath::parse(input).unwrap(),
            output: OutputTarget::Path(DotPath::parse(output).unwrap()),
        }
    }

    #[test]
    fn test_table_replaces_duplicate_inputs() {
        let mut table = MappingTable::new();
        table.insert(rule("freq", "frequency"));
        table.insert(rule("count", "end.occurrenceCount"));
        table.insert(rule("freq", "recurrence"));

        assert_eq!(table.len(), 2);
        let output = &table.get("freq").unwrap().output;
        assert_eq!(output.to_string(), "recurrence");
        assert_eq!(table.iter().next().unwrap().input.as_str(), "freq");
    }

    #[test]
    fn test_translation_lookup_by_serialized_value() {
        let mut table = ValueTranslationTable::new();
        table.insert_serialized("\"WEEKLY\"", json!(1)).unwrap();
        table.insert_serialized("2", json!("MONTHLY")).unwrap();
        table.insert(&json!({"weekday": 0, "n": 1}), json!(2));

        assert_eq!(table.lookup(&json!("WEEKLY")), Some(&json!(1)));
        assert_eq!(table.lookup(&json!(2)), Some(&json!("MONTHLY")));
        assert_eq!(table.lookup(&json!({"n": 1, "weekday": 0})), Some(&json!(2)));
        assert_eq!(table.lookup(&json!("2")), None);
        assert_eq!(table.keys(), vec!["\"WEEKLY\"", "2", "{\"n\":1,\"weekday\":0}"]);
    }

    #[test]
    fn test_whole_floats_share_integer_keys() {
        let table = ValueTranslationTable::from([(json!(1), json!("WEEKLY")), (json!(0), json!("DAILY"))]);

        assert_eq!(table.lookup(&json!(1.0)), Some(&json!("WEEKLY")));
        assert_eq!(table.lookup(&json!(-0.0)), Some(&json!("DAILY")));
        assert_eq!(table.lookup(&json!(1.5)), None);
        assert_eq!(serialized_key(&json!(2.0)), "2");
        assert_eq!(serialized_key(&json!({"dayOfWeek": 3.0})), "{\"dayOfWeek\":3}");
        assert_eq!(serialized_key(&json!(2.5)), "2.5");
    }

    #[test]
    fn test_translation_key_must_be_json() {
        let mut table = ValueTranslationTable::new();
        let err = table.insert_serialized("WEEKLY", json!(1)).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_orphan_translation_table_is_rejected() {
        let mut forward = DirectionConfig::default();
        forward.table.insert(rule("interval", "interval"));
        forward
            .translations
            .insert("freq".to_string(), ValueTranslationTable::from([(json!("DAILY"), json!(0))]));

        let err = MappingDomain::new("broken", forward, DirectionConfig::default()).unwrap_err();
        assert!(err.to_string().contains("freq"));
        assert!(err.to_string().contains("forward"));
    }

    #[test]
    fn test_unmatched_outputs() {
        let mut forward = DirectionConfig::default();
        forward.table.insert(rule("interval", "interval"));
        forward.table.insert(rule("wkst", "weekStart"));

        let mut inverse = DirectionConfig::default();
        inverse.table.insert(rule("interval", "interval"));

        let domain = MappingDomain::new("partial", forward, inverse).unwrap();
        let lost: Vec<&str> = domain
            .unmatched_outputs(Verse::Forward)
            .into_iter()
            .map(DotPath::as_str)
            .collect();
        assert_eq!(lost, vec!["weekStart"]);
        assert!(domain.unmatched_outputs(Verse::Inverse).is_empty());
    }

    #[test]
    fn test_verse_opposite_and_display() {
        assert_eq!(Verse::Forward.opposite(), Verse::Inverse);
        assert_eq!(Verse::Inverse.opposite(), Verse::Forward);
        assert_eq!(Verse::Inverse.to_string(), "inverse");
    }
}
