//! Dot-path parsing, resolution and writing
//!
//! A dot-path such as `end.occurrenceCount` names a field nested inside
//! JSON objects. Paths are parsed once, when a mapping table is built, so
//! transforms only walk pre-split segments.
//!
//! Copyright (c) 2025 Pathmap Team
//! Licensed under the Apache-2.0 license

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// A validated, pre-split dot-path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DotPath {
    raw: String,
    segments: Vec<String>,
}

impl DotPath {
    /// Parse a dot-path, rejecting empty paths and empty segments
    pub fn parse(path: &str) -> Result<Self> {
        if path.is_empty() {
            return Err(Error::InvalidPath {
                path: path.to_string(),
                message: "path is empty".to_string(),
            });
        }

        let segments: Vec<String> = path.split('.').map(str::to_string).collect();
        if let Some(position) = segments.iter().position(|s| s.is_empty()) {
            return Err(Error::InvalidPath {
                path: path.to_string(),
                message: format!("segment {} is empty", position + 1),
            });
        }

        Ok(Self {
            raw: path.to_string(),
            segments,
        })
    }

    /// The path as written
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The ordered segments of the path
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Resolve the path against `root`
    ///
    /// Returns `None` as soon as a visited value is missing, `null`, an empty
    /// array, or not an object where another segment must be read. Arrays are
    /// never indexed by segment name.
    pub fn resolve<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        let mut current = root;

        for segment in &self.segments {
            current = current.as_object()?.get(segment)?;
            if is_absent(current) {
                return None;
            }
        }

        Some(current)
    }

    /// Write `value` at the path, creating intermediate objects as needed
    ///
    /// Any missing or non-object intermediate is replaced by an empty object,
    /// and the final segment is overwritten unconditionally.
    pub fn write(&self, root: &mut Value, value: Value) {
        let (last, parent) = self.parent_mut(root);
        parent.insert(last.to_string(), value);
    }

    /// Create intermediate objects and remove the final segment
    ///
    /// This is the "undefined" write: containers on the way exist afterwards,
    /// the leaf does not.
    pub fn clear(&self, root: &mut Value) {
        let (last, parent) = self.parent_mut(root);
        parent.remove(last);
    }

    fn parent_mut<'a>(&'a self, root: &'a mut Value) -> (&'a str, &'a mut Map<String, Value>) {
        // parse() guarantees at least one segment
        let (last, intermediate): (&str, &[String]) = match self.segments.split_last() {
            Some((last, rest)) => (last.as_str(), rest),
            None => ("", &[]),
        };

        let mut current = ensure_object(root);
        for segment in intermediate {
            let child = current
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            current = ensure_object(child);
        }

        (last, current)
    }
}

/// Replace a non-object value by an empty object and borrow its map
fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just replaced by an object"),
    }
}

/// `null` and empty arrays stop resolution
fn is_absent(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

impl fmt::Display for DotPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for DotPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DotPath {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for DotPath {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<DotPath> for String {
    fn from(path: DotPath) -> Self {
        path.raw
    }
}

/// Parse `path` and resolve it against `root` in one step
pub fn resolve<'a>(root: &'a Value, path: &str) -> Result<Option<&'a Value>> {
    Ok(DotPath::parse(path)?.resolve(root))
}

/// Parse `path` and write `value` into `root` in one step
pub fn write(root: &mut Value, path: &str, value: Value) -> Result<()> {
    DotPath::parse(path)?.write(root, value);
    Ok(())
}
