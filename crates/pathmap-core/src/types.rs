//! Result types shared by the mapping engine and its callers

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

pub use crate::error::{LossinessCode, Severity, StrictMode};
pub use crate::mapping::Verse;

/// Output of a reported transform
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MappingOutcome {
    /// The freshly built output value
    pub output: Value,

    /// Direction the transform ran in
    pub verse: Verse,

    /// Values that could not be translated
    pub lossiness: LossinessReport,
}

impl MappingOutcome {
    /// Check if the transform lost or passed through any value
    pub fn has_lossiness(&self) -> bool {
        !self.lossiness.items.is_empty()
    }
}

/// Lossiness report containing all deviations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LossinessReport {
    /// List of lossiness items
    pub items: Vec<LossinessItem>,

    /// Overall severity of the report
    pub max_severity: Severity,

    /// Summary statistics
    pub summary: LossinessSummary,
}

impl Default for LossinessReport {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            max_severity: Severity::Info,
            summary: LossinessSummary::default(),
        }
    }
}

/// Individual lossiness item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LossinessItem {
    pub code: LossinessCode,
    pub path: String,
    pub message: String,
    pub severity: Severity,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<Value>,
}

/// Summary of lossiness statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LossinessSummary {
    pub total_items: usize,
    pub by_severity: HashMap<String, usize>,
    pub by_code: HashMap<String, usize>,
}
