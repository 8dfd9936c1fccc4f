//! Lossiness tracking for a single transform
//!
//! Records every value that could not be translated, with a severity that
//! depends on the active strictness mode, and folds them into a
//! [`LossinessReport`].
//!
//! Copyright (c) 2025 Pathmap Team
//! Licensed under the Apache-2.0 license

use crate::{LossinessCode, LossinessItem, LossinessReport, LossinessSummary, Severity, StrictMode};
use serde_json::Value;
use std::collections::HashMap;

/// Tracker for recording lossiness during one transform
#[derive(Debug)]
pub struct LossinessTracker {
    items: Vec<LossinessItem>,
    strict_mode: StrictMode,
}

impl LossinessTracker {
    /// Create a new lossiness tracker
    pub fn new(strict_mode: StrictMode) -> Self {
        Self {
            items: Vec::new(),
            strict_mode,
        }
    }

    /// Add a dropped value lossiness item
    pub fn add_dropped(&mut self, path: &str, message: &str, dropped_value: Option<Value>) {
        self.items.push(LossinessItem {
            code: LossinessCode::Drop,
            path: path.to_string(),
            message: message.to_string(),
            severity: self.determine_severity(LossinessCode::Drop),
            before: dropped_value,
            after: None,
        });
    }

    /// Add a passed-through value lossiness item
    pub fn add_map_fallback(&mut self, path: &str, message: &str, value: Option<Value>) {
        self.items.push(LossinessItem {
            code: LossinessCode::MapFallback,
            path: path.to_string(),
            message: message.to_string(),
            severity: self.determine_severity(LossinessCode::MapFallback),
            before: value.clone(),
            after: value,
        });
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    fn determine_severity(&self, code: LossinessCode) -> Severity {
        match (code, self.strict_mode) {
            // Drops are errors in strict mode
            (LossinessCode::Drop, StrictMode::Strict) => Severity::Error,
            (LossinessCode::Drop, _) => Severity::Warning,

            (LossinessCode::MapFallback, StrictMode::Coerce) => Severity::Info,
            (LossinessCode::MapFallback, _) => Severity::Warning,
        }
    }

    /// Build the final report
    pub fn build_report(self) -> LossinessReport {
        let max_severity = self
            .items
            .iter()
            .map(|item| item.severity)
            .max()
            .unwrap_or(Severity::Info);

        let mut by_severity = HashMap::new();
        let mut by_code = HashMap::new();

        for item in &self.items {
            *by_severity.entry(item.severity.to_string()).or_insert(0) += 1;
            *by_code.entry(item.code.to_string()).or_insert(0) += 1;
        }

        LossinessReport {
            summary: LossinessSummary {
                total_items: self.items.len(),
                by_severity,
                by_code,
            },
            items: self.items,
            max_severity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_report() {
        let report = LossinessTracker::new(StrictMode::Warn).build_report();
        assert!(report.items.is_empty());
        assert_eq!(report.max_severity, Severity::Info);
        assert_eq!(report.summary.total_items, 0);
    }

    #[test]
    fn test_report_summary_counts() {
        let mut tracker = LossinessTracker::new(StrictMode::Warn);
        tracker.add_dropped("freq", "no translation", Some(json!("SECONDLY")));
        tracker.add_dropped("freq", "no translation", Some(json!("MINUTELY")));
        tracker.add_map_fallback("frequency", "passed through", Some(json!(9)));
        assert_eq!(tracker.item_count(), 3);

        let report = tracker.build_report();
        assert_eq!(report.summary.total_items, 3);
        assert_eq!(report.summary.by_code.get("Drop"), Some(&2));
        assert_eq!(report.summary.by_code.get("MapFallback"), Some(&1));
        assert_eq!(report.summary.by_severity.get("warning"), Some(&3));
        assert_eq!(report.max_severity, Severity::Warning);
        assert_eq!(report.items[2].after, Some(json!(9)));
    }

    #[test]
    fn test_coerce_fallbacks_are_informational() {
        let mut tracker = LossinessTracker::new(StrictMode::Coerce);
        tracker.add_map_fallback("frequency", "passed through", Some(json!(9)));
        assert_eq!(tracker.build_report().max_severity, Severity::Info);
    }
}
