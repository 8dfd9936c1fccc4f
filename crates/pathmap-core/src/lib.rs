//! Pathmap Core - Declarative, bidirectional mapping between JSON shapes
//!
//! This crate converts a structured value of one shape into another shape
//! and back, driven by per-direction mapping tables of dot-paths, value
//! translation tables and named callbacks.
//!
//! # Main Components
//!
//! - **Error Handling**: Error types using `thiserror` and `anyhow`
//! - **Mapping Engine**: Dot-paths, mapping domains and the [`PathMapper`]
//! - **Recurrence Domain**: Built-in mapping between RRULE-style rules and
//!   platform recurrence objects
//! - **RRULE Codec**: Conversion between RRULE text and the rule shape
//! - **Domain Loader**: Mapping domains read from JSON, YAML or TOML
//!
//! # Example
//!
//! ```
//! use pathmap_core::{recurrence, rrule, Result};
//!
//! fn example() -> Result<()> {
//!     let rule = rrule::parse("RRULE:FREQ=WEEKLY;COUNT=3;BYDAY=MO,WE")?;
//!     let platform = recurrence::rule_to_platform(&rule)?;
//!     assert_eq!(platform["frequency"], 1);
//!     assert_eq!(platform["end"]["occurrenceCount"], 3);
//!
//!     let back = recurrence::platform_to_rule(&platform)?;
//!     assert_eq!(rrule::format(&back)?, "FREQ=WEEKLY;INTERVAL=1;COUNT=3;BYDAY=MO,WE");
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

pub mod error;
pub mod loader;
pub mod mapping;
pub mod recurrence;
pub mod rrule;
pub mod types;

#[cfg(test)]
mod proptest_strategies;

// Re-export main types for convenience
pub use error::{Error, LossinessCode, Result, Severity, StrictMode};
pub use loader::{
    load_domain_from_path, load_domain_from_str, CallbackRegistry, DomainFile, DomainFormat,
};
pub use mapping::{
    Callback, DirectionBuilder, DotPath, MappingDomain, MappingDomainBuilder, PathMapper,
    ValueTranslationTable, Verse,
};
pub use types::{LossinessItem, LossinessReport, LossinessSummary, MappingOutcome};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_library_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_error_creation() {
        let err = Error::configuration("Test error");
        assert!(err.to_string().contains("Test error"));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_strict_mode_equality() {
        assert_eq!(StrictMode::Strict, StrictMode::Strict);
        assert_ne!(StrictMode::Strict, StrictMode::Warn);
    }

    #[test]
    fn test_reexports_build_a_mapper() {
        let domain = MappingDomainBuilder::new("root")
            .forward(DirectionBuilder::new().map("a", "b"))
            .build()
            .unwrap();
        let mapper = PathMapper::new(domain).unwrap();
        assert_eq!(mapper.transform(Verse::Forward, &json!({"a": 1})).unwrap(), json!({"b": 1}));
    }
}
