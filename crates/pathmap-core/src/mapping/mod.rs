//! Declarative, bidirectional field mapping
//!
//! A mapping domain describes how the fields of one shape correspond to the
//! fields of another, in both directions. Rules copy a value from an input
//! dot-path to an output dot-path, optionally recoding enumerated values
//! through a translation table, or hand the value to a named callback that
//! reshapes the output itself (for arrays, dates and other non-trivial
//! conversions).
//!
//! # Module Organization
//!
//! - [`path`] - dot-path parsing, resolution and writing
//! - [`table`] - mapping tables, translation tables and domains
//! - [`builder`] - fluent builders for domains
//! - [`engine`] - the [`PathMapper`] transform engine
//! - [`lossiness`] - tracking of untranslatable values
//!
//! # Examples
//!
//! ```
//! use pathmap_core::mapping::{DirectionBuilder, MappingDomainBuilder, PathMapper};
//! use serde_json::json;
//!
//! let domain = MappingDomainBuilder::new("frequency")
//!     .forward(
//!         DirectionBuilder::new()
//!             .map("freq", "frequency")
//!             .map("count", "end.occurrenceCount")
//!             .translate("freq", json!("WEEKLY"), json!(2)),
//!     )
//!     .inverse(
//!         DirectionBuilder::new()
//!             .map("frequency", "freq")
//!             .map("end.occurrenceCount", "count")
//!             .translate("frequency", json!(2), json!("WEEKLY")),
//!     )
//!     .build()
//!     .unwrap();
//!
//! let mapper = PathMapper::new(domain).unwrap();
//! let platform = mapper.transform_forward(&json!({"freq": "WEEKLY", "count": 5})).unwrap();
//! assert_eq!(platform, json!({"frequency": 2, "end": {"occurrenceCount": 5}}));
//!
//! let rule = mapper.transform_inverse(&platform).unwrap();
//! assert_eq!(rule, json!({"freq": "WEEKLY", "count": 5}));
//! ```
//!
//! Copyright (c) 2025 Pathmap Team
//! Licensed under the Apache-2.0 license

pub mod builder;
pub mod engine;
pub mod lossiness;
pub mod path;
pub mod table;

#[cfg(test)]
mod tests;

pub use builder::{DirectionBuilder, MappingDomainBuilder};
pub use engine::PathMapper;
pub use lossiness::LossinessTracker;
pub use path::DotPath;
pub use table::{
    serialized_key, Callback, CallbackFn, DirectionConfig, MappingDomain, MappingRule,
    MappingTable, OutputTarget, ValueTranslationTable, Verse,
};
