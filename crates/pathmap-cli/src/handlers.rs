//! Command handlers for CLI subcommands
//!
//! This module contains the implementation logic for each CLI subcommand.

mod completions;
mod rrule;
mod transform;
mod utils;
mod validate;

pub use completions::handle_completions;
pub use rrule::handle_rrule;
pub use transform::handle_transform;
pub use validate::handle_validate;
