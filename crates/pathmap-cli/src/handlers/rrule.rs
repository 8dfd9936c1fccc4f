//! RRULE command handler

use super::utils::read_document;
use crate::cli::RruleArgs;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use pathmap_core::{recurrence, rrule};
use serde_json::json;
use std::path::Path;
use tracing::{debug, instrument};

/// Handle the rrule command
#[instrument(skip(output))]
pub fn handle_rrule(args: RruleArgs, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::new("rrule_command");

    match (args.text, args.to_text) {
        (Some(text), None) => text_to_platform(&text, output),
        (None, Some(path)) => platform_to_text(&path, output),
        _ => Err(Error::invalid_args(
            "pass either RRULE text or --to-text <PLATFORM_FILE>",
        )),
    }
}

fn text_to_platform(text: &str, output: &mut OutputWriter) -> Result<()> {
    let rule = rrule::parse(text)?;
    debug!(?rule, "Parsed recurrence rule");
    let platform = recurrence::rule_to_platform(&rule)?;

    if !output.is_human() {
        return output.data(&json!({ "rule": rule, "platform": platform }));
    }

    output.section("Rule")?;
    output.data(&rule)?;
    output.section("Platform")?;
    output.data(&platform)
}

fn platform_to_text(path: &Path, output: &mut OutputWriter) -> Result<()> {
    let platform = read_document(path)?;
    let rule = recurrence::platform_to_rule(&platform)?;
    debug!(?rule, "Recovered recurrence rule");
    let text = format!("RRULE:{}", rrule::format(&rule)?);

    if output.is_human() {
        output.writeln(&text)
    } else {
        output.data(&json!({ "rrule": text }))
    }
}
