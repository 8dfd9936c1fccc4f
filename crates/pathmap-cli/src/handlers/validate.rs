//! Validation command handler

use crate::cli::ValidateArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use pathmap_core::loader::{load_domain_from_path, CallbackRegistry};
use pathmap_core::{MappingDomain, PathMapper, Verse};
use serde::Serialize;
use tracing::{info, instrument};

/// Machine-readable validation summary
#[derive(Debug, Serialize)]
struct ValidationSummary<'a> {
    name: &'a str,
    valid: bool,
    forward_rules: usize,
    inverse_rules: usize,
    /// Outputs not read back by the opposite direction
    unmatched: Vec<String>,
}

/// Handle the validate command
#[instrument(skip(_config, output), fields(file = %args.domain_file.display()))]
pub fn handle_validate(args: ValidateArgs, _config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::with_details("validate_command", &format!("file: {}", args.domain_file.display()));
    output.info(&format!("Validating mapping domain: {}", args.domain_file.display()))?;

    if !args.domain_file.exists() {
        return Err(Error::FileNotFound {
            path: args.domain_file.clone(),
        });
    }

    let domain = load_domain_from_path(&args.domain_file, &CallbackRegistry::default())?;
    let mapper = PathMapper::new(domain)?;
    let domain = mapper.domain();
    info!(domain = domain.name(), "Domain is valid");

    let unmatched: Vec<String> = [Verse::Forward, Verse::Inverse]
        .into_iter()
        .flat_map(|verse| {
            domain
                .unmatched_outputs(verse)
                .into_iter()
                .map(move |path| format!("{} {}", verse, path))
        })
        .collect();

    if !output.is_human() {
        return output.data(&ValidationSummary {
            name: domain.name(),
            valid: true,
            forward_rules: domain.direction(Verse::Forward).table.len(),
            inverse_rules: domain.direction(Verse::Inverse).table.len(),
            unmatched,
        });
    }

    output.success(&format!("✓ Domain '{}' is valid", domain.name()))?;
    for verse in [Verse::Forward, Verse::Inverse] {
        let direction = domain.direction(verse);
        output.info(&format!(
            "{}: {} rule(s), {} translation table(s)",
            verse,
            direction.table.len(),
            direction.translations.len()
        ))?;
    }
    for lost in &unmatched {
        output.warning(&format!("Output not read back on a round trip: {}", lost))?;
    }

    if args.detailed {
        for verse in [Verse::Forward, Verse::Inverse] {
            output.section(&format!("{} rules", verse))?;
            output.table(&["Input", "Output", "Translated"], rule_rows(domain, verse))?;
        }
    }

    Ok(())
}

fn rule_rows(domain: &MappingDomain, verse: Verse) -> Vec<Vec<String>> {
    let direction = domain.direction(verse);
    direction
        .table
        .iter()
        .map(|rule| {
            let translated = direction
                .translation_for(rule.input.as_str())
                .map(|table| format!("{} value(s)", table.len()))
                .unwrap_or_default();
            vec![rule.input.to_string(), rule.output.to_string(), translated]
        })
        .collect()
}
