//! Transform command handler

use super::utils::{read_document, resolve_domain, DomainSource};
use crate::cli::TransformArgs;
use crate::config::Config;
use crate::error::Result;
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use pathmap_core::{recurrence, Verse};
use std::fs;
use tracing::{debug, info, instrument};

/// Handle the transform command
#[instrument(skip(config, output), fields(input = %args.input.display(), inverse = args.inverse))]
pub fn handle_transform(args: TransformArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::with_details("transform_command", &format!("file: {}", args.input.display()));

    let (mapper, source) = resolve_domain(args.domain.as_deref(), config)?;
    let strict_mode = args
        .strict
        .map(pathmap_core::StrictMode::from)
        .or(config.strict_mode)
        .unwrap_or_default();
    let mapper = mapper.with_strict_mode(strict_mode);
    let verse = if args.inverse { Verse::Inverse } else { Verse::Forward };

    output.info(&format!(
        "Transforming {} with domain '{}' ({}, {})",
        args.input.display(),
        mapper.domain().name(),
        verse,
        strict_mode
    ))?;

    let mut input = read_document(&args.input)?;
    if source == DomainSource::Builtin && verse == Verse::Forward {
        debug!("Applying rule defaults");
        recurrence::apply_rule_defaults(&mut input);
    }

    let outcome = mapper.transform_with_report(verse, &input)?;
    info!(
        lossy_values = outcome.lossiness.items.len(),
        "Transform completed"
    );

    if let Some(path) = &args.output_file {
        fs::write(path, serde_json::to_string_pretty(&outcome.output)?)?;
        output.success(&format!("✓ Output saved to {}", path.display()))?;
        if args.report {
            output.lossiness_report(&outcome.lossiness)?;
        }
    } else if args.report {
        output.outcome(&outcome)?;
    } else {
        output.data(&outcome.output)?;
    }

    if outcome.has_lossiness() && !args.report {
        output.warning(&format!(
            "{} value(s) had no translation; rerun with --report for details",
            outcome.lossiness.items.len()
        ))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{OutputFormat, StrictMode};
    use crate::error::Error;
    use crate::output::SharedBuffer;
    use serde_json::{json, Value};
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn args(input: PathBuf) -> TransformArgs {
        TransformArgs {
            input,
            domain: None,
            inverse: false,
            strict: None,
            report: false,
            output_file: None,
        }
    }

    fn write_rule(dir: &TempDir, rule: &Value) -> PathBuf {
        let path = dir.path().join("rule.json");
        fs::write(&path, rule.to_string()).unwrap();
        path
    }

    #[test]
    fn test_forward_transform_applies_defaults() {
        let dir = TempDir::new().unwrap();
        let input = write_rule(&dir, &json!({"freq": "WEEKLY", "count": 3, "byweekday": ["TU"]}));

        let buffer = SharedBuffer::default();
        let mut output = buffer.writer(OutputFormat::Json);
        handle_transform(args(input), &Config::default(), &mut output).unwrap();

        let platform: Value = serde_json::from_str(buffer.contents().trim()).unwrap();
        assert_eq!(
            platform,
            json!({
                "frequency": 1,
                "interval": 1,
                "end": {"occurrenceCount": 3},
                "daysOfTheWeek": [{"dayOfWeek": 3}]
            })
        );
    }

    #[test]
    fn test_inverse_transform_with_report() {
        let dir = TempDir::new().unwrap();
        let input = write_rule(&dir, &json!({"frequency": 7, "interval": 2}));

        let buffer = SharedBuffer::default();
        let mut output = buffer.writer(OutputFormat::Json);
        let transform = TransformArgs {
            inverse: true,
            report: true,
            ..args(input)
        };
        handle_transform(transform, &Config::default(), &mut output).unwrap();

        let outcome: Value = serde_json::from_str(buffer.contents().trim()).unwrap();
        assert_eq!(outcome["output"], json!({"interval": 2}));
        assert_eq!(outcome["verse"], json!("inverse"));
        assert_eq!(outcome["lossiness"]["items"][0]["path"], json!("frequency"));
    }

    #[test]
    fn test_strict_flag_overrides_config() {
        let dir = TempDir::new().unwrap();
        let input = write_rule(&dir, &json!({"freq": "SECONDLY"}));
        let config = Config {
            strict_mode: Some(pathmap_core::StrictMode::Coerce),
            ..Config::default()
        };

        let buffer = SharedBuffer::default();
        let mut output = buffer.writer(OutputFormat::Json);
        handle_transform(args(input.clone()), &config, &mut output).unwrap();
        let platform: Value = serde_json::from_str(buffer.contents().trim()).unwrap();
        assert_eq!(platform["frequency"], json!("SECONDLY"));

        let strict = TransformArgs {
            strict: Some(StrictMode::Strict),
            ..args(input)
        };
        let err = handle_transform(strict, &config, &mut buffer.writer(OutputFormat::Json)).unwrap_err();
        assert!(matches!(err, Error::Core(pathmap_core::Error::Translation { .. })));
    }

    #[test]
    fn test_save_to_file() {
        let dir = TempDir::new().unwrap();
        let input = write_rule(&dir, &json!({"freq": "DAILY"}));
        let target = dir.path().join("platform.json");

        let buffer = SharedBuffer::default();
        let mut output = buffer.writer(OutputFormat::Human);
        let transform = TransformArgs {
            output_file: Some(target.clone()),
            ..args(input)
        };
        handle_transform(transform, &Config::default(), &mut output).unwrap();

        let saved: Value = serde_json::from_str(&fs::read_to_string(&target).unwrap()).unwrap();
        assert_eq!(saved, json!({"frequency": 0, "interval": 1}));
        assert!(buffer.contents().contains("Output saved to"));
    }
}
