//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API,
//! providing a type-safe and well-documented command interface.

use clap::{Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;
use std::path::PathBuf;

/// Pathmap CLI - Bidirectional mapping between JSON document shapes
///
/// Transforms documents through declarative mapping domains, validates
/// domain files and converts RFC 5545 recurrence rules to platform
/// recurrence objects and back.
#[derive(Parser, Debug)]
#[command(
    name = "pathmap",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "PATHMAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(short, long, value_enum, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Transform a JSON or YAML document through a mapping domain
    Transform(TransformArgs),

    /// Check that a mapping domain file loads and is consistent
    Validate(ValidateArgs),

    /// Convert RRULE text to a platform recurrence, or back
    Rrule(RruleArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Arguments for the transform command
#[derive(Parser, Debug)]
pub struct TransformArgs {
    /// Document to transform (JSON or YAML, `-` for stdin)
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Domain file, domain name in the domains directory, or `recurrence`
    #[arg(short, long, value_name = "DOMAIN")]
    pub domain: Option<String>,

    /// Run the inverse direction instead of the forward one
    #[arg(short, long)]
    pub inverse: bool,

    /// How untranslatable values are handled
    #[arg(short, long, value_enum)]
    pub strict: Option<StrictMode>,

    /// Show the lossiness report alongside the output
    #[arg(long)]
    pub report: bool,

    /// Output file path (stdout if not specified)
    #[arg(long = "save-to")]
    pub output_file: Option<PathBuf>,
}

/// Arguments for the validate command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to the mapping domain file (JSON, YAML or TOML)
    #[arg(value_name = "DOMAIN_FILE")]
    pub domain_file: PathBuf,

    /// List every rule of both directions
    #[arg(long)]
    pub detailed: bool,
}

/// Arguments for the rrule command
#[derive(Parser, Debug)]
pub struct RruleArgs {
    /// Recurrence rule text, e.g. `RRULE:FREQ=WEEKLY;BYDAY=MO,FR`
    #[arg(value_name = "TEXT", required_unless_present = "to_text")]
    pub text: Option<String>,

    /// Read a platform recurrence (JSON or YAML) and print its RRULE text
    #[arg(long, value_name = "PLATFORM_FILE", conflicts_with = "text")]
    pub to_text: Option<PathBuf>,
}

/// Arguments for generating shell completions
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

/// Handling of values without a translation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrictMode {
    /// Fail on the first untranslatable value
    Strict,
    /// Drop the value with a warning
    Warn,
    /// Pass the untranslated value through
    Coerce,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

impl From<StrictMode> for pathmap_core::StrictMode {
    fn from(mode: StrictMode) -> Self {
        match mode {
            StrictMode::Strict => pathmap_core::StrictMode::Strict,
            StrictMode::Warn => pathmap_core::StrictMode::Warn,
            StrictMode::Coerce => pathmap_core::StrictMode::Coerce,
        }
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        // Verify that the CLI structure is valid
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_level() {
        let cli = Cli {
            verbose: 2,
            quiet: false,
            config: None,
            output: OutputFormat::Human,
            no_color: false,
            command: Commands::Validate(ValidateArgs {
                domain_file: PathBuf::from("domain.yaml"),
                detailed: false,
            }),
        };
        assert_eq!(cli.verbosity_level(), 2);

        let quiet_cli = Cli {
            verbose: 2,
            quiet: true,
            ..cli
        };
        assert_eq!(quiet_cli.verbosity_level(), 0);
    }

    #[test]
    fn test_transform_arguments() {
        let cli = Cli::parse_from([
            "pathmap", "transform", "rule.json", "--domain", "recurrence", "--inverse", "--strict",
            "coerce", "--report",
        ]);

        match cli.command {
            Commands::Transform(args) => {
                assert_eq!(args.input, PathBuf::from("rule.json"));
                assert_eq!(args.domain.as_deref(), Some("recurrence"));
                assert!(args.inverse);
                assert_eq!(args.strict, Some(StrictMode::Coerce));
                assert!(args.report);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_rrule_needs_text_or_file() {
        assert!(Cli::try_parse_from(["pathmap", "rrule"]).is_err());
        assert!(Cli::try_parse_from(["pathmap", "rrule", "FREQ=DAILY", "--to-text", "p.json"]).is_err());

        let cli = Cli::try_parse_from(["pathmap", "rrule", "--to-text", "platform.json"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Rrule(RruleArgs { text: None, to_text: Some(_) })
        ));
    }

    #[test]
    fn test_strict_mode_conversion() {
        assert_eq!(
            pathmap_core::StrictMode::from(StrictMode::Strict),
            pathmap_core::StrictMode::Strict
        );
        assert_eq!(
            pathmap_core::StrictMode::from(StrictMode::Coerce),
            pathmap_core::StrictMode::Coerce
        );
    }
}
