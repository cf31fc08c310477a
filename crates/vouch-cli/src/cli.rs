//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API,
//! providing a type-safe and well-documented command interface.

use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;
use vouch_core::{FormatterFactory, TraversalMode};

/// Vouch CLI - Validate data files against rule schemas
///
/// Compiles a rule schema once and validates one or more JSON or YAML
/// data files against it, reporting failures field by field.
#[derive(Parser, Debug)]
#[command(
    name = "vouch",
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
    #[arg(short, long, global = true, env = "VOUCH_CONFIG")]
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
    /// Validate data files against a rule schema
    Validate(ValidateArgs),

    /// Compile a rule schema without validating any data
    Check(CheckArgs),

    /// Inspect configuration files and settings
    Config(ConfigArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Arguments for the validate command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Data files to validate (JSON or YAML)
    #[arg(value_name = "DATA", required = true)]
    pub data: Vec<PathBuf>,

    /// Rule schema file mapping fields to rules (JSON or YAML)
    #[arg(short, long, value_name = "SCHEMA")]
    pub schema: PathBuf,

    /// Custom messages keyed by `field.rule` or `rule`
    #[arg(short, long, value_name = "MESSAGES")]
    pub messages: Option<PathBuf>,

    /// Traversal mode (defaults to the configured mode)
    #[arg(long, value_enum)]
    pub mode: Option<Mode>,

    /// Error formatter (defaults to the configured formatter)
    #[arg(short, long, value_enum)]
    pub formatter: Option<FormatterKind>,

    /// Strip fields not declared in the schema from the printed output
    #[arg(long)]
    pub remove_additional: bool,

    /// Run non-presence rules on empty strings
    #[arg(long)]
    pub existy_strict: bool,

    /// Print the validated data of passing files
    #[arg(long)]
    pub show_data: bool,
}

/// Arguments for the check command
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Rule schema file (JSON or YAML)
    #[arg(value_name = "SCHEMA")]
    pub schema: PathBuf,

    /// Custom messages file to bind while compiling
    #[arg(short, long, value_name = "MESSAGES")]
    pub messages: Option<PathBuf>,

    /// List the compiled fields and their rules
    #[arg(long)]
    pub detailed: bool,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show(ConfigShowArgs),

    /// Write a default configuration file
    Init(ConfigInitArgs),

    /// List the locations searched for a configuration file
    Paths,
}

/// Arguments for config show
#[derive(Parser, Debug)]
pub struct ConfigShowArgs {
    /// Show configuration in specified format
    #[arg(short, long, value_enum, default_value = "yaml")]
    pub format: ConfigFormat,
}

/// Arguments for config init
#[derive(Parser, Debug)]
pub struct ConfigInitArgs {
    /// Destination file (defaults to the user config location)
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Force overwrite of an existing file
    #[arg(long)]
    pub force: bool,
}

/// Configuration file formats
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    /// JSON format
    Json,
    /// YAML format
    Yaml,
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

/// Traversal mode for the validate command
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Stop at the first failing rule
    First,
    /// Run every rule and collect every failure
    All,
    /// Stop at the first failing rule of each field
    Each,
}

/// Built-in error formatters
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum FormatterKind {
    /// `{message, validation, field}` entries
    Vanilla,
    /// JSON:API `{title, detail, source}` entries
    Jsonapi,
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

impl Mode {
    pub fn name(self) -> &'static str {
        match self {
            Mode::First => "first",
            Mode::All => "all",
            Mode::Each => "each",
        }
    }

    /// Parse a mode name as written in configuration files
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "first" => Some(Mode::First),
            "all" => Some(Mode::All),
            "each" => Some(Mode::Each),
            _ => None,
        }
    }
}

impl From<Mode> for TraversalMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::First => TraversalMode::StopAtFirst,
            Mode::All => TraversalMode::CollectAll,
            Mode::Each => TraversalMode::StopPerField,
        }
    }
}

impl FormatterKind {
    pub fn name(self) -> &'static str {
        match self {
            FormatterKind::Vanilla => "vanilla",
            FormatterKind::Jsonapi => "jsonapi",
        }
    }

    /// Formatter factory for this kind
    pub fn factory(self) -> FormatterFactory {
        match self {
            FormatterKind::Vanilla => FormatterFactory::vanilla(),
            FormatterKind::Jsonapi => FormatterFactory::json_api(),
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
