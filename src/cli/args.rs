//! CLI argument definitions
//!
//! All Clap derive structs for `EmoSpy` command-line parsing.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

// ============================================================================
// Root CLI
// ============================================================================

/// Pass-and-play party game: find the outsider who does not know the emotion.
#[derive(Parser, Debug)]
#[command(name = "emospy", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "EMOSPY_COLOR")]
    pub color: ColorChoice,

    /// Log output format.
    #[arg(long, default_value = "human", global = true)]
    pub log_format: OutputFormat,
}

// ============================================================================
// Top-Level Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Play rounds in this terminal, passing the device around the table.
    Play(PlayArgs),

    /// Inspect and validate card catalogs.
    Catalog(CatalogCommand),

    /// Display version information.
    Version(VersionArgs),
}

// ============================================================================
// Play Command
// ============================================================================

/// Arguments for `play`.
#[derive(Args, Debug)]
pub struct PlayArgs {
    /// Player name, in seat order (repeat for each player).
    #[arg(short, long = "name", value_name = "NAME", action = ArgAction::Append)]
    pub names: Vec<String>,

    /// Number of players (3-6). Missing names become "Player k".
    #[arg(short, long)]
    pub players: Option<usize>,

    /// Path to YAML game configuration.
    #[arg(short, long, env = "EMOSPY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Discussion length, e.g. "7m" or "90s" (overrides the config file).
    #[arg(short, long, env = "EMOSPY_DISCUSSION", value_parser = humantime::parse_duration)]
    pub discussion: Option<Duration>,

    /// Seed for reproducible deals.
    #[arg(long, env = "EMOSPY_SEED")]
    pub seed: Option<u64>,

    /// Write JSONL game events to this file.
    #[arg(long, env = "EMOSPY_EVENTS")]
    pub events: Option<PathBuf>,

    /// Serve Prometheus metrics on 127.0.0.1 at this port.
    #[arg(long, env = "EMOSPY_METRICS_PORT")]
    pub metrics_port: Option<u16>,

    /// Do not clear the screen between turns.
    #[arg(long)]
    pub no_clear: bool,
}

// ============================================================================
// Catalog Command
// ============================================================================

/// Catalog commands.
#[derive(Args, Debug)]
pub struct CatalogCommand {
    /// Catalog subcommand.
    #[command(subcommand)]
    pub subcommand: CatalogSubcommand,
}

/// Catalog subcommands.
#[derive(Subcommand, Debug)]
pub enum CatalogSubcommand {
    /// Validate game configuration files.
    Validate(CatalogValidateArgs),

    /// Print the effective catalog.
    Show(CatalogShowArgs),
}

/// Arguments for `catalog validate`.
#[derive(Args, Debug)]
pub struct CatalogValidateArgs {
    /// Configuration files to validate.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,

    /// Enable strict validation (warnings become errors).
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for `catalog show`.
#[derive(Args, Debug)]
pub struct CatalogShowArgs {
    /// Path to YAML game configuration (built-in catalog when absent).
    #[arg(short, long, env = "EMOSPY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// Version
// ============================================================================

/// Arguments for version display.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Output format for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

// ============================================================================
// Tests
// ============================================================================
