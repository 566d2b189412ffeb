//! CLI argument definitions.
//!
//! All Clap derive structs for `breathbox` command-line parsing.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

// ============================================================================
// Root CLI
// ============================================================================

/// Guided box-breathing sessions with an offline-first asset gateway.
#[derive(Parser, Debug)]
#[command(name = "breathbox", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "BREATHBOX_COLOR")]
    pub color: ColorChoice,
}

// ============================================================================
// Top-Level Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run guided breathing sessions.
    Session(SessionCommand),

    /// Start or validate the offline asset gateway.
    Gateway(GatewayCommand),

    /// Generate shell completion scripts.
    Completions(CompletionsArgs),

    /// Display version information.
    Version(VersionArgs),
}

// ============================================================================
// Session Command
// ============================================================================

/// Session management commands.
#[derive(Args, Debug)]
pub struct SessionCommand {
    /// Session subcommand.
    #[command(subcommand)]
    pub subcommand: SessionSubcommand,
}

/// Session subcommands.
#[derive(Subcommand, Debug)]
pub enum SessionSubcommand {
    /// Run a breathing session in the terminal.
    Run(SessionRunArgs),
}

/// Arguments for `session run`.
#[derive(Args, Debug)]
pub struct SessionRunArgs {
    /// Path to YAML configuration file.
    #[arg(short, long, env = "BREATHBOX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the phase length in seconds (clamped to [1.0, 10.0]).
    #[arg(long)]
    pub phase_seconds: Option<f64>,

    /// End the session automatically after this long (e.g. `90s`, `5m`).
    #[arg(long = "for", value_name = "DURATION", value_parser = humantime::parse_duration)]
    pub run_for: Option<Duration>,
}

// ============================================================================
// Gateway Command
// ============================================================================

/// Gateway management commands.
#[derive(Args, Debug)]
pub struct GatewayCommand {
    /// Gateway subcommand.
    #[command(subcommand)]
    pub subcommand: GatewaySubcommand,
}

/// Gateway subcommands.
#[derive(Subcommand, Debug)]
pub enum GatewaySubcommand {
    /// Install the precache, activate, and serve.
    Run(GatewayRunArgs),

    /// Validate configuration files without starting the gateway.
    Validate(GatewayValidateArgs),
}

/// Arguments for `gateway run`.
#[derive(Args, Debug)]
pub struct GatewayRunArgs {
    /// Path to YAML configuration file.
    #[arg(short, long, env = "BREATHBOX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the bind address from the configuration.
    #[arg(long)]
    pub bind: Option<String>,
}

/// Arguments for `gateway validate`.
#[derive(Args, Debug)]
pub struct GatewayValidateArgs {
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

// ============================================================================
// Completions / Version
// ============================================================================

/// Arguments for shell completion generation.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell for completion script.
    pub shell: Shell,
}

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

/// Shell type for completion generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell.
    Bash,
    /// Zsh shell.
    Zsh,
    /// Fish shell.
    Fish,
    /// `PowerShell`.
    #[value(name = "powershell")]
    PowerShell,
    /// Elvish shell.
    Elvish,
}

// ============================================================================
// Tests
// ============================================================================
