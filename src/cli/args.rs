//! CLI argument definitions
//!
//! All Clap derive structs for `aurora` command-line parsing.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::error::PhaseError;
use crate::observability::LogFormat;
use crate::phase::Phase;

// ============================================================================
// Root CLI
// ============================================================================

/// AURORA mission control terminal.
#[derive(Parser, Debug)]
#[command(name = "aurora", author, version, about)]
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
    #[arg(long, default_value = "auto", global = true, env = "AURORA_COLOR")]
    pub color: ColorChoice,

    /// Log output format (logs go to stderr).
    #[arg(long, default_value = "human", global = true)]
    pub log_format: LogFormat,
}

// ============================================================================
// Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the mission terminal.
    Run(RunArgs),

    /// Check a protocol 2 access code.
    CheckCode(CheckCodeArgs),

    /// List mission URLs per protocol and level.
    Missions(MissionsArgs),

    /// Validate script files without running them.
    Validate(ValidateArgs),

    /// Print the built-in script as YAML.
    Defaults,

    /// Display version information.
    Version(VersionArgs),
}

/// Arguments for `run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to a YAML script file (built-in script when omitted).
    #[arg(short, long, env = "AURORA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Phase to start from: boot, system-check, crisis, briefing or hub.
    #[arg(long, default_value = "boot")]
    pub start_at: String,

    /// Time scale applied to every delay (0 = instant, 0.5 = twice as fast).
    #[arg(long, default_value_t = 1.0, env = "AURORA_SPEED")]
    pub speed: f64,

    /// Seed for the glitch pulse intervals.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Disable the atmospheric flicker effects.
    #[arg(long)]
    pub no_effects: bool,

    /// Ring the terminal bell on the crisis alarm.
    #[arg(long)]
    pub bell: bool,

    /// Open selected missions in the system browser.
    #[arg(long)]
    pub open_browser: bool,
}

impl RunArgs {
    /// Resolves `--start-at` to a phase.
    ///
    /// # Errors
    ///
    /// Returns [`PhaseError::NotFound`] for an unknown phase name.
    pub fn start_phase(&self) -> Result<Phase, PhaseError> {
        self.start_at.parse()
    }
}

/// Arguments for `check-code`.
#[derive(Args, Debug)]
pub struct CheckCodeArgs {
    /// Code to check (read from stdin when omitted).
    pub code: Option<String>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `missions`.
#[derive(Args, Debug)]
pub struct MissionsArgs {
    /// Path to a YAML script file (built-in catalog when omitted).
    #[arg(short, long, env = "AURORA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Script files to validate.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,

    /// Treat warnings as errors.
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for `version`.
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
