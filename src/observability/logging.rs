//! Logging initialization.
//!
//! Structured logging via `tracing`, human-readable or JSON, always on
//! stderr so it never mixes with the terminal rendering on stdout.
//! `AURORA_LOG_LEVEL` overrides the verbosity flags.

use std::io::IsTerminal;

use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

use crate::cli::args::ColorChoice;

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_LEVEL_ENV: &str = "AURORA_LOG_LEVEL";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with optional ANSI colors.
    #[default]
    Human,
    /// Newline-delimited JSON for machine consumption.
    Json,
}

/// Maps a verbosity level to a filter directive.
///
/// Verbosity raises this crate's level only; dependencies stay at `warn`
/// until `-vvv`, where everything goes to `trace`.
#[must_use]
pub const fn verbosity_to_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "warn,aurora_terminal=info",
        2 => "warn,aurora_terminal=debug",
        _ => "trace",
    }
}

/// Resolves a color choice for a stream.
///
/// `Auto` means color only on a terminal and only when `NO_COLOR` is unset.
#[must_use]
pub fn color_enabled(color: ColorChoice, is_terminal: bool) -> bool {
    match color {
        ColorChoice::Auto => is_terminal && std::env::var_os("NO_COLOR").is_none(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    }
}

/// Builds the event filter from an optional override and the `-v` count.
///
/// An override that fails to parse is ignored in favour of the verbosity.
fn build_filter(env_override: Option<&str>, verbosity: u8) -> EnvFilter {
    env_override
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .unwrap_or_else(|| EnvFilter::new(verbosity_to_directive(verbosity)))
}

/// Initializes the global tracing subscriber on stderr.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging(format: LogFormat, verbosity: u8, color: ColorChoice) {
    let env_override = std::env::var(LOG_LEVEL_ENV).ok();
    let filter = build_filter(env_override.as_deref(), verbosity);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .with_writer(std::io::stderr);

    let _ = match format {
        LogFormat::Human => builder
            .with_ansi(color_enabled(color, std::io::stderr().is_terminal()))
            .try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
