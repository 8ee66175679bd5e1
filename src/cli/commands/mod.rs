//! CLI command dispatch and handlers
//!
//! Routes parsed CLI arguments to the appropriate command handler.

pub mod check_code;
pub mod defaults;
pub mod missions;
pub mod run;
pub mod validate;
pub mod version;

use std::path::Path;

use crate::cli::args::{Cli, Commands};
use crate::config::{ConfigLoader, LoaderOptions, Script};
use crate::error::AuroraError;

/// Dispatch a parsed CLI invocation to the appropriate command handler.
///
/// # Errors
///
/// Returns an error if the dispatched command handler fails.
pub async fn dispatch(cli: Cli) -> Result<(), AuroraError> {
    match cli.command {
        Commands::Run(args) => run::run(&args, cli.color).await,
        Commands::CheckCode(args) => check_code::run(&args),
        Commands::Missions(args) => missions::run(&args),
        Commands::Validate(args) => validate::run(&args),
        Commands::Defaults => defaults::run(),
        Commands::Version(args) => {
            version::run(&args);
            Ok(())
        }
    }
}

/// Loads the script at `path`, or the built-in script when `None`.
///
/// Validation warnings are logged; they never block loading.
///
/// # Errors
///
/// Returns a config error if the file cannot be read, parsed or validated.
pub fn load_script(path: Option<&Path>) -> Result<Script, AuroraError> {
    let Some(path) = path else {
        tracing::debug!("using built-in script");
        return Ok(Script::default());
    };

    tracing::info!(config = %path.display(), "loading script");
    let result = ConfigLoader::new(LoaderOptions::default()).load(path)?;
    for warning in &result.warnings {
        tracing::warn!(location = %warning.path, "{}", warning.message);
    }
    Ok(result.script)
}
