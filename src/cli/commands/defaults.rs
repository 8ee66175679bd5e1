//! Prints the built-in script.

use crate::config::Script;
use crate::error::AuroraError;

/// Print the built-in script as YAML, ready to be edited and passed to
/// `run --config`.
///
/// # Errors
///
/// Returns a YAML error if serialization fails.
pub fn run() -> Result<(), AuroraError> {
    print!("{}", serde_yaml::to_string(&Script::default())?);
    Ok(())
}
