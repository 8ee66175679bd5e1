//! Script loader.
//!
//! Pipeline:
//! 1. Size check against `AURORA_MAX_CONFIG_SIZE`
//! 2. Read and strip a UTF-8 BOM
//! 3. YAML parsing into a typed [`Script`]
//! 4. Validation (collects every issue)

use std::path::{Path, PathBuf};

use crate::config::schema::Script;
use crate::config::validation::Validator;
use crate::error::{ConfigError, ValidationIssue};

// ============================================================================
// Public API
// ============================================================================

/// Default maximum script size (1 MiB).
pub const DEFAULT_MAX_CONFIG_SIZE: u64 = 1024 * 1024;

/// Options for the script loader.
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Maximum script file size in bytes.
    pub max_config_size: u64,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            max_config_size: env_or("AURORA_MAX_CONFIG_SIZE", DEFAULT_MAX_CONFIG_SIZE),
        }
    }
}

/// Result of loading a script.
#[derive(Debug)]
pub struct LoadResult {
    /// The loaded and validated script.
    pub script: Script,

    /// Validation warnings (the script is still usable).
    pub warnings: Vec<ValidationIssue>,
}

/// Script loader.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: LoaderOptions,
}

impl ConfigLoader {
    /// Creates a loader with the given options.
    #[must_use]
    pub const fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    /// Loads and validates a script file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The file exceeds the size limit
    /// - YAML parsing fails
    /// - Validation reports errors
    pub fn load(&self, path: &Path) -> Result<LoadResult, ConfigError> {
        let metadata = std::fs::metadata(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;

        if metadata.len() > self.options.max_config_size {
            return Err(ConfigError::TooLarge {
                size: metadata.len(),
                limit: self.options.max_config_size,
            });
        }

        let raw = std::fs::read_to_string(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;

        tracing::debug!(path = %path.display(), bytes = raw.len(), "script read");
        self.parse(&raw, path)
    }

    /// Loads and validates a script from a string.
    ///
    /// `origin` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns an error if YAML parsing fails or validation reports errors.
    pub fn load_str(&self, raw: &str, origin: &str) -> Result<LoadResult, ConfigError> {
        self.parse(raw, &PathBuf::from(origin))
    }

    #[allow(clippy::unused_self)]
    fn parse(&self, raw: &str, path: &Path) -> Result<LoadResult, ConfigError> {
        let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);

        // An empty file means "all defaults"
        let script: Script = if raw.trim().is_empty() {
            Script::default()
        } else {
            serde_yaml::from_str(raw).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                line: e.location().map(|l| l.line()),
                message: e.to_string(),
            })?
        };

        let result = Validator::new().validate(&script);
        if result.has_errors() {
            return Err(ConfigError::ValidationError {
                path: path.display().to_string(),
                errors: result.errors,
            });
        }

        Ok(LoadResult {
            script,
            warnings: result.warnings,
        })
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Reads an environment variable, falling back to `default` when unset or
/// unparsable.
fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ============================================================================
// Tests
// ============================================================================
