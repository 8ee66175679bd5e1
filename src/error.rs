//! Error types for the AURORA mission terminal
//!
//! Domain failures in the sequencer are never fatal (missing render targets
//! are skipped, bad access codes are retried). The types here cover the
//! ambient failure modes: configuration, I/O, and command-level outcomes
//! that map to process exit codes.

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `aurora` CLI operations.
///
/// These codes follow Unix conventions.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Configuration error (invalid YAML, validation failure)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, terminal closed)
    pub const IO_ERROR: i32 = 3;

    /// Phase controller error (unknown phase name)
    pub const PHASE_ERROR: i32 = 5;

    /// Access code rejected by `check-code`
    pub const ACCESS_DENIED: i32 = 6;

    /// Usage error (invalid arguments, missing required options)
    pub const USAGE_ERROR: i32 = 64;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;

    /// Terminated by SIGTERM
    pub const TERMINATED: i32 = 143;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for terminal operations.
///
/// Aggregates the domain-specific errors and maps each to an exit code.
#[derive(Debug, Error)]
pub enum AuroraError {
    /// Configuration loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Phase controller error
    #[error(transparent)]
    Phase(#[from] PhaseError),

    /// Access code rejected
    #[error(transparent)]
    AccessCode(#[from] AccessCodeError),

    /// Invalid command-line usage
    #[error("usage error: {0}")]
    Usage(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl AuroraError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Json(_) | Self::Yaml(_) => ExitCode::CONFIG_ERROR,
            Self::Phase(_) => ExitCode::PHASE_ERROR,
            Self::AccessCode(_) => ExitCode::ACCESS_DENIED,
            Self::Usage(_) => ExitCode::USAGE_ERROR,
            Self::Io(_) => ExitCode::IO_ERROR,
        }
    }
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Script configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}: {message}")]
    ParseError {
        /// Path to the configuration file
        path: PathBuf,
        /// Line number where the error occurred (if available)
        line: Option<usize>,
        /// Error message from the parser
        message: String,
    },

    /// Configuration validation failed
    #[error("validation failed for {path}: {}", summarize(errors))]
    ValidationError {
        /// Path to the configuration file
        path: String,
        /// List of validation issues found
        errors: Vec<ValidationIssue>,
    },

    /// Referenced configuration file not found
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Configuration file exceeds the size limit
    #[error("config file too large: {size} bytes (limit: {limit})")]
    TooLarge {
        /// Actual file size in bytes
        size: u64,
        /// Configured size limit in bytes
        limit: u64,
    },
}

fn summarize(errors: &[ValidationIssue]) -> String {
    match errors {
        [] => "no issues recorded".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{first} (and {} more)", rest.len()),
    }
}

// ============================================================================
// Validation Types
// ============================================================================

/// A single validation issue found during configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Path to the problematic field (e.g., "timing.glitch_min")
    pub path: String,
    /// Description of the validation issue
    pub message: String,
    /// Severity level of the issue
    pub severity: Severity,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: {} at {}", prefix, self.message, self.path)
    }
}

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Error - validation failure that prevents the script from being used
    Error,
    /// Warning - potential issue that does not prevent loading
    Warning,
}

// ============================================================================
// Phase Errors
// ============================================================================

/// Phase controller errors.
///
/// These only arise at the edges (CLI debug hooks); a running sequence
/// never fails.
#[derive(Debug, Error)]
pub enum PhaseError {
    /// Referenced phase does not exist
    #[error("phase not found: '{name}' (expected one of: boot, system-check, crisis, briefing, hub)")]
    NotFound {
        /// The name that failed to resolve
        name: String,
    },
}

// ============================================================================
// Access Code Errors
// ============================================================================

/// Reasons an access code submission is rejected.
///
/// Both variants are user-facing and recoverable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AccessCodeError {
    /// Nothing was entered
    #[error("no access code entered")]
    Empty,

    /// The code does not match the required format
    #[error("invalid access code")]
    Invalid,
}

// ============================================================================
// Render Errors
// ============================================================================

/// Failures reported by a renderer for a single directive.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The directive's target does not exist on this surface
    #[error("render target not present: {0}")]
    MissingTarget(crate::render::Target),

    /// Writing to the output failed
    #[error("render I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for render operations.
pub type RenderResult = Result<(), RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_map_by_variant() {
        let config = AuroraError::Config(ConfigError::MissingFile {
            path: PathBuf::from("script.yaml"),
        });
        assert_eq!(config.exit_code(), ExitCode::CONFIG_ERROR);

        let phase = AuroraError::Phase(PhaseError::NotFound {
            name: "warp".to_string(),
        });
        assert_eq!(phase.exit_code(), ExitCode::PHASE_ERROR);

        let denied = AuroraError::AccessCode(AccessCodeError::Invalid);
        assert_eq!(denied.exit_code(), ExitCode::ACCESS_DENIED);

        let io = AuroraError::Io(std::io::Error::other("closed"));
        assert_eq!(io.exit_code(), ExitCode::IO_ERROR);

        assert_eq!(
            AuroraError::Usage("bad".to_string()).exit_code(),
            ExitCode::USAGE_ERROR
        );
    }

    #[test]
    fn validation_issue_display() {
        let issue = ValidationIssue {
            path: "timing.glitch_min".to_string(),
            message: "must not exceed glitch_max".to_string(),
            severity: Severity::Error,
        };
        assert_eq!(
            issue.to_string(),
            "error: must not exceed glitch_max at timing.glitch_min"
        );
    }

    #[test]
    fn validation_error_summarizes_issues() {
        let issue = ValidationIssue {
            path: "narrative.boot_sequence".to_string(),
            message: "must not be empty".to_string(),
            severity: Severity::Error,
        };
        let err = ConfigError::ValidationError {
            path: "script.yaml".to_string(),
            errors: vec![issue.clone(), issue],
        };
        let msg = err.to_string();
        assert!(msg.contains("script.yaml"));
        assert!(msg.contains("and 1 more"));
    }

    #[test]
    fn phase_not_found_lists_names() {
        let err = PhaseError::NotFound {
            name: "warp".to_string(),
        };
        assert!(err.to_string().contains("system-check"));
    }
}
