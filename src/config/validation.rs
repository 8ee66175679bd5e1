//! Script validation.
//!
//! Runs on the fully deserialized [`Script`] and collects ALL issues
//! rather than stopping at the first one.

use std::collections::BTreeSet;
use std::time::Duration;

use crate::config::schema::{Flicker, Script};
use crate::error::{Severity, ValidationIssue};
use crate::hub::Protocol;

/// Longest accepted effects delay, interval or flicker duration.
const MAX_EFFECT_DURATION: Duration = Duration::from_secs(60 * 60);

/// Words the input router claims before level ids are considered.
const RESERVED_WORDS: &[&str] = &[
    "", "ok", "ready", "listo", "s", "skip", "h", "1", "2", "x", "close", "q", "quit", "exit",
];

// ============================================================================
// Public API
// ============================================================================

/// Result of script validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Validation errors (prevent loading).
    pub errors: Vec<ValidationIssue>,

    /// Validation warnings (informational).
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Returns `true` if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns `true` if validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Iterates over errors, then warnings.
    pub fn issues(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.errors.iter().chain(&self.warnings)
    }
}

/// Script validator.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Validator {
    /// Creates a new validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a script and returns every issue found.
    pub fn validate(&mut self, script: &Script) -> ValidationResult {
        self.errors.clear();
        self.warnings.clear();

        self.validate_narrative(script);
        self.validate_timing(script);
        self.validate_effects(script);
        self.validate_missions(script);

        ValidationResult {
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    // ========================================================================
    // Sections
    // ========================================================================

    fn validate_narrative(&mut self, script: &Script) {
        let narrative = &script.narrative;

        if narrative.boot_sequence.is_empty() {
            self.add_error("narrative.boot_sequence", "boot sequence cannot be empty");
        }
        for (i, line) in narrative.boot_sequence.iter().enumerate() {
            if line.trim().is_empty() {
                self.add_warning(&format!("narrative.boot_sequence[{i}]"), "blank boot line");
            }
        }

        if narrative.briefing_text.trim().is_empty() {
            self.add_error("narrative.briefing_text", "briefing text cannot be empty");
        }

        if narrative.alert_text.trim().is_empty() {
            self.add_warning("narrative.alert_text", "alert text is empty");
        }
    }

    fn validate_timing(&mut self, script: &Script) {
        let timing = &script.timing;

        if timing.glitch_min > timing.glitch_max {
            self.add_error(
                "timing.glitch_min",
                &format!(
                    "glitch_min ({}) is greater than glitch_max ({})",
                    humantime::format_duration(timing.glitch_min),
                    humantime::format_duration(timing.glitch_max),
                ),
            );
        }

        if timing.typewriter_speed.is_zero() {
            self.add_warning(
                "timing.typewriter_speed",
                "zero typing delay reveals boot text instantly",
            );
        }
        if timing.briefing_speed.is_zero() {
            self.add_warning(
                "timing.briefing_speed",
                "zero typing delay reveals the briefing instantly",
            );
        }
    }

    fn validate_effects(&mut self, script: &Script) {
        let effects = &script.effects;
        if !effects.enabled {
            return;
        }
        self.check_effect_bound(effects.start_delay, "effects.start_delay");
        self.validate_flicker(&effects.scanline, "effects.scanline");
        self.validate_flicker(&effects.screen, "effects.screen");
    }

    fn validate_flicker(&mut self, flicker: &Flicker, base_path: &str) {
        self.check_effect_bound(flicker.interval, &format!("{base_path}.interval"));
        self.check_effect_bound(flicker.duration, &format!("{base_path}.duration"));
        if flicker.interval == Duration::ZERO {
            self.add_error(
                &format!("{base_path}.interval"),
                "interval must be greater than zero",
            );
        }
        if !(0.0..=1.0).contains(&flicker.probability) {
            self.add_error(
                &format!("{base_path}.probability"),
                &format!("probability {} is outside 0.0..=1.0", flicker.probability),
            );
        }
        if flicker.duration >= flicker.interval && !flicker.interval.is_zero() {
            self.add_warning(
                &format!("{base_path}.duration"),
                "flicker lasts as long as its interval",
            );
        }
    }

    fn check_effect_bound(&mut self, value: Duration, path: &str) {
        if value > MAX_EFFECT_DURATION {
            self.add_error(
                path,
                &format!(
                    "{} exceeds the {} limit",
                    humantime::format_duration(value),
                    humantime::format_duration(MAX_EFFECT_DURATION),
                ),
            );
        }
    }

    fn validate_missions(&mut self, script: &Script) {
        let catalog = &script.missions;

        for protocol in Protocol::ALL {
            let base_path = format!("missions.mission{}", protocol.number());
            let levels = catalog.levels(protocol);

            if levels.is_empty() {
                self.add_error(&base_path, "protocol has no levels");
            }

            for (level, url) in levels {
                let path = format!("{base_path}.{level}");
                if !(url.starts_with("https://") || url.starts_with("http://")) {
                    self.add_error(&path, &format!("'{url}' is not an http(s) URL"));
                }
                if level.to_lowercase() != *level {
                    self.add_warning(&path, "level ids are matched in lowercase");
                }
                if RESERVED_WORDS.contains(&level.as_str()) {
                    self.add_warning(&path, "level id shadows a command word");
                }
            }
        }

        let one: BTreeSet<&String> = catalog.levels(Protocol::One).keys().collect();
        let two: BTreeSet<&String> = catalog.levels(Protocol::Two).keys().collect();
        for level in one.symmetric_difference(&two) {
            let missing_from = if one.contains(level) { 2 } else { 1 };
            self.add_error(
                &format!("missions.mission{missing_from}"),
                &format!("level '{level}' is missing"),
            );
        }
    }

    // ========================================================================
    // Helper Methods
    // ========================================================================

    fn add_error(&mut self, path: &str, message: &str) {
        self.errors.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Error,
        });
    }

    fn add_warning(&mut self, path: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Warning,
        });
    }
}

// ============================================================================
// Tests
// ============================================================================
