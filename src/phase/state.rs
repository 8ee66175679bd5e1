//! Phase and outcome types.

use std::str::FromStr;

use crate::error::PhaseError;

/// One stage of the scripted sequence.
///
/// Phases run in declaration order. `Hub` is terminal for the automated
/// sequence: once entered, only user input moves things along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    /// Line-by-line boot narrative
    Boot,
    /// Countdown dwell on the system interface
    SystemCheck,
    /// Alarm and signal instability
    Crisis,
    /// Narrative briefing awaiting acknowledgement
    Briefing,
    /// Protocol selection
    Hub,
}

impl Phase {
    /// All phases in sequence order.
    pub const ALL: [Self; 5] = [
        Self::Boot,
        Self::SystemCheck,
        Self::Crisis,
        Self::Briefing,
        Self::Hub,
    ];

    /// Returns the stable kebab-case name of this phase.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Boot => "boot",
            Self::SystemCheck => "system-check",
            Self::Crisis => "crisis",
            Self::Briefing => "briefing",
            Self::Hub => "hub",
        }
    }

    /// Returns the phase that follows this one in the automated sequence.
    ///
    /// `Hub` has no successor.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Boot => Some(Self::SystemCheck),
            Self::SystemCheck => Some(Self::Crisis),
            Self::Crisis => Some(Self::Briefing),
            Self::Briefing => Some(Self::Hub),
            Self::Hub => None,
        }
    }

    /// Returns whether a skip request applies while in this phase.
    #[must_use]
    pub const fn is_skippable(self) -> bool {
        !matches!(self, Self::Hub)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Phase {
    type Err = PhaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|p| p.name() == normalized)
            .ok_or_else(|| PhaseError::NotFound {
                name: s.to_string(),
            })
    }
}

/// How a phase runner finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseOutcome {
    /// All steps ran; the sequence may advance
    Completed,
    /// A skip was observed at a suspension point
    Interrupted,
    /// The input source closed while waiting for the user
    InputClosed,
}

impl PhaseOutcome {
    /// Returns `true` for [`PhaseOutcome::Completed`].
    #[must_use]
    pub const fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Why the hub loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunExit {
    /// The user asked to quit
    Quit,
    /// The input source closed
    InputClosed,
}

/// Summary of a full run, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    /// Phase the controller was in when the run ended
    pub final_phase: Phase,
    /// Number of times the hub was entered
    pub hub_entries: u32,
    /// Whether the automated sequence was cut short by a skip
    pub skipped_intro: bool,
    /// Why the run ended
    pub exit: RunExit,
}
