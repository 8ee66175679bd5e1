//! Rendering surface
//!
//! The phase controller never touches the terminal directly. It emits a
//! stream of [`Directive`]s addressed to named [`Target`]s, and a
//! [`Renderer`] applies them to whatever surface it owns.
//!
//! # Architecture
//!
//! - [`Directive`] - One display instruction (show phase, append text, toggle class, cue)
//! - [`Renderer`] - Consumer trait; reports targets it lacks via `RenderError::MissingTarget`
//! - [`TerminalRenderer`] - ANSI terminal surface used by `aurora run`
//! - [`RecordingRenderer`] - In-memory surface for test harnesses

pub mod recording;
pub mod terminal;

pub use recording::RecordingRenderer;
pub use terminal::TerminalRenderer;

use crate::error::RenderResult;
use crate::phase::Phase;

/// Named display element a directive is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// Boot sequence text block
    BootText,
    /// System interface panel (glitch effects apply here)
    SystemInterface,
    /// System status indicator
    SystemStatus,
    /// Text inside the system status indicator
    StatusText,
    /// Error message block revealed during the crisis
    ErrorMessages,
    /// Briefing narrative text
    BriefingText,
    /// Briefing acknowledgement button
    ReadyButton,
    /// Skip-intro button
    SkipButton,
    /// Level selection modal
    LevelModal,
    /// Title of the level selection modal
    ModalTitle,
    /// Vault unlock animation modal
    VaultModal,
    /// Access code prompt
    AccessPrompt,
    /// Access code feedback message
    AccessMessage,
    /// Hub notices (unknown commands, hints)
    Notice,
    /// Destination shown when redirecting to a mission
    Redirect,
    /// Scanline overlay
    Scanlines,
    /// Whole screen (brightness flicker)
    Screen,
}

impl Target {
    /// Returns the stable kebab-case name of this target.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::BootText => "boot-text",
            Self::SystemInterface => "system-interface",
            Self::SystemStatus => "system-status",
            Self::StatusText => "status-text",
            Self::ErrorMessages => "error-messages",
            Self::BriefingText => "briefing-text",
            Self::ReadyButton => "ready-button",
            Self::SkipButton => "skip-button",
            Self::LevelModal => "level-modal",
            Self::ModalTitle => "modal-title",
            Self::VaultModal => "vault-modal",
            Self::AccessPrompt => "access-prompt",
            Self::AccessMessage => "access-message",
            Self::Notice => "notice",
            Self::Redirect => "redirect",
            Self::Scanlines => "scanlines",
            Self::Screen => "screen",
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Presentation class toggled on a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Class {
    /// Element is not displayed
    Hidden,
    /// Critical alert styling
    Critical,
    /// Signal instability effect
    GlitchActive,
    /// Reduced opacity (scanline flicker)
    Dimmed,
    /// Raised brightness (screen flicker)
    Brightened,
}

/// Named sound cue. Synthesis is up to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cue {
    /// One typed character
    Typing,
    /// Crisis alarm
    Alarm,
    /// Button press
    Ui,
    /// Access granted
    Success,
    /// Access denied
    Error,
}

/// One display instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Hide every phase panel and show the given one
    ShowPhase(Phase),
    /// Remove all text from a target
    ClearText(Target),
    /// Start a new line inside a target
    NewLine(Target),
    /// Append a single character
    AppendChar(Target, char),
    /// Append a run of text at once
    AppendText(Target, String),
    /// Replace the target's text
    SetText(Target, String),
    /// Add a class to a target
    AddClass(Target, Class),
    /// Remove a class from a target
    RemoveClass(Target, Class),
    /// Flip a class on a target
    ToggleClass(Target, Class),
    /// Play a sound cue
    Cue(Cue),
}

impl Directive {
    /// Shorthand for removing [`Class::Hidden`].
    #[must_use]
    pub const fn show(target: Target) -> Self {
        Self::RemoveClass(target, Class::Hidden)
    }

    /// Shorthand for adding [`Class::Hidden`].
    #[must_use]
    pub const fn hide(target: Target) -> Self {
        Self::AddClass(target, Class::Hidden)
    }

    /// Returns the target this directive addresses, if any.
    #[must_use]
    pub const fn target(&self) -> Option<Target> {
        match self {
            Self::ClearText(t)
            | Self::NewLine(t)
            | Self::AppendChar(t, _)
            | Self::AppendText(t, _)
            | Self::SetText(t, _)
            | Self::AddClass(t, _)
            | Self::RemoveClass(t, _)
            | Self::ToggleClass(t, _) => Some(*t),
            Self::ShowPhase(_) | Self::Cue(_) => None,
        }
    }
}

/// Consumer of display directives.
///
/// Implementations return `RenderError::MissingTarget` for targets they do
/// not have. Callers treat that as a skipped step, never as a failure.
pub trait Renderer {
    /// Applies a single directive to the surface.
    ///
    /// # Errors
    ///
    /// Returns `RenderError::MissingTarget` if the surface has no such
    /// target, or `RenderError::Io` if writing to the surface failed.
    fn apply(&mut self, directive: &Directive) -> RenderResult;
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn apply(&mut self, directive: &Directive) -> RenderResult {
        (**self).apply(directive)
    }
}
