//! Typewriter reveal of a text string.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::render::{Cue, Directive, Renderer, Target};

use super::stage::Stage;
use super::state::PhaseOutcome;

/// Character-by-character reveal of `text` into `target`.
///
/// Each step appends one character and plays the typing cue, then waits
/// `delay`. A cancelled token is observed between steps only, so the
/// character in flight always lands. On cancellation the remaining text is
/// appended in one piece: the target never keeps a truncated prefix.
#[derive(Debug, Clone, Copy)]
pub struct TypingTask<'a> {
    target: Target,
    text: &'a str,
    delay: Duration,
}

impl<'a> TypingTask<'a> {
    /// Creates a reveal of `text` into `target` at `delay` per character.
    #[must_use]
    pub const fn new(target: Target, text: &'a str, delay: Duration) -> Self {
        Self {
            target,
            text,
            delay,
        }
    }

    /// Runs the reveal to completion or until the token is cancelled.
    ///
    /// Appends to the target; callers clear it first when needed.
    pub async fn run<R: Renderer>(
        self,
        stage: &mut Stage<R>,
        token: &CancellationToken,
    ) -> PhaseOutcome {
        for (offset, ch) in self.text.char_indices() {
            if token.is_cancelled() {
                self.finish(stage, offset);
                return PhaseOutcome::Interrupted;
            }

            stage.emit(Directive::AppendChar(self.target, ch));
            stage.emit(Directive::Cue(Cue::Typing));

            if stage.pause(self.delay, token).await == PhaseOutcome::Interrupted {
                self.finish(stage, offset + ch.len_utf8());
                return PhaseOutcome::Interrupted;
            }
        }
        PhaseOutcome::Completed
    }

    fn finish<R: Renderer>(&self, stage: &mut Stage<R>, offset: usize) {
        let rest = &self.text[offset..];
        if !rest.is_empty() {
            stage.emit(Directive::AppendText(self.target, rest.to_string()));
        }
    }
}
