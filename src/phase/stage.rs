//! Suspension points and directive emission.
//!
//! [`Stage`] bundles the renderer with the two inbound channels (user
//! events and cosmetic effects). Every wait in the sequence goes through
//! [`Stage::pause`] or [`Stage::wait_event`], which select against the
//! caller's cancellation token and apply pending effect directives while
//! they wait.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::error::RenderError;
use crate::input::UserEvent;
use crate::render::{Directive, Renderer};

use super::state::PhaseOutcome;

/// Result of waiting for user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Waited {
    /// An event arrived
    Event(UserEvent),
    /// The input source closed
    Closed,
    /// The token was cancelled first
    Interrupted,
}

/// Renderer plus inbound channels, owned by the phase controller.
pub struct Stage<R> {
    renderer: R,
    events: mpsc::UnboundedReceiver<UserEvent>,
    effects: Option<mpsc::UnboundedReceiver<Directive>>,
}

impl<R: Renderer> Stage<R> {
    /// Creates a stage over a renderer and a user event stream.
    pub const fn new(renderer: R, events: mpsc::UnboundedReceiver<UserEvent>) -> Self {
        Self {
            renderer,
            events,
            effects: None,
        }
    }

    /// Attaches the receiving end of the atmospheric effects channel.
    pub fn attach_effects(&mut self, effects: mpsc::UnboundedReceiver<Directive>) {
        self.effects = Some(effects);
    }

    /// Returns the renderer.
    pub const fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Returns the renderer mutably.
    pub const fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Applies a directive. Rendering failures never propagate.
    ///
    /// A missing target is a silently skipped step; any other failure is
    /// logged and the sequence continues.
    pub fn emit(&mut self, directive: Directive) {
        trace!(?directive, "emit");
        match self.renderer.apply(&directive) {
            Ok(()) => {}
            Err(RenderError::MissingTarget(target)) => {
                debug!(%target, "render target missing; step skipped");
            }
            Err(e) => warn!(error = %e, "render failed; continuing"),
        }
    }

    /// Waits for `duration` unless the token is cancelled first.
    ///
    /// Returns [`PhaseOutcome::Interrupted`] without waiting if the token is
    /// already cancelled.
    pub async fn pause(&mut self, duration: Duration, token: &CancellationToken) -> PhaseOutcome {
        if token.is_cancelled() {
            return PhaseOutcome::Interrupted;
        }

        let sleep = tokio::time::sleep(duration);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                biased;
                () = token.cancelled() => return PhaseOutcome::Interrupted,
                () = &mut sleep => return PhaseOutcome::Completed,
                effect = next_effect(&mut self.effects) => self.apply_effect(effect),
            }
        }
    }

    /// Waits for the next user event unless the token is cancelled first.
    pub async fn wait_event(&mut self, token: &CancellationToken) -> Waited {
        loop {
            tokio::select! {
                biased;
                () = token.cancelled() => return Waited::Interrupted,
                event = self.events.recv() => {
                    return event.map_or(Waited::Closed, Waited::Event);
                }
                effect = next_effect(&mut self.effects) => self.apply_effect(effect),
            }
        }
    }

    /// Drops events queued before the caller started listening.
    ///
    /// Returns the number of events discarded.
    pub fn discard_pending_events(&mut self) -> usize {
        let mut discarded = 0;
        while let Ok(event) = self.events.try_recv() {
            debug!(?event, "discarding stale event");
            discarded += 1;
        }
        discarded
    }

    fn apply_effect(&mut self, effect: Option<Directive>) {
        match effect {
            Some(directive) => self.emit(directive),
            None => {
                debug!("effects channel closed");
                self.effects = None;
            }
        }
    }
}

async fn next_effect(effects: &mut Option<mpsc::UnboundedReceiver<Directive>>) -> Option<Directive> {
    match effects {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

impl<R> std::fmt::Debug for Stage<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage")
            .field("effects_attached", &self.effects.is_some())
            .finish_non_exhaustive()
    }
}
