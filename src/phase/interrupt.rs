//! Resettable skip signal.
//!
//! A `CancellationToken` cannot be un-cancelled, so the signal holds the
//! current token behind a lock and swaps in a fresh one when the hub is
//! entered. Suspension points take a snapshot of the current token and
//! select against it; a skip cancels exactly the token they hold.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio_util::sync::CancellationToken;

/// The two states of the skip signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptState {
    /// The sequence may be interrupted
    Armed,
    /// A skip has been requested
    Triggered,
}

type Slot = Arc<Mutex<CancellationToken>>;

fn lock(slot: &Slot) -> MutexGuard<'_, CancellationToken> {
    // A poisoned lock still holds a valid token handle
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Skip signal owned by the phase controller.
#[derive(Debug, Default)]
pub struct InterruptSignal {
    slot: Slot,
}

impl InterruptSignal {
    /// Creates an armed signal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> InterruptState {
        if lock(&self.slot).is_cancelled() {
            InterruptState::Triggered
        } else {
            InterruptState::Armed
        }
    }

    /// Returns `true` if a skip has been requested since the last reset.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        self.state() == InterruptState::Triggered
    }

    /// Returns a snapshot of the current token for a suspension point.
    #[must_use]
    pub fn token(&self) -> CancellationToken {
        lock(&self.slot).clone()
    }

    /// Triggers the signal. Returns `true` if this call changed the state.
    pub fn trigger(&self) -> bool {
        trigger_slot(&self.slot)
    }

    /// Re-arms the signal. Returns `true` if it was triggered.
    pub fn reset(&self) -> bool {
        let mut token = lock(&self.slot);
        if token.is_cancelled() {
            *token = CancellationToken::new();
            true
        } else {
            false
        }
    }

    /// Returns a handle that can request a skip and nothing else.
    #[must_use]
    pub fn skip_trigger(&self) -> SkipTrigger {
        SkipTrigger {
            slot: Arc::clone(&self.slot),
        }
    }
}

fn trigger_slot(slot: &Slot) -> bool {
    let token = lock(slot);
    if token.is_cancelled() {
        false
    } else {
        token.cancel();
        true
    }
}

/// Write-only handle for the user's skip action.
///
/// Held by input sources. Requests are idempotent: a second request while
/// the signal is already triggered has no effect.
#[derive(Debug, Clone)]
pub struct SkipTrigger {
    slot: Slot,
}

impl SkipTrigger {
    /// Requests a skip. Returns `true` if this call triggered the signal.
    pub fn request_skip(&self) -> bool {
        trigger_slot(&self.slot)
    }
}
