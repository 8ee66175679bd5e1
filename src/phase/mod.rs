//! Phase controller
//!
//! Runs the scripted sequence (boot → system check → crisis → briefing →
//! hub) and lets a skip request cut it short at any suspension point.
//!
//! # Architecture
//!
//! - [`Phase`] - The five stages, in order
//! - [`InterruptSignal`] / [`SkipTrigger`] - Resettable skip token and its write-only handle
//! - [`Stage`] - Renderer plus inbound channels; every wait goes through it
//! - [`TypingTask`] - Typewriter reveal that completes instantly when interrupted
//! - [`PhaseController`] - Owns the current phase and the signal, drives the run

pub mod engine;
pub mod interrupt;
pub mod stage;
pub mod state;
pub mod typing;

pub use engine::PhaseController;
pub use interrupt::{InterruptSignal, InterruptState, SkipTrigger};
pub use stage::{Stage, Waited};
pub use state::{Phase, PhaseOutcome, RunExit, RunReport};
pub use typing::TypingTask;
