//! `aurora_terminal` - interruptible narrative mission terminal
//!
//! Plays the A.U.R.O.R.A. recovery sequence (boot, system check, crisis,
//! briefing) on a rendering surface, lets the user skip straight to the
//! mission hub at any point, and gates the second protocol behind an
//! access code.

pub mod cli;
pub mod config;
pub mod effects;
pub mod error;
pub mod gate;
pub mod hub;
pub mod input;
pub mod observability;
pub mod phase;
pub mod render;
