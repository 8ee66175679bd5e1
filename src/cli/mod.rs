//! Command-line interface
//!
//! Clap argument definitions and command handlers for the `aurora` binary.

pub mod args;
pub mod commands;
