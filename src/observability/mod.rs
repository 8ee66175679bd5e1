//! Observability
//!
//! Structured logging for the terminal. Logs go to stderr; stdout belongs
//! to the renderer.

pub mod logging;

pub use logging::{LogFormat, color_enabled, init_logging};
