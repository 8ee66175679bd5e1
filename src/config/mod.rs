//! Script configuration
//!
//! Loads and validates AURORA script files: narrative text, phase timings,
//! atmospheric effects and the mission catalog.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{ConfigLoader, DEFAULT_MAX_CONFIG_SIZE, LoadResult, LoaderOptions};
pub use schema::{EffectsConfig, Flicker, Narrative, Script, Timing};
pub use validation::{ValidationResult, Validator};
