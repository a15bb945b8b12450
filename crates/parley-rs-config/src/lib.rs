//! Configuration models and layered config loading.
//!
//! This crate owns the parley config schema, validation, environment
//! overrides and the credential checks performed at startup.

mod error;
mod loader;
mod model;

/// Public error type returned by config loading and validation APIs.
pub use error::ConfigError;
/// Layered config types and loader options.
pub use loader::{ConfigLayer, ConfigLayerSource, LayeredConfig, LayeredConfigOptions};
/// Configuration schema models.
pub use model::*;
