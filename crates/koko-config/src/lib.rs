//! Configuration models and layered config loading for Koko.
//!
//! This crate owns the Koko config schema, validation, and layer-merging
//! logic used by the server binary and the SDK surface.

mod error;
mod loader;
mod model;

/// Public error type returned by config loading and validation APIs.
pub use error::ConfigError;
/// Layered config types and loader options.
pub use loader::{ConfigLayer, ConfigLayerSource, LayeredConfig, LayeredConfigOptions};
/// Configuration schema models.
pub use model::*;
