//! Run configuration for dvmdostem.
//!
//! This crate owns the control file schema, comment-tolerant parsing,
//! validation, and layering used by the `dvmdostem` binary and by anything
//! else that needs to know where a run reads and writes its data.

mod access;
mod error;
mod loader;
mod model;

/// Public error type returned by config loading, validation, and lookups.
pub use error::ConfigError;
/// Layered loading entry points.
pub use loader::{ConfigLayer, ConfigLayerSource, ConfigStore, DEFAULT_CTRL_FILE, LoadOptions};
/// Control file schema models.
pub use model::*;
