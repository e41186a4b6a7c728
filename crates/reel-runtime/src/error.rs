//! Runtime error types.

use thiserror::Error;

use reel_core::PluginError;

use crate::config::ConfigError;

/// Errors that can occur during runtime operations.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Configuration could not be loaded or is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A plugin failed to load or instantiate.
    #[error("Plugin error: {0}")]
    Plugin(#[from] PluginError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
