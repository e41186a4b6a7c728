//! Configuration module for the Reel runtime.
//!
//! Figment-based loading and validation of player settings, the
//! plugin reference → options mapping, and logging options.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    LogFormat, LogLevel, LogOutput, LoggingConfig, PlayerConfig, ReelConfig, SpanEventConfig,
};
pub use validation::validate_config;
