//! Foundation layer - Core abstractions shared by every Reel crate.
//!
//! - Error taxonomy for plugin loading and instantiation
//! - The untyped per-plugin configuration mapping

pub mod config;
pub mod error;

pub use config::{ConfigMap, config_map_from_value};
pub use error::{BoxError, PluginError, PluginResult, SharedError};
