//! Reel Runtime - orchestration layer for the Reel player plugin system.
//!
//! This crate provides:
//! - Figment-based configuration (`reel.toml` / `reel.yaml` / `REEL_*`)
//! - Logging setup on top of `tracing-subscriber`
//! - [`PluginRuntime`], which loads every configured plugin concurrently and
//!   configures the ones that loaded into the host player
//!
//! ```ignore
//! use reel_runtime::{PluginRuntime, config::load_config};
//!
//! let config = load_config()?;
//! let runtime = PluginRuntime::from_config(&config, host, loader)?;
//!
//! let report = runtime.setup(&config.plugins).await;
//! for failure in &report.failed {
//!     eprintln!("{}: {}", failure.reference, failure.error);
//! }
//! runtime.attach_all();
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

// Re-exports
pub use config::{ConfigError, ConfigLoader, ConfigResult, ReelConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{PluginRuntime, SetupFailure, SetupReport};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
///
/// Provides the `tracing` logging macros and `Level`.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
