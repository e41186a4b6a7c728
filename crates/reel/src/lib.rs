//! # Reel
//!
//! Plugin loading and instantiation for embeddable media players.
//!
//! ## Overview
//!
//! A player is configured with a mapping of plugin references to options.
//! Each reference is a URL, a path relative to the player's page, or a short
//! identifier of a plugin the host already knows.  Reel fetches each plugin
//! once, lets its code register a factory, builds an instance with its own
//! mount element, and attaches it to the player's overlay layer.
//!
//! ```text
//! ┌──────────┐   classify    ┌──────────────┐  fetch once   ┌──────────────┐
//! │ reference│──────────────▶│ PluginHandle │──────────────▶│ ScriptLoader │
//! └──────────┘               └──────┬───────┘               └──────┬───────┘
//!                                   │  register_plugin(name, ver, factory)
//!                                   │◀─────────────────────────────┘
//!                                   ▼
//!                            ┌────────────────┐  add_to_player  ┌──────────┐
//!                            │ PluginInstance │────────────────▶│ overlays │
//!                            └────────────────┘                 └──────────┘
//! ```
//!
//! - **reel-core**: errors, the display capabilities the host implements, the
//!   behaviour trait plugins implement
//! - **reel-framework**: path classification, load-once handles, registration,
//!   instance construction
//! - **reel-runtime**: configuration, logging, and [`PluginRuntime`](runtime::PluginRuntime)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use reel::prelude::*;
//!
//! let loader = StaticScriptLoader::new();
//! loader.insert("https://example.com/plugins/logo.js", logo::entry);
//!
//! let config = load_config()?;
//! let runtime = PluginRuntime::from_config(&config, host, Arc::new(loader))?;
//! let report = runtime.setup(&config.plugins).await;
//! runtime.attach_all();
//! ```
//!
//! ## Features
//!
//! - `toml-config`: read `reel.toml` (default)
//! - `yaml-config`: read `reel.yaml`
//! - `json-log`: JSON log lines

pub use reel_core as core;
pub use reel_framework as framework;
pub use reel_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use reel::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use reel_runtime::config::{ReelConfig, load_config, load_config_from_file};
    pub use reel_runtime::{PluginRuntime, SetupReport};

    // Plugin system
    pub use reel_framework::{
        BoxedHostApi, BoxedScriptLoader, HostApi, PathClass, PluginHandle, PluginInstance,
        PluginRegistrar, PluginState, PluginsModel, ResolutionContext, ScriptLoader,
        StaticScriptLoader,
    };

    // Host and plugin capabilities
    pub use reel_core::{
        BoxError, BoxedPlugin, ConfigMap, Container, DisplayArea, MountElement, PluginBehavior,
        PluginError, PluginResult, Position,
    };

    // Logging
    pub use reel_runtime::prelude::*;
}
