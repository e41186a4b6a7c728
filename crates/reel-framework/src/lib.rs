//! # Reel Framework
//!
//! Plugin loading and instantiation for the Reel player.
//!
//! This layer provides:
//! - Plugin reference classification and fetch-target resolution
//! - Load-once plugin handles backed by an opaque [`ScriptLoader`]
//! - The registration callback exposed to loaded plugin code
//! - Instance construction with attach-to-player and resize behaviour
//!
//! The host player is reached only through [`HostApi`] and the display
//! capabilities re-exported from `reel-core`.

pub mod plugin;

pub use plugin::{
    BoxedHostApi, BoxedScriptLoader, HostApi, LoadOperation, PathClass, PluginFactory,
    PluginHandle, PluginInstance, PluginRegistrar, PluginState, PluginsModel, Registration,
    ResolutionContext, ScriptLoader, StaticScriptLoader, build_instance, configure_plugin,
    resolve_fetch_target,
};

pub use reel_core::{
    BoxError, BoxedPlugin, ConfigMap, Container, DisplayArea, MountElement, PluginBehavior,
    PluginError, PluginResult, Position,
};
