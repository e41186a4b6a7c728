//! Plugin system for the Reel player.
//!
//! # Architecture
//!
//! A plugin reference (URL, relative path, or short identifier) becomes a
//! live, attached plugin instance in four steps:
//!
//! 1. [`PathClass::classify`] decides how the reference is resolved.
//! 2. [`PluginHandle::load`] fetches and runs the plugin's code through a
//!    [`ScriptLoader`], exactly once per handle.
//! 3. The running code calls [`PluginRegistrar::register_plugin`], storing a
//!    name, minimum player version and [`PluginFactory`] on the handle.
//! 4. [`build_instance`] / [`configure_plugin`] call the factory and wrap the
//!    product in a [`PluginInstance`] with attach and resize behaviour.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use reel_framework::plugin::*;
//!
//! let model = PluginsModel::new();
//! let handle = model.add_plugin("plugins/logo.js");
//! let handle = handle.load(&loader, &ResolutionContext::parse("https://host/app/")?).await?;
//!
//! let instance = configure_plugin(&handle, &config, api)?;
//! instance.add_to_player();
//! instance.resize_handler();
//! ```
//!
//! # Writing a plugin
//!
//! ```rust,ignore
//! struct Logo { mount: Arc<MountElement> }
//!
//! impl PluginBehavior for Logo {
//!     fn resize(&mut self, width: u32, height: u32) { /* … */ }
//!     fn as_any(&self) -> &dyn Any { self }
//! }
//!
//! fn entry(registrar: &PluginRegistrar) -> Result<(), BoxError> {
//!     registrar.register_plugin("logo", "0.1.0", |_api, _config, mount| {
//!         Ok(Box::new(Logo { mount }) as BoxedPlugin)
//!     });
//!     Ok(())
//! }
//! ```

// ─── Submodules ──────────────────────────────────────────────────────────────
pub mod builder;
pub mod handle;
pub mod host;
pub mod loader;
pub mod model;
pub mod path;
pub mod version;

// ─── Re-exports from submodules ──────────────────────────────────────────────
pub use builder::{PluginInstance, build_instance, configure_plugin, mount_element_id};
pub use handle::{
    LoadOperation, PluginFactory, PluginHandle, PluginRegistrar, PluginState, Registration,
};
pub use host::{BoxedHostApi, HostApi};
pub use loader::{BoxedScriptLoader, ScriptEntry, ScriptLoader, StaticScriptLoader};
pub use model::PluginsModel;
pub use path::{PathClass, ResolutionContext, resolve_fetch_target};
pub use version::{compare_versions, satisfies_minimum};
