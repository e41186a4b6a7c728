//! # Reel Core
//!
//! Core types shared by the Reel player plugin system.
//!
//! ## Architecture Layers
//!
//! ### Foundation Layer
//!
//! - **Errors**: the plugin error taxonomy ([`PluginError`])
//! - **Configuration**: the untyped per-plugin mapping ([`ConfigMap`])
//!
//! ### Integration Layer
//!
//! Interfaces implemented outside the plugin system:
//! - **Display capabilities**: the host's [`Container`], its overlay
//!   [`DisplayArea`], and the [`MountElement`] created per plugin instance
//! - **Plugin contract**: [`PluginBehavior`], implemented by every plugin
//!
//! ```text
//! ┌──────────────┐  query_class   ┌─────────────┐  append_child  ┌──────────────┐
//! │  Container   │───────────────▶│ DisplayArea │◀───────────────│ MountElement │
//! │   (host)     │                │ (overlays)  │                │  (per plugin)│
//! └──────────────┘                └─────────────┘                └──────────────┘
//! ```

// Architectural layers
pub mod foundation;
pub mod integration;

// Re-export foundation types
pub use foundation::{
    BoxError, ConfigMap, PluginError, PluginResult, SharedError, config_map_from_value,
};

// Re-export integration types
pub use integration::{
    BoxedPlugin, Container, DisplayArea, MountElement, OVERLAYS_CLASS, PLUGIN_CLASS,
    PluginBehavior, Position, RESET_CLASS,
};
