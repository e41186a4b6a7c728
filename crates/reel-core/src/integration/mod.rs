//! Integration layer - Interfaces implemented by the host player and plugins.
//!
//! - Display capabilities (container, overlay area, mount element)
//! - The plugin behaviour contract

pub mod behavior;
pub mod display;

pub use behavior::{BoxedPlugin, PluginBehavior};
pub use display::{
    Container, DisplayArea, MountElement, OVERLAYS_CLASS, PLUGIN_CLASS, Position, RESET_CLASS,
};
