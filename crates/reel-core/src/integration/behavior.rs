//! The capability interface every plugin instance implements.

use std::any::Any;
use std::sync::Arc;

use crate::integration::display::DisplayArea;

/// Behaviour a plugin factory must produce.
///
/// The plugin system wraps the returned object and adds attach/resize
/// handling around it; the plugin itself only reacts to the resulting calls.
pub trait PluginBehavior: Send + Sync {
    /// Called with the display area's content size on every resize.
    fn resize(&mut self, width: u32, height: u32);

    /// Called once the instance's mount element has been appended to `area`.
    fn on_attach(&mut self, _area: &Arc<dyn DisplayArea>) {
        // Default implementation does nothing
    }

    /// Returns `self` as `Any` so hosts can reach the concrete plugin type.
    fn as_any(&self) -> &dyn Any;
}

/// Boxed plugin behaviour as returned by a factory.
pub type BoxedPlugin = Box<dyn PluginBehavior>;
