//! The narrow slice of the host player the plugin system talks to.

use std::sync::Arc;

use reel_core::Container;

use super::builder::PluginInstance;

/// Host player capabilities consumed while building and registering plugins.
pub trait HostApi: Send + Sync {
    /// Player id, used to derive mount element ids.
    fn id(&self) -> &str;

    /// The player's root container, or `None` before it exists.
    fn container(&self) -> Option<Arc<dyn Container>>;

    /// Stores a configured plugin instance under its registered name.
    fn add_plugin(&self, name: &str, instance: Arc<PluginInstance>);
}

/// Shared host handle passed to plugin factories.
pub type BoxedHostApi = Arc<dyn HostApi>;
