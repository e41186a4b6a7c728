//! Per-session registry of plugin handles.
//!
//! [`PluginsModel`] guarantees that a reference maps to exactly one
//! [`PluginHandle`] for the lifetime of the host session, which is what makes
//! the handle's load-once memoization hold across the whole player.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use reel_core::{BoxError, BoxedPlugin, ConfigMap, MountElement};

use super::handle::PluginHandle;
use super::host::BoxedHostApi;

/// Registry of every plugin reference the host has encountered.
#[derive(Debug, Default)]
pub struct PluginsModel {
    plugins: RwLock<Vec<Arc<PluginHandle>>>,
}

impl PluginsModel {
    /// Creates an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the handle for `reference`, creating it on first sight.
    pub fn add_plugin(&self, reference: &str) -> Arc<PluginHandle> {
        if let Some(existing) = self.get_plugin(reference) {
            return existing;
        }

        let mut plugins = self.plugins.write();
        // Re-check under the write lock.
        if let Some(existing) = plugins.iter().find(|p| p.reference() == reference) {
            return Arc::clone(existing);
        }
        let handle = PluginHandle::new(reference);
        debug!(
            reference  = %reference,
            path_class = %handle.path_class(),
            "Plugin handle created"
        );
        plugins.push(Arc::clone(&handle));
        handle
    }

    /// Returns the handle for `reference`, if one exists.
    pub fn get_plugin(&self, reference: &str) -> Option<Arc<PluginHandle>> {
        self.plugins
            .read()
            .iter()
            .find(|p| p.reference() == reference)
            .cloned()
    }

    /// Routes a registration to the handle for `reference`.
    ///
    /// Creates the handle if needed, so hosts can pre-register short
    /// identifiers that are never fetched.
    pub fn register_plugin<F>(
        &self,
        reference: &str,
        name: impl Into<String>,
        minimum_version: impl Into<String>,
        factory: F,
    ) -> Arc<PluginHandle>
    where
        F: Fn(BoxedHostApi, ConfigMap, Arc<MountElement>) -> Result<BoxedPlugin, BoxError>
            + Send
            + Sync
            + 'static,
    {
        let handle = self.add_plugin(reference);
        handle.register_plugin(name, minimum_version, factory);
        handle
    }

    /// Snapshot of all handles in first-seen order.
    pub fn plugins(&self) -> Vec<Arc<PluginHandle>> {
        self.plugins.read().clone()
    }

    /// Number of known references.
    pub fn len(&self) -> usize {
        self.plugins.read().len()
    }

    /// Returns `true` if no reference has been seen yet.
    pub fn is_empty(&self) -> bool {
        self.plugins.read().is_empty()
    }
}
