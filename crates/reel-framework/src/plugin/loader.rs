//! Script loader capability.
//!
//! A [`ScriptLoader`] makes a plugin's code available and runs it.  The
//! plugin system treats it as opaque: it hands over a resolved fetch target
//! plus a [`PluginRegistrar`] and only observes success or failure.  Running
//! code is expected to call [`PluginRegistrar::register_plugin`].
//!
//! [`StaticScriptLoader`] is an in-process implementation for hosts that link
//! their plugins in and map fetch targets to entry functions.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, trace};

use reel_core::BoxError;

use super::handle::PluginRegistrar;

/// Fetches and executes plugin code.
///
/// Each call must run the code at most once; the plugin system guarantees it
/// calls `fetch` at most once per plugin handle.
#[async_trait]
pub trait ScriptLoader: Send + Sync {
    /// Loads the code at `target`, giving it `registrar` to register with.
    async fn fetch(&self, target: &str, registrar: PluginRegistrar) -> Result<(), BoxError>;
}

/// Shared loader handle.
pub type BoxedScriptLoader = Arc<dyn ScriptLoader>;

/// Entry point of a statically linked plugin script.
pub type ScriptEntry = Arc<dyn Fn(&PluginRegistrar) -> Result<(), BoxError> + Send + Sync>;

/// Loader backed by an in-memory table of fetch target → entry point.
///
/// # Example
///
/// ```rust,ignore
/// let loader = StaticScriptLoader::new();
/// loader.insert("https://cdn.example.com/logo.js", |registrar| {
///     registrar.register_plugin("logo", "0.1.0", Logo::create);
///     Ok(())
/// });
/// ```
#[derive(Default)]
pub struct StaticScriptLoader {
    scripts: RwLock<HashMap<String, ScriptEntry>>,
}

impl StaticScriptLoader {
    /// Creates an empty loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps `target` to `entry`, replacing any previous entry.
    pub fn insert<F>(&self, target: impl Into<String>, entry: F)
    where
        F: Fn(&PluginRegistrar) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        let target = target.into();
        trace!(target = %target, "Static plugin script registered");
        self.scripts.write().insert(target, Arc::new(entry));
    }

    /// Returns `true` if a script is mapped at `target`.
    pub fn contains(&self, target: &str) -> bool {
        self.scripts.read().contains_key(target)
    }
}

#[async_trait]
impl ScriptLoader for StaticScriptLoader {
    async fn fetch(&self, target: &str, registrar: PluginRegistrar) -> Result<(), BoxError> {
        let entry = self
            .scripts
            .read()
            .get(target)
            .cloned()
            .ok_or_else(|| format!("no script available at '{target}'"))?;
        debug!(target = %target, "Running static plugin script");
        entry(&registrar)
    }
}
