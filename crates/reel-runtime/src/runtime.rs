//! Plugin orchestration for one player.
//!
//! [`PluginRuntime`] ties the plugin system to a host: it owns the
//! [`PluginsModel`], loads every configured plugin concurrently through the
//! host's [`ScriptLoader`](reel_framework::ScriptLoader), and configures
//! each loaded plugin into the player.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use reel_runtime::{PluginRuntime, config::load_config};
//!
//! let config = load_config()?;
//! let runtime = PluginRuntime::from_config(&config, host, loader)?;
//!
//! let report = runtime.setup(&config.plugins).await;
//! runtime.attach_all();
//! runtime.resize_all();
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future;
use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, info, warn};

use reel_core::{ConfigMap, PluginError, PluginResult, config_map_from_value};
use reel_framework::{
    BoxedHostApi, BoxedScriptLoader, LoadOperation, PluginHandle, PluginInstance, PluginsModel,
    ResolutionContext, configure_plugin,
};

use crate::config::{ConfigError, ReelConfig};
use crate::error::RuntimeResult;
use crate::logging;

// =============================================================================
// SetupReport
// =============================================================================

/// A plugin that could not be set up.
#[derive(Debug, Clone)]
pub struct SetupFailure {
    /// Reference as it appears in the configuration.
    pub reference: String,
    pub error: PluginError,
}

/// Outcome of [`PluginRuntime::setup`].
#[derive(Debug, Clone, Default)]
pub struct SetupReport {
    /// Names of the plugins that were configured, in configuration order.
    pub configured: Vec<String>,
    pub failed: Vec<SetupFailure>,
}

impl SetupReport {
    /// Returns `true` if every configured plugin was set up.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

// =============================================================================
// PluginRuntime
// =============================================================================

/// Loads and configures the plugins of one player.
pub struct PluginRuntime {
    api: BoxedHostApi,
    loader: BoxedScriptLoader,
    context: ResolutionContext,
    player_version: String,
    model: PluginsModel,
    instances: RwLock<Vec<Arc<PluginInstance>>>,
}

impl PluginRuntime {
    /// Creates a runtime for the player behind `api`.
    pub fn new(api: BoxedHostApi, loader: BoxedScriptLoader, context: ResolutionContext) -> Self {
        Self {
            api,
            loader,
            context,
            player_version: env!("CARGO_PKG_VERSION").to_string(),
            model: PluginsModel::new(),
            instances: RwLock::new(Vec::new()),
        }
    }

    /// Creates a runtime from configuration and installs logging.
    ///
    /// Uses `player.base_url` as resolution base and `player.version` for
    /// the minimum-version check.
    pub fn from_config(
        config: &ReelConfig,
        api: BoxedHostApi,
        loader: BoxedScriptLoader,
    ) -> RuntimeResult<Self> {
        logging::init_from_config(&config.logging);

        let base_url = &config.player.base_url;
        let context = ResolutionContext::parse(base_url)
            .map_err(|e| ConfigError::invalid_url(base_url, e.to_string()))?;

        info!(
            player   = %api.id(),
            base_url = %base_url,
            version  = %config.player.version,
            plugins  = config.plugins.len(),
            "Plugin runtime initialized from configuration"
        );

        Ok(Self::new(api, loader, context).with_player_version(&config.player.version))
    }

    /// Overrides the player version used for the minimum-version check.
    pub fn with_player_version(mut self, version: impl Into<String>) -> Self {
        self.player_version = version.into();
        self
    }

    /// The plugin handles known to this runtime.
    pub fn model(&self) -> &PluginsModel {
        &self.model
    }

    pub fn context(&self) -> &ResolutionContext {
        &self.context
    }

    pub fn player_version(&self) -> &str {
        &self.player_version
    }

    /// Loads the plugin at `reference`, creating its handle if needed.
    pub fn load_plugin(&self, reference: &str) -> LoadOperation {
        self.model
            .add_plugin(reference)
            .load(&self.loader, &self.context)
    }

    /// Configures a loaded plugin into the player and keeps the instance.
    ///
    /// A plugin whose minimum version is above the player version is
    /// reported and configured anyway.
    pub fn configure(
        &self,
        handle: &PluginHandle,
        options: &ConfigMap,
    ) -> PluginResult<Arc<PluginInstance>> {
        if !handle.is_compatible(&self.player_version) {
            warn!(
                reference = %handle.reference(),
                required  = handle.minimum_version().as_deref().unwrap_or_default(),
                player    = %self.player_version,
                "Plugin requires a newer player version"
            );
        }

        let instance = configure_plugin(handle, options, Arc::clone(&self.api))?;
        self.instances.write().push(Arc::clone(&instance));
        Ok(instance)
    }

    /// Loads every plugin in `plugins` concurrently, then configures each
    /// one that loaded.
    ///
    /// Failures are collected in the report; they never stop the other
    /// plugins.  Non-mapping option values are replaced with an empty map.
    pub async fn setup(&self, plugins: &BTreeMap<String, Value>) -> SetupReport {
        let pending = plugins.iter().map(|(reference, options)| {
            let options = config_map_from_value(options).unwrap_or_else(|| {
                warn!(reference = %reference, "Plugin options are not a mapping, ignoring them");
                ConfigMap::new()
            });
            let load = self.load_plugin(reference);
            async move { (reference, load.await, options) }
        });
        let loaded = future::join_all(pending).await;

        let mut report = SetupReport::default();
        for (reference, result, options) in loaded {
            match result.and_then(|handle| self.configure(&handle, &options)) {
                Ok(instance) => {
                    debug!(reference = %reference, plugin = %instance.name(), "Plugin configured");
                    report.configured.push(instance.name().to_string());
                }
                Err(error) => {
                    warn!(reference = %reference, error = %error, "Plugin setup failed");
                    report.failed.push(SetupFailure {
                        reference: reference.clone(),
                        error,
                    });
                }
            }
        }

        info!(
            configured = report.configured.len(),
            failed     = report.failed.len(),
            "Plugin setup finished"
        );
        report
    }

    /// Instances configured so far.
    pub fn instances(&self) -> Vec<Arc<PluginInstance>> {
        self.instances.read().clone()
    }

    /// Attaches every instance to the player's overlay layer.
    pub fn attach_all(&self) {
        for instance in self.instances.read().iter() {
            instance.add_to_player();
        }
    }

    /// Resizes every attached instance to its display area.
    pub fn resize_all(&self) {
        for instance in self.instances.read().iter() {
            instance.resize_handler();
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
