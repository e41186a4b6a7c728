//! Unified error types for the Reel plugin system.
//!
//! Every failure a host can observe while turning a plugin reference into a
//! live instance is a [`PluginError`].  The type is `Clone` because a single
//! load result is shared between every caller awaiting the same plugin.

use std::sync::Arc;

use thiserror::Error;

/// Boxed error returned by external collaborators (loaders, plugin factories).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Reference-counted error cause, cloned into every awaiter of a failed load.
pub type SharedError = Arc<dyn std::error::Error + Send + Sync>;

// =============================================================================
// Plugin Errors
// =============================================================================

/// Errors that can occur while loading or instantiating a plugin.
#[derive(Debug, Clone, Error)]
pub enum PluginError {
    /// The script loader failed to fetch or execute the plugin code.
    #[error("failed to load plugin script '{target}': {cause}")]
    Load {
        /// The resolved fetch target.
        target: String,
        /// Underlying loader failure.
        #[source]
        cause: SharedError,
    },

    /// The plugin code loaded but never called `register_plugin`.
    #[error("\"{reference}\" did not call register_plugin")]
    RegistrationMissing {
        /// The reference the handle was created for.
        reference: String,
    },

    /// The registered factory returned an error.
    #[error("plugin '{name}' failed to construct: {cause}")]
    Construction {
        /// Registered plugin name.
        name: String,
        /// Underlying factory failure.
        #[source]
        cause: SharedError,
    },

    /// No fetch target can be derived for the reference.
    #[error("cannot resolve a fetch target for plugin reference '{reference}'")]
    Unresolvable {
        /// The offending reference.
        reference: String,
    },
}

impl PluginError {
    /// Creates a load error from a loader failure.
    pub fn load(target: impl Into<String>, cause: BoxError) -> Self {
        Self::Load {
            target: target.into(),
            cause: Arc::from(cause),
        }
    }

    /// Creates a registration-missing error for `reference`.
    pub fn registration_missing(reference: impl Into<String>) -> Self {
        Self::RegistrationMissing {
            reference: reference.into(),
        }
    }

    /// Creates a construction error from a factory failure.
    pub fn construction(name: impl Into<String>, cause: BoxError) -> Self {
        Self::Construction {
            name: name.into(),
            cause: Arc::from(cause),
        }
    }

    /// Returns `true` for failures of the load operation itself.
    ///
    /// Load failures are permanent for a handle; build-time failures are not.
    pub fn is_load_failure(&self) -> bool {
        matches!(self, Self::Load { .. } | Self::Unresolvable { .. })
    }
}

/// Result type for plugin operations.
pub type PluginResult<T> = Result<T, PluginError>;
