//! Configuration schema definitions.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReelConfig {
    /// Settings of the player that hosts the plugins.
    #[serde(default)]
    pub player: PlayerConfig,

    /// Plugin reference → per-plugin configuration mapping.
    ///
    /// ```toml
    /// [plugins."https://cdn.example.com/logo.js"]
    /// position = "top-right"
    ///
    /// [plugins.related]
    /// ```
    #[serde(default)]
    pub plugins: BTreeMap<String, Value>,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Player settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Player id, prefixed to every plugin mount element id.
    #[serde(default = "default_player_id")]
    pub id: String,

    /// Location of the document the player lives in; relative plugin
    /// references are resolved against it.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Player version checked against each plugin's minimum version.
    #[serde(default = "default_player_version")]
    pub version: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            id: default_player_id(),
            base_url: default_base_url(),
            version: default_player_version(),
        }
    }
}

fn default_player_id() -> String {
    "player".to_string()
}

fn default_base_url() -> String {
    "http://localhost/".to_string()
}

fn default_player_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

// =============================================================================
// Logging
// =============================================================================

/// Log level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Returns the level as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Converts to the `tracing` level.
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Requires the `json-log` feature; falls back to compact otherwise.
    Json,
}

/// Log destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpanEventConfig {
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub enter: bool,
    #[serde(default)]
    pub exit: bool,
    #[serde(default)]
    pub close: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Global log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Line format.
    #[serde(default)]
    pub format: LogFormat,

    /// Destination.
    #[serde(default)]
    pub output: LogOutput,

    /// Log file, used when `output = "file"`.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    /// Span events to log.
    #[serde(default)]
    pub span_events: SpanEventConfig,

    /// Include thread ids.
    #[serde(default)]
    pub thread_ids: bool,

    /// Include source file and line.
    #[serde(default)]
    pub file_location: bool,

    /// Per-module level overrides, e.g. `reel_framework = "debug"`.
    #[serde(default)]
    pub filters: HashMap<String, LogLevel>,
}
