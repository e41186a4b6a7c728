//! Configuration loader using figment.
//!
//! Sources are layered, later ones overriding earlier ones:
//!
//! 1. Built-in defaults
//! 2. Profile-specific config file (`reel.{profile}.toml` / `reel.{profile}.yaml`)
//! 3. Main config file (`reel.toml` / `reel.yaml`)
//! 4. Environment variables (`REEL_*`)
//! 5. Programmatic overrides ([`ConfigLoader::merge`], [`ConfigLoader::set`])
//!
//! # Feature Flags
//!
//! - `toml-config` *(default)*: enables TOML configuration files (`reel.toml`, `config.toml`)
//! - `yaml-config`: enables YAML configuration files (`reel.yaml`, `reel.yml`, etc.)
//!
//! Without either feature only defaults, programmatic merges and environment
//! variables are read.
//!
//! # Environment Variable Mapping
//!
//! Variables use the `REEL_` prefix with `__` as the nesting separator:
//!
//! - `REEL_LOGGING__LEVEL=debug` → `logging.level = "debug"`
//! - `REEL_PLAYER__BASE_URL=https://example.com/` → `player.base_url`
//!
//! # Example
//!
//! ```rust,ignore
//! use reel_runtime::config::ConfigLoader;
//!
//! let config = ConfigLoader::new()
//!     .profile("production")
//!     .file("./config/reel.toml")
//!     .load()?;
//! ```

use std::path::{Path, PathBuf};

use figment::{Figment, Provider};
#[cfg(any(feature = "yaml-config", feature = "toml-config"))]
use figment::providers::Format;
#[cfg(feature = "toml-config")]
use figment::providers::Toml;
#[cfg(feature = "yaml-config")]
use figment::providers::Yaml;
use figment::providers::{Env, Serialized};
use serde::Serialize;
use tracing::{debug, info, trace, warn};

use super::error::{ConfigError, ConfigResult};
use super::schema::ReelConfig;
use super::validation::validate_config;

/// Configuration profile for environment-specific settings.
#[derive(Debug, Clone, Default)]
pub enum Profile {
    /// Development profile (default).
    #[default]
    Development,
    /// Production profile.
    Production,
    /// Custom profile name.
    Custom(String),
}

impl Profile {
    /// Returns the profile name as a string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Custom(name) => name,
        }
    }

    /// Parses a profile name; `prod`/`dev` are accepted as short forms.
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "development" | "dev" => Self::Development,
            other => Self::Custom(other.to_string()),
        }
    }

    /// Reads `REEL_PROFILE`, defaulting to Development.
    pub fn from_env() -> Self {
        std::env::var("REEL_PROFILE")
            .map(|p| Self::parse(&p))
            .unwrap_or_default()
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Configuration loader with figment-based multi-source support.
///
/// # Example
///
/// ```rust,ignore
/// let config = ConfigLoader::new()
///     .file("reel.yaml")
///     .with_env()
///     .load()?;
/// ```
pub struct ConfigLoader {
    /// Base figment instance.
    figment: Figment,
    /// Configuration profile.
    profile: Profile,
    /// Search paths for configuration files.
    search_paths: Vec<PathBuf>,
    /// Whether to load environment variables.
    load_env: bool,
    /// Specific config file to load (overrides search).
    config_file: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a new configuration loader with defaults.
    pub fn new() -> Self {
        Self {
            figment: Figment::new(),
            profile: Profile::from_env(),
            search_paths: Vec::new(),
            load_env: true,
            config_file: None,
        }
    }

    /// Sets the configuration profile.
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Profile::parse(&profile.into());
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.search_paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Adds current directory to search paths.
    pub fn with_current_dir(self) -> Self {
        if let Ok(cwd) = std::env::current_dir() {
            self.search_path(cwd)
        } else {
            self
        }
    }

    /// Sets a specific configuration file to load.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Enables loading environment variables (default: true).
    pub fn with_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Merges an override layer on top of files and environment.
    ///
    /// Only the keys `provider` emits are overridden, so pass a partial
    /// provider; a full `Serialized::defaults(ReelConfig { .. })` resets
    /// every file and environment value.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let config = ConfigLoader::new()
    ///     .merge(Toml::string("[player]\nid = \"main\""))
    ///     .load()?;
    /// ```
    pub fn merge<P: Provider>(mut self, provider: P) -> Self {
        self.figment = self.figment.merge(provider);
        self
    }

    /// Overrides the single value at dotted `key`, e.g. `"player.id"`.
    pub fn set<T: Serialize>(self, key: &str, value: T) -> Self {
        self.merge(Serialized::default(key, value))
    }

    /// Loads, validates and returns the configuration.
    pub fn load(self) -> ConfigResult<ReelConfig> {
        let profile = self.profile.clone();
        let figment = self.build_figment()?;

        let config: ReelConfig = figment.extract().map_err(|e| {
            ConfigError::ParseError(format!("Failed to extract configuration: {e}"))
        })?;

        validate_config(&config)?;

        debug!(
            profile       = %profile,
            player        = %config.player.id,
            plugins       = config.plugins.len(),
            logging_level = %config.logging.level,
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Builds the figment instance with all sources.
    fn build_figment(mut self) -> ConfigResult<Figment> {
        // Start with defaults
        let mut figment = Figment::from(Serialized::defaults(ReelConfig::default()));
        let overrides = std::mem::take(&mut self.figment);

        // Load config files
        if let Some(path) = self.config_file {
            // Load specific file
            if path.exists() {
                info!(path = %path.display(), "Loading configuration file");
                figment = Self::merge_config_file(figment, &path)?;
            } else {
                return Err(ConfigError::FileNotFound(path.clone()));
            }
        } else {
            // Search for config files
            figment = self.load_config_files(figment);
        }

        // Load environment variables
        if self.load_env {
            trace!("Loading environment variables with REEL_ prefix");
            figment = figment.merge(Env::prefixed("REEL_").ignore(&["PROFILE"]).split("__"));
        }

        // Programmatic overrides win over every other source
        Ok(figment.merge(overrides))
    }

    /// Merges a single config file into the figment, dispatching on file extension.
    ///
    /// Only extensions enabled via feature flags are accepted.
    fn merge_config_file(figment: Figment, path: &Path) -> ConfigResult<Figment> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match ext {
            #[cfg(feature = "toml-config")]
            "toml" => Ok(figment.merge(Toml::file(path))),
            #[cfg(feature = "yaml-config")]
            "yaml" | "yml" => Ok(figment.merge(Yaml::file(path))),
            _ => Err(ConfigError::ParseError(format!(
                "Unsupported or disabled configuration file format: .{ext}"
            ))),
        }
    }

    /// Resolves the effective list of search paths: the explicit ones, or
    /// the current directory followed by `<user config dir>/reel`.
    fn resolve_search_paths(&self) -> Vec<PathBuf> {
        if self.search_paths.is_empty() {
            let mut paths = Vec::new();
            if let Ok(cwd) = std::env::current_dir() {
                paths.push(cwd);
            }
            if let Some(config_dir) = dirs::config_dir() {
                paths.push(config_dir.join("reel"));
            }
            paths
        } else {
            self.search_paths.clone()
        }
    }

    /// Common search logic for a single file format.
    ///
    /// Iterates `search_paths × base_names`, tries a profile-specific variant first, then the
    /// base file. Returns `(figment, true)` as soon as a base file is found (early return), or
    /// `(figment, false)` if nothing was located.
    #[cfg(any(feature = "toml-config", feature = "yaml-config"))]
    fn load_format_files<F>(
        &self,
        mut figment: Figment,
        search_paths: &[PathBuf],
        base_names: &[&str],
        merge_fn: F,
    ) -> (Figment, bool)
    where
        F: Fn(Figment, &Path) -> Figment,
    {
        for search_path in search_paths {
            for base_name in base_names {
                if let Some(dot) = base_name.rfind('.') {
                    let stem = &base_name[..dot];
                    let ext = &base_name[dot + 1..];

                    // Profile-specific: e.g. reel.production.toml
                    let profile_name = format!("{}.{}.{}", stem, self.profile.as_str(), ext);
                    let profile_path = search_path.join(&profile_name);
                    if profile_path.exists() {
                        debug!(path = %profile_path.display(), "Loading profile-specific config");
                        figment = merge_fn(figment, &profile_path);
                    }

                    // Base file
                    let base_path = search_path.join(base_name);
                    if base_path.exists() {
                        info!(path = %base_path.display(), "Loading configuration file");
                        figment = merge_fn(figment, &base_path);
                        return (figment, true);
                    }
                }
            }
        }
        (figment, false)
    }

    /// Searches for and loads configuration files from search paths.
    ///
    /// Which file formats are attempted is controlled by the `toml-config` and `yaml-config`
    /// feature flags.  Each enabled format is searched independently.
    fn load_config_files(&self, mut figment: Figment) -> Figment {
        let search_paths = self.resolve_search_paths();
        let mut found = false;

        #[cfg(feature = "toml-config")]
        {
            let (f, ok) = self.load_format_files(
                figment,
                &search_paths,
                &["reel.toml", "config.toml"],
                |fig, path| fig.merge(Toml::file(path)),
            );
            figment = f;
            found |= ok;
        }

        #[cfg(feature = "yaml-config")]
        {
            let (f, ok) = self.load_format_files(
                figment,
                &search_paths,
                &["reel.yaml", "reel.yml", "config.yaml", "config.yml"],
                |fig, path| fig.merge(Yaml::file(path)),
            );
            figment = f;
            found |= ok;
        }

        if !found {
            warn!("No configuration file found, using defaults");
        }
        figment
    }
}

/// Loads the configuration from the default locations.
pub fn load_config() -> ConfigResult<ReelConfig> {
    ConfigLoader::new().load()
}

/// Loads the configuration from `path`, with environment overrides.
pub fn load_config_from_file<P: AsRef<Path>>(path: P) -> ConfigResult<ReelConfig> {
    ConfigLoader::new().file(path).load()
}

// =============================================================================
// Tests
// =============================================================================
