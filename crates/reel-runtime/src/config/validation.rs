//! Configuration validation utilities.

use url::Url;

use super::error::{ConfigError, ConfigResult};
use super::schema::{LogOutput, LoggingConfig, PlayerConfig, ReelConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &ReelConfig) -> ConfigResult<()> {
    validate_player_config(&config.player)?;
    validate_plugins_config(config)?;
    validate_logging_config(&config.logging)?;
    Ok(())
}

/// Validates player settings.
fn validate_player_config(player: &PlayerConfig) -> ConfigResult<()> {
    if player.id.trim().is_empty() {
        return Err(ConfigError::validation("Player id cannot be empty"));
    }

    if player.id.contains(char::is_whitespace) {
        return Err(ConfigError::validation("Player id cannot contain whitespace"));
    }

    validate_base_url(&player.base_url)
}

/// The base URL must be absolute and able to resolve relative references.
fn validate_base_url(base_url: &str) -> ConfigResult<()> {
    let url = Url::parse(base_url).map_err(|e| ConfigError::invalid_url(base_url, e.to_string()))?;

    if url.cannot_be_a_base() {
        return Err(ConfigError::invalid_url(
            base_url,
            "relative references cannot be resolved against this URL",
        ));
    }

    Ok(())
}

/// Each plugin section must be a mapping or left empty.
fn validate_plugins_config(config: &ReelConfig) -> ConfigResult<()> {
    for (reference, options) in &config.plugins {
        if reference.is_empty() {
            return Err(ConfigError::validation("Plugin reference cannot be empty"));
        }

        if !(options.is_object() || options.is_null()) {
            return Err(ConfigError::InvalidPluginConfig {
                reference: reference.clone(),
            });
        }
    }

    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::validation(
            "logging.file_path is required when logging.output is \"file\"",
        ));
    }

    Ok(())
}
