//! Configuration loading functionality.
//!
//! Resolves the configuration path, creates a default file when none exists,
//! parses TOML and runs validation.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use super::Config;
use super::validation::validate_config;
use crate::common::constants::{CONFIG_DIR_NAME, CONFIG_FILE_NAME};

/// Global configuration directory, set once at startup
static CONFIG_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Set the configuration directory for the current process.
/// This can only be called once, typically when the host loads the extension.
/// Returns an error if already set.
pub fn set_config_dir(dir: Option<PathBuf>) -> Result<()> {
    CONFIG_DIR
        .set(dir)
        .map_err(|_| anyhow::anyhow!("Configuration directory already set"))
}

/// Get the custom configuration directory if one was set.
pub fn get_custom_config_dir() -> Option<PathBuf> {
    CONFIG_DIR.get().and_then(|d| d.clone())
}

/// Path of `dashsunrise.toml`, honoring a directory set with [`set_config_dir`].
pub fn get_config_path() -> Result<PathBuf> {
    if let Some(custom_dir) = get_custom_config_dir() {
        return Ok(custom_dir.join(CONFIG_FILE_NAME));
    }

    let config_dir = dirs::config_dir().context("Could not determine config directory")?;
    Ok(config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Load configuration using automatic path detection.
///
/// Creates a default configuration file if none exists.
pub fn load() -> Result<Config> {
    let config_path = get_config_path()?;

    if !config_path.exists() {
        super::builder::create_default_config(&config_path)
            .context("Failed to create default config during load")?;
    }

    load_from_path(&config_path)
}

/// Load configuration from a specific path.
///
/// Unlike [`load`], this never creates a file.
pub fn load_from_path(path: &Path) -> Result<Config> {
    if !path.exists() {
        anyhow::bail!("Configuration file not found at {}", path.display());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;

    let mut config = parse_config(&content)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;

    resolve_relative_paths(&mut config, path);

    Ok(config)
}

/// Parse and validate configuration text.
pub(crate) fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).context("Failed to parse config")?;
    validate_config(&config)?;
    Ok(config)
}

/// Make a relative `preferences_file` relative to the config file's directory.
fn resolve_relative_paths(config: &mut Config, config_path: &Path) {
    if let Some(prefs) = &config.preferences_file
        && prefs.is_relative()
        && let Some(base) = config_path.parent()
    {
        config.preferences_file = Some(base.join(prefs));
    }
}
