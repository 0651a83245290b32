//! Default configuration file creation.
//!
//! The default file lists every setting with its default value and an aligned
//! comment, so the file documents itself.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::common::constants::*;

/// Write a default config file to `path`, creating parent directories.
pub fn create_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    let content = default_config_content();
    fs::write(path, content)
        .with_context(|| format!("Failed to write default config to {}", path.display()))?;

    log_block_start!("Created default configuration");
    log_indented!("{}", path.display());
    Ok(())
}

/// Text of the default configuration file.
pub fn default_config_content() -> String {
    ConfigBuilder::new()
        .add_section("Location refresh")
        .add_setting(
            "stale_location_minutes",
            &DEFAULT_STALE_LOCATION_MINUTES.to_string(),
            &format!(
                "Age at which the last-known fix is refreshed ({MINIMUM_STALE_LOCATION_MINUTES}-{MAXIMUM_STALE_LOCATION_MINUTES}) minutes"
            ),
        )
        .add_section("Display")
        .add_setting(
            "time_format",
            "\"auto\"",
            "Select: \"auto\" (host locale), \"24h\", \"12h\"",
        )
        .add_setting(
            "icon",
            &format!("\"{DEFAULT_ICON}\""),
            "Icon identifier published with every update",
        )
        .add_commented_setting(
            "timezone",
            "\"Europe/Berlin\"",
            "IANA timezone overriding the host timezone",
        )
        .add_table("location")
        .add_setting("power", "\"low\"", "Select: \"low\", \"medium\", \"high\"")
        .add_setting("accuracy", "\"coarse\"", "Select: \"coarse\", \"fine\"")
        .add_setting("cost_allowed", "false", "Allow providers that may incur cost")
        .build()
}

struct ConfigBuilder {
    entries: Vec<ConfigEntry>,
}

enum ConfigEntry {
    /// Comment-only heading for readability
    Section(String),
    /// Real TOML table header; every following setting belongs to it
    Table(String),
    Setting { line: String, comment: String },
}

impl ConfigBuilder {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn add_section(mut self, title: &str) -> Self {
        self.entries.push(ConfigEntry::Section(format!("#[{title}]")));
        self
    }

    fn add_table(mut self, name: &str) -> Self {
        self.entries.push(ConfigEntry::Table(format!("[{name}]")));
        self
    }

    fn add_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.entries.push(ConfigEntry::Setting {
            line: format!("{key} = {value}"),
            comment: format!("# {comment}"),
        });
        self
    }

    /// A setting written commented out, showing an example value.
    fn add_commented_setting(mut self, key: &str, example: &str, comment: &str) -> Self {
        self.entries.push(ConfigEntry::Setting {
            line: format!("# {key} = {example}"),
            comment: format!("# {comment}"),
        });
        self
    }

    fn build(self) -> String {
        // Align every comment one space past the longest setting line
        let width = self
            .entries
            .iter()
            .filter_map(|entry| match entry {
                ConfigEntry::Setting { line, .. } => Some(line.len()),
                _ => None,
            })
            .max()
            .unwrap_or(0)
            + 1;

        let mut lines: Vec<String> = Vec::new();
        for entry in self.entries {
            match entry {
                ConfigEntry::Section(title) | ConfigEntry::Table(title) => {
                    if !lines.is_empty() {
                        lines.push(String::new());
                    }
                    lines.push(title);
                }
                ConfigEntry::Setting { line, comment } => {
                    lines.push(format!("{line:<width$}{comment}"));
                }
            }
        }

        let mut result = lines.join("\n");
        result.push('\n');
        result
    }
}
