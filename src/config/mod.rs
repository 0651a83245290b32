//! Extension configuration loaded once at startup.
//!
//! The configuration lives in `dashsunrise.toml` under the user config directory
//! (`$XDG_CONFIG_HOME/dashsunrise/` on Linux) unless a directory is set with
//! [`set_config_dir`]. A commented default file is created on first load.
//!
//! ```toml
//! stale_location_minutes = 10  # Age at which the last-known fix is refreshed (1-1440)
//! time_format = "auto"         # "auto" (host locale), "24h" or "12h"
//! icon = "ic_sunrise"          # Icon identifier published with every update
//! # timezone = "Europe/Berlin" # IANA timezone overriding the host timezone
//! # preferences_file = "..."   # TOML file backing the preference store
//!
//! [location]
//! power = "low"                # "low", "medium" or "high"
//! accuracy = "coarse"          # "coarse" or "fine"
//! cost_allowed = false
//! ```
//!
//! The loaded [`Config`] is immutable and shared by reference for the lifetime
//! of the extension. User preferences that change at runtime (the lead-time
//! window) live in the preference store instead, see [`crate::preferences`].

pub mod builder;
pub mod loading;
pub mod validation;

use chrono_tz::Tz;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::common::constants::*;
use crate::geo::TimeFormat;
use crate::location::LocationCriteria;
use crate::preferences::FilePreferences;

pub use builder::create_default_config;
pub use loading::{get_config_path, get_custom_config_dir, load, load_from_path, set_config_dir};


/// Clock style setting. `Auto` follows the host locale.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeFormatSetting {
    #[default]
    #[serde(rename = "auto")]
    Auto,
    #[serde(rename = "24h")]
    TwentyFourHour,
    #[serde(rename = "12h")]
    TwelveHour,
}

impl TimeFormatSetting {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFormatSetting::Auto => "auto",
            TimeFormatSetting::TwentyFourHour => "24h",
            TimeFormatSetting::TwelveHour => "12h",
        }
    }
}

/// Configuration for one extension instance.
///
/// Every field is optional in the file; accessors apply the defaults.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    /// Minutes after which the last-known location is refreshed (1-1440)
    pub stale_location_minutes: Option<u64>,

    /// Overrides the host's 24-hour flag unless `auto`
    pub time_format: Option<TimeFormatSetting>,

    /// IANA timezone name overriding the host timezone
    pub timezone: Option<String>,

    /// Icon identifier published with every update
    pub icon: Option<String>,

    /// TOML file used as the preference store
    pub preferences_file: Option<PathBuf>,

    /// Enable debug logging
    pub debug: Option<bool>,

    /// Criteria for picking a location provider
    #[serde(default)]
    pub location: LocationCriteria,
}

impl Config {
    /// Parse and validate configuration text.
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        loading::parse_config(content)
    }

    /// Load configuration using the module's load function
    pub fn load() -> anyhow::Result<Self> {
        load()
    }

    /// Load from path using the module's load_from_path function
    pub fn load_from_path(path: &PathBuf) -> anyhow::Result<Self> {
        load_from_path(path)
    }

    pub fn stale_location_threshold(&self) -> Duration {
        let minutes = self
            .stale_location_minutes
            .unwrap_or(DEFAULT_STALE_LOCATION_MINUTES);
        Duration::from_secs(minutes * 60)
    }

    pub fn icon(&self) -> &str {
        self.icon.as_deref().unwrap_or(DEFAULT_ICON)
    }

    /// File-backed preference store at `preferences_file`, if one is configured.
    pub fn preference_store(&self) -> Option<FilePreferences> {
        self.preferences_file.clone().map(FilePreferences::new)
    }

    pub fn debug_enabled(&self) -> bool {
        self.debug.unwrap_or(false)
    }

    /// Timezone to compute in: the configured override, else the host's.
    pub fn resolve_timezone(&self, host_timezone: Tz) -> Tz {
        match self.timezone.as_deref() {
            None => host_timezone,
            Some(name) => name.parse::<Tz>().unwrap_or_else(|e| {
                log_warning!("Ignoring invalid timezone '{name}': {e}");
                host_timezone
            }),
        }
    }

    /// Clock style: the configured override, else the host locale flag.
    pub fn resolve_time_format(&self, host_uses_24_hour: bool) -> TimeFormat {
        match self.time_format.unwrap_or_default() {
            TimeFormatSetting::Auto => TimeFormat::from_24_hour_flag(host_uses_24_hour),
            TimeFormatSetting::TwentyFourHour => TimeFormat::TwentyFourHour,
            TimeFormatSetting::TwelveHour => TimeFormat::TwelveHour,
        }
    }

    pub fn log_config(&self) {
        log_block_start!("Loaded configuration");
        log_indented!(
            "Stale location after: {} minutes",
            self.stale_location_threshold().as_secs() / 60
        );
        log_indented!(
            "Time format: {}",
            self.time_format.unwrap_or_default().as_str()
        );
        if let Some(tz) = &self.timezone {
            log_indented!("Timezone override: {tz}");
        }
        log_indented!("Icon: {}", self.icon());
        if let Some(path) = &self.preferences_file {
            log_indented!("Preferences file: {}", path.display());
        }
        log_indented!("Location criteria: {}", self.location);
    }
}
