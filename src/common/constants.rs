//! Defaults, validation limits and fixed identifiers.

use std::time::Duration;

// ═══ Extension Defaults ═══
// Used when the configuration or preference store leaves a value unset

pub const DEFAULT_STALE_LOCATION_MINUTES: u64 = 10; // last-known fix older than this is refreshed
pub const DEFAULT_SHOW_BEFORE_HOURS: u32 = 0; // 0 = always visible
pub const DEFAULT_ICON: &str = "ic_sunrise";

// ═══ Validation Limits ═══

pub const MINIMUM_STALE_LOCATION_MINUTES: u64 = 1;
pub const MAXIMUM_STALE_LOCATION_MINUTES: u64 = 1440; // one day

// ═══ Preference Keys ═══

pub const PREF_SHOW_BEFORE_HOURS: &str = "pref_sunrise_show_before_hours";

// ═══ Display ═══

pub const PATTERN_24_HOUR: &str = "%H:%M"; // HH:mm
pub const PATTERN_12_HOUR: &str = "%-I:%M %p"; // h:mm a
pub const SUNRISE_LABEL: &str = "Sunrise";
pub const SUNSET_LABEL: &str = "Sunset";

// ═══ Solar Sanity Bounds ═══

/// Largest distance a computed event may land from local noon of the requested
/// date before the result is treated as an unsupported location.
pub const MAX_EVENT_OFFSET_FROM_NOON: Duration = Duration::from_secs(24 * 60 * 60);

// ═══ Files ═══

pub const CONFIG_DIR_NAME: &str = "dashsunrise";
pub const CONFIG_FILE_NAME: &str = "dashsunrise.toml";
