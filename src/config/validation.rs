//! Configuration validation functionality.

use anyhow::Result;
use chrono_tz::Tz;

use super::Config;
use crate::common::constants::*;

/// Reject configurations the extension cannot run with.
pub fn validate_config(config: &Config) -> Result<()> {
    if let Some(minutes) = config.stale_location_minutes
        && !(MINIMUM_STALE_LOCATION_MINUTES..=MAXIMUM_STALE_LOCATION_MINUTES).contains(&minutes)
    {
        anyhow::bail!(
            "stale_location_minutes ({}) must be between {} and {} minutes",
            minutes,
            MINIMUM_STALE_LOCATION_MINUTES,
            MAXIMUM_STALE_LOCATION_MINUTES
        );
    }

    if let Some(name) = config.timezone.as_deref()
        && let Err(e) = name.parse::<Tz>()
    {
        anyhow::bail!("timezone '{}' is not a valid IANA timezone: {}", name, e);
    }

    if let Some(icon) = config.icon.as_deref()
        && icon.trim().is_empty()
    {
        anyhow::bail!("icon must not be empty");
    }

    if let Some(path) = &config.preferences_file
        && path.as_os_str().is_empty()
    {
        anyhow::bail!("preferences_file must not be empty");
    }

    Ok(())
}
