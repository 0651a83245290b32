//! Display and formatting helpers for solar events.

use chrono::{DateTime, Offset};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::GeoPoint;
use super::times::SolarDay;
use crate::common::constants::{PATTERN_12_HOUR, PATTERN_24_HOUR};
use crate::core::event::NextEvent;

/// Clock style used for event times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeFormat {
    /// `HH:mm`, e.g. `06:05`
    TwentyFourHour,
    /// `h:mm a`, e.g. `6:05 AM`
    TwelveHour,
}

impl TimeFormat {
    pub fn from_24_hour_flag(use_24_hour: bool) -> Self {
        if use_24_hour {
            TimeFormat::TwentyFourHour
        } else {
            TimeFormat::TwelveHour
        }
    }

    /// strftime pattern for this format.
    pub fn pattern(&self) -> &'static str {
        match self {
            TimeFormat::TwentyFourHour => PATTERN_24_HOUR,
            TimeFormat::TwelveHour => PATTERN_12_HOUR,
        }
    }
}

/// Format an event time in its own timezone.
pub fn format_event_time(time: &DateTime<Tz>, format: TimeFormat) -> String {
    time.format(format.pattern()).to_string()
}

/// Expanded line for an event: `"{time} {label}"`.
pub fn expanded_line(time_text: &str, event: NextEvent) -> String {
    format!("{time_text} {}", event.label())
}

/// UTC offset as `±HH:MM`.
pub(super) fn format_offset(offset_secs: i32) -> String {
    let sign = if offset_secs < 0 { '-' } else { '+' };
    let secs = offset_secs.unsigned_abs();
    format!("{sign}{:02}:{:02}", secs / 3600, (secs % 3600) / 60)
}

/// Log a debug block describing one solar calculation.
pub fn log_solar_debug_info(point: GeoPoint, solar_day: &SolarDay, now: &DateTime<Tz>) {
    let tz = now.timezone();

    log_pipe!();
    log_debug!("Solar calculation details:");
    log_indented!("    Raw coordinates: {point}");
    log_indented!(
        "          Timezone: {tz} ({})",
        format_offset(now.offset().fix().local_minus_utc())
    );
    log_indented!("     Calendar date: {}", solar_day.date);
    log_indented!(
        "       Sunrise UTC: {}",
        solar_day.sunrise.naive_utc().format("%H:%M:%S")
    );
    log_indented!(
        "        Sunset UTC: {}",
        solar_day.sunset.naive_utc().format("%H:%M:%S")
    );
    log_indented!(
        "     Sunrise local: {}",
        solar_day.sunrise.format("%Y-%m-%d %H:%M:%S")
    );
    log_indented!(
        "      Sunset local: {}",
        solar_day.sunset.format("%Y-%m-%d %H:%M:%S")
    );

    let day_length = solar_day.day_length();
    log_indented!(
        "        Day length: {}h {:02}m",
        day_length.num_hours(),
        day_length.num_minutes() % 60
    );

    let next = if *now < solar_day.sunrise {
        solar_day.sunrise
    } else {
        solar_day.sunset
    };
    let until = next - *now;
    log_indented!(
        "   Until next event: {}h {:02}m",
        until.num_hours(),
        until.num_minutes() % 60
    );
}
