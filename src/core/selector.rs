//! Selects the next sunrise or sunset and builds what the widget displays.

use chrono::{DateTime, Duration};
use chrono_tz::Tz;

use super::event::NextEvent;
use crate::common::constants::DEFAULT_SHOW_BEFORE_HOURS;
use crate::geo::{
    GeoPoint, SolarCalculator, SolarDay, SolarError, TimeFormat, expanded_line, format_event_time,
};
use crate::state::DisplayState;

/// Per-update inputs to the selector beyond location and time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectorOptions {
    /// Lead-time window in hours; 0 means always visible
    pub show_before_hours: u32,
    pub time_format: TimeFormat,
}

impl Default for SelectorOptions {
    fn default() -> Self {
        Self {
            show_before_hours: DEFAULT_SHOW_BEFORE_HOURS,
            time_format: TimeFormat::TwentyFourHour,
        }
    }
}

/// True if an event `until_event` away falls inside the lead-time window.
///
/// A window of 0 hours disables the rule. Once an event is inside the window
/// it stays visible until it passes.
pub fn is_within_lead_window(until_event: Duration, show_before_hours: u32) -> bool {
    show_before_hours == 0
        || until_event < Duration::milliseconds(i64::from(show_before_hours) * 3_600_000)
}

/// Compute what the widget shows at `now` for `point`.
///
/// The timezone of `now` is the location's timezone. When `now` is at or past
/// today's sunset the calculation rolls over to tomorrow, so both events in the
/// result are always in the future relative to the last sunset. The next event
/// is sunset only while `now` lies between sunrise and sunset; otherwise it is
/// sunrise.
///
/// Fails only when the calculator reports the location as unsupported.
pub fn compute_display_state<C: SolarCalculator + ?Sized>(
    calculator: &C,
    point: GeoPoint,
    now: &DateTime<Tz>,
    options: &SelectorOptions,
) -> Result<DisplayState, SolarError> {
    let solar_day = SolarDay::upcoming(calculator, point, now)?;

    let (next_event, next_event_time) = if solar_day.is_daylight(now) {
        (NextEvent::Sunset, solar_day.sunset)
    } else {
        (NextEvent::Sunrise, solar_day.sunrise)
    };

    let sunrise_text = format_event_time(&solar_day.sunrise, options.time_format);
    let sunset_text = format_event_time(&solar_day.sunset, options.time_format);
    let (next_text, other_text) = match next_event {
        NextEvent::Sunrise => (sunrise_text, sunset_text),
        NextEvent::Sunset => (sunset_text, sunrise_text),
    };

    let visible = is_within_lead_window(next_event_time - *now, options.show_before_hours);

    Ok(DisplayState {
        visible,
        next_event,
        next_event_time,
        sunrise: solar_day.sunrise,
        sunset: solar_day.sunset,
        expanded_title: expanded_line(&next_text, next_event),
        expanded_body: expanded_line(&other_text, next_event.other()),
        status_text: next_text,
    })
}
