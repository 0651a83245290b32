//! Sunrise and sunset for one local calendar day.
//!
//! Times are stored as `DateTime<Tz>` so comparisons against the current
//! instant handle day boundaries without extra bookkeeping.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Timelike};
use chrono_tz::Tz;

use super::GeoPoint;
use super::solar::{SolarCalculator, SolarError};
use crate::common::constants::MAX_EVENT_OFFSET_FROM_NOON;

/// One calendar day's sunrise and sunset in the location's timezone.
///
/// Invariant: `sunrise < sunset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolarDay {
    /// Local calendar date the events were calculated for
    pub date: NaiveDate,
    pub sunrise: DateTime<Tz>,
    pub sunset: DateTime<Tz>,
}

fn truncate_to_second(dt: DateTime<Tz>) -> DateTime<Tz> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

fn local_noon(tz: &Tz, date: NaiveDate) -> Option<DateTime<Tz>> {
    let noon = date.and_hms_opt(12, 0, 0)?;
    tz.from_local_datetime(&noon).earliest()
}

impl SolarDay {
    /// Build a solar day and check it describes an ordinary day.
    ///
    /// Rejects pairs where sunrise does not precede sunset, or where either
    /// event lands more than a day away from local noon of `date`. Both happen
    /// when the calculator has no real answer (polar day or night).
    pub fn new(
        date: NaiveDate,
        sunrise: DateTime<Tz>,
        sunset: DateTime<Tz>,
    ) -> Result<Self, SolarError> {
        let unsupported = |reason: String| SolarError::UnsupportedLocation { date, reason };

        let sunrise = truncate_to_second(sunrise);
        let sunset = truncate_to_second(sunset);

        if sunrise >= sunset {
            return Err(unsupported(format!(
                "sunrise {} is not before sunset {}",
                sunrise.format("%Y-%m-%d %H:%M:%S"),
                sunset.format("%Y-%m-%d %H:%M:%S")
            )));
        }

        let noon = local_noon(&sunrise.timezone(), date)
            .ok_or_else(|| unsupported("local noon does not exist".to_string()))?;
        let max_offset = Duration::from_std(MAX_EVENT_OFFSET_FROM_NOON)
            .map_err(|e| unsupported(e.to_string()))?;
        for (name, event) in [("sunrise", &sunrise), ("sunset", &sunset)] {
            if *event - noon > max_offset || noon - *event > max_offset {
                return Err(unsupported(format!(
                    "{name} {} is too far from the requested date",
                    event.format("%Y-%m-%d %H:%M:%S")
                )));
            }
        }

        Ok(Self {
            date,
            sunrise,
            sunset,
        })
    }

    /// The sunrise/sunset pair describing the next occurrences relative to `now`.
    ///
    /// Uses today's events (the date of `now` in its own timezone) unless `now`
    /// is at or after today's sunset, in which case tomorrow's events are used.
    pub fn upcoming<C: SolarCalculator + ?Sized>(
        calculator: &C,
        point: GeoPoint,
        now: &DateTime<Tz>,
    ) -> Result<Self, SolarError> {
        let tz = now.timezone();
        let today = now.date_naive();
        let solar_day = calculator.solar_day(point, tz, today)?;

        if *now >= solar_day.sunset {
            let tomorrow = today + Duration::days(1);
            return calculator.solar_day(point, tz, tomorrow);
        }

        Ok(solar_day)
    }

    /// True if `instant` lies between sunrise (inclusive) and sunset (exclusive).
    pub fn is_daylight(&self, instant: &DateTime<Tz>) -> bool {
        *instant >= self.sunrise && *instant < self.sunset
    }

    pub fn day_length(&self) -> Duration {
        self.sunset - self.sunrise
    }
}
