//! Astronomical sunrise/sunset lookup.
//!
//! The formula itself belongs to the `sunrise` crate; this module only adapts
//! its UTC results to a timezone-aware [`SolarDay`].

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use std::fmt;

use super::GeoPoint;
use super::times::SolarDay;

/// Errors from solar calculations.
#[derive(Debug, Clone, PartialEq)]
pub enum SolarError {
    /// Latitude or longitude outside the valid range
    InvalidCoordinates { latitude: f64, longitude: f64 },
    /// The location has no ordinary sunrise followed by sunset on this date,
    /// e.g. polar day or polar night. Such inputs are not supported.
    UnsupportedLocation { date: NaiveDate, reason: String },
}

impl fmt::Display for SolarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolarError::InvalidCoordinates {
                latitude,
                longitude,
            } => write!(
                f,
                "invalid coordinates: lat={latitude:.4}, lon={longitude:.4}"
            ),
            SolarError::UnsupportedLocation { date, reason } => {
                write!(f, "no sunrise/sunset pair on {date}: {reason}")
            }
        }
    }
}

impl std::error::Error for SolarError {}

/// Computes one calendar day's sunrise and sunset for a location.
///
/// Implementations are treated as pure: the same arguments must always give the
/// same result.
pub trait SolarCalculator {
    fn solar_day(&self, point: GeoPoint, tz: Tz, date: NaiveDate) -> Result<SolarDay, SolarError>;
}

/// Official sunrise/sunset (sun's upper limb at the refraction-corrected
/// horizon) from the `sunrise` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct SunriseCalculator;

impl SunriseCalculator {
    /// Raw UTC event times for `date`.
    pub fn utc_events(
        point: GeoPoint,
        date: NaiveDate,
    ) -> Result<(DateTime<Utc>, DateTime<Utc>), SolarError> {
        use sunrise::{Coordinates, SolarEvent};

        let coord = Coordinates::new(point.latitude, point.longitude).ok_or(
            SolarError::InvalidCoordinates {
                latitude: point.latitude,
                longitude: point.longitude,
            },
        )?;
        let day = sunrise::SolarDay::new(coord, date);
        Ok((
            day.event_time(SolarEvent::Sunrise),
            day.event_time(SolarEvent::Sunset),
        ))
    }
}

impl SolarCalculator for SunriseCalculator {
    /// The `sunrise` crate anchors its date to UTC at the given longitude, so
    /// where the timezone is far from the longitude (Pacific/Kiritimati, UTC+14)
    /// the events for `date` land on a neighbouring local day. Of the solar
    /// days around `date`, the one whose sunrise falls on local `date` wins.
    fn solar_day(&self, point: GeoPoint, tz: Tz, date: NaiveDate) -> Result<SolarDay, SolarError> {
        let mut requested = None;
        for offset in [0, -1, 1] {
            let Some(solar_date) = date.checked_add_signed(Duration::days(offset)) else {
                continue;
            };
            let (sunrise_utc, sunset_utc) = Self::utc_events(point, solar_date)?;
            let sunrise = sunrise_utc.with_timezone(&tz);
            let sunset = sunset_utc.with_timezone(&tz);

            if sunrise.date_naive() == date {
                return SolarDay::new(date, sunrise, sunset);
            }
            if offset == 0 {
                requested = Some((sunrise, sunset));
            }
        }

        // No neighbouring day matched, e.g. polar day or night. Validation
        // reports why the requested date's events are unusable.
        match requested {
            Some((sunrise, sunset)) => SolarDay::new(date, sunrise, sunset),
            None => Err(SolarError::UnsupportedLocation {
                date,
                reason: "date out of range".to_string(),
            }),
        }
    }
}

impl<C: SolarCalculator + ?Sized> SolarCalculator for &C {
    fn solar_day(&self, point: GeoPoint, tz: Tz, date: NaiveDate) -> Result<SolarDay, SolarError> {
        (**self).solar_day(point, tz, date)
    }
}
