//! Geographic location and sunrise/sunset calculations.
//!
//! ## Module Structure
//!
//! - [`solar`]: the `SolarCalculator` seam and its `sunrise`-crate implementation
//! - [`times`]: `SolarDay`, one local calendar day's sunrise and sunset with
//!   the day rollover used to always describe upcoming events
//! - [`display`]: time formatting and solar debug output

pub mod display;
pub mod solar;
pub mod times;

pub use display::{TimeFormat, expanded_line, format_event_time, log_solar_debug_info};
pub use solar::{SolarCalculator, SolarError, SunriseCalculator};
pub use times::SolarDay;

use serde::{Deserialize, Serialize};
use std::fmt;


/// A geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a point, rejecting latitudes outside [-90, 90] and longitudes
    /// outside [-180, 180].
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, SolarError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(SolarError::InvalidCoordinates {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}°, {:.4}°", self.latitude, self.longitude)
    }
}
