//! Host location services.
//!
//! Provider selection, permissions and the actual fixes belong to the host;
//! this module defines the [`LocationProvider`] seam the extension talks to and
//! the cancellable one-shot [`LocationRequest`] used for fresh fixes.

pub mod request;

pub use request::{ListenerId, LocationListener, LocationRequest, RequestStatus};

use anyhow::Result;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

use crate::geo::GeoPoint;

/// Acceptable power draw for a provider.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PowerRequirement {
    Low,
    Medium,
    High,
}

/// Required fix accuracy.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Accuracy {
    Coarse,
    Fine,
}

/// What the extension asks of a location provider.
///
/// Sunrise and sunset only need a coarse fix, so the defaults favour the
/// cheapest provider available.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct LocationCriteria {
    #[serde(default = "default_power")]
    pub power: PowerRequirement,
    #[serde(default = "default_accuracy")]
    pub accuracy: Accuracy,
    #[serde(default)]
    pub cost_allowed: bool,
}

fn default_power() -> PowerRequirement {
    PowerRequirement::Low
}

fn default_accuracy() -> Accuracy {
    Accuracy::Coarse
}

impl Default for LocationCriteria {
    fn default() -> Self {
        Self {
            power: default_power(),
            accuracy: default_accuracy(),
            cost_allowed: false,
        }
    }
}

impl fmt::Display for LocationCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "power={:?} accuracy={:?} cost_allowed={}",
            self.power, self.accuracy, self.cost_allowed
        )
    }
}

/// A location fix stamped on the monotonic clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationFix {
    pub point: GeoPoint,
    /// Monotonic time at which the fix was taken
    pub elapsed_realtime: Duration,
}

impl LocationFix {
    pub fn new(point: GeoPoint, elapsed_realtime: Duration) -> Self {
        Self {
            point,
            elapsed_realtime,
        }
    }

    /// Age of the fix at monotonic time `now_elapsed`. A fix stamped in the
    /// future counts as brand new.
    pub fn age(&self, now_elapsed: Duration) -> Duration {
        now_elapsed.saturating_sub(self.elapsed_realtime)
    }

    /// True once the fix is at least `threshold` old.
    pub fn is_stale(&self, now_elapsed: Duration, threshold: Duration) -> bool {
        self.age(now_elapsed) >= threshold
    }
}

/// Location services offered by the host.
#[cfg_attr(test, mockall::automock)]
pub trait LocationProvider {
    /// Name of the best enabled provider matching `criteria`, if any.
    fn best_provider(&self, criteria: &LocationCriteria) -> Option<String>;

    /// Every provider the host knows about, enabled or not. Used for diagnostics.
    fn all_providers(&self) -> Vec<String>;

    fn last_known_location(&self, provider: &str) -> Option<LocationFix>;

    /// Register `listener` for exactly one fix from `provider`.
    fn request_single_update(&mut self, provider: &str, listener: LocationListener) -> Result<()>;

    /// Drop the registration for `listener_id`. Unknown ids are ignored.
    fn remove_updates(&mut self, listener_id: ListenerId);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fix_at(minutes: u64) -> LocationFix {
        LocationFix::new(
            GeoPoint::new(48.8566, 2.3522).unwrap(),
            Duration::from_secs(minutes * 60),
        )
    }

    #[test]
    fn test_fix_staleness_uses_threshold_inclusively() {
        let fix = fix_at(5);
        let threshold = Duration::from_secs(10 * 60);

        assert!(!fix.is_stale(Duration::from_secs(14 * 60), threshold));
        assert!(fix.is_stale(Duration::from_secs(15 * 60), threshold));
        assert!(fix.is_stale(Duration::from_secs(60 * 60), threshold));
    }

    #[test]
    fn test_fix_from_future_is_fresh() {
        let fix = fix_at(30);
        assert_eq!(fix.age(Duration::from_secs(60)), Duration::ZERO);
        assert!(!fix.is_stale(Duration::from_secs(60), Duration::from_secs(600)));
    }

    #[test]
    fn test_default_criteria() {
        let criteria = LocationCriteria::default();
        assert_eq!(criteria.power, PowerRequirement::Low);
        assert_eq!(criteria.accuracy, Accuracy::Coarse);
        assert!(!criteria.cost_allowed);
    }

    #[test]
    fn test_criteria_from_toml() {
        let criteria: LocationCriteria = toml::from_str("power = \"high\"").unwrap();
        assert_eq!(criteria.power, PowerRequirement::High);
        assert_eq!(criteria.accuracy, Accuracy::Coarse);
    }
}
