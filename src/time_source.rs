//! Time source abstraction for real and simulated clocks.
//!
//! Two clocks are involved in an update: the wall clock, which decides the
//! calendar date and the next solar event, and a monotonic clock, which decides
//! whether the last-known location fix is stale. Keeping the staleness check on
//! the monotonic clock means a wall-clock change never makes a fix look fresh
//! or old.

use chrono::{DateTime, Duration as ChronoDuration, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use std::sync::Mutex;
use std::time::{Duration as StdDuration, Instant};

// Anchor for the process-wide monotonic clock
static MONOTONIC_ANCHOR: Lazy<Instant> = Lazy::new(Instant::now);

/// Time elapsed on the monotonic clock shared by the extension and providers.
///
/// Providers stamp [`LocationFix::elapsed_realtime`](crate::location::LocationFix)
/// with this value.
pub fn monotonic_elapsed() -> StdDuration {
    MONOTONIC_ANCHOR.elapsed()
}

/// Trait for abstracting time operations
pub trait TimeSource: Send + Sync {
    /// Current wall-clock instant
    fn now(&self) -> DateTime<Utc>;

    /// Current reading of the monotonic clock
    fn elapsed_realtime(&self) -> StdDuration;

    fn is_simulated(&self) -> bool {
        false
    }
}

/// System wall clock plus the process monotonic clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealTimeSource;

impl TimeSource for RealTimeSource {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn elapsed_realtime(&self) -> StdDuration {
        monotonic_elapsed()
    }
}

/// Manually driven clocks for tests and host previews.
///
/// Both clocks stand still until [`advance`](Self::advance) moves them together.
/// [`set_wall_clock`](Self::set_wall_clock) moves only the wall clock, the way
/// a user changing the system time would.
pub struct SimulatedTimeSource {
    wall: Mutex<DateTime<Utc>>,
    monotonic: Mutex<StdDuration>,
}

impl SimulatedTimeSource {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            wall: Mutex::new(start),
            monotonic: Mutex::new(StdDuration::ZERO),
        }
    }

    /// Start the wall clock at a local "YYYY-MM-DD HH:MM:SS" time in `tz`.
    pub fn from_local(s: &str, tz: chrono_tz::Tz) -> Result<Self, String> {
        parse_datetime_in_tz(s, tz).map(|local| Self::new(local.with_timezone(&Utc)))
    }

    /// Advance both clocks by `duration`.
    pub fn advance(&self, duration: StdDuration) {
        if let Ok(mut wall) = self.wall.lock() {
            *wall += ChronoDuration::milliseconds(duration.as_millis() as i64);
        }
        if let Ok(mut monotonic) = self.monotonic.lock() {
            *monotonic += duration;
        }
    }

    /// Jump the wall clock without touching the monotonic clock.
    pub fn set_wall_clock(&self, now: DateTime<Utc>) {
        if let Ok(mut wall) = self.wall.lock() {
            *wall = now;
        }
    }
}

impl TimeSource for SimulatedTimeSource {
    fn now(&self) -> DateTime<Utc> {
        match self.wall.lock() {
            Ok(wall) => *wall,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn elapsed_realtime(&self) -> StdDuration {
        match self.monotonic.lock() {
            Ok(monotonic) => *monotonic,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn is_simulated(&self) -> bool {
        true
    }
}

/// Parse a datetime string in the format "YYYY-MM-DD HH:MM:SS" in a specific timezone
pub fn parse_datetime_in_tz(s: &str, tz: chrono_tz::Tz) -> Result<DateTime<chrono_tz::Tz>, String> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map_err(|e| format!("Invalid datetime format: {e}. Use YYYY-MM-DD HH:MM:SS"))
        .and_then(|naive| {
            tz.from_local_datetime(&naive)
                .single()
                .ok_or_else(|| format!("Ambiguous or invalid time in timezone {tz}"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use chrono_tz::Europe::Berlin;

    #[test]
    fn test_simulated_advance_moves_both_clocks() {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
        let source = SimulatedTimeSource::new(start);

        source.advance(StdDuration::from_secs(90 * 60));

        assert_eq!(source.now(), start + ChronoDuration::minutes(90));
        assert_eq!(source.elapsed_realtime(), StdDuration::from_secs(90 * 60));
        assert!(source.is_simulated());
    }

    #[test]
    fn test_wall_clock_jump_leaves_monotonic_alone() {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
        let source = SimulatedTimeSource::new(start);
        source.advance(StdDuration::from_secs(60));

        source.set_wall_clock(start - ChronoDuration::days(3));

        assert_eq!(source.elapsed_realtime(), StdDuration::from_secs(60));
        assert_eq!(source.now(), start - ChronoDuration::days(3));
    }

    #[test]
    fn test_monotonic_elapsed_never_decreases() {
        let a = monotonic_elapsed();
        let b = RealTimeSource.elapsed_realtime();
        assert!(b >= a);
        assert!(!RealTimeSource.is_simulated());
    }

    #[test]
    fn test_from_local_starts_at_local_time() {
        let source = SimulatedTimeSource::from_local("2024-06-01 12:00:00", Berlin).unwrap();

        assert_eq!(source.now(), Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap());
        assert_eq!(source.elapsed_realtime(), StdDuration::ZERO);
        assert!(SimulatedTimeSource::from_local("noon", Berlin).is_err());
    }

    #[test]
    fn test_parse_datetime_in_tz() {
        let parsed = parse_datetime_in_tz("2024-06-01 12:00:00", Berlin).unwrap();
        assert_eq!(parsed.hour(), 12);
        assert_eq!(parsed.naive_utc().hour(), 10);

        assert!(parse_datetime_in_tz("2024-06-01T12:00", Berlin).is_err());
        // Skipped by the spring-forward gap
        assert!(parse_datetime_in_tz("2024-03-31 02:30:00", Berlin).is_err());
    }
}
