//! Host-facing extension adapter.
//!
//! `SunriseExtension` owns everything the pure selector does not: choosing a
//! location provider, deciding whether the last-known fix is fresh enough,
//! keeping the single outstanding location request, loading preferences and
//! publishing the result to the host display surface.
//!
//! The struct uses a builder pattern for the pieces a host or test may swap:
//! - Normal use: `SunriseExtension::new(provider, prefs, sink, config, host)`
//! - Tests: `.with_calculator(FixedCalculator::new(..)).with_time_source(sim)`

use anyhow::{Context, Result};
use chrono_tz::Tz;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::core::selector::{SelectorOptions, compute_display_state};
use crate::geo::{GeoPoint, SolarCalculator, SolarDay, SunriseCalculator, log_solar_debug_info};
use crate::location::{ListenerId, LocationProvider, LocationRequest, RequestStatus};
use crate::logger::Log;
use crate::preferences::{PreferenceStore, Preferences};
use crate::state::{DisplayState, ExtensionData};
use crate::time_source::{RealTimeSource, TimeSource};

/// The host's display surface for published updates.
pub trait DisplaySink {
    fn publish_update(&mut self, data: &ExtensionData) -> Result<()>;
}

/// Why the host asked for an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateReason {
    Unknown,
    Initial,
    Periodic,
    SettingsChanged,
    ContentChanged,
    ScreenOn,
    Manual,
}

impl UpdateReason {
    /// Map a host reason code. Unrecognised codes map to `Unknown`.
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => UpdateReason::Initial,
            2 => UpdateReason::Periodic,
            3 => UpdateReason::SettingsChanged,
            4 => UpdateReason::ContentChanged,
            5 => UpdateReason::ScreenOn,
            6 => UpdateReason::Manual,
            _ => UpdateReason::Unknown,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            UpdateReason::Unknown => 0,
            UpdateReason::Initial => 1,
            UpdateReason::Periodic => 2,
            UpdateReason::SettingsChanged => 3,
            UpdateReason::ContentChanged => 4,
            UpdateReason::ScreenOn => 5,
            UpdateReason::Manual => 6,
        }
    }
}

impl From<i32> for UpdateReason {
    fn from(code: i32) -> Self {
        UpdateReason::from_code(code)
    }
}

impl fmt::Display for UpdateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UpdateReason::Unknown => "unknown",
            UpdateReason::Initial => "initial",
            UpdateReason::Periodic => "periodic",
            UpdateReason::SettingsChanged => "settings changed",
            UpdateReason::ContentChanged => "content changed",
            UpdateReason::ScreenOn => "screen on",
            UpdateReason::Manual => "manual",
        };
        write!(f, "{name}")
    }
}

/// Locale inputs supplied by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostContext {
    pub timezone: Tz,
    pub use_24_hour: bool,
}

impl Default for HostContext {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::UTC,
            use_24_hour: true,
        }
    }
}

/// What one update step did.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// No location provider matched; nothing published
    NoProvider,
    /// A location request is outstanding; nothing published yet
    AwaitingLocation,
    /// A new state was published
    Published(DisplayState),
    /// The location has no computable sunrise or sunset; nothing published
    Skipped,
    /// No request outstanding and nothing to do
    Idle,
}

/// The provider together with the one request registered with it.
///
/// Releasing cancels the request and de-registers its listener. Dropping the
/// session releases too, so a torn-down extension never leaves a listener
/// registered.
struct LocationSession<P: LocationProvider> {
    provider: P,
    pending: Option<LocationRequest>,
}

impl<P: LocationProvider> LocationSession<P> {
    fn new(provider: P) -> Self {
        Self {
            provider,
            pending: None,
        }
    }

    /// Issue a fresh one-shot request, releasing any previous one first.
    fn replace_request(&mut self, provider_name: &str) -> Result<ListenerId> {
        if let Some(previous) = self.release() {
            log_debug!("Cancelled outstanding {previous}");
        }

        let (request, listener) = LocationRequest::new();
        let id = request.id();
        self.provider
            .request_single_update(provider_name, listener)
            .with_context(|| format!("Failed to request a location update from '{provider_name}'"))?;
        self.pending = Some(request);
        Ok(id)
    }

    fn release(&mut self) -> Option<ListenerId> {
        let request = self.pending.take()?;
        request.cancel();
        self.provider.remove_updates(request.id());
        Some(request.id())
    }

    /// Status of the outstanding request, `None` if there is none. A request
    /// that resolved either way is released.
    fn check(&mut self, wait: Option<Duration>) -> Option<RequestStatus> {
        let request = self.pending.as_ref()?;
        let status = match wait {
            Some(timeout) => request.wait_timeout(timeout),
            None => request.poll(),
        };
        if status != RequestStatus::Pending {
            self.release();
        }
        Some(status)
    }
}

impl<P: LocationProvider> Drop for LocationSession<P> {
    fn drop(&mut self) {
        if let Some(id) = self.release() {
            log_debug!("Released {id} on teardown");
        }
    }
}

/// Sunrise/sunset extension instance bound to one host.
///
/// # Examples
///
/// ```
/// use dashsunrise::testing::{FakeLocationProvider, RecordingSink};
/// use dashsunrise::preferences::MemoryPreferences;
/// use dashsunrise::{Config, HostContext, SunriseExtension, UpdateOutcome, UpdateReason};
/// use std::sync::Arc;
///
/// # fn main() -> anyhow::Result<()> {
/// let provider = FakeLocationProvider::new();
/// let mut extension = SunriseExtension::new(
///     provider,
///     MemoryPreferences::new(),
///     RecordingSink::new(),
///     Arc::new(Config::default()),
///     HostContext::default(),
/// );
///
/// // No enabled provider: the cycle ends without publishing
/// assert_eq!(extension.on_update_data(UpdateReason::Initial)?, UpdateOutcome::NoProvider);
/// # Ok(())
/// # }
/// ```
pub struct SunriseExtension<P, S, D, C = SunriseCalculator>
where
    P: LocationProvider,
    S: PreferenceStore,
    D: DisplaySink,
    C: SolarCalculator,
{
    session: LocationSession<P>,
    preferences: S,
    sink: D,
    calculator: C,
    config: Arc<Config>,
    host: HostContext,
    time_source: Arc<dyn TimeSource>,
}

impl<P, S, D> SunriseExtension<P, S, D>
where
    P: LocationProvider,
    S: PreferenceStore,
    D: DisplaySink,
{
    /// Create an extension using the real clocks and the `sunrise` crate.
    pub fn new(provider: P, preferences: S, sink: D, config: Arc<Config>, host: HostContext) -> Self {
        if config.debug_enabled() {
            Log::set_debug(true);
        }
        log_version!();
        config.log_config();

        Self {
            session: LocationSession::new(provider),
            preferences,
            sink,
            calculator: SunriseCalculator,
            config,
            host,
            time_source: Arc::new(RealTimeSource),
        }
    }
}

impl<P, S, D, C> SunriseExtension<P, S, D, C>
where
    P: LocationProvider,
    S: PreferenceStore,
    D: DisplaySink,
    C: SolarCalculator,
{
    /// Replace the solar calculator.
    pub fn with_calculator<C2: SolarCalculator>(self, calculator: C2) -> SunriseExtension<P, S, D, C2> {
        SunriseExtension {
            session: self.session,
            preferences: self.preferences,
            sink: self.sink,
            calculator,
            config: self.config,
            host: self.host,
            time_source: self.time_source,
        }
    }

    /// Replace the wall and monotonic clocks.
    pub fn with_time_source(mut self, time_source: Arc<dyn TimeSource>) -> Self {
        if time_source.is_simulated() {
            log_info!("Using simulated time source");
        }
        self.time_source = time_source;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.session.provider
    }

    pub fn sink(&self) -> &D {
        &self.sink
    }

    /// Listener id of the outstanding location request, if any.
    pub fn pending_listener(&self) -> Option<ListenerId> {
        self.session.pending.as_ref().map(LocationRequest::id)
    }

    /// Host update callback.
    ///
    /// Publishes right away when the last-known fix is fresh. Otherwise a
    /// single new location request replaces any outstanding one and the
    /// result is published once the fix arrives, see
    /// [`poll_location`](Self::poll_location).
    pub fn on_update_data(&mut self, reason: UpdateReason) -> Result<UpdateOutcome> {
        log_block_start!("Update requested ({reason})");

        let criteria = self.config.location;
        let Some(provider_name) = self.session.provider.best_provider(&criteria) else {
            let available = self.session.provider.all_providers();
            log_error!("No location provider matches {criteria}");
            if available.is_empty() {
                log_indented!("Available providers: none");
            } else {
                log_indented!("Available providers: {}", available.join(", "));
            }
            return Ok(UpdateOutcome::NoProvider);
        };
        log_debug!("Using location provider '{provider_name}'");

        let now_elapsed = self.time_source.elapsed_realtime();
        let threshold = self.config.stale_location_threshold();

        match self.session.provider.last_known_location(&provider_name) {
            Some(fix) if !fix.is_stale(now_elapsed, threshold) => {
                log_decorated!(
                    "Using last known location ({}s old)",
                    fix.age(now_elapsed).as_secs()
                );
                self.publish(fix.point)
            }
            last_known => {
                match last_known {
                    Some(fix) => log_decorated!(
                        "Last known location is {} min old, requesting a fresh fix",
                        fix.age(now_elapsed).as_secs() / 60
                    ),
                    None => log_decorated!("No last known location, requesting a fix"),
                }
                let id = self.session.replace_request(&provider_name)?;
                log_indented!("Waiting for {id} from '{provider_name}'");
                Ok(UpdateOutcome::AwaitingLocation)
            }
        }
    }

    /// Drive the outstanding location request without blocking.
    pub fn poll_location(&mut self) -> Result<UpdateOutcome> {
        let status = self.session.check(None);
        self.resolve(status)
    }

    /// Wait up to `timeout` for the outstanding location request.
    ///
    /// The request stays registered when the timeout passes.
    pub fn await_location(&mut self, timeout: Duration) -> Result<UpdateOutcome> {
        let status = self.session.check(Some(timeout));
        self.resolve(status)
    }

    /// Cancel and de-register the outstanding location request, if any.
    pub fn disable_location_listener(&mut self) {
        if let Some(id) = self.session.release() {
            log_decorated!("Removed location listener {id}");
        }
    }

    /// Tear down, releasing any listener registration.
    pub fn shutdown(mut self) {
        self.disable_location_listener();
        log_end!();
    }

    fn resolve(&mut self, status: Option<RequestStatus>) -> Result<UpdateOutcome> {
        match status {
            None => Ok(UpdateOutcome::Idle),
            Some(RequestStatus::Pending) => Ok(UpdateOutcome::AwaitingLocation),
            Some(RequestStatus::Cancelled) => {
                log_warning!("Location request ended without a fix");
                Ok(UpdateOutcome::Idle)
            }
            Some(RequestStatus::Ready(fix)) => {
                log_block_start!("Received location {}", fix.point);
                self.publish(fix.point)
            }
        }
    }

    fn publish(&mut self, point: GeoPoint) -> Result<UpdateOutcome> {
        let preferences = Preferences::load(&self.preferences);
        let tz = self.config.resolve_timezone(self.host.timezone);
        let now = self.time_source.now().with_timezone(&tz);
        let options = SelectorOptions {
            show_before_hours: preferences.show_before_hours,
            time_format: self.config.resolve_time_format(self.host.use_24_hour),
        };

        let state = match compute_display_state(&self.calculator, point, &now, &options) {
            Ok(state) => state,
            Err(e) => {
                log_error!("Cannot compute sunrise and sunset for {point}: {e}");
                return Ok(UpdateOutcome::Skipped);
            }
        };

        if Log::is_debug()
            && let Ok(solar_day) = SolarDay::upcoming(&self.calculator, point, &now)
        {
            log_solar_debug_info(point, &solar_day, &now);
        }

        let data = ExtensionData::from_state(&state, self.config.icon());
        self.sink
            .publish_update(&data)
            .context("Failed to publish update to the host")?;

        if state.visible {
            log_decorated!("Published: {}", state.expanded_title);
        } else {
            log_decorated!(
                "Published hidden: {} is more than {}h away",
                state.expanded_title,
                preferences.show_before_hours
            );
        }

        Ok(UpdateOutcome::Published(state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::{LocationFix, MockLocationProvider};
    use crate::preferences::MemoryPreferences;
    use crate::state::NextEvent;
    use crate::testing::{FixedCalculator, PolarCalculator, RecordingSink};
    use crate::time_source::SimulatedTimeSource;
    use chrono::{TimeZone, Utc};

    fn berlin() -> GeoPoint {
        GeoPoint::new(52.52, 13.405).unwrap()
    }

    fn host() -> HostContext {
        HostContext {
            timezone: chrono_tz::Europe::Berlin,
            use_24_hour: true,
        }
    }

    /// 2024-06-01 12:00 in Berlin, monotonic clock at 1 hour.
    fn clock() -> Arc<SimulatedTimeSource> {
        let clock = SimulatedTimeSource::new(Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap());
        clock.advance(Duration::from_secs(3600));
        Arc::new(clock)
    }

    fn extension(
        provider: MockLocationProvider,
        sink: RecordingSink,
    ) -> SunriseExtension<MockLocationProvider, MemoryPreferences, RecordingSink, FixedCalculator>
    {
        Log::set_enabled(false);
        SunriseExtension::new(
            provider,
            MemoryPreferences::new(),
            sink,
            Arc::new(Config::default()),
            host(),
        )
        .with_calculator(FixedCalculator::new((5, 0), (21, 30)))
        .with_time_source(clock())
    }

    #[test]
    fn test_reason_codes() {
        assert_eq!(UpdateReason::from_code(1), UpdateReason::Initial);
        assert_eq!(UpdateReason::from(6), UpdateReason::Manual);
        assert_eq!(UpdateReason::from_code(42), UpdateReason::Unknown);
        assert_eq!(UpdateReason::from_code(-1), UpdateReason::Unknown);
        for code in 0..=6 {
            assert_eq!(UpdateReason::from_code(code).code(), code);
        }
        assert_eq!(UpdateReason::ScreenOn.to_string(), "screen on");
    }

    #[test]
    fn test_no_provider_publishes_nothing() {
        let mut provider = MockLocationProvider::new();
        provider.expect_best_provider().return_const(None::<String>);
        provider
            .expect_all_providers()
            .times(1)
            .return_const(vec!["gps".to_string()]);
        provider.expect_last_known_location().never();
        provider.expect_request_single_update().never();

        let sink = RecordingSink::new();
        let mut ext = extension(provider, sink.clone());

        assert_eq!(
            ext.on_update_data(UpdateReason::Initial).unwrap(),
            UpdateOutcome::NoProvider
        );
        assert_eq!(sink.count(), 0);
        assert_eq!(ext.pending_listener(), None);
    }

    #[test]
    fn test_fresh_fix_publishes_immediately() {
        let mut provider = MockLocationProvider::new();
        provider
            .expect_best_provider()
            .return_const(Some("network".to_string()));
        provider
            .expect_last_known_location()
            .withf(|name| name == "network")
            .return_const(Some(LocationFix::new(berlin(), Duration::from_secs(3300))));
        provider.expect_request_single_update().never();

        let sink = RecordingSink::new();
        let mut ext = extension(provider, sink.clone());

        let outcome = ext.on_update_data(UpdateReason::Periodic).unwrap();
        let UpdateOutcome::Published(state) = outcome else {
            panic!("expected a published state, got {outcome:?}");
        };
        assert_eq!(state.next_event, NextEvent::Sunset);

        let data = sink.last().unwrap();
        assert!(data.visible);
        assert_eq!(data.icon, "ic_sunrise");
        assert_eq!(data.status, "21:30");
        assert_eq!(data.expanded_title, "21:30 Sunset");
        assert_eq!(data.expanded_body, "05:00 Sunrise");
    }

    #[test]
    fn test_stale_fix_requests_update() {
        let mut provider = MockLocationProvider::new();
        provider
            .expect_best_provider()
            .return_const(Some("network".to_string()));
        // Exactly ten minutes old counts as stale
        provider
            .expect_last_known_location()
            .return_const(Some(LocationFix::new(berlin(), Duration::from_secs(3600))));
        provider
            .expect_request_single_update()
            .withf(|name, _| name == "network")
            .times(1)
            .returning(|_, _| Ok(()));
        provider.expect_remove_updates().times(1).return_const(());

        let sink = RecordingSink::new();
        let ext = extension(provider, sink.clone());
        let clock = clock();
        clock.advance(Duration::from_secs(600));
        let mut ext = ext.with_time_source(clock);

        assert_eq!(
            ext.on_update_data(UpdateReason::ScreenOn).unwrap(),
            UpdateOutcome::AwaitingLocation
        );
        assert!(ext.pending_listener().is_some());
        assert_eq!(sink.count(), 0);
        // Dropping the extension releases the registration
    }

    #[test]
    fn test_request_failure_propagates() {
        let mut provider = MockLocationProvider::new();
        provider
            .expect_best_provider()
            .return_const(Some("gps".to_string()));
        provider.expect_last_known_location().return_const(None::<LocationFix>);
        provider
            .expect_request_single_update()
            .times(1)
            .returning(|_, _| Err(anyhow::anyhow!("permission denied")));

        let mut ext = extension(provider, RecordingSink::new());

        let err = ext.on_update_data(UpdateReason::Initial).unwrap_err();
        assert!(format!("{err:#}").contains("permission denied"));
        assert_eq!(ext.pending_listener(), None);
    }

    #[test]
    fn test_unsupported_location_is_skipped() {
        let mut provider = MockLocationProvider::new();
        provider
            .expect_best_provider()
            .return_const(Some("network".to_string()));
        provider
            .expect_last_known_location()
            .return_const(Some(LocationFix::new(
                GeoPoint::new(78.22, 15.65).unwrap(),
                Duration::from_secs(3500),
            )));

        let sink = RecordingSink::new();
        let mut ext = extension(provider, sink.clone()).with_calculator(PolarCalculator);

        assert_eq!(
            ext.on_update_data(UpdateReason::Initial).unwrap(),
            UpdateOutcome::Skipped
        );
        assert_eq!(sink.count(), 0);
    }

    #[test]
    fn test_poll_without_request_is_idle() {
        let provider = MockLocationProvider::new();
        let mut ext = extension(provider, RecordingSink::new());

        assert_eq!(ext.poll_location().unwrap(), UpdateOutcome::Idle);
        // Nothing registered, nothing to remove
        ext.disable_location_listener();
        ext.shutdown();
    }
}
