//! Test doubles for the host seams.
//!
//! Compiled for unit tests and, through the `testing-support` feature, for the
//! integration tests under `tests/`. The fakes share their state behind an
//! `Arc<Mutex<_>>`, so a test keeps a clone to drive and inspect a fake that
//! the extension owns.

use anyhow::Result;
use chrono::{NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::extension::DisplaySink;
use crate::geo::{GeoPoint, SolarCalculator, SolarDay, SolarError};
use crate::location::{ListenerId, LocationCriteria, LocationFix, LocationListener, LocationProvider};
use crate::state::ExtensionData;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Calculator returning the same local sunrise and sunset times every day.
#[derive(Debug, Clone, Copy)]
pub struct FixedCalculator {
    sunrise: NaiveTime,
    sunset: NaiveTime,
}

impl FixedCalculator {
    /// Panics on an invalid `(hour, minute)` pair.
    pub fn new(sunrise: (u32, u32), sunset: (u32, u32)) -> Self {
        let time = |(hour, minute): (u32, u32)| {
            NaiveTime::from_hms_opt(hour, minute, 0).expect("valid hour and minute")
        };
        Self {
            sunrise: time(sunrise),
            sunset: time(sunset),
        }
    }
}

impl SolarCalculator for FixedCalculator {
    fn solar_day(&self, _point: GeoPoint, tz: Tz, date: NaiveDate) -> Result<SolarDay, SolarError> {
        let at = |time: NaiveTime| {
            tz.from_local_datetime(&date.and_time(time))
                .earliest()
                .ok_or_else(|| SolarError::UnsupportedLocation {
                    date,
                    reason: format!("{time} does not exist in {tz}"),
                })
        };
        SolarDay::new(date, at(self.sunrise)?, at(self.sunset)?)
    }
}

/// Calculator that reports every location as unsupported, like a polar night.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolarCalculator;

impl SolarCalculator for PolarCalculator {
    fn solar_day(&self, _point: GeoPoint, _tz: Tz, date: NaiveDate) -> Result<SolarDay, SolarError> {
        Err(SolarError::UnsupportedLocation {
            date,
            reason: "sun does not rise".to_string(),
        })
    }
}

/// Display sink that records every published update.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    published: Arc<Mutex<Vec<ExtensionData>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(&self) -> Vec<ExtensionData> {
        lock(&self.published).clone()
    }

    pub fn last(&self) -> Option<ExtensionData> {
        lock(&self.published).last().cloned()
    }

    pub fn count(&self) -> usize {
        lock(&self.published).len()
    }
}

impl DisplaySink for RecordingSink {
    fn publish_update(&mut self, data: &ExtensionData) -> Result<()> {
        lock(&self.published).push(data.clone());
        Ok(())
    }
}

#[derive(Debug, Default)]
struct FakeProviderState {
    best: Option<String>,
    providers: Vec<String>,
    last_known: Option<LocationFix>,
    listeners: Vec<LocationListener>,
    requested: Vec<ListenerId>,
    removed: Vec<ListenerId>,
    reject_requests: bool,
}

/// Scriptable location services.
///
/// Registered listeners are held until a test delivers a fix with
/// [`deliver`](Self::deliver) or the extension removes them.
#[derive(Debug, Clone, Default)]
pub struct FakeLocationProvider {
    state: Arc<Mutex<FakeProviderState>>,
}

impl FakeLocationProvider {
    /// Provider set with no enabled provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider set whose best match is `name`.
    pub fn with_provider(name: &str) -> Self {
        let fake = Self::new();
        {
            let mut state = lock(&fake.state);
            state.best = Some(name.to_string());
            state.providers.push(name.to_string());
        }
        fake
    }

    /// Add a provider that exists but never matches the criteria.
    pub fn add_disabled_provider(&self, name: &str) {
        lock(&self.state).providers.push(name.to_string());
    }

    pub fn set_last_known(&self, fix: Option<LocationFix>) {
        lock(&self.state).last_known = fix;
    }

    /// Make `request_single_update` fail.
    pub fn reject_requests(&self, reject: bool) {
        lock(&self.state).reject_requests = reject;
    }

    /// Deliver `fix` to every registered listener. Returns how many accepted it.
    pub fn deliver(&self, fix: LocationFix) -> usize {
        let listeners = std::mem::take(&mut lock(&self.state).listeners);
        listeners
            .into_iter()
            .map(|listener| listener.deliver(fix))
            .filter(|accepted| *accepted)
            .count()
    }

    /// Drop every registered listener without delivering, as a provider that
    /// gets disabled would.
    pub fn drop_listeners(&self) {
        lock(&self.state).listeners.clear();
    }

    /// Ids of listeners currently registered.
    pub fn active_listeners(&self) -> Vec<ListenerId> {
        lock(&self.state)
            .listeners
            .iter()
            .map(LocationListener::id)
            .collect()
    }

    /// Ids of every listener ever registered, in order.
    pub fn requested(&self) -> Vec<ListenerId> {
        lock(&self.state).requested.clone()
    }

    /// Ids passed to `remove_updates`, in order.
    pub fn removed(&self) -> Vec<ListenerId> {
        lock(&self.state).removed.clone()
    }
}

impl LocationProvider for FakeLocationProvider {
    fn best_provider(&self, _criteria: &LocationCriteria) -> Option<String> {
        lock(&self.state).best.clone()
    }

    fn all_providers(&self) -> Vec<String> {
        lock(&self.state).providers.clone()
    }

    fn last_known_location(&self, _provider: &str) -> Option<LocationFix> {
        lock(&self.state).last_known
    }

    fn request_single_update(&mut self, provider: &str, listener: LocationListener) -> Result<()> {
        let mut state = lock(&self.state);
        if state.reject_requests {
            anyhow::bail!("provider '{provider}' refused the request");
        }
        state.requested.push(listener.id());
        state.listeners.push(listener);
        Ok(())
    }

    fn remove_updates(&mut self, listener_id: ListenerId) {
        let mut state = lock(&self.state);
        state.listeners.retain(|listener| listener.id() != listener_id);
        state.removed.push(listener_id);
    }
}
