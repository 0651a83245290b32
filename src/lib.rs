//! # dashsunrise
//!
//! Core of a home-screen widget extension that shows the next sunrise or sunset
//! for the device location, optionally only within a lead-time window before
//! the event.
//!
//! ## Architecture
//!
//! - **Selector**: `core::selector::compute_display_state` is a pure function of
//!   location, current instant and options. It picks the next solar event and
//!   builds the display strings and visibility flag.
//! - **Solar**: `geo` wraps the `sunrise` crate behind the `SolarCalculator`
//!   trait and handles day rollover and time formatting.
//! - **Adapter**: `extension::SunriseExtension` owns every host-facing concern:
//!   the update callback, the single outstanding location request, preference
//!   loading and publishing to the host display surface.
//! - **Infrastructure**: `config` (TOML settings), `preferences` (string-keyed
//!   store), `location` (provider trait and cancellable one-shot request),
//!   `time_source` (wall and monotonic clocks) and `logger`.

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod logger;

pub mod common;
pub mod config;
pub mod core;
pub mod extension;
pub mod geo;
pub mod location;
pub mod preferences;
pub mod state;
pub mod time_source;

#[cfg(any(test, feature = "testing-support"))]
pub mod testing;

pub use crate::core::selector::{SelectorOptions, compute_display_state};
pub use config::Config;
pub use extension::{HostContext, SunriseExtension, UpdateOutcome, UpdateReason};
pub use geo::{GeoPoint, SolarCalculator, SolarDay, SolarError, SunriseCalculator, TimeFormat};
pub use state::{DisplayState, ExtensionData, NextEvent};
