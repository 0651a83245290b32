//! Display state derived on every update and the published host contract.
//!
//! Neither type is persisted. `ExtensionData` serializes to JSON for hosts
//! that bridge the display surface over a text boundary.

use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::core::event::NextEvent;

/// Everything the selector derived for one update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayState {
    /// Whether the widget should currently be shown
    pub visible: bool,

    pub next_event: NextEvent,
    pub next_event_time: DateTime<Tz>,

    /// Upcoming sunrise and sunset after day rollover
    pub sunrise: DateTime<Tz>,
    pub sunset: DateTime<Tz>,

    /// Formatted time of the next event
    pub status_text: String,
    /// `"{time} {label}"` for the next event
    pub expanded_title: String,
    /// `"{time} {label}"` for the other event
    pub expanded_body: String,
}

impl DisplayState {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Result contract delivered to the host's display surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionData {
    pub visible: bool,
    pub icon: String,
    pub status: String,
    pub expanded_title: String,
    pub expanded_body: String,
}

impl ExtensionData {
    pub fn from_state(state: &DisplayState, icon: &str) -> Self {
        Self {
            visible: state.visible,
            icon: icon.to_string(),
            status: state.status_text.clone(),
            expanded_title: state.expanded_title.clone(),
            expanded_body: state.expanded_body.clone(),
        }
    }

    /// Convert to JSON string for hosts that take a serialized payload.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Europe::Berlin;

    fn sample_state() -> DisplayState {
        let sunrise = Berlin.with_ymd_and_hms(2024, 6, 2, 4, 44, 0).unwrap();
        let sunset = Berlin.with_ymd_and_hms(2024, 6, 1, 21, 22, 0).unwrap();
        DisplayState {
            visible: true,
            next_event: NextEvent::Sunset,
            next_event_time: sunset,
            sunrise,
            sunset,
            status_text: "21:22".to_string(),
            expanded_title: "21:22 Sunset".to_string(),
            expanded_body: "04:44 Sunrise".to_string(),
        }
    }

    #[test]
    fn test_extension_data_from_state() {
        let data = ExtensionData::from_state(&sample_state(), "ic_sunrise");

        assert!(data.visible);
        assert_eq!(data.icon, "ic_sunrise");
        assert_eq!(data.status, "21:22");
        assert_eq!(data.expanded_title, "21:22 Sunset");
        assert_eq!(data.expanded_body, "04:44 Sunrise");
    }

    #[test]
    fn test_extension_data_json() {
        let data = ExtensionData::from_state(&sample_state(), "ic_sunrise");
        let json = data.to_json().unwrap();

        assert!(json.contains("\"visible\":true"));
        assert!(json.contains("\"status\":\"21:22\""));

        let parsed: ExtensionData = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, data);
    }

    #[test]
    fn test_display_state_json_carries_offset() {
        let json = sample_state().to_json().unwrap();

        assert!(json.contains("\"next_event\":\"sunset\""));
        assert!(json.contains("2024-06-01T21:22:00+02:00"));
    }
}
