use serde::{Deserialize, Serialize};
use std::fmt;

use crate::common::constants::{SUNRISE_LABEL, SUNSET_LABEL};

/// The solar event announced by the widget.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NextEvent {
    Sunrise,
    Sunset,
}

impl fmt::Display for NextEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl NextEvent {
    /// Label shown next to the event time.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Sunrise => SUNRISE_LABEL,
            Self::Sunset => SUNSET_LABEL,
        }
    }

    /// The event that is not this one.
    pub fn other(&self) -> Self {
        match self {
            Self::Sunrise => Self::Sunset,
            Self::Sunset => Self::Sunrise,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_and_other() {
        assert_eq!(NextEvent::Sunrise.label(), "Sunrise");
        assert_eq!(NextEvent::Sunset.to_string(), "Sunset");
        assert_eq!(NextEvent::Sunrise.other(), NextEvent::Sunset);
        assert_eq!(NextEvent::Sunset.other().other(), NextEvent::Sunset);
    }

    #[test]
    fn test_serializes_lowercase() {
        let json = serde_json::to_string(&NextEvent::Sunset).unwrap();
        assert_eq!(json, "\"sunset\"");
    }
}
