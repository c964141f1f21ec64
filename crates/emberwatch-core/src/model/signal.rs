// ── Alert signal ──
//
// The single continuously-updating position record. Each inbound value
// replaces the previous one wholesale.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Kind of alert being tracked. Lowercase, and a separate namespace from
/// [`EmergencyType`](super::EmergencyType).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SignalType {
    Fire,
    Medical,
    Patrol,
}

impl SignalType {
    pub fn emoji(self) -> &'static str {
        match self {
            Self::Fire => "🔥",
            Self::Medical => "🏥",
            Self::Patrol => "🚔",
        }
    }
}

/// Latest reported alert position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertSignal {
    pub latitude: f64,
    pub longitude: f64,
    pub signal_type: SignalType,
    /// Epoch timestamp of the update as reported by the feed.
    pub observed_at: i64,
}

/// Epoch values below this are taken to be seconds, above it milliseconds.
const SECONDS_CEILING: i64 = 100_000_000_000;

impl AlertSignal {
    pub fn location(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }

    /// `observed_at` as a calendar time. Accepts both second and
    /// millisecond epochs.
    pub fn observed_at_utc(&self) -> Option<DateTime<Utc>> {
        if self.observed_at.abs() < SECONDS_CEILING {
            DateTime::from_timestamp(self.observed_at, 0)
        } else {
            DateTime::from_timestamp_millis(self.observed_at)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn signal(observed_at: i64) -> AlertSignal {
        AlertSignal {
            latitude: 11.02,
            longitude: 76.95,
            signal_type: SignalType::Medical,
            observed_at,
        }
    }

    #[test]
    fn signal_type_is_lowercase() {
        assert_eq!(SignalType::Patrol.to_string(), "patrol");
        assert_eq!("fire".parse::<SignalType>().unwrap(), SignalType::Fire);
        assert!("Fire".parse::<SignalType>().is_err());
    }

    #[test]
    fn observed_at_accepts_millis_and_seconds() {
        let ms = signal(1_718_447_400_000).observed_at_utc().unwrap();
        let secs = signal(1_718_447_400).observed_at_utc().unwrap();
        assert_eq!(ms, secs);
        assert_eq!(ms.to_rfc3339(), "2024-06-15T10:30:00+00:00");
    }

    #[test]
    fn location_is_lat_long() {
        assert_eq!(signal(0).location(), (11.02, 76.95));
    }
}
