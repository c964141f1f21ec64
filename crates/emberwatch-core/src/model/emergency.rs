// ── Emergency domain types ──

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::id::EmergencyId;

/// Kind of incident.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum EmergencyType {
    Fire,
    Medical,
    Patrol,
}

impl EmergencyType {
    pub const ALL: [Self; 3] = [Self::Fire, Self::Medical, Self::Patrol];

    /// Uniformly random type.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    /// Parse a caller-supplied type, falling back to a random one.
    ///
    /// Anything outside the enumeration (including blank input) is treated
    /// as "no preference" rather than rejected.
    pub fn parse_or_random<R: Rng + ?Sized>(raw: Option<&str>, rng: &mut R) -> Self {
        raw.and_then(|s| s.trim().parse().ok())
            .unwrap_or_else(|| Self::random(rng))
    }

    pub fn emoji(self) -> &'static str {
        match self {
            Self::Fire => "🔥",
            Self::Medical => "🏥",
            Self::Patrol => "🚔",
        }
    }
}

/// Lifecycle of an incident. Ordered; cycles forward only.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum EmergencyStatus {
    Pending,
    InProgress,
    Resolved,
}

impl EmergencyStatus {
    pub const ORDER: [Self; 3] = [Self::Pending, Self::InProgress, Self::Resolved];

    /// The status following this one, wrapping from `Resolved` to `Pending`.
    pub fn next(self) -> Self {
        match self {
            Self::Pending => Self::InProgress,
            Self::InProgress => Self::Resolved,
            Self::Resolved => Self::Pending,
        }
    }

    pub fn is_active(self) -> bool {
        self != Self::Resolved
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
        }
    }
}

/// A single incident on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Emergency {
    pub id: EmergencyId,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "type")]
    pub kind: EmergencyType,
    pub status: EmergencyStatus,
    pub timestamp: DateTime<Utc>,
}

/// Everything needed to create an emergency except its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEmergency {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "type")]
    pub kind: EmergencyType,
    pub status: EmergencyStatus,
    pub timestamp: DateTime<Utc>,
}

impl NewEmergency {
    /// A freshly reported incident: `pending`, stamped `at`.
    pub fn pending(latitude: f64, longitude: f64, kind: EmergencyType, at: DateTime<Utc>) -> Self {
        Self {
            latitude,
            longitude,
            kind,
            status: EmergencyStatus::Pending,
            timestamp: at,
        }
    }

    pub fn with_id(self, id: EmergencyId) -> Emergency {
        Emergency {
            id,
            latitude: self.latitude,
            longitude: self.longitude,
            kind: self.kind,
            status: self.status,
            timestamp: self.timestamp,
        }
    }
}

/// View filter held by the presentation layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Filter {
    #[default]
    All,
    Fire,
    Medical,
    Patrol,
}

impl Filter {
    /// The emergency type this filter selects, `None` for `All`.
    pub fn kind(self) -> Option<EmergencyType> {
        match self {
            Self::All => None,
            Self::Fire => Some(EmergencyType::Fire),
            Self::Medical => Some(EmergencyType::Medical),
            Self::Patrol => Some(EmergencyType::Patrol),
        }
    }

    pub fn matches(self, emergency: &Emergency) -> bool {
        self.kind().is_none_or(|kind| emergency.kind == kind)
    }
}

impl From<EmergencyType> for Filter {
    fn from(kind: EmergencyType) -> Self {
        match kind {
            EmergencyType::Fire => Self::Fire,
            EmergencyType::Medical => Self::Medical,
            EmergencyType::Patrol => Self::Patrol,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn status_cycle_is_closed() {
        for s in EmergencyStatus::ORDER {
            assert_eq!(s.next().next().next(), s);
            assert!(EmergencyStatus::ORDER.contains(&s.next()));
            assert_ne!(s.next(), s);
        }
    }

    #[test]
    fn status_cycle_wraps_forward() {
        assert_eq!(EmergencyStatus::Pending.next(), EmergencyStatus::InProgress);
        assert_eq!(EmergencyStatus::InProgress.next(), EmergencyStatus::Resolved);
        assert_eq!(EmergencyStatus::Resolved.next(), EmergencyStatus::Pending);
    }

    #[test]
    fn status_wire_names() {
        assert_eq!(EmergencyStatus::InProgress.to_string(), "in-progress");
        assert_eq!(
            "IN-PROGRESS".parse::<EmergencyStatus>().unwrap(),
            EmergencyStatus::InProgress
        );
        assert_eq!(
            serde_json::to_string(&EmergencyStatus::InProgress).unwrap(),
            "\"in-progress\""
        );
    }

    #[test]
    fn type_parsing_is_case_insensitive() {
        assert_eq!("fire".parse::<EmergencyType>().unwrap(), EmergencyType::Fire);
        assert_eq!("Medical".parse::<EmergencyType>().unwrap(), EmergencyType::Medical);
        assert!("ambulance".parse::<EmergencyType>().is_err());
    }

    #[test]
    fn parse_or_random_keeps_valid_input() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(
            EmergencyType::parse_or_random(Some(" patrol "), &mut rng),
            EmergencyType::Patrol
        );
    }

    #[test]
    fn parse_or_random_ignores_invalid_input() {
        let mut rng = StdRng::seed_from_u64(7);
        for raw in [None, Some(""), Some("flood"), Some("42")] {
            let kind = EmergencyType::parse_or_random(raw, &mut rng);
            assert!(EmergencyType::ALL.contains(&kind));
        }
    }

    #[test]
    fn filter_matches_by_type() {
        let e = NewEmergency::pending(0.0, 0.0, EmergencyType::Medical, Utc::now())
            .with_id("x".into());
        assert!(Filter::All.matches(&e));
        assert!(Filter::Medical.matches(&e));
        assert!(!Filter::Fire.matches(&e));
        assert_eq!(Filter::from(EmergencyType::Patrol), Filter::Patrol);
        assert_eq!("all".parse::<Filter>().unwrap(), Filter::All);
    }

    #[test]
    fn emergency_serializes_type_field() {
        let at = DateTime::parse_from_rfc3339("2024-06-15T10:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let e = NewEmergency::pending(11.0, 76.9, EmergencyType::Fire, at).with_id("a".into());
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["type"], "Fire");
        assert_eq!(json["status"], "pending");
        assert_eq!(json["timestamp"], "2024-06-15T10:30:00Z");
    }
}
