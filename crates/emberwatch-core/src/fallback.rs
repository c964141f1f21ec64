// ── Demo data ──
//
// Synthetic emergencies for sessions without a live backend, plus the
// larger sample set the seed command writes to a real collection.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::config::DemoArea;
use crate::model::{Emergency, EmergencyStatus, EmergencyType, NewEmergency};

struct Preset {
    latitude: f64,
    longitude: f64,
    kind: EmergencyType,
    status: EmergencyStatus,
}

const fn preset(
    latitude: f64,
    longitude: f64,
    kind: EmergencyType,
    status: EmergencyStatus,
) -> Preset {
    Preset {
        latitude,
        longitude,
        kind,
        status,
    }
}

const DEMO: [Preset; 5] = [
    preset(11.0168, 76.9558, EmergencyType::Fire, EmergencyStatus::Pending),
    preset(11.0245, 76.9672, EmergencyType::Medical, EmergencyStatus::InProgress),
    preset(11.0052, 76.9615, EmergencyType::Patrol, EmergencyStatus::Pending),
    preset(11.0321, 76.9423, EmergencyType::Fire, EmergencyStatus::Resolved),
    preset(10.9985, 76.9789, EmergencyType::Medical, EmergencyStatus::Pending),
];

const SEED: [Preset; 7] = [
    preset(11.0168, 76.9558, EmergencyType::Fire, EmergencyStatus::Pending),
    preset(11.0245, 76.9672, EmergencyType::Medical, EmergencyStatus::InProgress),
    preset(11.0052, 76.9615, EmergencyType::Patrol, EmergencyStatus::Pending),
    preset(11.0321, 76.9423, EmergencyType::Fire, EmergencyStatus::Resolved),
    preset(10.9985, 76.9789, EmergencyType::Medical, EmergencyStatus::Pending),
    preset(11.0089, 76.9345, EmergencyType::Patrol, EmergencyStatus::InProgress),
    preset(11.0412, 76.9501, EmergencyType::Fire, EmergencyStatus::Pending),
];

/// How far back generated timestamps may reach.
const RECENT_WINDOW_MS: i64 = 60 * 60 * 1000;

/// Sample emergencies with timestamps scattered over the last hour.
pub fn generate() -> Vec<Emergency> {
    generate_at(Utc::now(), &mut rand::rng())
}

/// [`generate`] with an explicit clock and randomness source.
///
/// Ids are `mock-1` through `mock-5`; the set always holds two Fire (one
/// resolved), two Medical and one Patrol entry.
pub fn generate_at<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> Vec<Emergency> {
    DEMO.iter()
        .enumerate()
        .map(|(i, p)| {
            let age = Duration::milliseconds(rng.random_range(0..RECENT_WINDOW_MS));
            Emergency {
                id: format!("mock-{}", i + 1).into(),
                latitude: p.latitude,
                longitude: p.longitude,
                kind: p.kind,
                status: p.status,
                timestamp: now - age,
            }
        })
        .collect()
}

/// The sample set written by `reseed`, all stamped `now`.
pub fn seed_samples(now: DateTime<Utc>) -> Vec<NewEmergency> {
    SEED.iter()
        .map(|p| NewEmergency {
            latitude: p.latitude,
            longitude: p.longitude,
            kind: p.kind,
            status: p.status,
            timestamp: now,
        })
        .collect()
}

/// A uniformly random point in the demo square.
pub fn random_location<R: Rng + ?Sized>(area: &DemoArea, rng: &mut R) -> (f64, f64) {
    let half = area.spread / 2.0;
    let latitude = area.center_latitude + rng.random_range(-half..=half);
    let longitude = area.center_longitude + rng.random_range(-half..=half);
    (latitude, longitude)
}
