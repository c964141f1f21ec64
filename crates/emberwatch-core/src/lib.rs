// emberwatch-core: emergency board state, backend gateway, alert tracking

pub mod backend;
pub mod config;
mod convert;
pub mod error;
pub mod fallback;
pub mod gateway;
pub mod model;
pub mod seed;
pub mod store;
pub mod stream;
pub mod subscription;
pub mod tracker;

// ── Primary re-exports ──────────────────────────────────────────────

pub use backend::{Backend, MemoryBackend, RemoteBackend};
pub use config::{BackendConfig, DemoArea};
pub use error::CoreError;
pub use gateway::{ConnectionState, Gateway};
pub use seed::{SeedReport, reseed};
pub use store::{BoardMode, BoardView, EmergencyBoard};
pub use stream::{EmergencyStream, Snapshot};
pub use subscription::Subscription;
pub use tracker::{AlertTracker, TrackerIssue, TrackerState};

// Model re-exports
pub use model::{
    AlertSignal, Emergency, EmergencyId, EmergencyStatus, EmergencyType, Filter, NewEmergency,
    SignalType, relative_age, short_id,
};
