// ── Domain model ──
//
// Every type in this module is the canonical in-memory representation of a
// dashboard entity. Wire encodings live in `emberwatch-api`; `convert` maps
// between the two.

pub mod emergency;
pub mod format;
pub mod id;
pub mod signal;

// ── Re-exports ──────────────────────────────────────────────────────
// Flat access: `use emberwatch_core::model::*` gives you everything.

pub use emergency::{Emergency, EmergencyStatus, EmergencyType, Filter, NewEmergency};
pub use format::{relative_age, short_id};
pub use id::EmergencyId;
pub use signal::{AlertSignal, SignalType};
