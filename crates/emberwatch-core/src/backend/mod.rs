// ── Backend abstraction ──
//
// The seam between the gateway and whatever actually stores emergencies.
// `RemoteBackend` talks to the hosted document store and realtime
// database; `MemoryBackend` keeps everything in process and is what the
// test suites drive.

mod memory;
mod remote;

pub use memory::MemoryBackend;
pub use remote::RemoteBackend;

use futures_util::future::BoxFuture;
use futures_util::stream::BoxStream;

use crate::error::CoreError;
use crate::model::{AlertSignal, Emergency, EmergencyId, EmergencyStatus, NewEmergency};

/// Full-collection snapshots, one item per change.
pub type EmergencyFeed = BoxStream<'static, Result<Vec<Emergency>, CoreError>>;

/// Alert record updates. `Ok(None)` means the record is absent.
pub type AlertFeed = BoxStream<'static, Result<Option<AlertSignal>, CoreError>>;

/// A remote store for emergencies and the alert record.
pub trait Backend: Send + Sync + 'static {
    /// Establish the session. Called once by the gateway.
    fn connect(&self) -> BoxFuture<'_, Result<(), CoreError>>;

    /// Push feed of the emergency collection. The first item is the
    /// current contents.
    fn emergency_feed(&self) -> EmergencyFeed;

    /// Push feed of the alert record. The first item is the current value.
    fn alert_feed(&self) -> AlertFeed;

    /// Persist a new record, returning its backend-assigned id.
    fn create_emergency(&self, new: NewEmergency) -> BoxFuture<'_, Result<EmergencyId, CoreError>>;

    /// Overwrite only the `status` field of an existing record.
    fn update_status(
        &self,
        id: EmergencyId,
        status: EmergencyStatus,
    ) -> BoxFuture<'_, Result<(), CoreError>>;
}
