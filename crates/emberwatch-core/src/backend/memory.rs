// ── In-process backend ──
//
// Holds records in memory and republishes the full collection on every
// write, the same way the hosted store pushes snapshots. Failure toggles
// let callers rehearse the unhappy paths.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use futures_util::future::BoxFuture;
use futures_util::{FutureExt, StreamExt};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::debug;
use uuid::Uuid;

use super::{AlertFeed, Backend, EmergencyFeed};
use crate::error::CoreError;
use crate::model::{AlertSignal, Emergency, EmergencyId, EmergencyStatus, NewEmergency};

type FeedState<T> = Result<T, String>;

/// Backend that lives entirely in process.
///
/// Cheaply cloneable; clones share the same records and feeds, so a test
/// can hand one clone to a gateway and keep the other to drive it.
#[derive(Clone)]
pub struct MemoryBackend {
    inner: Arc<MemoryInner>,
}

struct MemoryInner {
    records: Mutex<Vec<Emergency>>,
    emergencies: watch::Sender<FeedState<Vec<Emergency>>>,
    alert: watch::Sender<FeedState<Option<AlertSignal>>>,
    fail_connect: AtomicBool,
    fail_writes: AtomicBool,
    connects: AtomicUsize,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// An empty collection with no alert record.
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    /// Start with the given records already stored.
    pub fn with_records(records: Vec<Emergency>) -> Self {
        let (emergencies, _) = watch::channel(Ok(records.clone()));
        let (alert, _) = watch::channel(Ok(None));
        Self {
            inner: Arc::new(MemoryInner {
                records: Mutex::new(records),
                emergencies,
                alert,
                fail_connect: AtomicBool::new(false),
                fail_writes: AtomicBool::new(false),
                connects: AtomicUsize::new(0),
            }),
        }
    }

    /// Current stored records.
    pub fn records(&self) -> Vec<Emergency> {
        self.lock().clone()
    }

    /// Number of times `connect` has been called.
    pub fn connect_count(&self) -> usize {
        self.inner.connects.load(Ordering::SeqCst)
    }

    // ── Remote-side changes ──────────────────────────────────────

    /// Replace the whole collection, as if another client rewrote it.
    pub fn push_snapshot(&self, records: Vec<Emergency>) {
        *self.lock() = records;
        self.publish();
    }

    /// Set or clear the alert record.
    pub fn set_alert(&self, signal: Option<AlertSignal>) {
        self.inner.alert.send_replace(Ok(signal));
    }

    /// Deliver an error on the emergency feed.
    pub fn fail_emergency_feed(&self, message: impl Into<String>) {
        self.inner.emergencies.send_replace(Err(message.into()));
    }

    /// Deliver an error on the alert feed.
    pub fn fail_alert_feed(&self, message: impl Into<String>) {
        self.inner.alert.send_replace(Err(message.into()));
    }

    // ── Failure toggles ──────────────────────────────────────────

    pub fn set_fail_connect(&self, fail: bool) {
        self.inner.fail_connect.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    // ── Internals ────────────────────────────────────────────────

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Emergency>> {
        self.inner
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self) {
        let snapshot = self.records();
        self.inner.emergencies.send_replace(Ok(snapshot));
    }

    fn check_writable(&self) -> Result<(), CoreError> {
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(CoreError::OperationFailed {
                message: "write rejected by backend".into(),
            });
        }
        Ok(())
    }
}

impl Backend for MemoryBackend {
    fn connect(&self) -> BoxFuture<'_, Result<(), CoreError>> {
        async move {
            self.inner.connects.fetch_add(1, Ordering::SeqCst);
            if self.inner.fail_connect.load(Ordering::SeqCst) {
                return Err(CoreError::ConnectionFailed {
                    reason: "backend refused the session".into(),
                });
            }
            Ok(())
        }
        .boxed()
    }

    fn emergency_feed(&self) -> EmergencyFeed {
        WatchStream::new(self.inner.emergencies.subscribe())
            .map(|state| state.map_err(|message| CoreError::StreamError { message }))
            .boxed()
    }

    fn alert_feed(&self) -> AlertFeed {
        WatchStream::new(self.inner.alert.subscribe())
            .map(|state| state.map_err(|message| CoreError::StreamError { message }))
            .boxed()
    }

    fn create_emergency(&self, new: NewEmergency) -> BoxFuture<'_, Result<EmergencyId, CoreError>> {
        async move {
            self.check_writable()?;
            let id = EmergencyId::new(Uuid::new_v4().to_string());
            self.lock().push(new.with_id(id.clone()));
            self.publish();
            debug!(%id, "stored emergency");
            Ok(id)
        }
        .boxed()
    }

    fn update_status(
        &self,
        id: EmergencyId,
        status: EmergencyStatus,
    ) -> BoxFuture<'_, Result<(), CoreError>> {
        async move {
            self.check_writable()?;
            {
                let mut records = self.lock();
                let record = records
                    .iter_mut()
                    .find(|e| e.id == id)
                    .ok_or_else(|| CoreError::NotFound { id: id.to_string() })?;
                record.status = status;
            }
            self.publish();
            Ok(())
        }
        .boxed()
    }
}
