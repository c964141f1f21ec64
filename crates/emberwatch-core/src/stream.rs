// ── Reactive snapshot streams ──
//
// Subscription handle wrapping a `watch::Receiver` so consumers can read
// the current board contents and await the next change.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::model::Emergency;

/// Shared, immutable board snapshot.
pub type Snapshot = Arc<Vec<Emergency>>;

/// A subscription to board changes.
///
/// Holds a snapshot of the current state and lets you await the next one.
pub struct EmergencyStream {
    current: Snapshot,
    receiver: watch::Receiver<Snapshot>,
}

impl EmergencyStream {
    pub(crate) fn new(receiver: watch::Receiver<Snapshot>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// Snapshot as of creation or the last `changed()`.
    pub fn current(&self) -> &Snapshot {
        &self.current
    }

    /// Latest snapshot (may have changed since creation).
    pub fn latest(&self) -> Snapshot {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change, returning the new snapshot.
    /// Returns `None` once the board has been dropped.
    pub async fn changed(&mut self) -> Option<Snapshot> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    pub fn into_stream(self) -> EmergencyWatchStream {
        EmergencyWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter yielding each new board snapshot, starting with the
/// current one.
pub struct EmergencyWatchStream {
    inner: WatchStream<Snapshot>,
}

impl Stream for EmergencyWatchStream {
    type Item = Snapshot;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
