// ── Alert signal tracker ──
//
// Mirrors the single live alert record. Purely reactive: every delivered
// value, absent ones included, replaces what was there. There is no demo
// stand-in; an unconnected session simply never has a signal.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use serde::Serialize;
use tokio::sync::watch;
use tracing::debug;

use crate::gateway::Gateway;
use crate::model::AlertSignal;
use crate::subscription::Subscription;

/// Why the tracker has no usable signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrackerIssue {
    NotConfigured,
    NoSignal,
}

impl fmt::Display for TrackerIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConfigured => f.write_str("Backend not configured"),
            Self::NoSignal => f.write_str("No alert signal available"),
        }
    }
}

/// Tracker state at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackerState {
    pub initialized: bool,
    pub loading: bool,
    pub latest: Option<AlertSignal>,
    pub issue: Option<TrackerIssue>,
}

impl TrackerState {
    fn starting() -> Self {
        Self {
            initialized: false,
            loading: true,
            latest: None,
            issue: None,
        }
    }

    /// Initialized, settled, error-free and holding a signal.
    pub fn connected(&self) -> bool {
        self.initialized && !self.loading && self.issue.is_none() && self.latest.is_some()
    }
}

/// Live view of the alert record.
#[derive(Clone)]
pub struct AlertTracker {
    inner: Arc<TrackerInner>,
}

struct TrackerInner {
    state: watch::Sender<TrackerState>,
    subscription: Mutex<Option<Subscription>>,
}

impl AlertTracker {
    /// Initialize the gateway (a no-op if already connected) and start
    /// following the alert record.
    pub async fn start(gateway: Arc<Gateway>) -> Self {
        let (state, _) = watch::channel(TrackerState::starting());
        let tracker = Self {
            inner: Arc::new(TrackerInner {
                state,
                subscription: Mutex::new(None),
            }),
        };

        if !gateway.initialize().await {
            tracker.inner.state.send_replace(TrackerState {
                initialized: false,
                loading: false,
                latest: None,
                issue: Some(TrackerIssue::NotConfigured),
            });
            return tracker;
        }

        tracker.inner.state.send_modify(|s| s.initialized = true);
        let weak = Arc::downgrade(&tracker.inner);
        let sub = gateway.subscribe_to_alert_signal(move |signal| apply_signal(&weak, signal));
        *tracker.lock_subscription() = Some(sub);
        tracker
    }

    pub fn latest(&self) -> Option<AlertSignal> {
        self.inner.state.borrow().latest.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.inner.state.borrow().connected()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().loading
    }

    pub fn state(&self) -> TrackerState {
        self.inner.state.borrow().clone()
    }

    /// Watch state changes.
    pub fn subscribe(&self) -> watch::Receiver<TrackerState> {
        self.inner.state.subscribe()
    }

    /// Stop following the record. The last state stays readable.
    pub fn stop(&self) {
        if let Some(sub) = self.lock_subscription().take() {
            sub.unsubscribe();
        }
    }

    fn lock_subscription(&self) -> std::sync::MutexGuard<'_, Option<Subscription>> {
        self.inner
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn apply_signal(tracker: &Weak<TrackerInner>, signal: Option<AlertSignal>) {
    let Some(inner) = tracker.upgrade() else {
        return;
    };
    debug!(present = signal.is_some(), "alert signal update");
    inner.state.send_modify(|s| {
        s.loading = false;
        s.issue = signal.is_none().then_some(TrackerIssue::NoSignal);
        s.latest = signal;
    });
}
