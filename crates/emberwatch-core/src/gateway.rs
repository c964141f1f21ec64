// ── Backend gateway ──
//
// The only component that talks to a backend. Everything that can go wrong
// below it is logged here and turned into a plain value: `None`, `false`,
// a synthetic snapshot. Nothing past this boundary sees a `CoreError`.

use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

use chrono::Utc;
use futures_util::StreamExt;
use tokio::sync::{Mutex, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::backend::{Backend, RemoteBackend};
use crate::config::BackendConfig;
use crate::fallback;
use crate::model::{AlertSignal, Emergency, EmergencyId, EmergencyStatus, EmergencyType, NewEmergency};
use crate::subscription::Subscription;

// ── ConnectionState ──────────────────────────────────────────────────

/// Connection state observable by consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    /// Mandatory parameters were absent; the session runs on demo data.
    Unconfigured,
    Failed { reason: String },
}

// ── Gateway ──────────────────────────────────────────────────────────

/// Connection handle shared by the board and the alert tracker.
pub struct Gateway {
    config: BackendConfig,
    /// Backend supplied by the caller instead of the hosted one.
    injected: Option<Arc<dyn Backend>>,
    /// Set exactly once, on the first successful `initialize`.
    backend: OnceLock<Arc<dyn Backend>>,
    state: watch::Sender<ConnectionState>,
    init_lock: Mutex<()>,
}

impl Gateway {
    /// Gateway for the hosted backend described by `config`.
    pub fn new(config: BackendConfig) -> Self {
        Self::build(config, None)
    }

    /// Gateway that connects to `backend` instead of the hosted one.
    ///
    /// `config` still gates the connection: an unconfigured gateway never
    /// touches the backend.
    pub fn with_backend(config: BackendConfig, backend: Arc<dyn Backend>) -> Self {
        Self::build(config, Some(backend))
    }

    fn build(config: BackendConfig, injected: Option<Arc<dyn Backend>>) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            config,
            injected,
            backend: OnceLock::new(),
            state,
            init_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.state.borrow().clone()
    }

    /// Watch connection state changes.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    pub fn is_connected(&self) -> bool {
        self.backend.get().is_some()
    }

    fn backend(&self) -> Option<Arc<dyn Backend>> {
        self.backend.get().cloned()
    }

    // ── Connection lifecycle ─────────────────────────────────────────

    /// Try to establish the live connection. Returns whether it is up.
    ///
    /// Idempotent: once connected, further calls return `true` without
    /// reconnecting. A failed attempt may be retried by calling again.
    pub async fn initialize(&self) -> bool {
        let _guard = self.init_lock.lock().await;
        if self.is_connected() {
            return true;
        }

        let missing = self.config.missing_parameters();
        if !missing.is_empty() {
            info!(
                missing = %missing.join(", "),
                "backend not configured, using demo data"
            );
            self.state.send_replace(ConnectionState::Unconfigured);
            return false;
        }

        self.state.send_replace(ConnectionState::Connecting);

        let backend: Arc<dyn Backend> = match &self.injected {
            Some(backend) => Arc::clone(backend),
            None => match RemoteBackend::new(&self.config) {
                Ok(remote) => Arc::new(remote),
                Err(e) => {
                    warn!(error = %e, "could not build backend client");
                    self.state
                        .send_replace(ConnectionState::Failed { reason: e.to_string() });
                    return false;
                }
            },
        };

        match backend.connect().await {
            Ok(()) => {
                let _ = self.backend.set(backend);
                self.state.send_replace(ConnectionState::Connected);
                info!(
                    project = self.config.project_id.as_deref().unwrap_or_default(),
                    "connected to backend"
                );
                true
            }
            Err(e) => {
                warn!(error = %e, "backend connection failed, using demo data");
                self.state
                    .send_replace(ConnectionState::Failed { reason: e.to_string() });
                false
            }
        }
    }

    // ── Subscriptions ────────────────────────────────────────────────

    /// Receive full emergency snapshots.
    ///
    /// Without a connection, `on_update` is called once, synchronously,
    /// with a synthetic demo set and the returned handle is inert. Feed
    /// errors are logged and the previous snapshot stays in effect; an
    /// error before any snapshot is delivered as an empty list.
    pub fn subscribe_to_emergencies<F>(&self, mut on_update: F) -> Subscription
    where
        F: FnMut(Vec<Emergency>) + Send + 'static,
    {
        let Some(backend) = self.backend() else {
            debug!("not connected, delivering demo emergencies");
            on_update(fallback::generate());
            return Subscription::noop();
        };

        let mut feed = backend.emergency_feed();
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        tokio::spawn(async move {
            let mut delivered = false;
            loop {
                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    item = feed.next() => match item {
                        Some(Ok(list)) => {
                            delivered = true;
                            on_update(dedupe_by_id(list));
                        }
                        // Nothing applied yet: an empty list ends the listener's wait.
                        Some(Err(e)) if !delivered => {
                            warn!(error = %e, "emergency feed failed before first snapshot");
                            delivered = true;
                            on_update(Vec::new());
                        }
                        Some(Err(e)) => warn!(error = %e, "emergency feed error, keeping last snapshot"),
                        None => {
                            debug!("emergency feed closed");
                            break;
                        }
                    },
                }
            }
        });

        Subscription::new(cancel)
    }

    /// Receive alert record updates.
    ///
    /// Without a connection, `on_update(None)` is called once and the
    /// returned handle is inert. Feed errors are logged and delivered as
    /// `None`.
    pub fn subscribe_to_alert_signal<F>(&self, mut on_update: F) -> Subscription
    where
        F: FnMut(Option<AlertSignal>) + Send + 'static,
    {
        let Some(backend) = self.backend() else {
            debug!("not connected, no alert signal");
            on_update(None);
            return Subscription::noop();
        };

        let mut feed = backend.alert_feed();
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    item = feed.next() => match item {
                        Some(Ok(signal)) => on_update(signal),
                        Some(Err(e)) => {
                            warn!(error = %e, "alert feed error");
                            on_update(None);
                        }
                        None => {
                            debug!("alert feed closed");
                            break;
                        }
                    },
                }
            }
        });

        Subscription::new(cancel)
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Store a new pending emergency. `None` when disconnected or when the
    /// backend rejects the write; the caller decides what to do locally.
    pub async fn add_emergency(
        &self,
        latitude: f64,
        longitude: f64,
        kind: EmergencyType,
    ) -> Option<EmergencyId> {
        let Some(backend) = self.backend() else {
            info!(%kind, latitude, longitude, "not connected, emergency not stored");
            return None;
        };

        let new = NewEmergency::pending(latitude, longitude, kind, Utc::now());
        match backend.create_emergency(new).await {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(error = %e, %kind, "failed to add emergency");
                None
            }
        }
    }

    /// Change an emergency's status. `false` only when a live write fails;
    /// disconnected calls are a successful no-op.
    pub async fn update_status(&self, id: &EmergencyId, status: EmergencyStatus) -> bool {
        let Some(backend) = self.backend() else {
            debug!(%id, %status, "not connected, status update skipped");
            return true;
        };

        match backend.update_status(id.clone(), status).await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, %id, %status, "failed to update emergency status");
                false
            }
        }
    }
}

/// Keep the first record for each id.
fn dedupe_by_id(list: Vec<Emergency>) -> Vec<Emergency> {
    let mut seen = HashSet::with_capacity(list.len());
    let before = list.len();
    let unique: Vec<Emergency> = list
        .into_iter()
        .filter(|e| seen.insert(e.id.clone()))
        .collect();
    if unique.len() != before {
        warn!(
            dropped = before - unique.len(),
            "snapshot contained duplicate ids"
        );
    }
    unique
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::model::SignalType;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn configured() -> BackendConfig {
        BackendConfig::with_credentials("key", "demo")
    }

    fn live(backend: &MemoryBackend) -> Gateway {
        Gateway::with_backend(configured(), Arc::new(backend.clone()))
    }

    fn emergency(id: &str, kind: EmergencyType) -> Emergency {
        NewEmergency::pending(1.0, 2.0, kind, Utc::now()).with_id(id.into())
    }

    async fn recv<T>(rx: &mut mpsc::UnboundedReceiver<T>) -> T {
        tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn unconfigured_gateway_never_connects() {
        let backend = MemoryBackend::new();
        let gateway = Gateway::with_backend(BackendConfig::default(), Arc::new(backend.clone()));

        assert!(!gateway.initialize().await);
        assert_eq!(backend.connect_count(), 0);
        assert_eq!(gateway.connection_state(), ConnectionState::Unconfigured);
    }

    #[tokio::test]
    async fn initialize_is_idempotent() {
        let backend = MemoryBackend::new();
        let gateway = live(&backend);

        assert!(gateway.initialize().await);
        assert!(gateway.initialize().await);
        assert_eq!(backend.connect_count(), 1);
        assert_eq!(gateway.connection_state(), ConnectionState::Connected);
    }

    #[tokio::test]
    async fn connection_failure_is_reported_not_raised() {
        let backend = MemoryBackend::new();
        backend.set_fail_connect(true);
        let gateway = live(&backend);

        assert!(!gateway.initialize().await);
        assert!(!gateway.is_connected());
        assert!(matches!(
            gateway.connection_state(),
            ConnectionState::Failed { .. }
        ));
    }

    #[tokio::test]
    async fn disconnected_subscription_delivers_demo_set_once() {
        let gateway = Gateway::new(BackendConfig::default());
        let delivered = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&delivered);

        let sub = gateway.subscribe_to_emergencies(move |list| sink.lock().unwrap().push(list));

        assert!(!sub.is_active());
        let delivered = delivered.lock().unwrap();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].len(), 5);
    }

    #[tokio::test]
    async fn disconnected_alert_subscription_delivers_none() {
        let gateway = Gateway::new(BackendConfig::default());
        let delivered = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&delivered);

        let _sub = gateway.subscribe_to_alert_signal(move |s| sink.lock().unwrap().push(s));
        assert_eq!(*delivered.lock().unwrap(), vec![None]);
    }

    #[tokio::test]
    async fn disconnected_writes_return_sentinels() {
        let gateway = Gateway::new(BackendConfig::default());
        assert!(!gateway.initialize().await);

        assert_eq!(
            gateway.add_emergency(1.0, 2.0, EmergencyType::Fire).await,
            None
        );
        assert!(
            gateway
                .update_status(&"mock-1".into(), EmergencyStatus::Resolved)
                .await
        );
    }

    #[tokio::test]
    async fn live_writes_reach_backend() {
        let backend = MemoryBackend::new();
        let gateway = live(&backend);
        assert!(gateway.initialize().await);

        let id = gateway
            .add_emergency(11.0, 76.9, EmergencyType::Medical)
            .await
            .unwrap();
        assert!(gateway.update_status(&id, EmergencyStatus::InProgress).await);

        let records = backend.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, EmergencyStatus::InProgress);
    }

    #[tokio::test]
    async fn failed_live_writes_return_sentinels() {
        let backend = MemoryBackend::new();
        let gateway = live(&backend);
        assert!(gateway.initialize().await);
        backend.set_fail_writes(true);

        assert_eq!(
            gateway.add_emergency(1.0, 2.0, EmergencyType::Patrol).await,
            None
        );
        assert!(
            !gateway
                .update_status(&"missing".into(), EmergencyStatus::Resolved)
                .await
        );
    }

    #[tokio::test]
    async fn live_feed_delivers_full_snapshots() {
        let backend = MemoryBackend::new();
        let gateway = live(&backend);
        assert!(gateway.initialize().await);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _sub = gateway.subscribe_to_emergencies(move |list| {
            let _ = tx.send(list);
        });
        assert!(recv(&mut rx).await.is_empty());

        backend.push_snapshot(vec![
            emergency("a", EmergencyType::Fire),
            emergency("a", EmergencyType::Medical),
            emergency("b", EmergencyType::Patrol),
        ]);
        let list = recv(&mut rx).await;
        let ids: Vec<_> = list.iter().map(|e| e.id.as_str().to_owned()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(list[0].kind, EmergencyType::Fire);
    }

    #[tokio::test]
    async fn feed_error_keeps_subscription_alive() {
        let backend = MemoryBackend::new();
        let gateway = live(&backend);
        assert!(gateway.initialize().await);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let sub = gateway.subscribe_to_emergencies(move |list| {
            let _ = tx.send(list);
        });
        let _ = recv(&mut rx).await;

        backend.fail_emergency_feed("quota exceeded");
        tokio::task::yield_now().await;
        backend.push_snapshot(vec![emergency("c", EmergencyType::Fire)]);

        assert_eq!(recv(&mut rx).await.len(), 1);
        assert!(sub.is_active());
    }

    #[tokio::test]
    async fn feed_error_before_first_snapshot_delivers_empty_list() {
        let backend = MemoryBackend::with_records(vec![emergency("x", EmergencyType::Fire)]);
        let gateway = live(&backend);
        assert!(gateway.initialize().await);
        backend.fail_emergency_feed("quota exceeded");

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _sub = gateway.subscribe_to_emergencies(move |list| {
            let _ = tx.send(list);
        });
        assert!(recv(&mut rx).await.is_empty());

        backend.push_snapshot(vec![emergency("y", EmergencyType::Medical)]);
        let list = recv(&mut rx).await;
        assert_eq!(list[0].id.as_str(), "y");
    }

    #[tokio::test]
    async fn alert_errors_become_none() {
        let backend = MemoryBackend::new();
        let gateway = live(&backend);
        assert!(gateway.initialize().await);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _sub = gateway.subscribe_to_alert_signal(move |s| {
            let _ = tx.send(s);
        });
        assert_eq!(recv(&mut rx).await, None);

        let signal = AlertSignal {
            latitude: 11.0,
            longitude: 76.9,
            signal_type: SignalType::Fire,
            observed_at: 1_718_447_400_000,
        };
        backend.set_alert(Some(signal.clone()));
        assert_eq!(recv(&mut rx).await, Some(signal));

        backend.fail_alert_feed("permission denied");
        assert_eq!(recv(&mut rx).await, None);
    }

    #[tokio::test]
    async fn unsubscribe_stops_delivery() {
        let backend = MemoryBackend::new();
        let gateway = live(&backend);
        assert!(gateway.initialize().await);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let sub = gateway.subscribe_to_emergencies(move |list| {
            let _ = tx.send(list);
        });
        let _ = recv(&mut rx).await;

        sub.unsubscribe();
        sub.unsubscribe();
        backend.push_snapshot(vec![emergency("late", EmergencyType::Fire)]);

        // The delivery task exits and drops its sender.
        let next = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap();
        assert!(next.is_none());
    }
}
