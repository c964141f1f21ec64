// ── Emergency board ──
//
// Owns the canonical emergency list for a session. The mode is chosen once
// by `start()` and never changes afterwards:
//
// - live: the list is exactly the last snapshot pushed through the gateway;
//   writes are forwarded and only show up when the next push lands.
// - fallback: the list is seeded from demo data and every write mutates it
//   in place.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError, Weak};

use chrono::Utc;
use serde::Serialize;
use tokio::sync::{Mutex as AsyncMutex, watch};
use tracing::{debug, info};

use super::views::{self, BoardView};
use crate::config::DemoArea;
use crate::fallback;
use crate::gateway::Gateway;
use crate::model::{Emergency, EmergencyId, EmergencyStatus, EmergencyType, Filter, NewEmergency};
use crate::stream::{EmergencyStream, Snapshot};
use crate::subscription::Subscription;

/// Which list is authoritative for this session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoardMode {
    Uninitialized,
    LiveConnected,
    FallbackOnly,
}

/// The dashboard's emergency list.
///
/// Cheaply cloneable; clones share state.
#[derive(Clone)]
pub struct EmergencyBoard {
    inner: Arc<BoardInner>,
}

struct BoardInner {
    gateway: Arc<Gateway>,
    demo_area: DemoArea,
    mode: OnceLock<BoardMode>,
    start_lock: AsyncMutex<()>,
    emergencies: watch::Sender<Snapshot>,
    loading: watch::Sender<bool>,
    subscription: Mutex<Option<Subscription>>,
    local_seq: AtomicU64,
}

impl EmergencyBoard {
    /// A board that will talk through `gateway`. Call [`start`](Self::start)
    /// to pick the mode.
    pub fn new(gateway: Arc<Gateway>) -> Self {
        let demo_area = gateway.config().demo_area;
        let (emergencies, _) = watch::channel(Snapshot::default());
        let (loading, _) = watch::channel(true);
        Self {
            inner: Arc::new(BoardInner {
                gateway,
                demo_area,
                mode: OnceLock::new(),
                start_lock: AsyncMutex::new(()),
                emergencies,
                loading,
                subscription: Mutex::new(None),
                local_seq: AtomicU64::new(0),
            }),
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Decide the session mode. Only the first call does anything.
    pub async fn start(&self) -> BoardMode {
        let _guard = self.inner.start_lock.lock().await;
        if let Some(mode) = self.inner.mode.get() {
            return *mode;
        }

        let mode = if self.inner.gateway.initialize().await {
            let weak = Arc::downgrade(&self.inner);
            let sub = self
                .inner
                .gateway
                .subscribe_to_emergencies(move |list| apply_push(&weak, list));
            *self.lock_subscription() = Some(sub);
            BoardMode::LiveConnected
        } else {
            let seed = fallback::generate();
            debug!(count = seed.len(), "seeded board with demo data");
            self.inner.emergencies.send_replace(Arc::new(seed));
            self.inner.loading.send_replace(false);
            BoardMode::FallbackOnly
        };

        let _ = self.inner.mode.set(mode);
        info!(?mode, "emergency board started");
        mode
    }

    /// Stop receiving live pushes. The last snapshot stays readable.
    pub fn shutdown(&self) {
        if let Some(sub) = self.lock_subscription().take() {
            sub.unsubscribe();
        }
    }

    pub fn mode(&self) -> BoardMode {
        self.inner
            .mode
            .get()
            .copied()
            .unwrap_or(BoardMode::Uninitialized)
    }

    /// `true` until the first snapshot is in place.
    pub fn is_loading(&self) -> bool {
        *self.inner.loading.borrow()
    }

    /// Wait until the first snapshot is in place.
    pub async fn ready(&self) {
        let mut rx = self.inner.loading.subscribe();
        let _ = rx.wait_for(|loading| !*loading).await;
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub fn snapshot(&self) -> Snapshot {
        self.inner.emergencies.borrow().clone()
    }

    pub fn filtered(&self, filter: Filter) -> Vec<Emergency> {
        views::filtered(&self.snapshot(), filter)
    }

    pub fn active_count(&self) -> usize {
        views::active_count(&self.snapshot())
    }

    pub fn get(&self, id: &EmergencyId) -> Option<Emergency> {
        self.snapshot().iter().find(|e| &e.id == id).cloned()
    }

    /// Everything needed to render the board under `filter`.
    pub fn view(&self, filter: Filter) -> BoardView {
        let all = self.snapshot();
        BoardView {
            filter,
            mode: self.mode(),
            loading: self.is_loading(),
            emergencies: views::filtered(&all, filter),
            active_count: views::active_count(&all),
            total: all.len(),
        }
    }

    /// Subscribe to board changes.
    pub fn subscribe(&self) -> EmergencyStream {
        EmergencyStream::new(self.inner.emergencies.subscribe())
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Report an emergency at a random spot in the demo area. `kind`
    /// defaults to a random type.
    pub async fn add_emergency(&self, kind: Option<EmergencyType>) -> Option<EmergencyId> {
        let (kind, (latitude, longitude)) = {
            let mut rng = rand::rng();
            let kind = kind.unwrap_or_else(|| EmergencyType::random(&mut rng));
            (kind, fallback::random_location(&self.inner.demo_area, &mut rng))
        };
        self.add_emergency_at(latitude, longitude, kind).await
    }

    /// Report an emergency at a given position.
    ///
    /// Live: forwarded; the entry appears with the next push. Fallback:
    /// appended immediately as `pending` with a fresh local id.
    pub async fn add_emergency_at(
        &self,
        latitude: f64,
        longitude: f64,
        kind: EmergencyType,
    ) -> Option<EmergencyId> {
        match self.start().await {
            BoardMode::LiveConnected => {
                self.inner
                    .gateway
                    .add_emergency(latitude, longitude, kind)
                    .await
            }
            BoardMode::FallbackOnly | BoardMode::Uninitialized => {
                let new = NewEmergency::pending(latitude, longitude, kind, Utc::now());
                let mut minted = None;
                self.inner.emergencies.send_modify(|snap| {
                    let id = self.next_local_id(snap.as_slice());
                    Arc::make_mut(snap).push(new.with_id(id.clone()));
                    minted = Some(id);
                });
                debug!(id = ?minted, %kind, "added local emergency");
                minted
            }
        }
    }

    /// Set an emergency's status.
    ///
    /// Live: forwarded, `false` if the write failed. Fallback: applied in
    /// place, `false` if no entry has that id.
    pub async fn update_status(&self, id: &EmergencyId, status: EmergencyStatus) -> bool {
        match self.start().await {
            BoardMode::LiveConnected => self.inner.gateway.update_status(id, status).await,
            BoardMode::FallbackOnly | BoardMode::Uninitialized => {
                let mut found = false;
                self.inner.emergencies.send_if_modified(|snap| {
                    let Some(pos) = snap.iter().position(|e| &e.id == id) else {
                        return false;
                    };
                    Arc::make_mut(snap)[pos].status = status;
                    found = true;
                    true
                });
                if !found {
                    debug!(%id, "no local emergency with that id");
                }
                found
            }
        }
    }

    /// Advance an emergency to its next status. Returns the status that
    /// was requested, or `None` if the id is unknown or the write failed.
    pub async fn cycle_status(&self, id: &EmergencyId) -> Option<EmergencyStatus> {
        self.start().await;
        let next = self.get(id)?.status.next();
        self.update_status(id, next).await.then_some(next)
    }

    // ── Internals ────────────────────────────────────────────────────

    fn next_local_id(&self, current: &[Emergency]) -> EmergencyId {
        loop {
            let n = self.inner.local_seq.fetch_add(1, Ordering::Relaxed) + 1;
            let id = EmergencyId::new(format!("local-{n}"));
            if !current.iter().any(|e| e.id == id) {
                return id;
            }
        }
    }

    fn lock_subscription(&self) -> std::sync::MutexGuard<'_, Option<Subscription>> {
        self.inner
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Replace the canonical list with a live push.
fn apply_push(board: &Weak<BoardInner>, list: Vec<Emergency>) {
    let Some(inner) = board.upgrade() else {
        return;
    };
    debug!(count = list.len(), "applying live snapshot");
    inner.emergencies.send_replace(Arc::new(list));
    inner.loading.send_replace(false);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::config::BackendConfig;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;
    use std::time::Duration;

    fn fallback_board() -> EmergencyBoard {
        EmergencyBoard::new(Arc::new(Gateway::new(BackendConfig::default())))
    }

    fn live_board(backend: &MemoryBackend) -> EmergencyBoard {
        let gateway = Gateway::with_backend(
            BackendConfig::with_credentials("key", "demo"),
            Arc::new(backend.clone()),
        );
        EmergencyBoard::new(Arc::new(gateway))
    }

    fn record(id: &str, kind: EmergencyType) -> Emergency {
        NewEmergency::pending(11.0, 76.9, kind, Utc::now()).with_id(id.into())
    }

    async fn settle(board: &EmergencyBoard, done: impl Fn(&[Emergency]) -> bool) {
        let mut stream = board.subscribe();
        tokio::time::timeout(Duration::from_secs(2), async {
            while !done(&stream.latest()) {
                stream.changed().await;
            }
        })
        .await
        .unwrap();
    }

    // ── Fallback mode ────────────────────────────────────────────────

    #[tokio::test]
    async fn fallback_seeds_demo_set() {
        let board = fallback_board();
        assert!(board.is_loading());
        assert_eq!(board.mode(), BoardMode::Uninitialized);

        assert_eq!(board.start().await, BoardMode::FallbackOnly);
        assert!(!board.is_loading());

        let view = board.view(Filter::Fire);
        assert_eq!(view.total, 5);
        assert_eq!(view.active_count, 4);
        let ids: Vec<_> = view.emergencies.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["mock-1", "mock-4"]);
    }

    #[tokio::test]
    async fn fallback_add_is_visible_immediately() {
        let board = fallback_board();
        board.start().await;
        let before: HashSet<_> = board.snapshot().iter().map(|e| e.id.clone()).collect();

        let id = board.add_emergency(Some(EmergencyType::Patrol)).await.unwrap();
        assert!(!before.contains(&id));

        let added = board.get(&id).unwrap();
        assert_eq!(added.status, EmergencyStatus::Pending);
        assert_eq!(added.kind, EmergencyType::Patrol);
        assert_eq!(board.snapshot().len(), 6);
        assert_eq!(board.active_count(), 5);
    }

    #[tokio::test]
    async fn fallback_ids_stay_unique() {
        let board = fallback_board();
        board.start().await;
        for _ in 0..20 {
            board.add_emergency(None).await.unwrap();
        }
        let snap = board.snapshot();
        let ids: HashSet<_> = snap.iter().map(|e| e.id.clone()).collect();
        assert_eq!(ids.len(), snap.len());
    }

    #[tokio::test]
    async fn fallback_add_lands_in_demo_area() {
        let board = fallback_board();
        let id = board.add_emergency(None).await.unwrap();
        let e = board.get(&id).unwrap();
        let area = DemoArea::default();
        assert!((e.latitude - area.center_latitude).abs() <= area.spread / 2.0);
        assert!((e.longitude - area.center_longitude).abs() <= area.spread / 2.0);
    }

    #[tokio::test]
    async fn fallback_status_update_in_place() {
        let board = fallback_board();
        board.start().await;

        assert!(board.update_status(&"mock-1".into(), EmergencyStatus::Resolved).await);
        assert_eq!(board.active_count(), 3);
        assert!(!board.update_status(&"nope".into(), EmergencyStatus::Resolved).await);
        assert_eq!(board.snapshot().len(), 5);
    }

    #[tokio::test]
    async fn cycle_status_walks_the_order() {
        let board = fallback_board();
        board.start().await;
        let id: EmergencyId = "mock-3".into();

        assert_eq!(board.cycle_status(&id).await, Some(EmergencyStatus::InProgress));
        assert_eq!(board.cycle_status(&id).await, Some(EmergencyStatus::Resolved));
        assert_eq!(board.cycle_status(&id).await, Some(EmergencyStatus::Pending));
        assert_eq!(board.cycle_status(&"ghost".into()).await, None);
    }

    #[tokio::test]
    async fn mode_is_decided_once() {
        let board = fallback_board();
        assert_eq!(board.start().await, BoardMode::FallbackOnly);
        board.add_emergency(None).await;
        assert_eq!(board.start().await, BoardMode::FallbackOnly);
        assert_eq!(board.snapshot().len(), 6);
    }

    // ── Live mode ────────────────────────────────────────────────────

    #[tokio::test]
    async fn live_board_reflects_pushes_exactly() {
        let backend = MemoryBackend::new();
        let board = live_board(&backend);
        assert_eq!(board.start().await, BoardMode::LiveConnected);
        board.ready().await;

        backend.push_snapshot(vec![
            record("p1-a", EmergencyType::Fire),
            record("p1-b", EmergencyType::Medical),
        ]);
        settle(&board, |l| l.len() == 2).await;

        backend.push_snapshot(vec![record("p2-a", EmergencyType::Patrol)]);
        settle(&board, |l| l.iter().any(|e| e.id.as_str() == "p2-a")).await;

        let ids: Vec<_> = board.snapshot().iter().map(|e| e.id.as_str().to_owned()).collect();
        assert_eq!(ids, vec!["p2-a"]);
    }

    #[tokio::test]
    async fn live_add_waits_for_push() {
        let backend = MemoryBackend::new();
        let board = live_board(&backend);
        board.start().await;
        board.ready().await;

        let id = board.add_emergency(Some(EmergencyType::Fire)).await.unwrap();
        settle(&board, |l| l.iter().any(|e| e.id == id)).await;
        assert_eq!(board.get(&id).unwrap().status, EmergencyStatus::Pending);
        assert_eq!(backend.records().len(), 1);
    }

    #[tokio::test]
    async fn live_failure_does_not_touch_list() {
        let backend = MemoryBackend::with_records(vec![record("x", EmergencyType::Medical)]);
        let board = live_board(&backend);
        board.start().await;
        board.ready().await;
        backend.set_fail_writes(true);

        assert_eq!(board.add_emergency(None).await, None);
        assert!(!board.update_status(&"x".into(), EmergencyStatus::Resolved).await);
        assert_eq!(board.cycle_status(&"x".into()).await, None);

        let snap = board.snapshot();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].status, EmergencyStatus::Pending);
    }

    #[tokio::test]
    async fn feed_failure_before_first_push_still_finishes_loading() {
        let backend = MemoryBackend::with_records(vec![record("x", EmergencyType::Fire)]);
        backend.fail_emergency_feed("quota exceeded");
        let board = live_board(&backend);

        assert_eq!(board.start().await, BoardMode::LiveConnected);
        tokio::time::timeout(Duration::from_secs(1), board.ready())
            .await
            .unwrap();
        assert!(!board.is_loading());
        assert!(board.snapshot().is_empty());

        backend.push_snapshot(vec![record("y", EmergencyType::Patrol)]);
        settle(&board, |l| l.len() == 1).await;
        assert_eq!(board.snapshot()[0].id.as_str(), "y");
    }

    #[tokio::test]
    async fn failed_connection_falls_back() {
        let backend = MemoryBackend::new();
        backend.set_fail_connect(true);
        let board = live_board(&backend);

        assert_eq!(board.start().await, BoardMode::FallbackOnly);
        assert_eq!(board.snapshot().len(), 5);
    }

    #[tokio::test]
    async fn shutdown_stops_live_updates() {
        let backend = MemoryBackend::new();
        let board = live_board(&backend);
        board.start().await;
        board.ready().await;

        board.shutdown();
        board.shutdown();
        backend.push_snapshot(vec![record("late", EmergencyType::Fire)]);
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(board.snapshot().is_empty());
    }
}
