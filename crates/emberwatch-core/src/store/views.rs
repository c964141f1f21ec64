// ── Derived views ──
//
// Pure functions over a snapshot. Recomputed from the canonical list on
// every read; nothing here is cached.

use serde::Serialize;

use crate::model::{Emergency, Filter};

use super::BoardMode;

/// Entries matching `filter`, in their original order.
pub fn filtered(list: &[Emergency], filter: Filter) -> Vec<Emergency> {
    list.iter().filter(|e| filter.matches(e)).cloned().collect()
}

/// Entries not yet resolved.
pub fn active_count(list: &[Emergency]) -> usize {
    list.iter().filter(|e| e.status.is_active()).count()
}

/// Everything a dashboard renders for one filter setting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardView {
    pub filter: Filter,
    pub mode: BoardMode,
    pub loading: bool,
    /// Filtered entries.
    pub emergencies: Vec<Emergency>,
    /// Active count over the whole board, not just the filtered slice.
    pub active_count: usize,
    pub total: usize,
}
