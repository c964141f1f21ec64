//! Board listing, shared with `watch`.

use chrono::{DateTime, Utc};
use tabled::Tabled;

use emberwatch_core::{BoardMode, BoardView, Emergency, relative_age, short_id};

use crate::cli::{GlobalOpts, ListArgs};
use crate::error::CliError;
use crate::output;

use super::{Session, filter_of};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct EmergencyRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Reported")]
    reported: String,
}

impl EmergencyRow {
    pub fn new(e: &Emergency, now: DateTime<Utc>, color: bool) -> Self {
        Self {
            id: short_id(e.id.as_str()),
            kind: output::paint_kind(e.kind, color),
            status: output::paint_status(e.status, color),
            location: format!("{:.4}, {:.4}", e.latitude, e.longitude),
            reported: relative_age(e.timestamp, now),
        }
    }
}

/// One board, in the selected format.
pub fn render_board(view: &BoardView, global: &GlobalOpts) -> Result<String, CliError> {
    let color = output::should_color(&global.color);
    let now = Utc::now();
    output::render_list(
        &global.output,
        &view.emergencies,
        |e| EmergencyRow::new(e, now, color),
        |e| e.id.to_string(),
    )
}

/// Summary line under a table board.
pub fn summary(view: &BoardView, global: &GlobalOpts) -> String {
    let color = output::should_color(&global.color);
    let source = match view.mode {
        BoardMode::LiveConnected => "live",
        BoardMode::FallbackOnly | BoardMode::Uninitialized => "demo data",
    };
    let shown = if view.emergencies.len() == view.total {
        format!("{} incidents", view.total)
    } else {
        format!("{} of {} incidents ({})", view.emergencies.len(), view.total, view.filter)
    };
    output::dim(
        &format!("{shown} · {} active · {source}", view.active_count),
        color,
    )
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: ListArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let session = Session::open(global).await?;
    let view = session.board.view(filter_of(args.filter));

    output::print_output(&render_board(&view, global)?, global.quiet);
    output::note(&global.output, global.quiet, &summary(&view, global));
    Ok(())
}
