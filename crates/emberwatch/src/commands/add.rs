//! Report a new incident.

use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tracing::warn;

use emberwatch_core::{Emergency, EmergencyBoard, EmergencyId, EmergencyType, relative_age};

use crate::cli::{AddArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::Session;

#[derive(Serialize)]
#[serde(untagged)]
enum Added {
    /// Visible on the board.
    Stored(Emergency),
    /// Accepted by the backend but not pushed back yet.
    Pending { id: EmergencyId },
}

impl Added {
    fn id(&self) -> String {
        match self {
            Self::Stored(e) => e.id.to_string(),
            Self::Pending { id } => id.to_string(),
        }
    }
}

fn detail(added: &Added, color: bool) -> String {
    match added {
        Added::Stored(e) => [
            format!("ID:        {}", e.id),
            format!("Type:      {}", output::paint_kind(e.kind, color)),
            format!("Status:    {}", output::paint_status(e.status, color)),
            format!("Location:  {:.5}, {:.5}", e.latitude, e.longitude),
            format!("Reported:  {}", relative_age(e.timestamp, Utc::now())),
        ]
        .join("\n"),
        Added::Pending { id } => format!("ID:        {id}\nStatus:    submitted"),
    }
}

pub async fn handle(args: AddArgs, global: &GlobalOpts) -> Result<(), CliError> {
    if let (Some(lat), Some(lon)) = (args.lat, args.lon) {
        validate_position(lat, lon)?;
    }

    let kind = {
        let mut rng = rand::rng();
        EmergencyType::parse_or_random(args.kind.as_deref(), &mut rng)
    };
    if let Some(raw) = args.kind.as_deref() {
        if raw.trim().parse::<EmergencyType>().is_err() {
            warn!(value = raw, chosen = %kind, "unknown incident type, picked one at random");
        }
    }

    let session = Session::open(global).await?;
    let board = &session.board;

    let id = match (args.lat, args.lon) {
        (Some(lat), Some(lon)) => board.add_emergency_at(lat, lon, kind).await,
        _ => board.add_emergency(Some(kind)).await,
    }
    .ok_or_else(|| CliError::Rejected {
        operation: "new incident".into(),
    })?;

    let added = match await_entry(board, &id, session.wait).await {
        Some(e) => Added::Stored(e),
        None => Added::Pending { id },
    };

    let color = output::should_color(&global.color);
    let out = output::render_single(&global.output, &added, |a| detail(a, color), Added::id)?;
    output::print_output(&out, global.quiet);

    if session.is_demo() {
        output::note(
            &global.output,
            global.quiet,
            "Demo board: the incident is not stored anywhere.",
        );
    }
    Ok(())
}

/// The new entry, once it is on the board. Live boards only show it after
/// the backend pushes it back.
async fn await_entry(board: &EmergencyBoard, id: &EmergencyId, wait: Duration) -> Option<Emergency> {
    let mut stream = board.subscribe();
    tokio::time::timeout(wait, async {
        loop {
            if let Some(e) = board.get(id) {
                return Some(e);
            }
            stream.changed().await?;
        }
    })
    .await
    .ok()
    .flatten()
}

fn validate_position(lat: f64, lon: f64) -> Result<(), CliError> {
    if !(-90.0..=90.0).contains(&lat) {
        return Err(CliError::Validation {
            field: "lat".into(),
            reason: format!("{lat} is outside -90..=90"),
        });
    }
    if !(-180.0..=180.0).contains(&lon) {
        return Err(CliError::Validation {
            field: "lon".into(),
            reason: format!("{lon} is outside -180..=180"),
        });
    }
    Ok(())
}
