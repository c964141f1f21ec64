//! Advance or set an incident's status.

use serde::Serialize;

use emberwatch_core::{EmergencyId, EmergencyStatus};

use crate::cli::{GlobalOpts, StatusArg, StatusArgs};
use crate::error::CliError;
use crate::output;

use super::{Session, util};

#[derive(Serialize)]
struct StatusChange {
    id: EmergencyId,
    from: EmergencyStatus,
    to: EmergencyStatus,
}

fn status_of(arg: StatusArg) -> EmergencyStatus {
    match arg {
        StatusArg::Pending => EmergencyStatus::Pending,
        StatusArg::InProgress => EmergencyStatus::InProgress,
        StatusArg::Resolved => EmergencyStatus::Resolved,
    }
}

pub async fn handle(args: StatusArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let session = Session::open(global).await?;
    let board = &session.board;

    let id = util::resolve_id(board, &args.id)?;
    let from = board
        .get(&id)
        .map(|e| e.status)
        .ok_or_else(|| CliError::NotFound {
            identifier: args.id.clone(),
        })?;

    let to = match args.set {
        Some(target) => {
            let target = status_of(target);
            if !board.update_status(&id, target).await {
                return Err(CliError::Rejected {
                    operation: "status update".into(),
                });
            }
            target
        }
        None => board
            .cycle_status(&id)
            .await
            .ok_or_else(|| CliError::Rejected {
                operation: "status update".into(),
            })?,
    };

    let color = output::should_color(&global.color);
    let change = StatusChange { id, from, to };
    let out = output::render_single(
        &global.output,
        &change,
        |c| {
            format!(
                "{}: {} → {}",
                c.id,
                output::paint_status(c.from, color),
                output::paint_status(c.to, color)
            )
        },
        |c| c.to.to_string(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
