//! Follow the board until interrupted.

use chrono::Local;
use tracing::debug;

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

use super::list::{render_board, summary};
use super::{Session, filter_of};

pub async fn handle(args: WatchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let session = Session::open(global).await?;
    let filter = filter_of(args.filter);
    let mut stream = session.board.subscribe();
    let mut printed = 0usize;

    if session.is_demo() {
        output::note(
            &global.output,
            global.quiet,
            "Demo board: nothing will change unless a backend is configured.",
        );
    }

    loop {
        let view = session.board.view(filter);
        if matches!(global.output, OutputFormat::Table) && printed > 0 && !global.quiet {
            println!();
        }
        output::note(
            &global.output,
            global.quiet,
            &format!("── {} ──", Local::now().format("%H:%M:%S")),
        );
        output::print_output(&render_board(&view, global)?, global.quiet);
        output::note(&global.output, global.quiet, &summary(&view, global));

        printed += 1;
        if args.count.is_some_and(|n| printed >= n) {
            break;
        }

        tokio::select! {
            changed = stream.changed() => {
                if changed.is_none() {
                    debug!("board closed");
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    Ok(())
}
