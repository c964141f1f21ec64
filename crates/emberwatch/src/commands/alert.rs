//! Show (or follow) the alert signal.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;

use emberwatch_core::{AlertSignal, AlertTracker, Gateway, TrackerIssue, TrackerState, relative_age};

use crate::cli::{AlertArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::backend_config;

#[derive(Serialize)]
struct AlertReport {
    connected: bool,
    signal: Option<AlertSignal>,
    issue: Option<TrackerIssue>,
}

impl From<&TrackerState> for AlertReport {
    fn from(state: &TrackerState) -> Self {
        Self {
            connected: state.connected(),
            signal: state.latest.clone(),
            issue: state.issue,
        }
    }
}

fn detail(report: &AlertReport, color: bool) -> String {
    let Some(signal) = &report.signal else {
        let reason = report
            .issue
            .map_or_else(|| "No alert signal".to_owned(), |i| i.to_string());
        return output::dim(&reason, color);
    };

    let (lat, lon) = signal.location();
    let observed = signal.observed_at_utc().map_or_else(
        || signal.observed_at.to_string(),
        |at| format!("{} ({})", at.format("%Y-%m-%d %H:%M:%S UTC"), relative_age(at, Utc::now())),
    );
    [
        format!("Signal:    {} {}", signal.signal_type.emoji(), signal.signal_type),
        format!("Location:  {lat:.5}, {lon:.5}"),
        format!("Observed:  {observed}"),
        format!("Connected: {}", if report.connected { "yes" } else { "no" }),
    ]
    .join("\n")
}

fn plain(report: &AlertReport) -> String {
    report
        .signal
        .as_ref()
        .map(|s| format!("{},{}", s.latitude, s.longitude))
        .unwrap_or_default()
}

pub async fn handle(args: AlertArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let config = backend_config(global)?;
    let wait = config.timeout;
    let tracker = AlertTracker::start(Arc::new(Gateway::new(config))).await;
    let mut rx = tracker.subscribe();

    tokio::time::timeout(wait, rx.wait_for(|s| !s.loading))
        .await
        .map_err(|_| CliError::Timeout {
            seconds: wait.as_secs(),
        })?
        .map_err(|_| CliError::ConnectionFailed {
            reason: "alert tracker stopped".into(),
        })?;

    let color = output::should_color(&global.color);
    loop {
        let report = AlertReport::from(&*rx.borrow_and_update());
        let out = output::render_single(&global.output, &report, |r| detail(r, color), plain)?;
        output::print_output(&out, global.quiet);

        if !args.follow || report.issue == Some(TrackerIssue::NotConfigured) {
            break;
        }
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    tracker.stop();
    Ok(())
}
