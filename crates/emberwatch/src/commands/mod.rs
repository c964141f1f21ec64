//! Command dispatch and the session every board command runs in.

pub mod add;
pub mod alert;
pub mod config_cmd;
pub mod list;
pub mod seed;
pub mod status;
pub mod util;
pub mod watch;

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use emberwatch_core::{BackendConfig, ConnectionState, EmergencyBoard, Filter, Gateway};

use crate::cli::{Command, FilterArg, GlobalOpts};
use crate::error::CliError;
use crate::output;

/// Dispatch a board or backend command to its handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::List(args) => list::handle(args, global).await,
        Command::Watch(args) => watch::handle(args, global).await,
        Command::Add(args) => add::handle(args, global).await,
        Command::Status(args) => status::handle(args, global).await,
        Command::Alert(args) => alert::handle(args, global).await,
        Command::Seed => seed::handle(global).await,
        Command::Config(args) => config_cmd::handle(args, global),
        Command::Completions(_) => Err(CliError::Validation {
            field: "command".into(),
            reason: "completions are generated before dispatch".into(),
        }),
    }
}

// ── Configuration ────────────────────────────────────────────────────

/// Backend configuration from file + environment, with CLI overrides.
pub fn backend_config(global: &GlobalOpts) -> Result<BackendConfig, CliError> {
    let path = global
        .config
        .clone()
        .unwrap_or_else(emberwatch_config::config_path);
    let settings = emberwatch_config::load_settings_from(&path)?;
    let mut config = settings.to_backend_config()?;

    if let Some(secs) = global.timeout {
        config.timeout = Duration::from_secs(secs);
    }
    if global.demo {
        config = config.without_credentials();
    }
    Ok(config)
}

// ── Session ──────────────────────────────────────────────────────────

/// A started board plus the gateway behind it.
pub struct Session {
    pub board: EmergencyBoard,
    pub gateway: Arc<Gateway>,
    /// How long to wait for backend data.
    pub wait: Duration,
}

impl Session {
    /// Connect (or fall back to demo data) and wait for the first snapshot.
    pub async fn open(global: &GlobalOpts) -> Result<Self, CliError> {
        let config = backend_config(global)?;
        let wait = config.timeout;
        let gateway = Arc::new(Gateway::new(config));
        let board = EmergencyBoard::new(Arc::clone(&gateway));

        let mode = board.start().await;
        debug!(?mode, "board started");

        if let ConnectionState::Failed { reason } = gateway.connection_state() {
            output::note(
                &global.output,
                global.quiet,
                &format!("Backend unavailable ({reason}); showing demo data."),
            );
        }

        tokio::time::timeout(wait, board.ready())
            .await
            .map_err(|_| CliError::Timeout {
                seconds: wait.as_secs(),
            })?;

        Ok(Self {
            board,
            gateway,
            wait,
        })
    }

    pub fn is_demo(&self) -> bool {
        !self.gateway.is_connected()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.board.shutdown();
    }
}

pub fn filter_of(arg: FilterArg) -> Filter {
    match arg {
        FilterArg::All => Filter::All,
        FilterArg::Fire => Filter::Fire,
        FilterArg::Medical => Filter::Medical,
        FilterArg::Patrol => Filter::Patrol,
    }
}
