//! Shared helpers for command handlers.

use std::io::IsTerminal;

use emberwatch_core::{EmergencyBoard, EmergencyId};

use crate::error::CliError;

/// Resolve a full id or a unique id prefix against the current board.
pub fn resolve_id(board: &EmergencyBoard, identifier: &str) -> Result<EmergencyId, CliError> {
    let wanted = identifier.trim().trim_end_matches("...");
    if wanted.is_empty() {
        return Err(CliError::Validation {
            field: "id".into(),
            reason: "must not be empty".into(),
        });
    }

    let snap = board.snapshot();
    if let Some(exact) = snap.iter().find(|e| e.id.as_str() == wanted) {
        return Ok(exact.id.clone());
    }

    let matches: Vec<_> = snap
        .iter()
        .filter(|e| e.id.as_str().starts_with(wanted))
        .collect();
    match matches.as_slice() {
        [only] => Ok(only.id.clone()),
        [] => Err(CliError::NotFound {
            identifier: identifier.into(),
        }),
        many => Err(CliError::Ambiguous {
            identifier: identifier.into(),
            matches: many.len(),
        }),
    }
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Map a dialoguer failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}
