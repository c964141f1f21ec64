//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use emberwatch_config::ConfigError;
use emberwatch_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONFIG: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const REJECTED: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Configuration ────────────────────────────────────────────────
    #[error("Backend not configured: missing {missing}")]
    #[diagnostic(
        code(emberwatch::not_configured),
        help(
            "Create a config file with: emberwatch config init\n\
             Or set EMBERWATCH_BACKEND__API_KEY and EMBERWATCH_BACKEND__PROJECT_ID."
        )
    )]
    NotConfigured { missing: String },

    #[error("Invalid configuration: {0}")]
    #[diagnostic(
        code(emberwatch::config),
        help("Check the file shown by: emberwatch config path")
    )]
    Config(#[from] ConfigError),

    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the backend: {reason}")]
    #[diagnostic(
        code(emberwatch::connection_failed),
        help("Check network access and the project settings, or run with --demo.")
    )]
    ConnectionFailed { reason: String },

    #[error("No data from the backend after {seconds}s")]
    #[diagnostic(
        code(emberwatch::timeout),
        help("Increase the wait with --timeout or check backend responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Incidents ────────────────────────────────────────────────────
    #[error("Incident '{identifier}' not found")]
    #[diagnostic(
        code(emberwatch::not_found),
        help("Run: emberwatch list to see current incidents")
    )]
    NotFound { identifier: String },

    #[error("Incident id '{identifier}' is ambiguous ({matches} matches)")]
    #[diagnostic(code(emberwatch::ambiguous), help("Use more characters of the id."))]
    Ambiguous { identifier: String, matches: usize },

    #[error("The backend rejected the {operation}")]
    #[diagnostic(
        code(emberwatch::rejected),
        help("Run again with -v for the backend's reason.")
    )]
    Rejected { operation: String },

    #[error("API error: {message}")]
    #[diagnostic(code(emberwatch::api_error))]
    Api { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(emberwatch::validation))]
    Validation { field: String, reason: String },

    #[error("'{action}' requires confirmation")]
    #[diagnostic(
        code(emberwatch::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to encode output: {0}")]
    #[diagnostic(code(emberwatch::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to encode configuration: {0}")]
    #[diagnostic(code(emberwatch::toml))]
    Toml(#[from] toml::ser::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotConfigured { .. } | Self::Config(_) => exit_code::CONFIG,
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Rejected { .. } => exit_code::REJECTED,
            Self::Validation { .. }
            | Self::Ambiguous { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConfigurationMissing { missing } => CliError::NotConfigured { missing },
            CoreError::ConnectionFailed { reason } => CliError::ConnectionFailed { reason },
            CoreError::NotFound { id } => CliError::NotFound { identifier: id },
            CoreError::Validation { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },
            CoreError::OperationFailed { message }
            | CoreError::StreamError { message }
            | CoreError::Api { message, .. } => CliError::Api { message },
            CoreError::Internal(message) => CliError::Api { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_exit_codes() {
        let cases = [
            (
                CoreError::ConfigurationMissing {
                    missing: "api key".into(),
                },
                exit_code::CONFIG,
            ),
            (
                CoreError::ConnectionFailed {
                    reason: "refused".into(),
                },
                exit_code::CONNECTION,
            ),
            (CoreError::NotFound { id: "x".into() }, exit_code::NOT_FOUND),
            (
                CoreError::Api {
                    message: "boom".into(),
                    status: Some(500),
                },
                exit_code::GENERAL,
            ),
        ];
        for (core, code) in cases {
            assert_eq!(CliError::from(core).exit_code(), code);
        }
    }
}
