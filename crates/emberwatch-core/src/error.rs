// ── Core error types ──
//
// Errors below the gateway boundary. Dashboard consumers never see these:
// the `Gateway` logs them and hands back `None`/`false`/empty instead.
// The `From<emberwatch_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Backend not configured: missing {missing}")]
    ConfigurationMissing { missing: String },

    #[error("Cannot connect to backend: {reason}")]
    ConnectionFailed { reason: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Operation failed: {message}")]
    OperationFailed { message: String },

    #[error("Subscription stream failed: {message}")]
    StreamError { message: String },

    #[error("Emergency not found: {id}")]
    NotFound { id: String },

    #[error("Validation failed: {message}")]
    Validation { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<emberwatch_api::Error> for CoreError {
    fn from(err: emberwatch_api::Error) -> Self {
        match err {
            emberwatch_api::Error::Transport(ref e) if e.is_connect() || e.is_timeout() => {
                CoreError::ConnectionFailed {
                    reason: e.to_string(),
                }
            }
            emberwatch_api::Error::Transport(e) => CoreError::Api {
                status: e.status().map(|s| s.as_u16()),
                message: e.to_string(),
            },
            emberwatch_api::Error::InvalidUrl(e) => CoreError::ConfigurationMissing {
                missing: format!("a valid URL ({e})"),
            },
            emberwatch_api::Error::Tls(reason) => CoreError::ConnectionFailed {
                reason: format!("TLS error: {reason}"),
            },
            emberwatch_api::Error::DocumentStore { status: 404, message }
            | emberwatch_api::Error::Realtime { status: 404, message } => {
                CoreError::NotFound { id: message }
            }
            emberwatch_api::Error::DocumentStore { status, message }
            | emberwatch_api::Error::Realtime { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            emberwatch_api::Error::MissingDocumentName => CoreError::OperationFailed {
                message: "backend returned a document without an id".into(),
            },
            emberwatch_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
