use thiserror::Error;

/// Top-level error type for the `emberwatch-api` crate.
///
/// Covers every failure mode across both remote surfaces: transport,
/// the document store, and the realtime feed. `emberwatch-core` maps these
/// into domain errors and never lets them reach a dashboard consumer.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Document store ──────────────────────────────────────────────
    /// Structured error returned by the document store.
    #[error("Document store error (HTTP {status}): {message}")]
    DocumentStore { status: u16, message: String },

    /// A document came back without a resource name, so it has no id.
    #[error("Document store returned a document without a name")]
    MissingDocumentName,

    // ── Realtime feed ───────────────────────────────────────────────
    /// Non-success response from the realtime database.
    #[error("Realtime database error (HTTP {status}): {message}")]
    Realtime { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::DocumentStore { status: 404, .. } | Self::Realtime { status: 404, .. } => true,
            _ => false,
        }
    }
}
