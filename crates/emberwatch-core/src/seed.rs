// ── Collection reseeding ──

use chrono::Utc;
use serde::Serialize;

use crate::backend::RemoteBackend;
use crate::config::BackendConfig;
use crate::error::CoreError;
use crate::fallback;

/// Outcome of a reseed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub removed: usize,
    pub created: usize,
}

/// Clear the configured collection and write the sample set.
///
/// Unlike the gateway this reports failures: it is an operator action, not
/// part of the dashboard session.
pub async fn reseed(config: &BackendConfig) -> Result<SeedReport, CoreError> {
    let backend = RemoteBackend::new(config)?;
    let (removed, created) = backend
        .replace_all(fallback::seed_samples(Utc::now()))
        .await?;
    Ok(SeedReport { removed, created })
}
