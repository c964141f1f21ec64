// HTTP client settings shared by the document store and realtime clients.

use std::time::Duration;

use crate::error::Error;

const USER_AGENT: &str = concat!("emberwatch/", env!("CARGO_PKG_VERSION"));

/// Settings applied to every `reqwest::Client` this crate builds.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Whole-request timeout, connect included.
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::with_timeout(Duration::from_secs(30))
    }
}

impl TransportConfig {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}
