// Realtime Database REST client
//
// Reads single records from the key-value tree. A record path maps to
// `{database_url}/{path}.json`; an absent record comes back as a JSON
// `null` body, which is surfaced as `Ok(None)` rather than an error.

use secrecy::{ExposeSecret, SecretString};
use tracing::trace;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Raw HTTP client for one Realtime Database instance.
pub struct RealtimeClient {
    http: reqwest::Client,
    database_url: Url,
    auth: Option<SecretString>,
}

impl RealtimeClient {
    pub fn new(
        database_url: Url,
        auth: Option<SecretString>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, database_url, auth))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    ///
    /// `auth` is an optional database secret or ID token, sent as the
    /// `auth` query parameter.
    pub fn with_client(http: reqwest::Client, database_url: Url, auth: Option<SecretString>) -> Self {
        Self {
            http,
            database_url,
            auth,
        }
    }

    pub fn database_url(&self) -> &Url {
        &self.database_url
    }

    /// Fetch the record at `path`. `Ok(None)` means the record is empty.
    pub async fn get_record(&self, path: &str) -> Result<Option<serde_json::Value>, Error> {
        let url = self.record_url(path)?;
        trace!(%url, "reading realtime record");

        let mut req = self.http.get(url);
        if let Some(ref auth) = self.auth {
            req = req.query(&[("auth", auth.expose_secret())]);
        }
        let resp = req.send().await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(Error::Realtime {
                status: status.as_u16(),
                message: realtime_error_message(&body),
            });
        }

        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body,
            })?;
        Ok((!value.is_null()).then_some(value))
    }

    fn record_url(&self, path: &str) -> Result<Url, Error> {
        let trimmed = path.trim_matches('/');
        let mut url = self.database_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?;
            segments.pop_if_empty();
            let mut parts = trimmed.split('/').peekable();
            while let Some(part) = parts.next() {
                if parts.peek().is_some() {
                    segments.push(part);
                } else {
                    segments.push(&format!("{part}.json"));
                }
            }
        }
        Ok(url)
    }
}

/// The realtime database reports failures as `{"error": "..."}`.
fn realtime_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_owned))
        .unwrap_or_else(|| body.to_owned())
}
