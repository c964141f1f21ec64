// ── Runtime backend configuration ──
//
// Describes *how* to reach the remote document store and realtime feed.
// Carries credential data and tuning, but never touches disk or the
// environment. `emberwatch-config` builds one and hands it in.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use url::Url;

pub const DEFAULT_COLLECTION: &str = "emergencies";
pub const DEFAULT_ALERT_RECORD: &str = "drone_status";
/// Shortest feed polling period; smaller values are raised to this.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Area in which locally reported incidents are scattered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DemoArea {
    pub center_latitude: f64,
    pub center_longitude: f64,
    /// Full width of the square, in degrees.
    pub spread: f64,
}

impl Default for DemoArea {
    fn default() -> Self {
        Self {
            center_latitude: 11.0168,
            center_longitude: 76.9558,
            spread: 0.1,
        }
    }
}

/// Connection parameters for the live backend.
///
/// Only `api_key` and `project_id` are mandatory; without both the session
/// runs in fallback mode.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub api_key: Option<SecretString>,
    pub project_id: Option<String>,
    pub auth_domain: Option<String>,
    /// Realtime database root, e.g. `https://<project>-default-rtdb.firebaseio.com`.
    /// Without it the alert feed always reports no signal.
    pub database_url: Option<Url>,
    pub storage_bucket: Option<String>,
    pub messaging_sender_id: Option<String>,
    pub app_id: Option<String>,
    /// Override for the document store REST endpoint (emulators, tests).
    pub document_store_url: Option<Url>,
    /// Collection holding emergency documents.
    pub collection: String,
    /// Realtime record holding the alert signal.
    pub alert_record: String,
    /// How often the remote feeds are re-read. Never below
    /// [`MIN_POLL_INTERVAL`] in practice.
    pub poll_interval: Duration,
    /// Request timeout.
    pub timeout: Duration,
    pub demo_area: DemoArea,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            project_id: None,
            auth_domain: None,
            database_url: None,
            storage_bucket: None,
            messaging_sender_id: None,
            app_id: None,
            document_store_url: None,
            collection: DEFAULT_COLLECTION.into(),
            alert_record: DEFAULT_ALERT_RECORD.into(),
            poll_interval: Duration::from_secs(2),
            timeout: Duration::from_secs(30),
            demo_area: DemoArea::default(),
        }
    }
}

impl BackendConfig {
    /// Config with only the two mandatory parameters set.
    pub fn with_credentials(api_key: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            api_key: Some(SecretString::from(api_key.into())),
            project_id: Some(project_id.into()),
            ..Self::default()
        }
    }

    /// Whether both mandatory parameters are present and non-blank.
    /// This alone decides between live and fallback mode.
    pub fn is_configured(&self) -> bool {
        self.missing_parameters().is_empty()
    }

    /// Names of the mandatory parameters that are absent or blank.
    pub fn missing_parameters(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self
            .api_key
            .as_ref()
            .is_none_or(|k| k.expose_secret().trim().is_empty())
        {
            missing.push("api key");
        }
        if self.project_id.as_deref().is_none_or(|p| p.trim().is_empty()) {
            missing.push("project id");
        }
        missing
    }

    /// Drop the mandatory credentials, forcing fallback mode.
    pub fn without_credentials(mut self) -> Self {
        self.api_key = None;
        self.project_id = None;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_not_configured() {
        let cfg = BackendConfig::default();
        assert!(!cfg.is_configured());
        assert_eq!(cfg.missing_parameters(), vec!["api key", "project id"]);
    }

    #[test]
    fn both_mandatory_parameters_configure() {
        assert!(BackendConfig::with_credentials("key", "demo").is_configured());
    }

    #[test]
    fn blank_values_do_not_count() {
        let cfg = BackendConfig::with_credentials("  ", "demo");
        assert_eq!(cfg.missing_parameters(), vec!["api key"]);

        let cfg = BackendConfig::with_credentials("key", "");
        assert_eq!(cfg.missing_parameters(), vec!["project id"]);
    }

    #[test]
    fn optional_parameters_do_not_gate() {
        let mut cfg = BackendConfig::with_credentials("key", "demo");
        cfg.database_url = None;
        cfg.app_id = None;
        assert!(cfg.is_configured());
        assert!(!cfg.without_credentials().is_configured());
    }
}
