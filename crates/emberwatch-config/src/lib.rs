//! Configuration for emberwatch.
//!
//! Settings are layered: built-in defaults, then the TOML file, then
//! `VITE_FIREBASE_*` variables (the names a web dashboard `.env` uses),
//! then `EMBERWATCH_*` variables. The result translates into an
//! `emberwatch_core::BackendConfig`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use emberwatch_core::config::{DEFAULT_ALERT_RECORD, DEFAULT_COLLECTION, MIN_POLL_INTERVAL};
use emberwatch_core::{BackendConfig, DemoArea};

/// Overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "EMBERWATCH_CONFIG";

const ENV_PREFIX: &str = "EMBERWATCH_";
const DASHBOARD_ENV_PREFIX: &str = "VITE_FIREBASE_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub backend: BackendSettings,

    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub demo: DemoSettings,
}

/// Connection parameters. `api_key` and `project_id` are the only
/// mandatory ones; without both the dashboard runs on demo data.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BackendSettings {
    /// API key (plaintext; prefer the environment).
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub api_key: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub project_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub auth_domain: Option<String>,
    /// Realtime database root URL.
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub database_url: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub storage_bucket: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub messaging_sender_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub app_id: Option<String>,
    /// Document store endpoint override (emulators).
    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub document_store_url: Option<String>,

    #[serde(default = "default_collection")]
    pub collection: String,

    #[serde(default = "default_alert_record")]
    pub alert_record: String,

    /// Feed refresh interval in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for BackendSettings {
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
            collection: default_collection(),
            alert_record: default_alert_record(),
            poll_interval_ms: default_poll_interval_ms(),
            timeout: default_timeout(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

/// Where locally reported incidents are placed.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DemoSettings {
    pub center_latitude: f64,
    pub center_longitude: f64,
    pub spread: f64,
}

impl Default for DemoSettings {
    fn default() -> Self {
        let area = DemoArea::default();
        Self {
            center_latitude: area.center_latitude,
            center_longitude: area.center_longitude,
            spread: area.spread,
        }
    }
}

/// Accept numbers where a string is expected. Environment values that
/// look numeric (sender ids, app ids) arrive as numbers.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Signed(i64),
        Unsigned(u64),
        Float(f64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Signed(n) => n.to_string(),
        Raw::Unsigned(n) => n.to_string(),
        Raw::Float(n) => n.to_string(),
    }))
}

fn default_collection() -> String {
    DEFAULT_COLLECTION.into()
}
fn default_alert_record() -> String {
    DEFAULT_ALERT_RECORD.into()
}
fn default_poll_interval_ms() -> u64 {
    2000
}
fn default_timeout() -> u64 {
    30
}
fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `EMBERWATCH_CONFIG` if set, otherwise
/// the platform config directory.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("org", "emberwatch", "emberwatch").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("emberwatch");
    p
}

// ── Loading and saving ──────────────────────────────────────────────

/// Load settings from the default path and the environment.
pub fn load_settings() -> Result<Settings, ConfigError> {
    load_settings_from(&config_path())
}

/// Load settings from `path` (missing files are fine) and the environment.
pub fn load_settings_from(path: &Path) -> Result<Settings, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Settings::default()))
        .merge(Toml::file(path))
        .merge(
            Env::prefixed(DASHBOARD_ENV_PREFIX)
                .map(|key| format!("backend.{}", key.as_str().to_ascii_lowercase()).into()),
        )
        .merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]).split("__"));

    Ok(figment.extract()?)
}

/// Write settings as TOML to `path`, creating parent directories.
pub fn save_settings(settings: &Settings, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, toml::to_string_pretty(settings)?)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

impl Settings {
    /// Build the backend configuration. Blank strings count as unset.
    pub fn to_backend_config(&self) -> Result<BackendConfig, ConfigError> {
        let b = &self.backend;

        if self.demo.spread.is_nan() || self.demo.spread < 0.0 {
            return Err(ConfigError::Validation {
                field: "demo.spread".into(),
                reason: "must be a non-negative number of degrees".into(),
            });
        }

        Ok(BackendConfig {
            api_key: non_blank(b.api_key.as_deref()).map(|k| SecretString::from(k.to_owned())),
            project_id: non_blank(b.project_id.as_deref()).map(str::to_owned),
            auth_domain: non_blank(b.auth_domain.as_deref()).map(str::to_owned),
            database_url: parse_url("backend.database_url", b.database_url.as_deref())?,
            storage_bucket: non_blank(b.storage_bucket.as_deref()).map(str::to_owned),
            messaging_sender_id: non_blank(b.messaging_sender_id.as_deref()).map(str::to_owned),
            app_id: non_blank(b.app_id.as_deref()).map(str::to_owned),
            document_store_url: parse_url(
                "backend.document_store_url",
                b.document_store_url.as_deref(),
            )?,
            collection: b.collection.clone(),
            alert_record: b.alert_record.clone(),
            poll_interval: Duration::from_millis(b.poll_interval_ms).max(MIN_POLL_INTERVAL),
            timeout: Duration::from_secs(b.timeout),
            demo_area: DemoArea {
                center_latitude: self.demo.center_latitude,
                center_longitude: self.demo.center_longitude,
                spread: self.demo.spread,
            },
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_url(field: &str, value: Option<&str>) -> Result<Option<url::Url>, ConfigError> {
    non_blank(value)
        .map(|raw| {
            raw.parse().map_err(|e| ConfigError::Validation {
                field: field.into(),
                reason: format!("invalid URL '{raw}': {e}"),
            })
        })
        .transpose()
}
