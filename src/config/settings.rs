use serde::Deserialize;

use crate::utils::constants::{
    DEFAULT_HTTP_TIMEOUT_MS, DEFAULT_METRICS_PATH, DEFAULT_REFRESH_WINDOW_SECS,
    DEFAULT_REQUEST_TOKEN_PATH,
};

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub settings: SettingsConfig,
    pub authority: AuthorityConfig,
}

/// ================================
/// Global service-wide settings
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct SettingsConfig {
    /// tokens expiring sooner than this are refreshed before being served
    #[serde(default = "default_refresh_window_seconds")]
    pub refresh_window_seconds: i64,
    pub server: ServerConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_path")]
    pub path: String,
    #[serde(default)]
    pub is_enabled: bool,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            path: default_metrics_path(),
            is_enabled: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: String,
    /// route answering token requests
    #[serde(default = "default_request_token_path")]
    pub path: String,
}

/// ================================
/// Authorization server
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct AuthorityConfig {
    pub token_endpoint: String,
    pub client_id: String,
    /// resource identifier sent with every grant
    pub resource: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String, // allowed: trace, debug, info, warn, error
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new(level: String, format: LogFormat) -> Self {
        Self { level, format }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Compact,
}

fn default_metrics_path() -> String {
    DEFAULT_METRICS_PATH.to_string()
}

fn default_request_token_path() -> String {
    DEFAULT_REQUEST_TOKEN_PATH.to_string()
}

fn default_refresh_window_seconds() -> i64 {
    DEFAULT_REFRESH_WINDOW_SECS
}

fn default_timeout_ms() -> u64 {
    DEFAULT_HTTP_TIMEOUT_MS
}
