//! Shared constants and invariants

/// 30 minutes before expiry a cached token is renewed instead of served
pub const DEFAULT_REFRESH_WINDOW_SECS: i64 = 1800;
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 5000;

pub const DEFAULT_REQUEST_TOKEN_PATH: &str = "/requesttoken";
pub const DEFAULT_METRICS_PATH: &str = "/metrics";

/// Display format of `expires_on` in broker responses (UTC)
pub const EXPIRES_ON_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// Outbound grant types
pub const GRANT_PASSWORD: &str = "password";
pub const GRANT_REFRESH_TOKEN: &str = "refresh_token";

pub const UNKNOWN_ERROR: &str = "unknown error";
pub const MALFORMED_REQUEST: &str = "malformed request";
