//! Normalizes token endpoint bodies into exactly three outcomes.
//!
//! The HTTP status is not consulted: authorization servers answer
//! rejected grants with a 4xx carrying the same JSON error shape, and a
//! 2xx without the expected fields is still unusable.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

use crate::helpers::time::from_unix_secs;

/// Tokens returned by a successful password or refresh grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_on: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorityResponse {
    Granted(TokenGrant),
    /// explicit rejection, passed through to the caller verbatim
    Rejected { error: String, description: String },
    /// transport failure or a body of any other shape; detail is dropped
    Unknown,
}

impl AuthorityResponse {
    /// metrics label
    pub fn reason(&self) -> &'static str {
        match self {
            AuthorityResponse::Granted(_) => "granted",
            AuthorityResponse::Rejected { .. } => "rejected",
            AuthorityResponse::Unknown => "unknown",
        }
    }
}

/// Sorts a token endpoint body into granted, rejected or unknown.
///
/// A rejection needs both `error` and `error_description` as JSON strings.
/// Any other type, `null` included, makes the body unknown rather than
/// being stringified into the response.
pub fn classify(body: &str) -> AuthorityResponse {
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => {
            debug!("token endpoint body is not JSON: {}", e);
            return AuthorityResponse::Unknown;
        }
    };

    let grant_err = match parse_grant(&value) {
        Ok(grant) => return AuthorityResponse::Granted(grant),
        Err(e) => e,
    };

    let error = value.get("error").and_then(Value::as_str);
    let description = value.get("error_description").and_then(Value::as_str);
    match (error, description) {
        (Some(error), Some(description)) => AuthorityResponse::Rejected {
            error: error.to_owned(),
            description: description.to_owned(),
        },
        _ => {
            debug!("token endpoint body unusable: {:#}", grant_err);
            AuthorityResponse::Unknown
        }
    }
}

fn parse_grant(value: &Value) -> Result<TokenGrant> {
    let access_token = string_field(value, "access_token")?;
    let refresh_token = string_field(value, "refresh_token")?;
    let expires_on = value
        .get("expires_on")
        .ok_or_else(|| anyhow!("missing field 'expires_on'"))
        .and_then(parse_expires_on)
        .context("invalid 'expires_on'")?;

    Ok(TokenGrant {
        access_token,
        refresh_token,
        expires_on,
    })
}

fn string_field(value: &Value, name: &str) -> Result<String> {
    value
        .get(name)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| anyhow!("missing or non-string field '{}'", name))
}

/// Unix seconds as a JSON number or a numeric string; fractions are truncated.
fn parse_expires_on(value: &Value) -> Result<DateTime<Utc>> {
    let secs = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(finite_secs)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(finite_secs))
        }
        _ => None,
    }
    .ok_or_else(|| anyhow!("not a numeric unix timestamp: {}", value))?;

    from_unix_secs(secs).ok_or_else(|| anyhow!("timestamp {} out of range", secs))
}

fn finite_secs(secs: f64) -> Option<i64> {
    secs.is_finite().then(|| secs.trunc() as i64)
}
