use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::helpers::time::format_expires_on;
use crate::utils::constants::{MALFORMED_REQUEST, UNKNOWN_ERROR};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    RetrievedNew,
    Refreshed,
    ReturnedExisting,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::RetrievedNew => "retrieved new token",
            Action::Refreshed => "refreshed existing token",
            Action::ReturnedExisting => "returned existing token",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Action::RetrievedNew => "retrieved_new",
            Action::Refreshed => "refreshed",
            Action::ReturnedExisting => "returned_existing",
        }
    }
}

/// Answer to a token request. Serializes to exactly one of
/// `{token, expires_on, action}`, `{error, description}` or
/// `{"error": "unknown error"}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenResult {
    Issued {
        token: String,
        expires_on: DateTime<Utc>,
        action: Action,
    },
    Rejected {
        error: String,
        description: String,
    },
    Unknown,
}

impl TokenResult {
    pub fn malformed(description: impl Into<String>) -> Self {
        TokenResult::Rejected {
            error: MALFORMED_REQUEST.to_owned(),
            description: description.into(),
        }
    }

    /// metrics label
    pub fn outcome(&self) -> &'static str {
        match self {
            TokenResult::Issued { action, .. } => action.label(),
            TokenResult::Rejected { .. } => "rejected",
            TokenResult::Unknown => "unknown_error",
        }
    }
}

impl Serialize for TokenResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TokenResult::Issued {
                token,
                expires_on,
                action,
            } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("token", token)?;
                map.serialize_entry("expires_on", &format_expires_on(expires_on))?;
                map.serialize_entry("action", action.as_str())?;
                map.end()
            }
            TokenResult::Rejected { error, description } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("error", error)?;
                map.serialize_entry("description", description)?;
                map.end()
            }
            TokenResult::Unknown => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("error", UNKNOWN_ERROR)?;
                map.end()
            }
        }
    }
}
