use chrono::{DateTime, Utc};

use crate::cache::credential::Credential;

/// A token pair issued for one credential. Never mutated once cached,
/// a refresh produces a new value that replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedToken {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_on: DateTime<Utc>,
    pub credential: Credential,
}

impl CachedToken {
    pub fn new(
        access_token: String,
        refresh_token: String,
        expires_on: DateTime<Utc>,
        credential: Credential,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_on,
            credential,
        }
    }

    /// Seconds left until expiry; negative once expired.
    pub fn remaining_seconds(&self, now: i64) -> i64 {
        self.expires_on.timestamp().saturating_sub(now)
    }
}
