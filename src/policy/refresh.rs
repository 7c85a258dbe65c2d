use crate::cache::token::CachedToken;

/// What the broker has to do before it can answer a token request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// nothing cached for the credential
    AcquireNew,
    /// cached, but inside the refresh window (or already expired)
    Refresh,
    UseExisting,
}

/// The window is a safety margin: a token with less than
/// `refresh_window_seconds` of validity left is renewed while still valid,
/// so downstream callers never receive one that expires mid-use.
pub fn decide(cached: Option<&CachedToken>, now: i64, refresh_window_seconds: i64) -> Decision {
    match cached {
        None => Decision::AcquireNew,
        Some(token) if token.remaining_seconds(now) < refresh_window_seconds => Decision::Refresh,
        Some(_) => Decision::UseExisting,
    }
}
