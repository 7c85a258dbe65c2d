use std::sync::Arc;

use tracing::{debug, warn};

use crate::broker::result::{Action, TokenResult};
use crate::cache::credential::Credential;
use crate::cache::token::CachedToken;
use crate::cache::token_cache::TokenCache;
use crate::observability::metrics::get_metrics;
use crate::policy::refresh::{decide, Decision};
use crate::sources::authority::{Authority, AuthorityClient};
use crate::sources::response::AuthorityResponse;

/// Entry point answering "give me a valid token for these credentials".
///
/// Cheap to clone; clones share the cache and the authorization client.
pub struct TokenBroker<A = AuthorityClient> {
    authority: Arc<A>,
    cache: TokenCache,
    refresh_window_seconds: i64,
}

impl<A> Clone for TokenBroker<A> {
    fn clone(&self) -> Self {
        Self {
            authority: self.authority.clone(),
            cache: self.cache.clone(),
            refresh_window_seconds: self.refresh_window_seconds,
        }
    }
}

impl<A: Authority> TokenBroker<A> {
    pub fn new(authority: A, refresh_window_seconds: i64) -> Self {
        Self::with_cache(authority, TokenCache::new(), refresh_window_seconds)
    }

    pub fn with_cache(authority: A, cache: TokenCache, refresh_window_seconds: i64) -> Self {
        Self {
            authority: Arc::new(authority),
            cache,
            refresh_window_seconds,
        }
    }

    pub fn cache(&self) -> &TokenCache {
        &self.cache
    }

    /// Serves, refreshes or acquires a token for `(username, password)` as of
    /// `now` (Unix seconds). Every path ends in a `TokenResult`; failures are
    /// never retried and a failed refresh leaves the stale entry cached.
    pub async fn handle(&self, username: &str, password: &str, now: i64) -> TokenResult {
        let credential = Credential::new(username, password);

        // one outbound exchange per credential at a time; later callers
        // find the entry the first one stored
        let _guard = self.cache.lock(&credential).await;
        let cached = self.cache.lookup(&credential).await;
        let decision = decide(cached.as_ref(), now, self.refresh_window_seconds);
        debug!("user '{}': {:?}", credential.username, decision);

        let result = match (decision, cached) {
            (Decision::UseExisting, Some(token)) => TokenResult::Issued {
                token: token.access_token,
                expires_on: token.expires_on,
                action: Action::ReturnedExisting,
            },
            (Decision::Refresh, Some(token)) => {
                let outcome = self.authority.refresh(&token.refresh_token).await;
                self.settle(credential, outcome, Action::Refreshed).await
            }
            (Decision::AcquireNew, _) | (_, None) => {
                let outcome = self
                    .authority
                    .acquire_new(&credential.username, &credential.password)
                    .await;
                self.settle(credential, outcome, Action::RetrievedNew).await
            }
        };

        get_metrics()
            .await
            .broker_requests
            .with_label_values(&[result.outcome()])
            .inc();
        debug!("token request answered: {}", result.outcome());
        result
    }

    /// Caches a granted token and maps the authorization outcome to a result.
    async fn settle(
        &self,
        credential: Credential,
        outcome: AuthorityResponse,
        action: Action,
    ) -> TokenResult {
        match outcome {
            AuthorityResponse::Granted(grant) => {
                let token = CachedToken::new(
                    grant.access_token,
                    grant.refresh_token,
                    grant.expires_on,
                    credential,
                );
                let result = TokenResult::Issued {
                    token: token.access_token.clone(),
                    expires_on: token.expires_on,
                    action,
                };
                self.cache.put(token).await;
                result
            }
            AuthorityResponse::Rejected { error, description } => {
                warn!("authorization server rejected the request: {}", error);
                TokenResult::Rejected { error, description }
            }
            AuthorityResponse::Unknown => TokenResult::Unknown,
        }
    }
}
