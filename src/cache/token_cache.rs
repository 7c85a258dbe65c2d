use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard, RwLock};
use tracing::debug;

use crate::cache::credential::Credential;
use crate::cache::token::CachedToken;
use crate::observability::metrics::get_metrics;

type CredentialGuards = Mutex<HashMap<Credential, Arc<AsyncMutex<()>>>>;

/// Credential-keyed token cache: credential -> token.
///
/// Holds at most one entry per credential. Entries are only ever replaced,
/// never removed, so the map grows with the number of distinct credentials.
#[derive(Debug, Clone, Default)]
pub struct TokenCache {
    inner: Arc<RwLock<HashMap<Credential, CachedToken>>>,
    guards: Arc<CredentialGuards>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token cached for exactly this credential, if any.
    pub async fn lookup(&self, credential: &Credential) -> Option<CachedToken> {
        self.inner.read().await.get(credential).cloned()
    }

    /// Insert the token, replacing whatever the same credential held before.
    /// Readers see either the old entry or the new one, never a mix.
    pub async fn put(&self, token: CachedToken) {
        let size = {
            let mut map = self.inner.write().await;
            let replaced = map.insert(token.credential.clone(), token).is_some();
            debug!("cache put, replaced existing entry: {}", replaced);
            map.len()
        };
        get_metrics()
            .await
            .cached_credentials
            .set(i64::try_from(size).unwrap_or(i64::MAX));
    }

    /// Serializes work on one credential. Hold the guard across
    /// lookup -> outbound call -> put; other credentials are not blocked.
    /// The guard table entry goes away with the last holder or waiter.
    pub async fn lock(&self, credential: &Credential) -> CredentialGuard {
        let (mutex, slot) = {
            let mut guards = self.guards.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            let mutex = guards
                .entry(credential.clone())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone();
            let slot = GuardSlot {
                credential: credential.clone(),
                mutex: Some(mutex.clone()),
                guards: self.guards.clone(),
            };
            (mutex, slot)
        };
        let guard = mutex.lock_owned().await;
        CredentialGuard {
            _guard: guard,
            _slot: slot,
        }
    }

    /// credentials currently locked or waited on
    pub(crate) fn guard_entries(&self) -> usize {
        self.guards.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).len()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Exclusive access to one credential, released on drop.
// field order matters: the async guard drops before the slot cleans up
pub struct CredentialGuard {
    _guard: OwnedMutexGuard<()>,
    _slot: GuardSlot,
}

/// A registered interest in a credential's mutex.
struct GuardSlot {
    credential: Credential,
    mutex: Option<Arc<AsyncMutex<()>>>,
    guards: Arc<CredentialGuards>,
}

impl Drop for GuardSlot {
    fn drop(&mut self) {
        let mut guards = self.guards.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let Some(mutex) = self.mutex.take() else {
            return;
        };
        // table + this slot: nobody else holds or awaits the mutex.
        // The Arc is released under the table lock so counts stay consistent.
        let owned_by_table = guards
            .get(&self.credential)
            .is_some_and(|entry| Arc::ptr_eq(entry, &mutex));
        if owned_by_table && Arc::strong_count(&mutex) == 2 {
            guards.remove(&self.credential);
        }
        drop(mutex);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::time::from_unix_secs;
    use std::time::Duration;

    fn token(access: &str, credential: &Credential) -> CachedToken {
        CachedToken::new(
            access.to_owned(),
            format!("refresh-{access}"),
            from_unix_secs(2_000_000_000).unwrap(),
            credential.clone(),
        )
    }

    #[tokio::test]
    async fn put_replaces_entry_for_same_credential() {
        let cache = TokenCache::new();
        let credential = Credential::new("u1", "p1");

        cache.put(token("A1", &credential)).await;
        cache.put(token("A2", &credential)).await;

        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.lookup(&credential).await.unwrap().access_token, "A2");
    }

    #[tokio::test]
    async fn credentials_differing_in_password_do_not_share_entries() {
        let cache = TokenCache::new();
        let first = Credential::new("u1", "p1");
        let second = Credential::new("u1", "p2");

        cache.put(token("A1", &first)).await;
        assert!(cache.lookup(&second).await.is_none());

        cache.put(token("B1", &second)).await;
        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.lookup(&first).await.unwrap().access_token, "A1");
        assert_eq!(cache.lookup(&second).await.unwrap().access_token, "B1");
    }

    #[tokio::test]
    async fn lock_blocks_same_credential_only() {
        let cache = TokenCache::new();
        let credential = Credential::new("u1", "p1");

        let held = cache.lock(&credential).await;

        // a different credential is free
        let other = tokio::time::timeout(
            Duration::from_millis(100),
            cache.lock(&Credential::new("u2", "p2")),
        )
        .await;
        assert!(other.is_ok());
        drop(other);

        // the same credential waits for the holder
        let same = tokio::time::timeout(Duration::from_millis(100), cache.lock(&credential)).await;
        assert!(same.is_err());

        drop(held);
        let same = tokio::time::timeout(Duration::from_millis(100), cache.lock(&credential)).await;
        assert!(same.is_ok());
        drop(same);
        assert_eq!(cache.guard_entries(), 0);
    }

    #[tokio::test]
    async fn guard_entry_outlives_holder_while_others_wait() {
        let cache = TokenCache::new();
        let credential = Credential::new("u1", "p1");

        let held = cache.lock(&credential).await;
        let waiter = tokio::spawn({
            let cache = cache.clone();
            let credential = credential.clone();
            async move {
                let _guard = cache.lock(&credential).await;
            }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(cache.guard_entries(), 1);

        drop(held);
        waiter.await.unwrap();
        assert_eq!(cache.guard_entries(), 0);
    }

    #[tokio::test]
    async fn cancelled_waiter_does_not_leave_guard_entry() {
        let cache = TokenCache::new();
        let credential = Credential::new("u1", "p1");

        let held = cache.lock(&credential).await;
        let timed_out = tokio::time::timeout(Duration::from_millis(50), cache.lock(&credential)).await;
        assert!(timed_out.is_err());
        assert_eq!(cache.guard_entries(), 1);

        drop(held);
        assert_eq!(cache.guard_entries(), 0);
    }
}
