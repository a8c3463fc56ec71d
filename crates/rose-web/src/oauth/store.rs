//! In-memory association store following the `OAuthStore` pattern.
//!
//! One lock guards both the live associations and the codes reserved by
//! initiations still waiting on the provider, so a code is never handed out
//! twice and every state transition is atomic.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use super::codes;
use super::types::{Association, AssociationStatus, Credentials};
use crate::error::{StoreError, StoreResult};

#[derive(Default)]
struct Inner {
    associations: HashMap<String, Association>,
    /// Reserved code and when it was reserved. Entries left behind by
    /// cancelled initiations are dropped by the TTL sweep.
    reserved: HashMap<String, Instant>,
}

impl Inner {
    fn is_taken(&self, code: &str) -> bool {
        self.associations.contains_key(code) || self.reserved.contains_key(code)
    }
}

/// Outcome of a poll.
#[derive(Debug, Clone)]
pub enum Poll {
    /// Still waiting on the user; the association is untouched.
    Pending(Association),
    /// Verified; the association has been removed from the store.
    Delivered(Association),
}

/// Process-wide association store.
#[derive(Clone, Default)]
pub struct AssociationStore {
    inner: Arc<RwLock<Inner>>,
}

impl AssociationStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a code that is neither stored nor reserved, and reserve it.
    pub async fn reserve_code(&self) -> String {
        let mut inner = self.inner.write().await;
        let code = codes::generate_code(|c| inner.is_taken(c));
        inner.reserved.insert(code.clone(), Instant::now());
        code
    }

    /// Drop a reservation whose initiation failed.
    pub async fn release_code(&self, code: &str) {
        self.inner.write().await.reserved.remove(code);
    }

    /// Store a new unverified association.
    pub async fn create(
        &self,
        code: &str,
        oauth_token: String,
        oauth_url: String,
    ) -> StoreResult<Association> {
        let mut inner = self.inner.write().await;
        if inner.associations.contains_key(code) {
            return Err(StoreError::DuplicateCode(code.to_owned()));
        }
        inner.reserved.remove(code);

        let association = Association::new(code.to_owned(), oauth_token, oauth_url);
        inner.associations.insert(code.to_owned(), association.clone());
        Ok(association)
    }

    /// Look up an association by code.
    pub async fn get(&self, code: &str) -> StoreResult<Association> {
        self.inner
            .read()
            .await
            .associations
            .get(code)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(code.to_owned()))
    }

    /// Mutate an association in place, returning the updated record.
    pub async fn update<F>(&self, code: &str, mutator: F) -> StoreResult<Association>
    where
        F: FnOnce(&mut Association),
    {
        let mut inner = self.inner.write().await;
        let association = inner
            .associations
            .get_mut(code)
            .ok_or_else(|| StoreError::NotFound(code.to_owned()))?;
        mutator(association);
        Ok(association.clone())
    }

    /// Remove an association.
    pub async fn remove(&self, code: &str) -> StoreResult<Association> {
        self.inner
            .write()
            .await
            .associations
            .remove(code)
            .ok_or_else(|| StoreError::NotFound(code.to_owned()))
    }

    /// Record credentials and mark the association verified.
    ///
    /// Succeeds at most once per code, and only for the request token that was
    /// recorded at initiation.
    pub async fn verify(
        &self,
        code: &str,
        oauth_token: &str,
        credentials: Credentials,
    ) -> StoreResult<Association> {
        let mut inner = self.inner.write().await;
        let association = inner
            .associations
            .get_mut(code)
            .ok_or_else(|| StoreError::NotFound(code.to_owned()))?;

        if association.oauth_token != oauth_token {
            return Err(StoreError::TokenMismatch(code.to_owned()));
        }
        if association.is_verified() {
            return Err(StoreError::AlreadyVerified(code.to_owned()));
        }

        association.credentials = Some(credentials);
        association.status = AssociationStatus::Verified;
        Ok(association.clone())
    }

    /// Poll a code: verified associations are removed and returned exactly once.
    pub async fn take_if_verified(&self, code: &str) -> StoreResult<Poll> {
        let mut inner = self.inner.write().await;
        let association = inner
            .associations
            .get(code)
            .ok_or_else(|| StoreError::NotFound(code.to_owned()))?;
        if !association.is_verified() {
            return Ok(Poll::Pending(association.clone()));
        }

        inner
            .associations
            .remove(code)
            .map(Poll::Delivered)
            .ok_or_else(|| StoreError::NotFound(code.to_owned()))
    }

    /// Number of live associations.
    pub async fn len(&self) -> usize {
        self.inner.read().await.associations.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Number of codes reserved by initiations that have not stored an association.
    pub async fn reserved_len(&self) -> usize {
        self.inner.read().await.reserved.len()
    }

    /// Drop associations and reservations older than `ttl`.
    /// Returns how many were removed.
    pub async fn sweep_expired(&self, ttl: Duration) -> usize {
        let mut inner = self.inner.write().await;
        let before = inner.associations.len() + inner.reserved.len();
        inner.associations.retain(|_, association| !association.is_expired(ttl));
        inner.reserved.retain(|_, reserved_at| reserved_at.elapsed() <= ttl);
        before - inner.associations.len() - inner.reserved.len()
    }

    /// Start background cleanup task for abandoned handshakes.
    pub fn start_cleanup_task(&self, ttl: Duration, interval: Duration) {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let removed = store.sweep_expired(ttl).await;
                if removed > 0 {
                    tracing::debug!(count = removed, "Cleaned up expired associations");
                }
            }
        });
    }
}

impl std::fmt::Debug for AssociationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssociationStore").finish()
    }
}
