//! Association records for in-flight and completed handshakes.

use std::time::Instant;

use serde::Serialize;

/// Handshake progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssociationStatus {
    Unverified,
    Verified,
}

impl AssociationStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unverified => "unverified",
            Self::Verified => "verified",
        }
    }
}

impl std::fmt::Display for AssociationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Access credentials returned by the provider's access-token exchange.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: String,
    pub access_token_secret: String,
    pub user_id: String,
    pub screen_name: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("user_id", &self.user_id)
            .field("screen_name", &self.screen_name)
            .finish()
    }
}

/// One handshake, keyed by its six-digit code.
#[derive(Debug, Clone)]
pub struct Association {
    pub code: String,
    /// Request token issued at initiation.
    pub oauth_token: String,
    /// Provider authorization page for `oauth_token`.
    pub oauth_url: String,
    /// Set once the access-token exchange succeeds.
    pub credentials: Option<Credentials>,
    pub status: AssociationStatus,
    pub created_at: Instant,
}

impl Association {
    #[must_use]
    pub fn new(code: String, oauth_token: String, oauth_url: String) -> Self {
        Self {
            code,
            oauth_token,
            oauth_url,
            credentials: None,
            status: AssociationStatus::Unverified,
            created_at: Instant::now(),
        }
    }

    /// Check if the association has outlived `ttl`.
    #[must_use]
    pub fn is_expired(&self, ttl: std::time::Duration) -> bool {
        self.created_at.elapsed() > ttl
    }

    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.status == AssociationStatus::Verified
    }
}
