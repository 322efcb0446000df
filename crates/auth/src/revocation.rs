//! Revoked-token set contract.

use std::sync::Arc;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use wallet_core::StoreError;

/// SHA-256 digest (lowercase hex) of a raw bearer token.
///
/// Revocation entries are keyed by fingerprint so the raw credential is never
/// written to the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenFingerprint(String);

impl TokenFingerprint {
    pub fn of(token: &str) -> Self {
        Self(hex::encode(Sha256::digest(token.as_bytes())))
    }

    /// Wrap an already-computed digest (e.g. loaded from storage).
    pub fn from_hex(digest: impl Into<String>) -> Self {
        Self(digest.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for TokenFingerprint {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Append-only set of explicitly invalidated tokens (logout).
///
/// Entries never expire: once revoked, a token stays revoked for the lifetime
/// of the store. Implementations must make `revoke` idempotent and visible to
/// every subsequent `is_revoked` call.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    async fn revoke(&self, fingerprint: &TokenFingerprint) -> Result<(), StoreError>;

    async fn is_revoked(&self, fingerprint: &TokenFingerprint) -> Result<bool, StoreError>;

    async fn revoke_token(&self, token: &str) -> Result<(), StoreError> {
        self.revoke(&TokenFingerprint::of(token)).await
    }

    async fn is_token_revoked(&self, token: &str) -> Result<bool, StoreError> {
        self.is_revoked(&TokenFingerprint::of(token)).await
    }
}

#[async_trait]
impl<S> RevocationStore for Arc<S>
where
    S: RevocationStore + ?Sized,
{
    async fn revoke(&self, fingerprint: &TokenFingerprint) -> Result<(), StoreError> {
        (**self).revoke(fingerprint).await
    }

    async fn is_revoked(&self, fingerprint: &TokenFingerprint) -> Result<bool, StoreError> {
        (**self).is_revoked(fingerprint).await
    }
}
