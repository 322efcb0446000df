use std::collections::HashSet;
use std::sync::RwLock;

use async_trait::async_trait;

use wallet_auth::{RevocationStore, TokenFingerprint};
use wallet_core::StoreError;

/// In-memory revoked-token set. Grows for the lifetime of the process.
#[derive(Debug, Default)]
pub struct InMemoryRevocationStore {
    revoked: RwLock<HashSet<TokenFingerprint>>,
}

impl InMemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.revoked.read().map(|set| set.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RevocationStore for InMemoryRevocationStore {
    async fn revoke(&self, fingerprint: &TokenFingerprint) -> Result<(), StoreError> {
        self.revoked
            .write()
            .map_err(|_| StoreError::unavailable("revocation lock poisoned"))?
            .insert(fingerprint.clone());
        Ok(())
    }

    async fn is_revoked(&self, fingerprint: &TokenFingerprint) -> Result<bool, StoreError> {
        let revoked = self
            .revoked
            .read()
            .map_err(|_| StoreError::unavailable("revocation lock poisoned"))?;
        Ok(revoked.contains(fingerprint))
    }
}
