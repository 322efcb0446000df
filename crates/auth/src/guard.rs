//! Per-request authorization: token → revocation → scope → identity.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, instrument};

use wallet_core::{Identity, StoreError};

use crate::authorize::{AuthzError, authorize};
use crate::revocation::{RevocationStore, TokenFingerprint};
use crate::{Principal, Scope, TokenCodec};

/// Default upper bound for a single store call made by the guard.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Existence check for wallet holders (implemented by the account store).
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    async fn exists(&self, identity: &Identity) -> Result<bool, StoreError>;
}

#[async_trait]
impl<S> IdentityDirectory for Arc<S>
where
    S: IdentityDirectory + ?Sized,
{
    async fn exists(&self, identity: &Identity) -> Result<bool, StoreError> {
        (**self).exists(identity).await
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Bad signature, malformed, expired or revoked token.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// Valid token without the scope the operation requires.
    #[error("forbidden: missing scope '{0}'")]
    Forbidden(Scope),

    /// Token is valid but its subject no longer has a wallet.
    #[error("identity '{0}' has no wallet")]
    NotFound(Identity),

    /// The revocation or account store could not answer.
    #[error("authorization could not be processed: {0}")]
    Processing(#[from] StoreError),
}

impl From<AuthzError> for AuthError {
    fn from(value: AuthzError) -> Self {
        match value {
            AuthzError::Forbidden(scope) => AuthError::Forbidden(scope),
        }
    }
}

/// Composes the token codec with server-side state.
///
/// Revocation is looked up on every call (never cached) so that logout takes
/// effect for the very next request.
#[derive(Debug)]
pub struct AuthorizationGuard<R, D> {
    codec: Arc<TokenCodec>,
    revocations: R,
    directory: D,
    store_timeout: Duration,
}

impl<R, D> AuthorizationGuard<R, D>
where
    R: RevocationStore,
    D: IdentityDirectory,
{
    pub fn new(codec: Arc<TokenCodec>, revocations: R, directory: D) -> Self {
        Self {
            codec,
            revocations,
            directory,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    pub fn revocations(&self) -> &R {
        &self.revocations
    }

    pub async fn authorize(&self, bearer: &str, required: &Scope) -> Result<Principal, AuthError> {
        self.authorize_at(bearer, required, Utc::now()).await
    }

    #[instrument(skip_all, fields(scope = %required), err(level = "debug"))]
    pub async fn authorize_at(
        &self,
        bearer: &str,
        required: &Scope,
        now: DateTime<Utc>,
    ) -> Result<Principal, AuthError> {
        let claims = self.codec.verify_at(bearer, now).map_err(|e| {
            debug!(reason = %e, "token rejected");
            AuthError::Unauthenticated(e.to_string())
        })?;

        let fingerprint = TokenFingerprint::of(bearer);
        let revoked = bounded(
            self.store_timeout,
            "revocation lookup",
            self.revocations.is_revoked(&fingerprint),
        )
        .await?;
        if revoked {
            return Err(AuthError::Unauthenticated("token has been revoked".to_string()));
        }

        let principal = Principal::from(claims);
        authorize(&principal, required)?;

        let exists = bounded(
            self.store_timeout,
            "identity lookup",
            self.directory.exists(&principal.identity),
        )
        .await?;
        if !exists {
            return Err(AuthError::NotFound(principal.identity));
        }

        Ok(principal)
    }
}

async fn bounded<T, F>(limit: Duration, operation: &'static str, fut: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::timeout(operation)),
    }
}
