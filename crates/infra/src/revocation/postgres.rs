use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use wallet_auth::{RevocationStore, TokenFingerprint};
use wallet_core::StoreError;

use crate::postgres::map_sqlx_error;

/// Revoked-token set in the `revoked_tokens` table, keyed by fingerprint.
#[derive(Debug, Clone)]
pub struct PostgresRevocationStore {
    pool: Arc<PgPool>,
}

impl PostgresRevocationStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait]
impl RevocationStore for PostgresRevocationStore {
    #[instrument(skip_all, err)]
    async fn revoke(&self, fingerprint: &TokenFingerprint) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO revoked_tokens (fingerprint, revoked_at)
            VALUES ($1, now())
            ON CONFLICT (fingerprint) DO NOTHING
            "#,
        )
        .bind(fingerprint.as_str())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("revoke_token", e))?;
        Ok(())
    }

    #[instrument(skip_all, err)]
    async fn is_revoked(&self, fingerprint: &TokenFingerprint) -> Result<bool, StoreError> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM revoked_tokens WHERE fingerprint = $1)")
            .bind(fingerprint.as_str())
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("is_token_revoked", e))
    }
}
