use chrono::{DateTime, Utc};
use uuid::Uuid;

use wallet_core::Identity;

use crate::{Scope, TokenClaims};

/// An authenticated wallet holder, as established by the authorization guard.
///
/// Once produced, the identity is trusted for the rest of the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub identity: Identity,
    pub scopes: Vec<Scope>,
    pub token_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

impl From<TokenClaims> for Principal {
    fn from(claims: TokenClaims) -> Self {
        Self {
            identity: claims.sub,
            scopes: claims.scopes,
            token_id: claims.jti,
            expires_at: claims.expires_at,
        }
    }
}
