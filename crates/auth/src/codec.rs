//! HS256 token issuance and verification.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use uuid::Uuid;

use wallet_core::Identity;

use crate::claims::{TokenClaims, TokenValidationError, validate_claims};
use crate::Scope;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token signature mismatch")]
    BadSignature,

    #[error(transparent)]
    Claims(#[from] TokenValidationError),

    #[error("token encoding failed: {0}")]
    Encoding(String),
}

/// A freshly signed token together with the claims it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub claims: TokenClaims,
}

/// Signs and verifies bearer tokens with a shared secret.
///
/// Stateless apart from the key material, so a single instance is shared
/// behind an `Arc` by every request task.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl core::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &Algorithm::HS256)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked by `validate_claims` against an injectable clock.
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, identity: &Identity, scopes: &[Scope]) -> Result<IssuedToken, TokenError> {
        self.issue_at(identity, scopes, Utc::now())
    }

    pub fn issue_at(
        &self,
        identity: &Identity,
        scopes: &[Scope],
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let expires_at = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| TokenError::Encoding("token expiry out of range".to_string()))?;

        let claims = TokenClaims {
            sub: identity.clone(),
            scopes: scopes.to_vec(),
            issued_at: now,
            expires_at,
            jti: Uuid::now_v7(),
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Encoding(e.to_string()))?;

        Ok(IssuedToken { token, claims })
    }

    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, TokenError> {
        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                ErrorKind::ExpiredSignature => TokenError::Claims(TokenValidationError::Expired),
                _ => TokenError::Malformed(e.to_string()),
            })?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new(b"test-secret", Duration::minutes(10))
    }

    fn alice() -> Identity {
        Identity::parse("alice@example.com").unwrap()
    }

    #[test]
    fn issued_token_verifies_with_identity_and_scopes() {
        let codec = codec();
        let issued = codec.issue(&alice(), &Scope::default_user_scopes()).unwrap();

        let claims = codec.verify(&issued.token).unwrap();
        assert_eq!(claims.sub, alice());
        assert!(claims.has_scope(&Scope::READ_USERS));
        assert!(claims.has_scope(&Scope::WRITE_USERS));
    }

    #[test]
    fn tokens_signed_with_another_secret_are_rejected() {
        let other = TokenCodec::new(b"other-secret", Duration::minutes(10));
        let issued = other.issue(&alice(), &[Scope::READ_USERS]).unwrap();

        assert_eq!(codec().verify(&issued.token), Err(TokenError::BadSignature));
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(codec().verify("not-a-token"), Err(TokenError::Malformed(_))));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let codec = codec();
        let issued = codec.issue(&alice(), &[Scope::READ_USERS]).unwrap();
        let forged = codec.issue(&Identity::parse("mallory@example.com").unwrap(), &[]).unwrap();

        // Splice mallory's payload onto alice's signature.
        let a: Vec<&str> = issued.token.split('.').collect();
        let m: Vec<&str> = forged.token.split('.').collect();
        let spliced = format!("{}.{}.{}", a[0], m[1], a[2]);

        assert_eq!(codec.verify(&spliced), Err(TokenError::BadSignature));
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let codec = codec();
        let issued_at = Utc::now() - Duration::hours(1);
        let issued = codec.issue_at(&alice(), &[Scope::READ_USERS], issued_at).unwrap();

        assert_eq!(
            codec.verify(&issued.token),
            Err(TokenError::Claims(TokenValidationError::Expired))
        );
    }

    #[test]
    fn unrepresentable_expiry_is_an_error() {
        let codec = TokenCodec::new(b"test-secret", Duration::MAX);
        let err = codec.issue(&alice(), &[Scope::READ_USERS]).unwrap_err();
        assert!(matches!(err, TokenError::Encoding(_)));
    }

    #[test]
    fn each_issuance_is_unique() {
        let codec = codec();
        let now = Utc::now();
        let a = codec.issue_at(&alice(), &[], now).unwrap();
        let b = codec.issue_at(&alice(), &[], now).unwrap();
        assert_ne!(a.token, b.token);
    }
}
