//! `wallet-auth`: bearer-token authentication/authorization boundary.
//!
//! This crate is decoupled from HTTP and from concrete storage: revocation and
//! identity lookups are reached through the [`RevocationStore`] and
//! [`IdentityDirectory`] traits.

pub mod authorize;
pub mod claims;
pub mod codec;
pub mod guard;
pub mod principal;
pub mod revocation;
pub mod scope;

pub use authorize::{AuthzError, authorize};
pub use claims::{TokenClaims, TokenValidationError, validate_claims};
pub use codec::{IssuedToken, TokenCodec, TokenError};
pub use guard::{AuthError, AuthorizationGuard, IdentityDirectory};
pub use principal::Principal;
pub use revocation::{RevocationStore, TokenFingerprint};
pub use scope::Scope;
