use wallet_auth::Principal;
use wallet_core::Identity;

/// Authenticated caller of a request, inserted by the auth middleware.
///
/// Handlers trust `identity` for the rest of the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    identity: Identity,
    token: String,
}

impl PrincipalContext {
    pub fn new(principal: Principal, token: impl Into<String>) -> Self {
        Self {
            identity: principal.identity,
            token: token.into(),
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// The raw bearer token the request was authenticated with.
    pub fn token(&self) -> &str {
        &self.token
    }
}
