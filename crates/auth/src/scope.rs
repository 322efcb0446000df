use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Permission scope carried inside a bearer token.
///
/// Scopes are opaque strings (e.g. `"get:users"`). A route names the one scope
/// it requires; the token must carry exactly that string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scope(Cow<'static, str>);

impl Scope {
    /// Read access to the caller's own wallet (balance, history, details).
    pub const READ_USERS: Scope = Scope(Cow::Borrowed("get:users"));
    /// Mutating access (pay, logout).
    pub const WRITE_USERS: Scope = Scope(Cow::Borrowed("post:users"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Scopes granted to every holder at login.
    pub fn default_user_scopes() -> Vec<Scope> {
        vec![Self::READ_USERS, Self::WRITE_USERS]
    }
}

impl core::fmt::Display for Scope {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
