use thiserror::Error;

use crate::{Principal, Scope};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing scope '{0}'")]
    Forbidden(Scope),
}

/// Check that a principal carries the scope an operation requires.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize(principal: &Principal, required: &Scope) -> Result<(), AuthzError> {
    if principal.scopes.iter().any(|s| s == required) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;
    use wallet_core::Identity;

    fn principal(scopes: Vec<Scope>) -> Principal {
        Principal {
            identity: Identity::parse("alice@example.com").unwrap(),
            scopes,
            token_id: Uuid::now_v7(),
            expires_at: Utc::now(),
        }
    }

    #[test]
    fn granted_scope_passes() {
        let p = principal(vec![Scope::READ_USERS]);
        assert_eq!(authorize(&p, &Scope::READ_USERS), Ok(()));
    }

    #[test]
    fn missing_scope_is_forbidden() {
        let p = principal(vec![Scope::READ_USERS]);
        assert_eq!(
            authorize(&p, &Scope::WRITE_USERS),
            Err(AuthzError::Forbidden(Scope::WRITE_USERS))
        );
    }

    #[test]
    fn scope_names_are_exact() {
        let p = principal(vec![Scope::new("post:user")]);
        assert!(authorize(&p, &Scope::WRITE_USERS).is_err());
    }
}
