use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use wallet_core::{Identity, StoreError};

use super::{UserRecord, UserStore};

#[derive(Debug, Default)]
struct Users {
    by_email: HashMap<Identity, UserRecord>,
    /// username -> email
    usernames: HashMap<String, Identity>,
}

/// In-memory user store with the same uniqueness rules as the `users` table.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<Users>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: UserRecord) -> Result<(), StoreError> {
        let mut users = self
            .users
            .write()
            .map_err(|_| StoreError::unavailable("user store lock poisoned"))?;

        if users.by_email.contains_key(&user.email) || users.usernames.contains_key(&user.username) {
            return Err(StoreError::conflict("email or username already registered"));
        }

        users.usernames.insert(user.username.clone(), user.email.clone());
        users.by_email.insert(user.email.clone(), user);
        Ok(())
    }

    async fn find_by_email(&self, email: &Identity) -> Result<Option<UserRecord>, StoreError> {
        let users = self
            .users
            .read()
            .map_err(|_| StoreError::unavailable("user store lock poisoned"))?;
        Ok(users.by_email.get(email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        let users = self
            .users
            .read()
            .map_err(|_| StoreError::unavailable("user store lock poisoned"))?;
        Ok(users
            .usernames
            .get(username)
            .and_then(|email| users.by_email.get(email))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(email: &str, username: &str) -> UserRecord {
        UserRecord {
            email: Identity::parse(email).unwrap(),
            username: username.to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            password_hash: "$argon2id$placeholder".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn email_and_username_are_unique() {
        let store = InMemoryUserStore::new();
        store.insert(record("ada@x.io", "ada")).await.unwrap();

        let dup_email = store.insert(record("ada@x.io", "ada2")).await.unwrap_err();
        let dup_name = store.insert(record("other@x.io", "ada")).await.unwrap_err();
        assert!(matches!(dup_email, StoreError::Conflict(_)));
        assert!(matches!(dup_name, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn login_resolves_email_then_username() {
        let store = InMemoryUserStore::new();
        store.insert(record("ada@x.io", "ada")).await.unwrap();

        let by_mail = store.find_by_login("ada@x.io").await.unwrap().unwrap();
        let by_name = store.find_by_login(" ada ").await.unwrap().unwrap();
        assert_eq!(by_mail, by_name);
        assert!(store.find_by_login("bob").await.unwrap().is_none());
        assert!(store.find_by_login("").await.unwrap().is_none());
    }
}
