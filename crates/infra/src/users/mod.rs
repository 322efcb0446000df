//! Registered wallet holders and their credentials.

pub mod in_memory;
pub mod password;
pub mod postgres;

pub use in_memory::InMemoryUserStore;
pub use password::{PasswordError, PasswordHashing};
pub use postgres::PostgresUserStore;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wallet_core::{Identity, StoreError};

/// Registration input, password still in clear text.
#[derive(Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: Identity,
    pub username: String,
    pub password: String,
}

impl core::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NewUser")
            .field("email", &self.email)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Persisted user row.
#[derive(Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub email: Identity,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            email: self.email.clone(),
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }
}

impl core::fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("UserRecord")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

/// Public view of a user (never carries the password hash).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: Identity,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user. `Conflict` if the email or the username is taken.
    async fn insert(&self, user: UserRecord) -> Result<(), StoreError>;

    async fn find_by_email(&self, email: &Identity) -> Result<Option<UserRecord>, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Resolve a login name: email first, then username.
    async fn find_by_login(&self, login: &str) -> Result<Option<UserRecord>, StoreError> {
        if let Ok(email) = Identity::parse(login) {
            if let Some(user) = self.find_by_email(&email).await? {
                return Ok(Some(user));
            }
        }
        self.find_by_username(login.trim()).await
    }
}

#[async_trait]
impl<S> UserStore for Arc<S>
where
    S: UserStore + ?Sized,
{
    async fn insert(&self, user: UserRecord) -> Result<(), StoreError> {
        (**self).insert(user).await
    }

    async fn find_by_email(&self, email: &Identity) -> Result<Option<UserRecord>, StoreError> {
        (**self).find_by_email(email).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        (**self).find_by_username(username).await
    }
}
