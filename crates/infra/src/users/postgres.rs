use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::instrument;

use wallet_core::{Identity, StoreError};

use super::{UserRecord, UserStore};
use crate::postgres::map_sqlx_error;

#[derive(Debug, Clone)]
pub struct PostgresUserStore {
    pool: Arc<PgPool>,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    async fn find_where(&self, column: Lookup, value: &str) -> Result<Option<UserRecord>, StoreError> {
        let sql = match column {
            Lookup::Email => {
                "SELECT email, username, first_name, last_name, password_hash, created_at \
                 FROM users WHERE email = $1"
            }
            Lookup::Username => {
                "SELECT email, username, first_name, last_name, password_hash, created_at \
                 FROM users WHERE username = $1"
            }
        };

        let row: Option<UserRow> = sqlx::query_as(sql)
            .bind(value)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_user", e))?;

        row.map(UserRecord::try_from).transpose()
    }
}

#[derive(Debug, Clone, Copy)]
enum Lookup {
    Email,
    Username,
}

#[derive(FromRow)]
struct UserRow {
    email: String,
    username: String,
    first_name: String,
    last_name: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(UserRecord {
            email: Identity::parse(&row.email).map_err(|e| StoreError::integrity(e.to_string()))?,
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            password_hash: row.password_hash,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    #[instrument(skip_all, fields(email = %user.email), err)]
    async fn insert(&self, user: UserRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (email, username, first_name, last_name, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.email.as_str())
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_user", e))?;
        Ok(())
    }

    async fn find_by_email(&self, email: &Identity) -> Result<Option<UserRecord>, StoreError> {
        self.find_where(Lookup::Email, email.as_str()).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        self.find_where(Lookup::Username, username).await
    }
}
