//! Postgres connection and schema wiring shared by the store adapters.
//!
//! ## Error Mapping
//!
//! SQLx errors are mapped to `StoreError` as follows:
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (check constraint violation) | `23514` | `Integrity` |
//! | Database (numeric value out of range) | `22003` | `Integrity` |
//! | Database (other) | Any other | `Unavailable` |
//! | PoolTimedOut | N/A | `Timeout` |
//! | PoolClosed / Io / Tls / other | N/A | `Unavailable` |

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, instrument};

use wallet_core::StoreError;

use crate::config::DatabaseConfig;

/// Statements run by [`ensure_schema`], in order. All are idempotent.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS accounts (
        owner   TEXT PRIMARY KEY,
        balance BIGINT NOT NULL CHECK (balance >= 0)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS transactions (
        seq          BIGSERIAL,
        id           UUID PRIMARY KEY,
        owner        TEXT NOT NULL,
        direction    TEXT NOT NULL CHECK (direction IN ('Debit', 'Credit')),
        counterparty TEXT NOT NULL,
        amount       BIGINT NOT NULL CHECK (amount > 0),
        status       TEXT NOT NULL CHECK (status IN ('Success', 'Failed')),
        occurred_at  TIMESTAMPTZ NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS transactions_owner_recent_idx
        ON transactions (owner, occurred_at DESC, seq DESC)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS revoked_tokens (
        fingerprint TEXT PRIMARY KEY,
        revoked_at  TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS users (
        email         TEXT PRIMARY KEY,
        username      TEXT NOT NULL UNIQUE,
        first_name    TEXT NOT NULL,
        last_name     TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        created_at    TIMESTAMPTZ NOT NULL
    )
    "#,
];

/// Build a connection pool from configuration.
#[instrument(skip_all, fields(max_connections = config.max_connections), err)]
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout)
        .connect(&config.url)
        .await
        .map_err(|e| map_sqlx_error("connect", e))?;

    info!("database pool established");
    Ok(pool)
}

/// Create the wallet tables if they do not exist yet.
#[instrument(skip_all, err)]
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
    for statement in SCHEMA {
        sqlx::query(*statement)
            .execute(pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
    }
    Ok(())
}

/// Map a SQLx error to a store fault.
pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            classify_database_error(db_err.code().as_deref(), msg)
        }
        sqlx::Error::PoolTimedOut => StoreError::timeout(format!("pool acquire in {operation}")),
        sqlx::Error::PoolClosed => {
            StoreError::unavailable(format!("connection pool closed in {operation}"))
        }
        other => StoreError::unavailable(format!("sqlx error in {operation}: {other}")),
    }
}

fn classify_database_error(code: Option<&str>, msg: String) -> StoreError {
    match code {
        Some("23505") => StoreError::Conflict(msg),
        // 22003: a balance update overflowed the BIGINT column.
        Some("23514") | Some("22003") => StoreError::Integrity(msg),
        _ => StoreError::Unavailable(msg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_codes_map_to_store_errors() {
        fn classify(code: Option<&str>) -> StoreError {
            classify_database_error(code, "boom".to_string())
        }

        assert!(matches!(classify(Some("23505")), StoreError::Conflict(_)));
        assert!(matches!(classify(Some("23514")), StoreError::Integrity(_)));
        assert!(matches!(classify(Some("22003")), StoreError::Integrity(_)));
        assert!(matches!(classify(Some("40001")), StoreError::Unavailable(_)));
        assert!(matches!(classify(None), StoreError::Unavailable(_)));
    }

    #[test]
    fn pool_timeout_maps_to_timeout() {
        let err = map_sqlx_error("credit", sqlx::Error::PoolTimedOut);
        assert!(matches!(err, StoreError::Timeout(_)));
    }
}
