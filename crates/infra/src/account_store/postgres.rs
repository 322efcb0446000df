//! Postgres-backed account store.
//!
//! Transfers run in a single transaction that locks both rows with
//! `SELECT … FOR UPDATE` in owner order, checks the source balance and then
//! applies both updates. The `balance >= 0` check constraint backs the
//! application-level check.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::instrument;

use wallet_auth::IdentityDirectory;
use wallet_core::{Account, Amount, Identity, StoreError};

use super::{AccountStore, DebitCreditOutcome};
use crate::postgres::map_sqlx_error;

#[derive(Debug, Clone)]
pub struct PostgresAccountStore {
    pool: Arc<PgPool>,
}

impl PostgresAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

fn account_from_row(row: &sqlx::postgres::PgRow) -> Result<Account, StoreError> {
    let owner: String = row
        .try_get("owner")
        .map_err(|e| map_sqlx_error("decode_account", e))?;
    let balance: i64 = row
        .try_get("balance")
        .map_err(|e| map_sqlx_error("decode_account", e))?;

    let owner = Identity::parse(&owner).map_err(|e| StoreError::integrity(e.to_string()))?;
    Account::restore(owner, balance).map_err(|e| StoreError::integrity(e.to_string()))
}

#[async_trait]
impl AccountStore for PostgresAccountStore {
    #[instrument(skip_all, fields(owner = %owner), err)]
    async fn open(&self, owner: &Identity) -> Result<Account, StoreError> {
        sqlx::query("INSERT INTO accounts (owner, balance) VALUES ($1, 0)")
            .bind(owner.as_str())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("open_account", e))?;

        Ok(Account::open(owner.clone()))
    }

    #[instrument(skip_all, fields(owner = %owner), err)]
    async fn get(&self, owner: &Identity) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query("SELECT owner, balance FROM accounts WHERE owner = $1")
            .bind(owner.as_str())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_account", e))?;

        row.as_ref().map(account_from_row).transpose()
    }

    #[instrument(skip_all, fields(owner = %owner, amount = amount.get()), err)]
    async fn deposit(&self, owner: &Identity, amount: Amount) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query(
            r#"
            UPDATE accounts
            SET balance = balance + $2
            WHERE owner = $1
            RETURNING owner, balance
            "#,
        )
        .bind(owner.as_str())
        .bind(amount.get())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("deposit", e))?;

        row.as_ref().map(account_from_row).transpose()
    }

    #[instrument(
        skip_all,
        fields(from = %from, to = %to, amount = amount.get()),
        err
    )]
    async fn try_debit_credit(
        &self,
        from: &Identity,
        to: &Identity,
        amount: Amount,
    ) -> Result<DebitCreditOutcome, StoreError> {
        if from == to {
            return Err(StoreError::integrity("debit and credit on the same account"));
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let rows = sqlx::query(
            r#"
            SELECT owner, balance
            FROM accounts
            WHERE owner = ANY($1)
            ORDER BY owner
            FOR UPDATE
            "#,
        )
        .bind(vec![from.as_str().to_string(), to.as_str().to_string()])
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("lock_accounts", e))?;

        let mut source = None;
        let mut target = None;
        for row in &rows {
            let account = account_from_row(row)?;
            if account.owner() == from {
                source = Some(account);
            } else if account.owner() == to {
                target = Some(account);
            }
        }

        let outcome = match (source, target) {
            (None, _) => Some(DebitCreditOutcome::NotFound(from.clone())),
            (_, None) => Some(DebitCreditOutcome::NotFound(to.clone())),
            (Some(source), Some(_)) if !source.can_cover(amount) => {
                Some(DebitCreditOutcome::InsufficientFunds {
                    available: source.balance(),
                })
            }
            _ => None,
        };
        if let Some(outcome) = outcome {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Ok(outcome);
        }

        let from_balance: i64 = sqlx::query_scalar(
            "UPDATE accounts SET balance = balance - $2 WHERE owner = $1 RETURNING balance",
        )
        .bind(from.as_str())
        .bind(amount.get())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("debit", e))?;

        let to_balance: i64 = sqlx::query_scalar(
            "UPDATE accounts SET balance = balance + $2 WHERE owner = $1 RETURNING balance",
        )
        .bind(to.as_str())
        .bind(amount.get())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("credit", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit", e))?;

        Ok(DebitCreditOutcome::Applied {
            from_balance,
            to_balance,
        })
    }
}

#[async_trait]
impl IdentityDirectory for PostgresAccountStore {
    async fn exists(&self, identity: &Identity) -> Result<bool, StoreError> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM accounts WHERE owner = $1)")
            .bind(identity.as_str())
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("account_exists", e))
    }
}
