//! Balance store of record: one account per identity.
//!
//! Implementations must make [`AccountStore::try_debit_credit`] linearizable
//! with respect to every other transfer touching either account. No caller
//! may ever observe a debit without its matching credit.

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryAccountStore;
pub use postgres::PostgresAccountStore;

use std::sync::Arc;

use async_trait::async_trait;

use wallet_core::{Account, Amount, Identity, StoreError};

/// Result of an atomic debit/credit attempt that reached the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebitCreditOutcome {
    /// Both balances moved; values are the post-transfer balances.
    Applied { from_balance: i64, to_balance: i64 },
    /// Nothing moved; the source held `available` at the time of the check.
    InsufficientFunds { available: i64 },
    /// Nothing moved; the named account does not exist.
    NotFound(Identity),
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Create an account with balance 0. `Conflict` if one already exists.
    async fn open(&self, owner: &Identity) -> Result<Account, StoreError>;

    async fn get(&self, owner: &Identity) -> Result<Option<Account>, StoreError>;

    /// Credit an account outside of the transfer flow (seeding, funding).
    ///
    /// Returns `None` when the account does not exist.
    async fn deposit(&self, owner: &Identity, amount: Amount) -> Result<Option<Account>, StoreError>;

    /// Move `amount` from `from` to `to` as one atomic step.
    ///
    /// Callers guarantee `from != to`; stores reject it as `Integrity`.
    async fn try_debit_credit(
        &self,
        from: &Identity,
        to: &Identity,
        amount: Amount,
    ) -> Result<DebitCreditOutcome, StoreError>;
}

#[async_trait]
impl<S> AccountStore for Arc<S>
where
    S: AccountStore + ?Sized,
{
    async fn open(&self, owner: &Identity) -> Result<Account, StoreError> {
        (**self).open(owner).await
    }

    async fn get(&self, owner: &Identity) -> Result<Option<Account>, StoreError> {
        (**self).get(owner).await
    }

    async fn deposit(&self, owner: &Identity, amount: Amount) -> Result<Option<Account>, StoreError> {
        (**self).deposit(owner, amount).await
    }

    async fn try_debit_credit(
        &self,
        from: &Identity,
        to: &Identity,
        amount: Amount,
    ) -> Result<DebitCreditOutcome, StoreError> {
        (**self).try_debit_credit(from, to, amount).await
    }
}
