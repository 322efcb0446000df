//! Transfer orchestration (application-level).
//!
//! ## Transfer Flow
//!
//! ```text
//! TransferRequest
//!   ↓
//! 1. Validate shape (amount > 0, well-formed recipient, not self)
//!   ↓
//! 2. Resolve sender and recipient accounts
//!   ↓
//! 3. Check the sender balance
//!   ↓
//! 4. Atomic debit/credit in the account store
//!   ↓
//! 5. Append the Debit + Credit pair as one batch
//!   ↓
//! Receipt (derived from the Debit)
//! ```
//!
//! ## Failure Handling
//!
//! Steps 1-3 only read; a rejection there writes nothing. A fault at step 4
//! or 5 leaves balances as they were before the call (step 5 failures are
//! compensated with a reverse move) and appends a single `Failed` Debit for
//! the sender. Insufficient funds or a missing account reported by the store
//! at step 4 (another transfer drained the account after step 3) are returned
//! as business outcomes and write nothing.
//!
//! The credit is visible to the recipient between steps 4 and 5. If the
//! recipient spends it before a failed step 5 is compensated, the reverse move
//! is refused and only logged: the caller still sees a processing error, the
//! sender is not refunded and the balances need manual reconciliation.
//!
//! Every store call is bounded by `store_timeout`.

use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info, instrument, warn};

use wallet_core::{Account, Identity, Receipt, StoreError, TransactionRecord};
use wallet_ledger::{TransferError, TransferRequest, ValidatedTransfer};

use crate::account_store::{AccountStore, DebitCreditOutcome};
use crate::transaction_log::{Page, TransactionLog};

pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Ledger engine over an account store and a transaction log.
///
/// ## Generic Parameters
///
/// - `A`: account store (in-memory for tests/dev, Postgres in production)
/// - `L`: transaction log
#[derive(Debug)]
pub struct LedgerEngine<A, L> {
    accounts: A,
    log: L,
    store_timeout: Duration,
}

impl<A, L> LedgerEngine<A, L> {
    pub fn new(accounts: A, log: L) -> Self {
        Self {
            accounts,
            log,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    pub fn accounts(&self) -> &A {
        &self.accounts
    }

    pub fn log(&self) -> &L {
        &self.log
    }

    pub fn into_parts(self) -> (A, L) {
        (self.accounts, self.log)
    }
}

impl<A, L> LedgerEngine<A, L>
where
    A: AccountStore,
    L: TransactionLog,
{
    /// Move funds from `request.sender` to `request.recipient`.
    #[instrument(
        skip_all,
        fields(sender = %request.sender, amount = request.amount),
        err(level = "debug")
    )]
    pub async fn transfer(&self, request: TransferRequest) -> Result<Receipt, TransferError> {
        let transfer = request.validate().inspect_err(|e| {
            debug!(reason = %e, "transfer rejected");
        })?;

        let sender = self.resolve(&transfer.sender).await?;
        self.resolve(&transfer.recipient).await?;

        transfer.check_funds(&sender).inspect_err(|e| {
            debug!(reason = %e, "transfer rejected");
        })?;

        let moved = self
            .bounded(
                "debit/credit",
                self.accounts
                    .try_debit_credit(&transfer.sender, &transfer.recipient, transfer.amount),
            )
            .await;

        match moved {
            Ok(DebitCreditOutcome::Applied { .. }) => {}
            Ok(DebitCreditOutcome::InsufficientFunds { available }) => {
                debug!(available, "source drained by a concurrent transfer");
                return Err(TransferError::InsufficientFunds {
                    available,
                    requested: transfer.amount.get(),
                });
            }
            Ok(DebitCreditOutcome::NotFound(missing)) => {
                return Err(TransferError::NotFound(missing));
            }
            Err(fault) => {
                error!(error = %fault, "debit/credit failed");
                self.record_failure(&transfer).await;
                return Err(TransferError::processing(fault));
            }
        }

        let settled = transfer.settle(Utc::now());
        let receipt = settled.receipt();

        if let Err(fault) = self
            .bounded("append transfer records", self.log.append_batch(settled.into_records()))
            .await
        {
            error!(error = %fault, "transfer records could not be written");
            self.compensate(&transfer).await;
            self.record_failure(&transfer).await;
            return Err(TransferError::processing(fault));
        }

        info!(
            transaction_id = %receipt.transaction_id,
            recipient = %receipt.recipient,
            "transfer settled"
        );
        Ok(receipt)
    }

    /// Current account of `owner`.
    #[instrument(skip_all, fields(owner = %owner), err(level = "debug"))]
    pub async fn balance(&self, owner: &Identity) -> Result<Account, TransferError> {
        self.resolve(owner).await
    }

    /// One page of `owner`'s history, most recent first.
    #[instrument(skip_all, fields(owner = %owner, page = page.number), err)]
    pub async fn history(
        &self,
        owner: &Identity,
        page: Page,
    ) -> Result<Vec<TransactionRecord>, TransferError> {
        self.bounded("list transactions", self.log.list_for(owner, page))
            .await
            .map_err(TransferError::processing)
    }

    async fn resolve(&self, owner: &Identity) -> Result<Account, TransferError> {
        match self.bounded("account lookup", self.accounts.get(owner)).await {
            Ok(Some(account)) => Ok(account),
            Ok(None) => Err(TransferError::NotFound(owner.clone())),
            Err(fault) => {
                error!(error = %fault, owner = %owner, "account lookup failed");
                Err(TransferError::processing(fault))
            }
        }
    }

    /// Undo an applied debit/credit with the reverse move.
    async fn compensate(&self, transfer: &ValidatedTransfer) {
        warn!("rolling back applied debit/credit");

        let reversed = self
            .bounded(
                "compensating debit/credit",
                self.accounts
                    .try_debit_credit(&transfer.recipient, &transfer.sender, transfer.amount),
            )
            .await;

        match reversed {
            Ok(DebitCreditOutcome::Applied { .. }) => {
                info!("rollback applied");
            }
            Ok(outcome) => {
                error!(?outcome, "rollback could not be applied; balances need reconciliation");
            }
            Err(fault) => {
                error!(error = %fault, "rollback failed; balances need reconciliation");
            }
        }
    }

    async fn record_failure(&self, transfer: &ValidatedTransfer) {
        let record = transfer.failed_attempt(Utc::now());
        let id = record.id;

        if let Err(fault) = self.bounded("append failed attempt", self.log.append(record)).await {
            error!(error = %fault, transaction_id = %id, "failed attempt could not be recorded");
        }
    }

    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.store_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::timeout(operation)),
        }
    }
}
