//! Append-only transaction records and the receipts derived from them.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::error::DomainError;
use crate::id::{Identity, TransactionId};
use crate::money::Amount;

/// Which side of a transfer a record describes, from its owner's view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Debit,
    Credit,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Debit => "Debit",
            Direction::Credit => "Credit",
        }
    }
}

impl core::fmt::Display for Direction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for Direction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Debit" => Ok(Direction::Debit),
            "Credit" => Ok(Direction::Credit),
            other => Err(DomainError::validation(format!("unknown direction '{other}'"))),
        }
    }
}

/// Outcome of the transfer a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    Success,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Success => "Success",
            TransactionStatus::Failed => "Failed",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TransactionStatus::Success)
    }
}

impl core::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for TransactionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Success" => Ok(TransactionStatus::Success),
            "Failed" => Ok(TransactionStatus::Failed),
            other => Err(DomainError::validation(format!("unknown status '{other}'"))),
        }
    }
}

/// One immutable line of a holder's transaction history.
///
/// A successful transfer is recorded as a Debit for the sender and a Credit
/// for the recipient with the same `amount` and `occurred_at`. A transfer
/// that faulted after validation leaves a single `Failed` Debit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: TransactionId,
    pub owner: Identity,
    pub direction: Direction,
    pub counterparty: Identity,
    pub amount: Amount,
    pub status: TransactionStatus,
    pub occurred_at: DateTime<Utc>,
}

impl TransactionRecord {
    pub fn debit(
        owner: Identity,
        counterparty: Identity,
        amount: Amount,
        status: TransactionStatus,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            owner,
            direction: Direction::Debit,
            counterparty,
            amount,
            status,
            occurred_at,
        }
    }

    pub fn credit(
        owner: Identity,
        counterparty: Identity,
        amount: Amount,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            owner,
            direction: Direction::Credit,
            counterparty,
            amount,
            status: TransactionStatus::Success,
            occurred_at,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.occurred_at.date_naive()
    }

    pub fn time(&self) -> NaiveTime {
        self.occurred_at.time()
    }

    /// Signed effect on the owner's balance (0 for failed attempts).
    pub fn signed_amount(&self) -> i64 {
        match (self.status, self.direction) {
            (TransactionStatus::Failed, _) => 0,
            (TransactionStatus::Success, Direction::Debit) => -self.amount.get(),
            (TransactionStatus::Success, Direction::Credit) => self.amount.get(),
        }
    }
}

impl Entity for TransactionRecord {
    type Id = TransactionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// What a payer gets back for a completed transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub transaction_id: TransactionId,
    pub sender: Identity,
    pub recipient: Identity,
    pub amount: Amount,
    pub status: TransactionStatus,
    pub occurred_at: DateTime<Utc>,
}
