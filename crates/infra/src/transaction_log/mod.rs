//! Append-only per-holder transaction history.

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryTransactionLog;
pub use postgres::PostgresTransactionLog;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use wallet_core::{Identity, StoreError, TransactionRecord};

/// Records per history page.
pub const PAGE_SIZE: u32 = 10;

/// 1-indexed page selector. Page 0 is valid input and always yields nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub number: u32,
    pub size: u32,
}

impl Page {
    pub fn new(number: u32) -> Self {
        Self {
            number,
            size: PAGE_SIZE,
        }
    }

    pub fn with_size(number: u32, size: u32) -> Self {
        Self { number, size }
    }

    /// Number of records to skip, or `None` when the page can hold nothing.
    pub fn offset(&self) -> Option<u64> {
        if self.number == 0 || self.size == 0 {
            return None;
        }
        Some(u64::from(self.number - 1) * u64::from(self.size))
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Ordered, durable log of transaction records.
///
/// Listing is most-recent-first by `occurred_at`; records sharing a timestamp
/// come back in reverse insertion order. Unknown owners and out-of-range pages
/// yield an empty list, never an error.
#[async_trait]
pub trait TransactionLog: Send + Sync {
    async fn append(&self, record: TransactionRecord) -> Result<(), StoreError> {
        self.append_batch(vec![record]).await
    }

    /// Append every record or none of them.
    async fn append_batch(&self, records: Vec<TransactionRecord>) -> Result<(), StoreError>;

    async fn list_for(&self, owner: &Identity, page: Page) -> Result<Vec<TransactionRecord>, StoreError>;
}

#[async_trait]
impl<S> TransactionLog for Arc<S>
where
    S: TransactionLog + ?Sized,
{
    async fn append(&self, record: TransactionRecord) -> Result<(), StoreError> {
        (**self).append(record).await
    }

    async fn append_batch(&self, records: Vec<TransactionRecord>) -> Result<(), StoreError> {
        (**self).append_batch(records).await
    }

    async fn list_for(&self, owner: &Identity, page: Page) -> Result<Vec<TransactionRecord>, StoreError> {
        (**self).list_for(owner, page).await
    }
}
