use std::collections::HashSet;
use std::sync::RwLock;

use async_trait::async_trait;

use wallet_core::{Identity, StoreError, TransactionId, TransactionRecord};

use super::{Page, TransactionLog};

/// In-memory transaction log.
///
/// Intended for tests/dev. Listing scans the whole log.
#[derive(Debug, Default)]
pub struct InMemoryTransactionLog {
    records: RwLock<Vec<TransactionRecord>>,
}

impl InMemoryTransactionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record in insertion order.
    pub fn snapshot(&self) -> Result<Vec<TransactionRecord>, StoreError> {
        let records = self
            .records
            .read()
            .map_err(|_| StoreError::unavailable("transaction log lock poisoned"))?;
        Ok(records.clone())
    }
}

#[async_trait]
impl TransactionLog for InMemoryTransactionLog {
    async fn append_batch(&self, records: Vec<TransactionRecord>) -> Result<(), StoreError> {
        let mut log = self
            .records
            .write()
            .map_err(|_| StoreError::unavailable("transaction log lock poisoned"))?;

        // Validate the whole batch before touching the log.
        let mut seen: HashSet<TransactionId> = log.iter().map(|r| r.id).collect();
        for record in &records {
            if !seen.insert(record.id) {
                return Err(StoreError::conflict(format!(
                    "transaction {} already recorded",
                    record.id
                )));
            }
        }

        log.extend(records);
        Ok(())
    }

    async fn list_for(&self, owner: &Identity, page: Page) -> Result<Vec<TransactionRecord>, StoreError> {
        let Some(offset) = page.offset() else {
            return Ok(vec![]);
        };

        let log = self
            .records
            .read()
            .map_err(|_| StoreError::unavailable("transaction log lock poisoned"))?;

        // Reverse insertion order first; the stable sort keeps it for equal timestamps.
        let mut mine: Vec<&TransactionRecord> =
            log.iter().rev().filter(|r| &r.owner == owner).collect();
        mine.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));

        Ok(mine
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(page.size as usize)
            .cloned()
            .collect())
    }
}
