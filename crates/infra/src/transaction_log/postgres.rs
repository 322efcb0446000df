//! Postgres-backed transaction log.
//!
//! `seq` (BIGSERIAL) records insertion order and breaks ties between records
//! that share `occurred_at`. Batches are inserted in one transaction.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::instrument;
use uuid::Uuid;

use wallet_core::{Amount, Identity, StoreError, TransactionId, TransactionRecord};

use super::{Page, TransactionLog};
use crate::postgres::map_sqlx_error;

#[derive(Debug, Clone)]
pub struct PostgresTransactionLog {
    pool: Arc<PgPool>,
}

impl PostgresTransactionLog {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[derive(Debug, FromRow)]
struct TransactionRow {
    id: Uuid,
    owner: String,
    direction: String,
    counterparty: String,
    amount: i64,
    status: String,
    occurred_at: DateTime<Utc>,
}

impl TryFrom<TransactionRow> for TransactionRecord {
    type Error = StoreError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let corrupt = |e: wallet_core::DomainError| {
            StoreError::integrity(format!("transaction {}: {e}", row.id))
        };

        Ok(TransactionRecord {
            id: TransactionId::from_uuid(row.id),
            owner: Identity::parse(&row.owner).map_err(corrupt)?,
            direction: row.direction.parse().map_err(corrupt)?,
            counterparty: Identity::parse(&row.counterparty).map_err(corrupt)?,
            amount: Amount::new(row.amount).map_err(corrupt)?,
            status: row.status.parse().map_err(corrupt)?,
            occurred_at: row.occurred_at,
        })
    }
}

#[async_trait]
impl TransactionLog for PostgresTransactionLog {
    #[instrument(skip_all, fields(record_count = records.len()), err)]
    async fn append_batch(&self, records: Vec<TransactionRecord>) -> Result<(), StoreError> {
        if records.is_empty() {
            return Ok(());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        for record in &records {
            sqlx::query(
                r#"
                INSERT INTO transactions (
                    id,
                    owner,
                    direction,
                    counterparty,
                    amount,
                    status,
                    occurred_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(record.id.as_uuid())
            .bind(record.owner.as_str())
            .bind(record.direction.as_str())
            .bind(record.counterparty.as_str())
            .bind(record.amount.get())
            .bind(record.status.as_str())
            .bind(record.occurred_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("append_transaction", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit", e))?;
        Ok(())
    }

    #[instrument(skip_all, fields(owner = %owner, page = page.number), err)]
    async fn list_for(&self, owner: &Identity, page: Page) -> Result<Vec<TransactionRecord>, StoreError> {
        let Some(offset) = page.offset() else {
            return Ok(vec![]);
        };
        let offset = i64::try_from(offset).map_err(|_| StoreError::integrity("page offset overflow"))?;

        let rows: Vec<TransactionRow> = sqlx::query_as(
            r#"
            SELECT id, owner, direction, counterparty, amount, status, occurred_at
            FROM transactions
            WHERE owner = $1
            ORDER BY occurred_at DESC, seq DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(owner.as_str())
        .bind(i64::from(page.size))
        .bind(offset)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_transactions", e))?;

        rows.into_iter().map(TransactionRecord::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wallet_core::{Direction, TransactionStatus};

    fn row(direction: &str, amount: i64) -> TransactionRow {
        TransactionRow {
            id: Uuid::now_v7(),
            owner: "a@x.io".to_string(),
            direction: direction.to_string(),
            counterparty: "b@x.io".to_string(),
            amount,
            status: "Success".to_string(),
            occurred_at: Utc::now(),
        }
    }

    #[test]
    fn stored_row_converts_to_record() {
        let row = row("Debit", 40);
        let id = row.id;

        let record = TransactionRecord::try_from(row).unwrap();
        assert_eq!(record.id, TransactionId::from_uuid(id));
        assert_eq!(record.direction, Direction::Debit);
        assert_eq!(record.status, TransactionStatus::Success);
        assert_eq!(record.amount.get(), 40);
    }

    #[test]
    fn corrupt_rows_are_integrity_errors() {
        for bad in [row("Sideways", 40), row("Credit", 0)] {
            let err = TransactionRecord::try_from(bad).unwrap_err();
            assert!(matches!(err, StoreError::Integrity(_)));
        }
    }
}
