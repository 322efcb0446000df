use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wallet_core::{Account, Amount, Identity, Receipt, TransactionRecord, TransactionStatus};

use crate::TransferError;

/// A transfer as received from a caller, before any validation.
///
/// `sender` is already authenticated; `recipient` and `amount` are raw input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub sender: Identity,
    pub recipient: String,
    pub amount: i64,
}

impl TransferRequest {
    pub fn new(sender: Identity, recipient: impl Into<String>, amount: i64) -> Self {
        Self {
            sender,
            recipient: recipient.into(),
            amount,
        }
    }

    /// Shape validation: positive amount, well-formed recipient, no self-transfer.
    ///
    /// Every shape violation collapses into `InvalidInput`.
    pub fn validate(&self) -> Result<ValidatedTransfer, TransferError> {
        let amount = Amount::new(self.amount)
            .map_err(|_| TransferError::invalid("amount must be a positive integer"))?;

        let recipient = Identity::parse(&self.recipient)
            .map_err(|e| TransferError::invalid(format!("recipient: {e}")))?;

        if recipient == self.sender {
            return Err(TransferError::invalid("cannot transfer to yourself"));
        }

        Ok(ValidatedTransfer {
            sender: self.sender.clone(),
            recipient,
            amount,
        })
    }
}

/// A transfer whose shape is known to be valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedTransfer {
    pub sender: Identity,
    pub recipient: Identity,
    pub amount: Amount,
}

impl ValidatedTransfer {
    /// Business check against the sender's current balance.
    pub fn check_funds(&self, sender_account: &Account) -> Result<(), TransferError> {
        if sender_account.can_cover(self.amount) {
            Ok(())
        } else {
            Err(TransferError::InsufficientFunds {
                available: sender_account.balance(),
                requested: self.amount.get(),
            })
        }
    }

    /// The two records of a completed transfer, sharing amount and timestamp.
    pub fn settle(&self, at: DateTime<Utc>) -> SettledTransfer {
        SettledTransfer {
            debit: TransactionRecord::debit(
                self.sender.clone(),
                self.recipient.clone(),
                self.amount,
                TransactionStatus::Success,
                at,
            ),
            credit: TransactionRecord::credit(
                self.recipient.clone(),
                self.sender.clone(),
                self.amount,
                at,
            ),
        }
    }

    /// Audit record for an attempt that faulted after validation.
    pub fn failed_attempt(&self, at: DateTime<Utc>) -> TransactionRecord {
        TransactionRecord::debit(
            self.sender.clone(),
            self.recipient.clone(),
            self.amount,
            TransactionStatus::Failed,
            at,
        )
    }
}

/// Debit + credit pair for one successful transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettledTransfer {
    pub debit: TransactionRecord,
    pub credit: TransactionRecord,
}

impl SettledTransfer {
    pub fn receipt(&self) -> Receipt {
        Receipt {
            transaction_id: self.debit.id,
            sender: self.debit.owner.clone(),
            recipient: self.debit.counterparty.clone(),
            amount: self.debit.amount,
            status: self.debit.status,
            occurred_at: self.debit.occurred_at,
        }
    }

    pub fn into_records(self) -> Vec<TransactionRecord> {
        vec![self.debit, self.credit]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use wallet_core::Direction;

    fn id(s: &str) -> Identity {
        Identity::parse(s).unwrap()
    }

    #[test]
    fn valid_request_passes() {
        let t = TransferRequest::new(id("a@x.io"), "b@x.io", 40).validate().unwrap();
        assert_eq!(t.recipient, id("b@x.io"));
        assert_eq!(t.amount.get(), 40);
    }

    #[test]
    fn zero_and_negative_amounts_are_invalid_input() {
        for amount in [0, -1, i64::MIN] {
            let err = TransferRequest::new(id("a@x.io"), "b@x.io", amount)
                .validate()
                .unwrap_err();
            assert!(matches!(err, TransferError::InvalidInput(_)));
        }
    }

    #[test]
    fn self_transfer_is_invalid_input_even_with_padding() {
        let err = TransferRequest::new(id("a@x.io"), "  a@x.io ", 1)
            .validate()
            .unwrap_err();
        assert_eq!(err, TransferError::invalid("cannot transfer to yourself"));
    }

    #[test]
    fn blank_recipient_is_invalid_input() {
        let err = TransferRequest::new(id("a@x.io"), "", 1).validate().unwrap_err();
        assert!(matches!(err, TransferError::InvalidInput(_)));
    }

    #[test]
    fn funds_check_reports_shortfall() {
        let t = TransferRequest::new(id("a@x.io"), "b@x.io", 1000).validate().unwrap();
        let acct = Account::restore(id("a@x.io"), 100).unwrap();
        assert_eq!(
            t.check_funds(&acct),
            Err(TransferError::InsufficientFunds { available: 100, requested: 1000 })
        );
    }

    #[test]
    fn settled_pair_is_mirrored() {
        let t = TransferRequest::new(id("a@x.io"), "b@x.io", 40).validate().unwrap();
        let at = Utc::now();
        let settled = t.settle(at);

        assert_eq!(settled.debit.direction, Direction::Debit);
        assert_eq!(settled.debit.owner, id("a@x.io"));
        assert_eq!(settled.debit.counterparty, id("b@x.io"));
        assert_eq!(settled.credit.direction, Direction::Credit);
        assert_eq!(settled.credit.owner, id("b@x.io"));
        assert_eq!(settled.credit.counterparty, id("a@x.io"));
        assert_eq!(settled.debit.occurred_at, settled.credit.occurred_at);
        assert_ne!(settled.debit.id, settled.credit.id);

        let receipt = settled.receipt();
        assert_eq!(receipt.transaction_id, settled.debit.id);
        assert_eq!(receipt.sender, id("a@x.io"));
        assert_eq!(receipt.recipient, id("b@x.io"));
        assert_eq!(receipt.amount.get(), 40);
        assert_eq!(receipt.status, TransactionStatus::Success);
        assert_eq!(receipt.occurred_at, at);
    }

    #[test]
    fn failed_attempt_is_a_single_failed_debit() {
        let t = TransferRequest::new(id("a@x.io"), "b@x.io", 7).validate().unwrap();
        let rec = t.failed_attempt(Utc::now());
        assert_eq!(rec.direction, Direction::Debit);
        assert_eq!(rec.status, TransactionStatus::Failed);
        assert_eq!(rec.amount.get(), 7);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: applying any sequence of settled transfers between two
        /// accounts conserves their combined balance and never goes negative.
        #[test]
        fn settled_transfers_conserve_funds(
            start in 0i64..1_000_000,
            amounts in prop::collection::vec((1i64..10_000, any::<bool>()), 1..20)
        ) {
            let a = id("a@x.io");
            let b = id("b@x.io");
            let mut accounts = [
                Account::restore(a.clone(), start).unwrap(),
                Account::open(b.clone()),
            ];
            let mut ledger_total: i64 = 0;

            for (amount, a_pays) in amounts {
                let (from, to) = if a_pays { (0, 1) } else { (1, 0) };
                let req = TransferRequest::new(
                    accounts[from].owner().clone(),
                    accounts[to].owner().as_str(),
                    amount,
                );
                let t = req.validate().unwrap();

                if t.check_funds(&accounts[from]).is_err() {
                    continue;
                }
                let settled = t.settle(Utc::now());
                accounts[from].debit(t.amount).unwrap();
                accounts[to].credit(t.amount).unwrap();

                for rec in settled.into_records() {
                    ledger_total += rec.signed_amount();
                }
            }

            prop_assert_eq!(ledger_total, 0);
            prop_assert_eq!(accounts[0].balance() + accounts[1].balance(), start);
            prop_assert!(accounts.iter().all(|acct| acct.balance() >= 0));
        }

        /// Property: validation accepts exactly the positive amounts.
        #[test]
        fn validation_accepts_only_positive_amounts(amount in any::<i64>()) {
            let res = TransferRequest::new(id("a@x.io"), "b@x.io", amount).validate();
            prop_assert_eq!(res.is_ok(), amount > 0);
        }
    }
}
