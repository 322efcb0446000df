//! Wallet account: one non-negative balance per identity.

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::error::{DomainError, DomainResult};
use crate::id::Identity;
use crate::money::Amount;

/// Balance record of a single wallet holder.
///
/// # Invariants
/// - `balance >= 0` in every reachable state.
/// - `owner` never changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    owner: Identity,
    balance: i64,
}

impl Account {
    /// A freshly registered account (balance 0).
    pub fn open(owner: Identity) -> Self {
        Self { owner, balance: 0 }
    }

    /// Rebuild an account from persisted state, rejecting negative balances.
    pub fn restore(owner: Identity, balance: i64) -> DomainResult<Self> {
        if balance < 0 {
            return Err(DomainError::invariant(format!(
                "account {owner} has negative balance {balance}"
            )));
        }
        Ok(Self { owner, balance })
    }

    pub fn owner(&self) -> &Identity {
        &self.owner
    }

    pub fn balance(&self) -> i64 {
        self.balance
    }

    pub fn can_cover(&self, amount: Amount) -> bool {
        self.balance >= amount.get()
    }

    pub fn debit(&mut self, amount: Amount) -> DomainResult<()> {
        if !self.can_cover(amount) {
            return Err(DomainError::invariant("insufficient funds"));
        }
        self.balance -= amount.get();
        Ok(())
    }

    pub fn credit(&mut self, amount: Amount) -> DomainResult<()> {
        self.balance = self
            .balance
            .checked_add(amount.get())
            .ok_or_else(|| DomainError::invariant("balance overflow"))?;
        Ok(())
    }
}

impl Entity for Account {
    type Id = Identity;

    fn id(&self) -> &Self::Id {
        &self.owner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> Identity {
        Identity::parse("alice@example.com").unwrap()
    }

    #[test]
    fn new_accounts_start_empty() {
        assert_eq!(Account::open(alice()).balance(), 0);
    }

    #[test]
    fn debit_never_goes_negative() {
        let mut acct = Account::restore(alice(), 10).unwrap();
        let err = acct.debit(Amount::new(11).unwrap()).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert_eq!(acct.balance(), 10);

        acct.debit(Amount::new(10).unwrap()).unwrap();
        assert_eq!(acct.balance(), 0);
    }

    #[test]
    fn credit_rejects_overflow() {
        let mut acct = Account::restore(alice(), i64::MAX).unwrap();
        assert!(acct.credit(Amount::new(1).unwrap()).is_err());
        assert_eq!(acct.balance(), i64::MAX);
    }

    #[test]
    fn restore_rejects_negative_balance() {
        assert!(Account::restore(alice(), -1).is_err());
    }
}
