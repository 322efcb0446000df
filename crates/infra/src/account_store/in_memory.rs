use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use async_trait::async_trait;

use wallet_auth::IdentityDirectory;
use wallet_core::{Account, Amount, Identity, StoreError};

use super::{AccountStore, DebitCreditOutcome};

type AccountCell = Arc<Mutex<Account>>;

/// In-memory account store.
///
/// The map lock only guards membership; each balance sits behind its own
/// mutex. Transfers lock both accounts in identity order so two opposing
/// transfers cannot deadlock.
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    accounts: RwLock<HashMap<Identity, AccountCell>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn cell(&self, owner: &Identity) -> Result<Option<AccountCell>, StoreError> {
        let accounts = self
            .accounts
            .read()
            .map_err(|_| StoreError::unavailable("account map lock poisoned"))?;
        Ok(accounts.get(owner).cloned())
    }
}

fn lock(cell: &AccountCell) -> Result<MutexGuard<'_, Account>, StoreError> {
    cell.lock()
        .map_err(|_| StoreError::unavailable("account lock poisoned"))
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn open(&self, owner: &Identity) -> Result<Account, StoreError> {
        let mut accounts = self
            .accounts
            .write()
            .map_err(|_| StoreError::unavailable("account map lock poisoned"))?;

        if accounts.contains_key(owner) {
            return Err(StoreError::conflict(format!("account {owner} already exists")));
        }

        let account = Account::open(owner.clone());
        accounts.insert(owner.clone(), Arc::new(Mutex::new(account.clone())));
        Ok(account)
    }

    async fn get(&self, owner: &Identity) -> Result<Option<Account>, StoreError> {
        match self.cell(owner)? {
            Some(cell) => Ok(Some(lock(&cell)?.clone())),
            None => Ok(None),
        }
    }

    async fn deposit(&self, owner: &Identity, amount: Amount) -> Result<Option<Account>, StoreError> {
        let Some(cell) = self.cell(owner)? else {
            return Ok(None);
        };

        let mut account = lock(&cell)?;
        account
            .credit(amount)
            .map_err(|e| StoreError::integrity(e.to_string()))?;
        Ok(Some(account.clone()))
    }

    async fn try_debit_credit(
        &self,
        from: &Identity,
        to: &Identity,
        amount: Amount,
    ) -> Result<DebitCreditOutcome, StoreError> {
        if from == to {
            return Err(StoreError::integrity("debit and credit on the same account"));
        }

        let Some(from_cell) = self.cell(from)? else {
            return Ok(DebitCreditOutcome::NotFound(from.clone()));
        };
        let Some(to_cell) = self.cell(to)? else {
            return Ok(DebitCreditOutcome::NotFound(to.clone()));
        };

        let (mut source, mut target) = if from < to {
            let source = lock(&from_cell)?;
            let target = lock(&to_cell)?;
            (source, target)
        } else {
            let target = lock(&to_cell)?;
            let source = lock(&from_cell)?;
            (source, target)
        };

        if !source.can_cover(amount) {
            return Ok(DebitCreditOutcome::InsufficientFunds {
                available: source.balance(),
            });
        }

        // Stage the credit first so an overflow leaves both balances untouched.
        let mut credited = target.clone();
        credited
            .credit(amount)
            .map_err(|e| StoreError::integrity(e.to_string()))?;
        source
            .debit(amount)
            .map_err(|e| StoreError::integrity(e.to_string()))?;
        *target = credited;

        Ok(DebitCreditOutcome::Applied {
            from_balance: source.balance(),
            to_balance: target.balance(),
        })
    }
}

#[async_trait]
impl IdentityDirectory for InMemoryAccountStore {
    async fn exists(&self, identity: &Identity) -> Result<bool, StoreError> {
        Ok(self.cell(identity)?.is_some())
    }
}
