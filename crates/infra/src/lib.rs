//! Infrastructure layer: stores of record, the ledger engine, config and Postgres wiring.

pub mod account_store;
pub mod config;
pub mod ledger_engine;
pub mod postgres;
pub mod revocation;
pub mod transaction_log;
pub mod users;

pub use account_store::{AccountStore, DebitCreditOutcome, InMemoryAccountStore, PostgresAccountStore};
pub use config::{ConfigError, DatabaseConfig, WalletConfig};
pub use ledger_engine::LedgerEngine;
pub use revocation::{InMemoryRevocationStore, PostgresRevocationStore};
pub use transaction_log::{
    InMemoryTransactionLog, PAGE_SIZE, Page, PostgresTransactionLog, TransactionLog,
};
pub use users::{
    InMemoryUserStore, NewUser, PasswordError, PasswordHashing, PostgresUserStore, UserProfile,
    UserRecord, UserStore,
};
