//! `wallet-core`: domain foundation for the custodial wallet.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod account;
pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod transaction;

pub use account::Account;
pub use entity::Entity;
pub use error::{DomainError, DomainResult, StoreError};
pub use id::{Identity, TransactionId};
pub use money::Amount;
pub use transaction::{Direction, Receipt, TransactionRecord, TransactionStatus};
