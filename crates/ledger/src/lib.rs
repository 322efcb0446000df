//! Transfer rules (validation, funds check, paired audit records).
//!
//! Pure domain logic only: no IO, no HTTP, no persistence concerns. The
//! orchestration against real stores lives in `wallet-infra::ledger_engine`.

pub mod error;
pub mod transfer;

pub use error::TransferError;
pub use transfer::{SettledTransfer, TransferRequest, ValidatedTransfer};
