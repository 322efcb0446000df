use thiserror::Error;

use wallet_core::Identity;

/// Outcome of a rejected or faulted transfer.
///
/// `InvalidInput`, `NotFound` and `InsufficientFunds` are expected business
/// outcomes; only `Processing` signals a store-layer fault.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("wallet not found: {0}")]
    NotFound(Identity),

    #[error("insufficient funds: available {available}, requested {requested}")]
    InsufficientFunds { available: i64, requested: i64 },

    #[error("transfer could not be processed: {0}")]
    Processing(String),
}

impl TransferError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn processing(msg: impl core::fmt::Display) -> Self {
        Self::Processing(msg.to_string())
    }

    /// Whether this is a fault (as opposed to a business rejection).
    pub fn is_fault(&self) -> bool {
        matches!(self, TransferError::Processing(_))
    }
}
