//! Monetary amounts in integer minor units (e.g. cents).

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// A strictly positive amount of money, in minor units.
///
/// Balances are plain `i64`s guarded by [`crate::Account`]; `Amount` is what
/// moves between them, so zero and negative values are unrepresentable.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Amount(i64);

impl Amount {
    pub fn new(minor_units: i64) -> Result<Self, DomainError> {
        if minor_units <= 0 {
            return Err(DomainError::validation("amount must be positive"));
        }
        Ok(Self(minor_units))
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for Amount {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for i64 {
    fn from(value: Amount) -> Self {
        value.0
    }
}

impl core::fmt::Display for Amount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}
