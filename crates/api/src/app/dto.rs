use serde::{Deserialize, Serialize};

use wallet_core::{Identity, Receipt, TransactionRecord};
use wallet_infra::NewUser;

use crate::app::errors::ApiError;

// -------------------------
// Request DTOs
// -------------------------

/// Registration body; every field is required, checked in [`RegisterRequest::into_new_user`].
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl RegisterRequest {
    pub fn into_new_user(self) -> Result<NewUser, ApiError> {
        let required = |v: Option<String>| {
            v.map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .ok_or(ApiError::BadRequest)
        };

        let email = required(self.email)?;
        let password = self
            .password
            .filter(|p| !p.is_empty())
            .ok_or(ApiError::BadRequest)?;

        Ok(NewUser {
            first_name: required(self.first_name)?,
            last_name: required(self.last_name)?,
            email: Identity::parse(&email).map_err(|_| ApiError::BadRequest)?,
            username: required(self.username)?,
            password,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub uname_or_mail: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PayRequest {
    #[serde(rename = "unam_or_mail", alias = "uname_or_mail", alias = "recipient")]
    pub recipient: String,
    pub amount: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct LogoutRequest {
    pub token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TransactionsQuery {
    pub page: Option<i64>,
}

// -------------------------
// Response DTOs
// -------------------------

/// One history line as rendered to the holder.
#[derive(Debug, Serialize)]
pub struct TransactionView {
    pub id: String,
    pub user: String,
    #[serde(rename = "type")]
    pub direction: String,
    pub description: String,
    pub amount: i64,
    pub status: bool,
    pub date: String,
    pub time: String,
}

impl From<&TransactionRecord> for TransactionView {
    fn from(r: &TransactionRecord) -> Self {
        Self {
            id: r.id.to_string(),
            user: r.owner.to_string(),
            direction: r.direction.to_string(),
            description: r.counterparty.to_string(),
            amount: r.amount.get(),
            status: r.status.is_success(),
            date: r.date().to_string(),
            time: r.time().format("%H:%M:%S%.6f").to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReceiptView {
    pub id: String,
    pub user: String,
    #[serde(rename = "type")]
    pub direction: &'static str,
    pub description: String,
    pub amount: i64,
    pub status: bool,
    pub date: String,
    pub time: String,
}

impl From<&Receipt> for ReceiptView {
    fn from(r: &Receipt) -> Self {
        Self {
            id: r.transaction_id.to_string(),
            user: r.sender.to_string(),
            direction: "Debit",
            description: r.recipient.to_string(),
            amount: r.amount.get(),
            status: r.status.is_success(),
            date: r.occurred_at.date_naive().to_string(),
            time: r.occurred_at.time().format("%H:%M:%S%.6f").to_string(),
        }
    }
}
