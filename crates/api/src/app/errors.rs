//! JSON envelope and the single error → status mapping of the API.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Map, Value, json};
use thiserror::Error;
use tracing::error;

use wallet_auth::AuthError;
use wallet_core::StoreError;
use wallet_infra::PasswordError;
use wallet_ledger::TransferError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request")]
    BadRequest,

    #[error("request unprocessable")]
    Unprocessable,

    #[error("user already exists")]
    UserExists,

    #[error("user does not exist")]
    UserNotFound,

    #[error("wrong password")]
    WrongPassword,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::BadRequest => (StatusCode::BAD_REQUEST, "Bad Request".to_string()),
            ApiError::Unprocessable => {
                (StatusCode::UNPROCESSABLE_ENTITY, "Request unprocessable".to_string())
            }
            ApiError::UserExists => (StatusCode::FORBIDDEN, "Sorry user already exists".to_string()),
            ApiError::UserNotFound => (StatusCode::NOT_FOUND, "user does not exist".to_string()),
            ApiError::WrongPassword => (StatusCode::FORBIDDEN, "unauthorised".to_string()),
            ApiError::Auth(e) => match e {
                AuthError::Unauthenticated(reason) => (StatusCode::UNAUTHORIZED, reason.clone()),
                AuthError::Forbidden(scope) => {
                    (StatusCode::FORBIDDEN, format!("permission '{scope}' not granted"))
                }
                AuthError::NotFound(_) => (StatusCode::NOT_FOUND, "user does not exist".to_string()),
                AuthError::Processing(_) => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "Request unprocessable".to_string())
                }
            },
            ApiError::Transfer(e) => match e {
                TransferError::InvalidInput(_) => (StatusCode::FORBIDDEN, "invalid input".to_string()),
                TransferError::NotFound(_) => {
                    (StatusCode::NOT_FOUND, "User wallet not found".to_string())
                }
                TransferError::InsufficientFunds { .. } => {
                    (StatusCode::NOT_FOUND, "Insufficient Balance".to_string())
                }
                TransferError::Processing(_) => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "An error occured".to_string())
                }
            },
            ApiError::Store(_) | ApiError::Password(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "Request unprocessable".to_string())
            }
            ApiError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        }
    }

    fn is_fault(&self) -> bool {
        match self {
            ApiError::Auth(AuthError::Processing(_)) => true,
            ApiError::Transfer(e) => e.is_fault(),
            ApiError::Store(_) | ApiError::Password(_) | ApiError::Internal(_) => true,
            _ => false,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.is_fault() {
            error!(error = %self, "request failed");
        }
        let (status, message) = self.status_and_message();
        envelope(status, message, Map::new())
    }
}

/// `{success, status, message}` plus any extra top-level fields.
pub fn envelope(status: StatusCode, message: impl Into<Value>, extra: Map<String, Value>) -> Response {
    let mut body = Map::new();
    body.insert("success".to_string(), json!(status.is_success()));
    body.insert("status".to_string(), json!(status.as_u16()));
    body.insert("message".to_string(), message.into());
    body.extend(extra);

    (status, Json(Value::Object(body))).into_response()
}

/// 200 envelope with an empty message and the given payload fields.
pub fn ok(extra: Value) -> Response {
    let extra = match extra {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    envelope(StatusCode::OK, "", extra)
}
