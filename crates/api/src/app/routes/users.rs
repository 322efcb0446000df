use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Query, rejection::JsonRejection},
    response::Response,
};
use serde_json::json;
use tracing::debug;

use wallet_infra::Page;
use wallet_ledger::TransferError;

use crate::app::dto::{
    LoginRequest, LogoutRequest, PayRequest, ReceiptView, RegisterRequest, TransactionView,
    TransactionsQuery,
};
use crate::app::errors::{self, ApiError};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body.map_err(|e| {
        debug!(reason = %e, "register body rejected");
        ApiError::BadRequest
    })?;

    let email = services.register(body.into_new_user()?).await?;
    Ok(errors::ok(json!({ "email": email })))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body.map_err(|_| ApiError::BadRequest)?;
    let (Some(login), Some(password)) = (body.uname_or_mail, body.password) else {
        return Err(ApiError::BadRequest);
    };

    let (issued, user) = services.login(&login, &password).await?;
    Ok(errors::ok(json!({ "jwt": issued.token, "user": user })))
}

pub async fn pay(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<PayRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = body.map_err(pay_rejection)?;

    let receipt = services
        .pay(principal.identity(), &body.recipient, body.amount)
        .await?;
    Ok(errors::ok(json!({ "message": ReceiptView::from(&receipt) })))
}

/// Well-formed JSON with missing or mistyped fields is invalid transfer input;
/// anything that is not a JSON body at all is unprocessable.
fn pay_rejection(rejection: JsonRejection) -> ApiError {
    debug!(reason = %rejection, "pay body rejected");
    match rejection {
        JsonRejection::JsonDataError(e) => {
            ApiError::Transfer(TransferError::invalid(e.body_text()))
        }
        _ => ApiError::Unprocessable,
    }
}

pub async fn balance(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Result<Response, ApiError> {
    let account = services.balance(principal.identity()).await.map_err(|e| match e {
        TransferError::NotFound(_) => ApiError::UserNotFound,
        other => ApiError::Transfer(other),
    })?;
    Ok(errors::ok(json!({ "balance": account.balance() })))
}

pub async fn transactions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    query: Option<Query<TransactionsQuery>>,
) -> Result<Response, ApiError> {
    let page = query.and_then(|Query(q)| q.page).unwrap_or(1);
    // Non-positive or oversized pages select nothing.
    let page = Page::new(u32::try_from(page).unwrap_or(0));

    let records = services.transactions(principal.identity(), page).await?;
    let items: Vec<TransactionView> = records.iter().map(TransactionView::from).collect();

    Ok(errors::ok(json!({
        "transactions": items,
        "user": principal.identity(),
    })))
}

pub async fn details(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Result<Response, ApiError> {
    let user = services.details(principal.identity()).await?;
    Ok(errors::ok(json!({ "user": user })))
}

pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Option<Json<LogoutRequest>>,
) -> Result<Response, ApiError> {
    let extra = body.and_then(|Json(b)| b.token);
    services.logout(principal.token(), extra.as_deref()).await?;
    Ok(errors::ok(json!({ "user": principal.identity() })))
}
