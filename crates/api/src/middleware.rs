use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use wallet_auth::{AuthError, Scope};

use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

/// Per route group: the services plus the one scope the group requires.
#[derive(Clone)]
pub struct AuthState {
    pub services: Arc<AppServices>,
    pub required: Scope,
}

impl AuthState {
    pub fn new(services: Arc<AppServices>, required: Scope) -> Self {
        Self { services, required }
    }
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(req.headers())?.to_string();

    let principal = state
        .services
        .guard()
        .authorize(&token, &state.required)
        .await?;

    req.extensions_mut()
        .insert(PrincipalContext::new(principal, token));

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    let missing = || AuthError::Unauthenticated("authorization header is expected".to_string());

    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(missing)?;

    let header = header.to_str().map_err(|_| missing())?;

    let token = header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .ok_or_else(|| {
            AuthError::Unauthenticated("authorization header must be a bearer token".to_string())
        })?
        .trim();

    if token.is_empty() {
        return Err(missing());
    }

    Ok(token)
}
