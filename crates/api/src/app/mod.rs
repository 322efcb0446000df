//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store/engine wiring and the operations handlers call
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: the JSON envelope and error → status mapping

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

use wallet_auth::Scope;

use crate::middleware::{self, AuthState};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::{AppServices, build_services};

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(services: Arc<AppServices>) -> Router {
    let read = routes::read_router().route_layer(axum::middleware::from_fn_with_state(
        AuthState::new(services.clone(), Scope::READ_USERS),
        middleware::auth_middleware,
    ));
    let write = routes::write_router().route_layer(axum::middleware::from_fn_with_state(
        AuthState::new(services.clone(), Scope::WRITE_USERS),
        middleware::auth_middleware,
    ));

    Router::new()
        .merge(routes::public_router())
        .merge(read)
        .merge(write)
        .fallback(routes::system::not_found)
        .layer(ServiceBuilder::new().layer(Extension(services)))
}
