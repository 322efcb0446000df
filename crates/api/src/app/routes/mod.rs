use axum::{
    Router,
    routing::{get, post},
};

pub mod system;
pub mod users;

/// Routes requiring the `get:users` scope.
pub fn read_router() -> Router {
    Router::new()
        .route("/users/balance", get(users::balance))
        .route("/users/transactions", get(users::transactions))
        .route("/users/details", get(users::details))
}

/// Routes requiring the `post:users` scope.
pub fn write_router() -> Router {
    Router::new()
        .route("/users/pay", post(users::pay))
        .route("/users/logout", post(users::logout))
}

/// Unauthenticated routes.
pub fn public_router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/users/register", post(users::register))
        .route("/users/login", post(users::login))
}
