use axum::{http::StatusCode, response::Response};
use serde_json::json;

use crate::app::errors;

pub async fn health() -> Response {
    errors::ok(json!({}))
}

pub async fn not_found() -> Response {
    errors::envelope(StatusCode::NOT_FOUND, "resource not found", Default::default())
}
