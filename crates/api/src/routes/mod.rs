//! API route definitions.

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::AppState;

pub mod debts;
pub mod health;
pub mod invoices;
pub mod settlements;
pub mod vouchers;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(invoices::routes())
        .merge(settlements::routes())
        .merge(debts::routes())
        .merge(vouchers::routes())
}

/// Builds an error response from a code, message and HTTP status.
pub(crate) fn error_response(status: u16, code: &'static str, message: String) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(json!({
            "error": code,
            "message": message
        })),
    )
        .into_response()
}

/// Builds a 400 response for a request field that failed to parse.
pub(crate) fn bad_request(code: &'static str, message: &str) -> Response {
    error_response(400, code, message.to_string())
}
