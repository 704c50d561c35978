//! HTTP API layer with Axum routes and the payment gateway client.
//!
//! This crate provides:
//! - REST API routes for invoices, settlements, debts and vouchers
//! - The reqwest-backed hosted-checkout gateway client
//! - Response types

pub mod gateway;
pub mod routes;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use gearbox_core::gateway::PaymentGateway;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Payment gateway used for bank-transfer checkouts.
    pub gateway: Arc<dyn PaymentGateway>,
    /// URL the gateway redirects the payer back to after checkout.
    pub return_url: Arc<str>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
