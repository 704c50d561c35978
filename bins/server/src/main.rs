//! Gearbox API Server
//!
//! Main entry point for the Gearbox backend service.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gearbox_api::gateway::HostedCheckoutGateway;
use gearbox_api::{AppState, create_router};
use gearbox_db::connect;
use gearbox_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gearbox=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load()?;

    // Connect to database
    let db = connect(&config.database.url).await?;
    info!("Connected to database");

    // Create the payment gateway client
    let return_url = config.gateway.return_url.clone();
    let gateway = HostedCheckoutGateway::new(config.gateway.clone())?;
    info!(base_url = %config.gateway.base_url, "Payment gateway configured");

    // Create application state
    let state = AppState {
        db: Arc::new(db),
        gateway: Arc::new(gateway),
        return_url: return_url.into(),
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
