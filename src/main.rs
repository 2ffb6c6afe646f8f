//! Fiber Topology Console
//!
//! Backend for the fiber network topology page: filters, renders and
//! summarizes headend topologies fetched from the inventory REST backend.

mod api;
mod audit;
mod client;
mod config;
mod console;
mod error;
mod models;
mod navigation;
mod topology;

use std::net::SocketAddr;
use std::time::Duration;

use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fiber_topology_console=info,tower_http=debug".into()),
        )
        .init();

    tracing::info!("Starting Fiber Topology Console...");

    // Load configuration
    let config = config::Config::load()?;
    tracing::info!("Configuration loaded (inventory backend: {})", config.backend.base_url);

    let state = AppState::from_config(&config)?;

    // Start background tasks
    start_background_tasks(&state);

    // Build application router
    let cors = CorsLayer::permissive();

    let app = api::routes(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    );

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Start background tasks (idle session sweep)
fn start_background_tasks(state: &AppState) {
    let sessions = state.sessions.clone();
    tokio::spawn(async move {
        sessions.run_expiry(Duration::from_secs(60)).await;
    });
}
