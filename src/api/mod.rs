//! API module - HTTP handlers and routes

pub mod handlers;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::audit::AuditDispatcher;
use crate::client::InventoryClient;
use crate::config::Config;
use crate::console::{SessionServices, SessionStore};
use crate::navigation::TracingNavigator;

/// Shared router state
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(sessions: SessionStore) -> Self {
        Self {
            sessions: Arc::new(sessions),
        }
    }

    /// Wires sessions to the inventory backend described by `config`
    pub fn from_config(config: &Config) -> Result<Self, crate::error::AppError> {
        let client = Arc::new(InventoryClient::new(&config.backend)?);
        let sessions = SessionStore::new(SessionServices {
            topology: client.clone(),
            audit: AuditDispatcher::new(client),
            navigator: Arc::new(TracingNavigator),
            layout: config.layout,
        })
        .with_idle_timeout(Duration::from_secs(config.server.session_idle_secs));
        Ok(Self::new(sessions))
    }
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        .route("/api/health", get(handlers::health_check))
        // Console sessions
        .route("/api/console/sessions", post(handlers::create_session))
        .route(
            "/api/console/sessions/:id",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .route(
            "/api/console/sessions/:id/tree.txt",
            get(handlers::get_tree_text),
        )
        .route("/api/console/sessions/:id/root", put(handlers::select_root))
        .route(
            "/api/console/sessions/:id/filter",
            put(handlers::update_filter),
        )
        .route("/api/console/sessions/:id/view", put(handlers::set_view_mode))
        .route(
            "/api/console/sessions/:id/toggle",
            post(handlers::toggle_section),
        )
        .route("/api/console/sessions/:id/click", post(handlers::click))
        .route(
            "/api/console/sessions/:id/export",
            post(handlers::export_view),
        )
        .route(
            "/api/console/sessions/:id/customers/:customer_id",
            get(handlers::get_customer_details),
        )
        .with_state(state)
}
