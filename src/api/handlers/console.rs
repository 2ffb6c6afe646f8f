//! Topology console handlers
//!
//! Thin wrappers over [`ConsoleSession`]; every mutating call answers with the
//! refreshed snapshot so the UI never needs a second round trip.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::AppState;
use crate::console::{ConsoleSession, FilterAction, ViewMode};
use crate::error::AppError;
use crate::navigation::Route;
use crate::topology::TreeTarget;

use super::SuccessResponse;

// ============================================================================
// Request / response types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectRootRequest {
    pub headend_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ViewModeRequest {
    pub mode: ViewMode,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleKind {
    Fdh,
    Splitter,
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub kind: ToggleKind,
    pub id: String,
}

/// Either a tree row or a graph node
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ClickTarget {
    Graph {
        #[serde(rename = "nodeId")]
        node_id: String,
    },
    Tree(TreeTarget),
}

#[derive(Debug, Deserialize)]
pub struct ClickRequest {
    pub target: ClickTarget,
}

#[derive(Debug, Serialize)]
pub struct ClickResponse {
    pub route: Route,
    pub path: String,
}

// ============================================================================
// Handlers
// ============================================================================

async fn session(state: &AppState, id: Uuid) -> Result<Arc<ConsoleSession>, AppError> {
    state
        .sessions
        .get(&id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {} not found", id)))
}

/// POST /api/console/sessions - Open a session and load the headend list
pub async fn create_session(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let session = state.sessions.create().await;
    session.load_headends().await;
    Ok((StatusCode::CREATED, Json(session.snapshot().await)))
}

/// GET /api/console/sessions/:id - Current view snapshot
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let session = session(&state, id).await?;
    Ok(Json(session.snapshot().await))
}

/// GET /api/console/sessions/:id/tree.txt - Tree rendered as indented text
pub async fn get_tree_text(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let session = session(&state, id).await?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        session.tree_text().await,
    ))
}

/// PUT /api/console/sessions/:id/root - Switch the headend
pub async fn select_root(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SelectRootRequest>,
) -> Result<impl IntoResponse, AppError> {
    let headend_id = payload.headend_id.trim();
    if headend_id.is_empty() {
        return Err(AppError::BadRequest("headendId must not be empty".to_string()));
    }
    let session = session(&state, id).await?;
    session.select_root(headend_id).await;
    Ok(Json(session.snapshot().await))
}

/// PUT /api/console/sessions/:id/filter - Apply one filter reducer action
pub async fn update_filter(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(action): Json<FilterAction>,
) -> Result<impl IntoResponse, AppError> {
    let session = session(&state, id).await?;
    session.update(|page| page.apply_filter(action)).await;
    Ok(Json(session.snapshot().await))
}

/// PUT /api/console/sessions/:id/view - Tree or graph
pub async fn set_view_mode(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ViewModeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session = session(&state, id).await?;
    session.update(|page| page.set_view_mode(payload.mode)).await;
    Ok(Json(session.snapshot().await))
}

/// POST /api/console/sessions/:id/toggle - Expand or collapse a tree section
pub async fn toggle_section(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ToggleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session = session(&state, id).await?;
    session
        .update(|page| match payload.kind {
            ToggleKind::Fdh => page.toggle_fdh(&payload.id),
            ToggleKind::Splitter => page.toggle_splitter(&payload.id),
        })
        .await;
    Ok(Json(session.snapshot().await))
}

/// POST /api/console/sessions/:id/click - Resolve a drill-down click
pub async fn click(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ClickRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session = session(&state, id).await?;
    let route = match payload.target {
        ClickTarget::Tree(target) => session.click_tree(&target).await,
        ClickTarget::Graph { node_id } => session
            .click_graph(&node_id)
            .await
            .ok_or_else(|| AppError::NotFound(format!("Graph node {} not found", node_id)))?,
    };
    Ok(Json(ClickResponse {
        path: route.path(),
        route,
    }))
}

/// POST /api/console/sessions/:id/export - Record an export of the current view
pub async fn export_view(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let session = session(&state, id).await?;
    Ok(Json(session.export().await))
}

/// GET /api/console/sessions/:id/customers/:customer_id - Customer drill-down
pub async fn get_customer_details(
    State(state): State<AppState>,
    Path((id, customer_id)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse, AppError> {
    let session = session(&state, id).await?;
    let details = session
        .customer_details(&customer_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Customer {} not found", customer_id)))?;
    Ok(Json(details))
}

/// DELETE /api/console/sessions/:id - Close a session
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    if !state.sessions.remove(&id).await {
        return Err(AppError::NotFound(format!("Session {} not found", id)));
    }
    Ok(Json(SuccessResponse::new("Session closed")))
}
