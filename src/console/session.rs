//! One operator's console session
//!
//! Wraps a [`TopologyPage`] with the services it talks to. The page lock is
//! never held across a backend call.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::page::{LoadOutcome, TopologyPage, ViewMode, ViewStatus};
use crate::audit::AuditDispatcher;
use crate::client::TopologyService;
use crate::error::AppError;
use crate::models::{AuditEvent, CustomerNodeDetails, HeadendSummary, NodeKind};
use crate::navigation::{Navigator, Route};
use crate::topology::{FilterSpec, GraphLayout, GraphProjection, SplitterSummaryRow, TreeTarget, TreeView};

/// Everything the host UI needs to draw the page
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub headends: Vec<HeadendSummary>,
    pub selected_headend_id: Option<String>,
    pub view_mode: ViewMode,
    pub filter: FilterSpec,
    pub status: ViewStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tree: Option<TreeView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph: Option<GraphProjection>,
    pub splitter_summary: Vec<SplitterSummaryRow>,
    pub last_route: Option<Route>,
}

pub struct ConsoleSession {
    id: Uuid,
    created_at: DateTime<Utc>,
    /// Unix millis of the last lookup through the session store
    last_seen_ms: AtomicI64,
    page: RwLock<TopologyPage>,
    topology: Arc<dyn TopologyService>,
    audit: AuditDispatcher,
    navigator: Arc<dyn Navigator>,
}

impl ConsoleSession {
    pub fn new(
        layout: GraphLayout,
        topology: Arc<dyn TopologyService>,
        audit: AuditDispatcher,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let created_at = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at,
            last_seen_ms: AtomicI64::new(created_at.timestamp_millis()),
            page: RwLock::new(TopologyPage::new(layout)),
            topology,
            audit,
            navigator,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn touch(&self) {
        self.last_seen_ms
            .store(Utc::now().timestamp_millis(), Ordering::Relaxed);
    }

    /// True once nothing has looked the session up for `timeout`
    pub fn is_idle(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        let idle_ms = now.timestamp_millis() - self.last_seen_ms.load(Ordering::Relaxed);
        idle_ms >= 0 && idle_ms as u128 >= timeout.as_millis()
    }

    /// Fetches the root selector list and loads the first headend
    pub async fn load_headends(&self) {
        let result = self.topology.list_headends().await;
        let first = self.page.write().await.set_headends(result);
        if let Some(headend_id) = first {
            self.select_root(&headend_id).await;
        }
    }

    pub async fn select_root(&self, headend_id: &str) -> LoadOutcome {
        let request = self.page.write().await.begin_root_load(headend_id);

        let result = self.topology.get_topology(&request.headend_id).await;

        let outcome = self.page.write().await.finish_root_load(&request, result);
        if let LoadOutcome::Committed {
            loaded_headend: Some(id),
        } = &outcome
        {
            tracing::info!("Session {} loaded topology for headend {}", self.id, id);
            if let Some(event) = AuditEvent::for_entity(
                AuditEvent::TOPOLOGY_VIEW,
                NodeKind::Headend,
                Some(id),
                "Topology loaded",
            ) {
                self.audit.fire(event);
            }
        }
        outcome
    }

    /// Runs a synchronous state change under the write lock
    pub async fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut TopologyPage),
    {
        let mut page = self.page.write().await;
        f(&mut page);
    }

    pub async fn click_tree(&self, target: &TreeTarget) -> Route {
        let click = self.page.write().await.click_tree(target);
        self.navigator.navigate_to(&click.route);
        click.route
    }

    /// `None` when the node id is not in the current graph
    pub async fn click_graph(&self, node_id: &str) -> Option<Route> {
        let click = self.page.write().await.click_graph(node_id)?;
        if let Some(event) = click.audit {
            self.audit.fire(event);
        }
        self.navigator.navigate_to(&click.route);
        Some(click.route)
    }

    pub async fn export(&self) -> SessionSnapshot {
        let snapshot = self.snapshot().await;
        let event = self.page.read().await.export_event();
        match event {
            Some(event) => {
                self.audit.fire(event);
            }
            None => tracing::debug!("Session {} export without a loaded headend", self.id),
        }
        snapshot
    }

    pub async fn customer_details(
        &self,
        customer_id: &str,
    ) -> Result<Option<CustomerNodeDetails>, AppError> {
        self.topology.get_customer_details(customer_id).await
    }

    pub async fn tree_text(&self) -> String {
        let page = self.page.read().await;
        match page.view_status() {
            ViewStatus::Loading => "Loading topology...".to_string(),
            ViewStatus::Failed { message } => message,
            _ => page
                .tree_view()
                .map(|view| view.to_text())
                .unwrap_or_else(|| "Select a headend to view its topology.".to_string()),
        }
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let page = self.page.read().await;
        let view_mode = page.view_mode();
        SessionSnapshot {
            session_id: self.id,
            created_at: self.created_at,
            headends: page.headends().to_vec(),
            selected_headend_id: page.selected_headend().map(str::to_string),
            view_mode,
            filter: page.filter_spec().clone(),
            status: page.view_status(),
            tree: match view_mode {
                ViewMode::Tree => page.tree_view(),
                ViewMode::Graph => None,
            },
            graph: match view_mode {
                ViewMode::Graph => Some(page.graph()),
                ViewMode::Tree => None,
            },
            splitter_summary: page.splitter_summary(),
            last_route: page.last_route().cloned(),
        }
    }
}
