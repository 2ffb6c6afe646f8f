//! Topology page state
//!
//! Owns everything one operator sees on the topology page: root selection,
//! the fetched document, view mode, filter and expand/collapse state. All
//! transitions here are synchronous; fetching lives in `ConsoleSession`.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::{AuditEvent, HeadendSummary, NodeKind, Status, Topology};
use crate::navigation::Route;
use crate::topology::{
    self, FilterSpec, GraphLayout, GraphProjection, SplitterSummaryRow, TreeState, TreeTarget,
    TreeView,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Tree,
    Graph,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Tree => "TREE",
            ViewMode::Graph => "GRAPH",
        }
    }
}

/// What the content area should show
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewStatus {
    /// No root selected, or the backend had no document for it
    Idle,
    Loading,
    Failed { message: String },
    /// Document loaded but the filter left no FDH
    NoMatches,
    Ready,
}

/// Reducer actions for the filter controls
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum FilterAction {
    SetSearchText { text: String },
    ToggleStatus { status: Status },
    SetActiveLinesOnly { enabled: bool },
    Clear,
}

/// Identifies one root fetch so late responses can be told apart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootRequest {
    pub generation: u64,
    pub headend_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// State updated. Carries the headend id when a document arrived.
    Committed { loaded_headend: Option<String> },
    /// A newer root selection superseded this request
    Stale,
}

/// Result of a click: where to go and what to audit
#[derive(Debug, Clone, PartialEq)]
pub struct ClickResolution {
    pub route: Route,
    pub audit: Option<AuditEvent>,
}

#[derive(Debug, Default)]
pub struct TopologyPage {
    layout: GraphLayout,
    headends: Vec<HeadendSummary>,
    selected_headend: Option<String>,
    topology: Option<Topology>,
    view_mode: ViewMode,
    filter: FilterSpec,
    tree_state: TreeState,
    loading: bool,
    error: Option<String>,
    generation: u64,
    last_route: Option<Route>,
}

impl TopologyPage {
    pub fn new(layout: GraphLayout) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn headends(&self) -> &[HeadendSummary] {
        &self.headends
    }

    pub fn selected_headend(&self) -> Option<&str> {
        self.selected_headend.as_deref()
    }

    #[cfg(test)]
    pub fn topology(&self) -> Option<&Topology> {
        self.topology.as_ref()
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn filter_spec(&self) -> &FilterSpec {
        &self.filter
    }

    #[cfg(test)]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn last_route(&self) -> Option<&Route> {
        self.last_route.as_ref()
    }

    // ------------------------------------------------------------------
    // Headends and root selection
    // ------------------------------------------------------------------

    /// Stores the root selector list. Returns the headend to auto-select.
    pub fn set_headends(&mut self, result: Result<Vec<HeadendSummary>, AppError>) -> Option<String> {
        match result {
            Ok(list) => {
                self.error = None;
                self.headends = list;
                let first = self.headends.iter().find_map(|h| h.headend_id.clone());
                if first.is_none() {
                    self.selected_headend = None;
                }
                first
            }
            Err(e) => {
                tracing::warn!("Headend list fetch failed: {}", e);
                self.error = Some(e.display_message("Failed to load headends"));
                None
            }
        }
    }

    /// Starts a root change: the previous document is dropped immediately
    pub fn begin_root_load(&mut self, headend_id: &str) -> RootRequest {
        self.generation += 1;
        self.selected_headend = Some(headend_id.to_string());
        self.topology = None;
        self.loading = true;
        self.error = None;
        RootRequest {
            generation: self.generation,
            headend_id: headend_id.to_string(),
        }
    }

    /// Commits a fetch result unless a newer selection has started since
    pub fn finish_root_load(
        &mut self,
        request: &RootRequest,
        result: Result<Option<Topology>, AppError>,
    ) -> LoadOutcome {
        if request.generation != self.generation
            || self.selected_headend.as_deref() != Some(request.headend_id.as_str())
        {
            tracing::debug!(
                "Dropping stale topology response for headend {}",
                request.headend_id
            );
            return LoadOutcome::Stale;
        }

        self.loading = false;
        match result {
            Ok(doc) => {
                let loaded_headend = doc.as_ref().and_then(|d| d.headend_id.clone());
                self.topology = doc;
                LoadOutcome::Committed { loaded_headend }
            }
            Err(e) => {
                tracing::warn!("Topology fetch for headend {} failed: {}", request.headend_id, e);
                self.topology = None;
                self.error = Some(e.display_message("Failed to load topology"));
                LoadOutcome::Committed {
                    loaded_headend: None,
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Filter, view mode, expand/collapse
    // ------------------------------------------------------------------

    pub fn apply_filter(&mut self, action: FilterAction) {
        self.filter = match action {
            FilterAction::SetSearchText { text } => self.filter.with_search_text(text),
            FilterAction::ToggleStatus { status } => self.filter.toggle_status(status),
            FilterAction::SetActiveLinesOnly { enabled } => {
                self.filter.with_active_lines_only(enabled)
            }
            FilterAction::Clear => FilterSpec::cleared(),
        };
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }

    pub fn toggle_fdh(&mut self, id: &str) {
        self.tree_state.toggle_fdh(id);
    }

    pub fn toggle_splitter(&mut self, id: &str) {
        self.tree_state.toggle_splitter(id);
    }

    // ------------------------------------------------------------------
    // Derived views
    // ------------------------------------------------------------------

    pub fn filtered(&self) -> Option<Topology> {
        topology::filter(self.topology.as_ref(), &self.filter)
    }

    pub fn tree_view(&self) -> Option<TreeView> {
        topology::tree::render(self.filtered().as_ref(), &self.tree_state)
    }

    pub fn graph(&self) -> GraphProjection {
        topology::to_graph(self.filtered().as_ref(), &self.layout)
    }

    /// Capacity table over the unfiltered document
    pub fn splitter_summary(&self) -> Vec<SplitterSummaryRow> {
        if self.loading || self.error.is_some() {
            return Vec::new();
        }
        topology::splitter_summary(self.topology.as_ref())
    }

    pub fn view_status(&self) -> ViewStatus {
        if self.loading {
            return ViewStatus::Loading;
        }
        if let Some(message) = &self.error {
            return ViewStatus::Failed {
                message: message.clone(),
            };
        }
        match self.filtered() {
            None => ViewStatus::Idle,
            Some(doc) if doc.fdhs.is_empty() => ViewStatus::NoMatches,
            Some(_) => ViewStatus::Ready,
        }
    }

    // ------------------------------------------------------------------
    // Clicks
    // ------------------------------------------------------------------

    pub fn click_tree(&mut self, target: &TreeTarget) -> ClickResolution {
        let route = target.route();
        self.last_route = Some(route.clone());
        ClickResolution { route, audit: None }
    }

    /// Resolves a graph node id against the current projection
    pub fn click_graph(&mut self, node_id: &str) -> Option<ClickResolution> {
        let graph = self.graph();
        let meta = &graph.node(node_id)?.meta;
        let route = Route::for_node(meta.kind, meta.id.as_deref())?;
        let audit = AuditEvent::for_entity(
            AuditEvent::TOPOLOGY_NODE_VIEW,
            meta.kind,
            meta.id.as_deref(),
            format!("Clicked node type={}", meta.kind.as_str().to_uppercase()),
        );
        self.last_route = Some(route.clone());
        Some(ClickResolution { route, audit })
    }

    /// Audit event for exporting the current view
    pub fn export_event(&self) -> Option<AuditEvent> {
        let headend_id = self.topology.as_ref()?.headend_id.as_deref();
        AuditEvent::for_entity(
            AuditEvent::TOPOLOGY_EXPORT,
            NodeKind::Headend,
            headend_id,
            format!("Export from {} view", self.view_mode.as_str()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::testing::sample_topology as scenario;

    fn loaded_page() -> TopologyPage {
        let mut page = TopologyPage::new(GraphLayout::default());
        let req = page.begin_root_load("1");
        page.finish_root_load(&req, Ok(Some(scenario("1", "HE1"))));
        page
    }

    #[test]
    fn test_begin_load_clears_previous_topology() {
        let mut page = loaded_page();
        assert!(page.topology().is_some());
        page.begin_root_load("2");
        assert!(page.topology().is_none());
        assert_eq!(page.view_status(), ViewStatus::Loading);
        assert_eq!(page.selected_headend(), Some("2"));
    }

    #[test]
    fn test_stale_response_is_dropped() {
        let mut page = TopologyPage::new(GraphLayout::default());
        let first = page.begin_root_load("1");
        let second = page.begin_root_load("2");

        let outcome = page.finish_root_load(&first, Ok(Some(scenario("1", "HE1"))));
        assert_eq!(outcome, LoadOutcome::Stale);
        assert!(page.topology().is_none());

        let outcome = page.finish_root_load(&second, Ok(Some(scenario("2", "HE2"))));
        assert_eq!(
            outcome,
            LoadOutcome::Committed {
                loaded_headend: Some("2".to_string())
            }
        );
        assert_eq!(page.topology().unwrap().name.as_deref(), Some("HE2"));
    }

    #[test]
    fn test_fetch_failure_sets_message_and_clears() {
        let mut page = loaded_page();
        let req = page.begin_root_load("3");
        page.finish_root_load(&req, Err(AppError::Upstream("HTTP 502".into())));
        assert!(page.topology().is_none());
        assert_eq!(
            page.view_status(),
            ViewStatus::Failed {
                message: "Failed to load topology: HTTP 502".to_string()
            }
        );
        assert!(page.splitter_summary().is_empty());
    }

    #[test]
    fn test_missing_document_is_idle() {
        let mut page = TopologyPage::new(GraphLayout::default());
        assert_eq!(page.view_status(), ViewStatus::Idle);
        let req = page.begin_root_load("9");
        page.finish_root_load(&req, Ok(None));
        assert_eq!(page.view_status(), ViewStatus::Idle);
    }

    #[test]
    fn test_no_matches_is_distinct_state() {
        let mut page = loaded_page();
        page.apply_filter(FilterAction::ToggleStatus {
            status: Status::Disconnected,
        });
        assert_eq!(page.view_status(), ViewStatus::NoMatches);
        assert!(page.tree_view().unwrap().no_matches);
    }

    #[test]
    fn test_summary_ignores_filter() {
        let mut page = loaded_page();
        page.apply_filter(FilterAction::SetSearchText {
            text: "nothing-matches".to_string(),
        });
        let rows = page.splitter_summary();
        assert_eq!(rows.len(), 1);
        assert_eq!((rows[0].total, rows[0].used, rows[0].free), (4, 2, 2));
    }

    #[test]
    fn test_filter_actions() {
        let mut page = loaded_page();
        page.apply_filter(FilterAction::SetActiveLinesOnly { enabled: true });
        page.apply_filter(FilterAction::ToggleStatus {
            status: Status::Pending,
        });
        assert!(page.filter_spec().status_filter.is_empty());
        page.apply_filter(FilterAction::Clear);
        assert_eq!(page.filter_spec(), &FilterSpec::default());
    }

    #[test]
    fn test_expand_state_survives_filter_changes() {
        let mut page = loaded_page();
        page.toggle_splitter("30");
        page.apply_filter(FilterAction::SetSearchText {
            text: "alice".to_string(),
        });
        page.apply_filter(FilterAction::Clear);
        let view = page.tree_view().unwrap();
        assert!(!view.fdhs[0].splitters[0].expanded);
    }

    #[test]
    fn test_click_graph_resolves_route_and_audit() {
        let mut page = loaded_page();
        page.set_view_mode(ViewMode::Graph);

        let click = page.click_graph("customer-1-40").unwrap();
        assert_eq!(click.route, Route::Customer { id: "1".to_string() });
        let audit = click.audit.unwrap();
        assert_eq!(audit.entity_type, "CUSTOMER");
        assert_eq!(audit.details, "Clicked node type=CUSTOMER");
        assert_eq!(page.last_route(), Some(&click.route));

        assert!(page.click_graph("fdh-unknown").is_none());
    }

    #[test]
    fn test_click_tree_line_customer_goes_to_customer_only() {
        let mut page = loaded_page();
        let click = page.click_tree(&TreeTarget::LineCustomer {
            line_id: "40".to_string(),
            customer_id: "1".to_string(),
        });
        assert_eq!(click.route.path(), "/customers/1");
        assert!(click.audit.is_none());
    }

    #[test]
    fn test_export_event_names_view() {
        let mut page = loaded_page();
        page.set_view_mode(ViewMode::Graph);
        let event = page.export_event().unwrap();
        assert_eq!(event.action, "TOPOLOGY_EXPORT");
        assert_eq!(event.details, "Export from GRAPH view");
        assert_eq!(event.entity_id, 1);
    }

    #[test]
    fn test_set_headends_error() {
        let mut page = TopologyPage::new(GraphLayout::default());
        let first = page.set_headends(Err(AppError::Upstream("HTTP 500".into())));
        assert!(first.is_none());
        assert_eq!(page.error(), Some("Failed to load headends: HTTP 500"));
    }
}
