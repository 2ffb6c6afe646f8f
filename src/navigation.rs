//! Drill-down navigation targets
//!
//! Topology nodes link back into the inventory CRUD pages. The console never
//! renders those pages; it only resolves the route and hands it to a
//! [`Navigator`].

use serde::Serialize;

use crate::models::NodeKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "page", rename_all = "snake_case")]
pub enum Route {
    Headends,
    Fdhs,
    Splitters,
    FiberDropLines,
    Customer { id: String },
}

impl Route {
    /// Route for a clicked node. Customers without an id have nowhere to go.
    pub fn for_node(kind: NodeKind, id: Option<&str>) -> Option<Self> {
        match kind {
            NodeKind::Headend => Some(Route::Headends),
            NodeKind::Fdh => Some(Route::Fdhs),
            NodeKind::Splitter => Some(Route::Splitters),
            NodeKind::Line => Some(Route::FiberDropLines),
            NodeKind::Customer => id.map(|id| Route::Customer { id: id.to_string() }),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Headends => "/headends".to_string(),
            Route::Fdhs => "/fdh".to_string(),
            Route::Splitters => "/splitters".to_string(),
            Route::FiberDropLines => "/fiber-drop-lines".to_string(),
            Route::Customer { id } => format!("/customers/{}", id),
        }
    }
}

/// Router capability injected into the page controller
pub trait Navigator: Send + Sync {
    fn navigate_to(&self, route: &Route);
}

/// Navigator for the HTTP console: the route is returned to the host UI in
/// the session snapshot, so all that is left to do here is log it.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn navigate_to(&self, route: &Route) {
        tracing::info!("Navigate to {}", route.path());
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Remembers every route it was sent to
    #[derive(Debug, Default)]
    pub struct RecordingNavigator {
        routes: Mutex<Vec<Route>>,
    }

    impl RecordingNavigator {
        pub fn routes(&self) -> Vec<Route> {
            self.routes.lock().unwrap().clone()
        }

        pub fn last(&self) -> Option<Route> {
            self.routes().last().cloned()
        }
    }

    impl Navigator for RecordingNavigator {
        fn navigate_to(&self, route: &Route) {
            self.routes.lock().unwrap().push(route.clone());
        }
    }
}
