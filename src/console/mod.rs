//! Topology console sessions
//!
//! Each operator gets a [`ConsoleSession`] keyed by a uuid. Sessions live in
//! memory only and disappear on restart.

pub mod page;
pub mod session;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::audit::AuditDispatcher;
use crate::client::TopologyService;
use crate::navigation::Navigator;
use crate::topology::GraphLayout;

pub use self::page::{FilterAction, ViewMode};
pub use self::session::ConsoleSession;

/// Shared services handed to every new session
#[derive(Clone)]
pub struct SessionServices {
    pub topology: Arc<dyn TopologyService>,
    pub audit: AuditDispatcher,
    pub navigator: Arc<dyn Navigator>,
    pub layout: GraphLayout,
}

/// Sessions untouched for this long are dropped
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

pub struct SessionStore {
    services: SessionServices,
    idle_timeout: Duration,
    sessions: RwLock<HashMap<Uuid, Arc<ConsoleSession>>>,
}

impl SessionStore {
    pub fn new(services: SessionServices) -> Self {
        Self {
            services,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Registers a fresh session. Headends are not loaded yet.
    pub async fn create(&self) -> Arc<ConsoleSession> {
        self.prune_idle_at(Utc::now()).await;

        let session = Arc::new(ConsoleSession::new(
            self.services.layout,
            self.services.topology.clone(),
            self.services.audit.clone(),
            self.services.navigator.clone(),
        ));
        self.sessions
            .write()
            .await
            .insert(session.id(), session.clone());
        tracing::info!("Console session {} opened", session.id());
        session
    }

    /// Looks a session up and marks it as in use. Expired sessions are gone.
    pub async fn get(&self, id: &Uuid) -> Option<Arc<ConsoleSession>> {
        let session = self.sessions.read().await.get(id).cloned()?;
        if session.is_idle(Utc::now(), self.idle_timeout) {
            self.remove(id).await;
            return None;
        }
        session.touch();
        Some(session)
    }

    pub async fn remove(&self, id: &Uuid) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            tracing::info!("Console session {} closed", id);
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drops every session idle at `now`; returns how many went away
    pub async fn prune_idle_at(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, session| {
            let keep = !session.is_idle(now, self.idle_timeout);
            if !keep {
                tracing::info!("Console session {} expired", id);
            }
            keep
        });
        before - sessions.len()
    }

    /// Periodic expiry sweep, runs until the process exits
    pub async fn run_expiry(&self, every: Duration) {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let expired = self.prune_idle_at(Utc::now()).await;
            if expired > 0 {
                tracing::debug!(
                    "Session sweep removed {} idle sessions, {} remain",
                    expired,
                    self.len().await
                );
            }
        }
    }
}
