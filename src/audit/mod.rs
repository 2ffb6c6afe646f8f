//! Fire-and-forget audit logging
//!
//! Every event runs on its own detached task. Callers never await the
//! outcome and failures are only logged.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::client::AuditService;
use crate::models::AuditEvent;

#[derive(Clone)]
pub struct AuditDispatcher {
    sink: Arc<dyn AuditService>,
}

impl AuditDispatcher {
    pub fn new(sink: Arc<dyn AuditService>) -> Self {
        Self { sink }
    }

    /// Spawn the audit call. The handle exists for tests; production callers drop it.
    pub fn fire(&self, event: AuditEvent) -> JoinHandle<()> {
        let sink = self.sink.clone();
        tokio::spawn(async move {
            match sink.log(&event).await {
                Ok(()) => tracing::debug!(
                    "Audit {} {} #{} recorded",
                    event.action,
                    event.entity_type,
                    event.entity_id
                ),
                Err(e) => tracing::debug!("Audit {} dropped: {}", event.action, e),
            }
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::error::AppError;

    /// Audit sink for tests: records events, optionally fails or stalls
    #[derive(Default)]
    pub struct RecordingAudit {
        pub events: Mutex<Vec<AuditEvent>>,
        pub fail: bool,
        pub delay: Option<Duration>,
    }

    impl RecordingAudit {
        pub fn events(&self) -> Vec<AuditEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AuditService for RecordingAudit {
        async fn log(&self, event: &AuditEvent) -> Result<(), AppError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.events.lock().unwrap().push(event.clone());
            if self.fail {
                return Err(AppError::Upstream("audit down".to_string()));
            }
            Ok(())
        }
    }
}
