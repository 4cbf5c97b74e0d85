//! Best-effort audit recording.
//!
//! [`AuditLogger`] appends to the audit streams after the audited mutation
//! has already happened. A failed append is logged and counted, never
//! returned: callers get `()` back whatever the store does.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use seclock_core::audit::ActionKind;
use seclock_core::types::DbId;
use seclock_db::models::log::{NewSystemEvent, NewUserAction};
use seclock_db::Store;

#[derive(Clone)]
pub struct AuditLogger {
    store: Arc<dyn Store>,
    failures: Arc<AtomicU64>,
}

impl AuditLogger {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            failures: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Record a lock mutation on the user-action stream.
    pub async fn user_action(&self, user_id: Option<DbId>, lock_id: Option<DbId>, action: ActionKind) {
        let entry = NewUserAction {
            user_id,
            lock_id,
            action,
        };
        if let Err(e) = self.store.append_user_action(&entry).await {
            self.failures.fetch_add(1, Ordering::Relaxed);
            tracing::error!(
                error = %e,
                action = action.name(),
                ?user_id,
                ?lock_id,
                "Failed to record user action"
            );
        }
    }

    pub async fn system_event(&self, event: NewSystemEvent) {
        if let Err(e) = self.store.append_system_event(&event).await {
            self.failures.fetch_add(1, Ordering::Relaxed);
            tracing::error!(
                error = %e,
                action = event.action.name(),
                user_id = ?event.user_id,
                "Failed to record system event"
            );
        }
    }

    /// Record a system event on a background task.
    ///
    /// The returned handle may be dropped; the append still runs.
    pub fn spawn_system_event(&self, event: NewSystemEvent) -> tokio::task::JoinHandle<()> {
        let logger = self.clone();
        tokio::spawn(async move { logger.system_event(event).await })
    }

    /// Appends that have failed since startup.
    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}
