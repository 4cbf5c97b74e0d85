//! Audit log entry models for the `log_entries` and `system_log` tables.

use seclock_core::audit::{actor_label, kind_name, ActionKind};
use seclock_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A lock mutation to append to the user-action stream.
#[derive(Debug, Clone)]
pub struct NewUserAction {
    pub user_id: Option<DbId>,
    pub lock_id: Option<DbId>,
    pub action: ActionKind,
}

/// A system event to append to the system stream.
///
/// Built with [`NewSystemEvent::new`] and the `with_*` helpers.
#[derive(Debug, Clone)]
pub struct NewSystemEvent {
    pub action: ActionKind,
    pub user_id: Option<DbId>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub endpoint: Option<String>,
    pub method: Option<String>,
    pub detail: Option<String>,
}

impl NewSystemEvent {
    pub fn new(action: ActionKind) -> Self {
        Self {
            action,
            user_id: None,
            ip_address: None,
            user_agent: None,
            endpoint: None,
            method: None,
            detail: None,
        }
    }

    pub fn with_actor(mut self, user_id: Option<DbId>) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn with_request(
        mut self,
        method: impl Into<String>,
        endpoint: impl Into<String>,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> Self {
        self.method = Some(method.into());
        self.endpoint = Some(endpoint.into());
        self.ip_address = ip_address;
        self.user_agent = user_agent;
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// `log_entries` row left-joined with the acting user's login.
#[derive(Debug, Clone, FromRow)]
pub struct UserActionRow {
    pub id: DbId,
    pub user_id: Option<DbId>,
    pub user_login: Option<String>,
    pub lock_id: Option<DbId>,
    pub action: i16,
    pub created_at: Timestamp,
}

/// `system_log` row left-joined with the acting user's login.
#[derive(Debug, Clone, FromRow)]
pub struct SystemEventRow {
    pub id: DbId,
    pub action_kind: i16,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub user_id: Option<DbId>,
    pub user_login: Option<String>,
    pub endpoint: Option<String>,
    pub method: Option<String>,
    pub detail: Option<String>,
    pub created_at: Timestamp,
}

/// A user-action entry as returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct UserActionEntry {
    pub id: DbId,
    pub user_id: Option<DbId>,
    pub actor: String,
    pub lock_id: Option<DbId>,
    pub action: i16,
    pub action_name: &'static str,
    pub timestamp: Timestamp,
}

impl From<UserActionRow> for UserActionEntry {
    fn from(row: UserActionRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            actor: actor_label(row.user_id, row.user_login.as_deref()),
            lock_id: row.lock_id,
            action: row.action,
            action_name: kind_name(row.action),
            timestamp: row.created_at,
        }
    }
}

/// A system event as returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct SystemEventEntry {
    pub id: DbId,
    pub action: i16,
    pub action_name: &'static str,
    pub user_id: Option<DbId>,
    pub actor: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub endpoint: Option<String>,
    pub method: Option<String>,
    pub detail: Option<String>,
    pub timestamp: Timestamp,
}

impl From<SystemEventRow> for SystemEventEntry {
    fn from(row: SystemEventRow) -> Self {
        Self {
            id: row.id,
            action: row.action_kind,
            action_name: kind_name(row.action_kind),
            user_id: row.user_id,
            actor: actor_label(row.user_id, row.user_login.as_deref()),
            ip_address: row.ip_address,
            user_agent: row.user_agent,
            endpoint: row.endpoint,
            method: row.method,
            detail: row.detail,
            timestamp: row.created_at,
        }
    }
}
