//! Audit action kinds, log streams and query filter parsing.
//!
//! Kind ids are the values persisted in `log_entries.action` and
//! `system_log.action_kind`; they must never be renumbered.

use serde::Serialize;

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Action kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ActionKind {
    Create,
    Update,
    Delete,
    SystemEvent,
    Login,
    LoginFailed,
    PrivilegeChange,
    UserDeletion,
    UserCreation,
    LockCreation,
    LockStatusChange,
    PageView,
    ApiCall,
    UnauthorizedAccess,
}

impl ActionKind {
    pub const ALL: [ActionKind; 14] = [
        ActionKind::Create,
        ActionKind::Update,
        ActionKind::Delete,
        ActionKind::SystemEvent,
        ActionKind::Login,
        ActionKind::LoginFailed,
        ActionKind::PrivilegeChange,
        ActionKind::UserDeletion,
        ActionKind::UserCreation,
        ActionKind::LockCreation,
        ActionKind::LockStatusChange,
        ActionKind::PageView,
        ActionKind::ApiCall,
        ActionKind::UnauthorizedAccess,
    ];

    pub fn id(self) -> i16 {
        match self {
            ActionKind::Create => 1,
            ActionKind::Update => 2,
            ActionKind::Delete => 3,
            ActionKind::SystemEvent => 4,
            ActionKind::Login => 5,
            ActionKind::LoginFailed => 6,
            ActionKind::PrivilegeChange => 7,
            ActionKind::UserDeletion => 8,
            ActionKind::UserCreation => 9,
            ActionKind::LockCreation => 10,
            ActionKind::LockStatusChange => 11,
            ActionKind::PageView => 12,
            ActionKind::ApiCall => 13,
            ActionKind::UnauthorizedAccess => 14,
        }
    }

    pub fn from_id(id: i16) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.id() == id)
    }

    /// Human-readable name shown in log listings.
    pub fn name(self) -> &'static str {
        match self {
            ActionKind::Create => "Create",
            ActionKind::Update => "Update",
            ActionKind::Delete => "Delete",
            ActionKind::SystemEvent => "System Event",
            ActionKind::Login => "Login",
            ActionKind::LoginFailed => "Login Failed",
            ActionKind::PrivilegeChange => "Privilege Change",
            ActionKind::UserDeletion => "User Deletion",
            ActionKind::UserCreation => "User Creation",
            ActionKind::LockCreation => "Lock Creation",
            ActionKind::LockStatusChange => "Lock Status Change",
            ActionKind::PageView => "Page View",
            ActionKind::ApiCall => "API Call",
            ActionKind::UnauthorizedAccess => "Unauthorized Access",
        }
    }

    pub fn stream(self) -> LogStream {
        match self {
            ActionKind::Create | ActionKind::Update | ActionKind::Delete => LogStream::UserAction,
            _ => LogStream::System,
        }
    }

    /// Kinds a client may append through the API. Every other kind is
    /// written only by the server itself.
    pub fn client_reportable(self) -> bool {
        matches!(self, ActionKind::PageView | ActionKind::SystemEvent)
    }
}

/// Name for a persisted kind id, tolerating ids written by newer releases.
pub fn kind_name(id: i16) -> &'static str {
    ActionKind::from_id(id).map_or("Unknown", ActionKind::name)
}

// ---------------------------------------------------------------------------
// Streams and filters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStream {
    /// Lock mutations performed by users (`log_entries`).
    UserAction,
    /// Authentication, administration and request events (`system_log`).
    System,
}

impl LogStream {
    pub fn default_kinds(self) -> Vec<i16> {
        ActionKind::ALL
            .into_iter()
            .filter(|k| k.stream() == self)
            .map(ActionKind::id)
            .collect()
    }
}

/// Parse a comma-separated kind filter such as `"1,3"`.
///
/// Entries that are not numbers or not kinds of `stream` are ignored. An
/// absent or empty filter, or one that names no kind of the stream, yields
/// the stream default.
/// The result is sorted and free of duplicates.
pub fn parse_kind_filter(raw: Option<&str>, stream: LogStream) -> Vec<i16> {
    let mut kinds: Vec<i16> = raw
        .unwrap_or_default()
        .split(',')
        .filter_map(|part| part.trim().parse::<i16>().ok())
        .filter(|id| ActionKind::from_id(*id).is_some_and(|kind| kind.stream() == stream))
        .collect();
    kinds.sort_unstable();
    kinds.dedup();

    if kinds.is_empty() {
        stream.default_kinds()
    } else {
        kinds
    }
}

// ---------------------------------------------------------------------------
// Actor rendering
// ---------------------------------------------------------------------------

pub const SYSTEM_ACTOR: &str = "System";
pub const DELETED_ACTOR: &str = "[deleted]";

/// Display label for the acting user of a log entry.
///
/// A null actor is the system itself; an actor whose login was scrubbed by
/// account deletion renders as `[deleted]`.
pub fn actor_label(user_id: Option<DbId>, login: Option<&str>) -> String {
    match (user_id, login) {
        (None, _) => SYSTEM_ACTOR.to_string(),
        (Some(_), Some(login)) => login.to_string(),
        (Some(_), None) => DELETED_ACTOR.to_string(),
    }
}

/// Detail text recorded for every failed login, whatever the cause.
pub fn login_failed_detail(login: &str) -> String {
    format!("Failed login attempt for {login}")
}
