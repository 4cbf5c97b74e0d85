//! Privilege model: five independent capability flags.
//!
//! Well-known privilege names must match the seed rows in
//! `db/migrations/20260301000001_create_user_privileges.sql`.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const PRIVILEGE_ADMIN: &str = "Admin";
pub const PRIVILEGE_EMPLOYEE: &str = "Employee";
pub const PRIVILEGE_VIEWER: &str = "Viewer";

/// A single grantable capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ViewLocks,
    ViewUsers,
    ViewLogs,
    EditLocks,
    EditUsers,
}

impl Capability {
    pub const ALL: [Capability; 5] = [
        Capability::ViewLocks,
        Capability::ViewUsers,
        Capability::ViewLogs,
        Capability::EditLocks,
        Capability::EditUsers,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Capability::ViewLocks => "view_locks",
            Capability::ViewUsers => "view_users",
            Capability::ViewLogs => "view_logs",
            Capability::EditLocks => "edit_locks",
            Capability::EditUsers => "edit_users",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The capability flag set attached to a privilege.
///
/// Missing fields deserialize as `false`, so request bodies only need to name
/// the flags they grant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivilegeFlags {
    pub view_locks: bool,
    pub view_users: bool,
    pub view_logs: bool,
    pub edit_locks: bool,
    pub edit_users: bool,
}

impl PrivilegeFlags {
    /// Every capability granted (the `Admin` privilege).
    pub const fn all() -> Self {
        Self {
            view_locks: true,
            view_users: true,
            view_logs: true,
            edit_locks: true,
            edit_users: true,
        }
    }

    pub fn grants(&self, capability: Capability) -> bool {
        match capability {
            Capability::ViewLocks => self.view_locks,
            Capability::ViewUsers => self.view_users,
            Capability::ViewLogs => self.view_logs,
            Capability::EditLocks => self.edit_locks,
            Capability::EditUsers => self.edit_users,
        }
    }
}
