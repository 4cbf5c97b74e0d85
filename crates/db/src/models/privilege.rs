//! Privilege entity model and DTOs.

use seclock_core::privileges::PrivilegeFlags;
use seclock_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `user_privileges` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Privilege {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub view_locks: bool,
    pub view_users: bool,
    pub view_logs: bool,
    pub edit_locks: bool,
    pub edit_users: bool,
    pub created_at: Timestamp,
}

impl Privilege {
    pub fn flags(&self) -> PrivilegeFlags {
        PrivilegeFlags {
            view_locks: self.view_locks,
            view_users: self.view_users,
            view_logs: self.view_logs,
            edit_locks: self.edit_locks,
            edit_users: self.edit_users,
        }
    }
}

/// DTO for creating a privilege. Omitted flags default to `false`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePrivilege {
    pub name: String,
    pub description: Option<String>,
    #[serde(flatten)]
    pub flags: PrivilegeFlags,
}

/// Full replacement of a privilege's description and flags. The name is immutable.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePrivilege {
    pub description: Option<String>,
    #[serde(flatten)]
    pub flags: PrivilegeFlags,
}
