//! Lock entity model.

use seclock_core::locks::LockState;
use seclock_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `locks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Lock {
    pub id: DbId,
    pub privilege_id: DbId,
    pub is_open: bool,
    #[serde(skip_serializing)]
    pub deleted: bool,
    pub last_modified: Timestamp,
}

impl Lock {
    pub fn state(&self) -> LockState {
        LockState::from_row(self.is_open, self.deleted)
    }
}

/// Outcome of a create request for a lock id.
#[derive(Debug, Clone)]
pub enum LockCreation {
    Created(Lock),
    /// A soft-deleted lock was brought back, closed, under the new privilege.
    Reactivated(Lock),
    /// An active lock already holds the id; nothing was written.
    AlreadyActive,
}
