//! Lock lifecycle: `Active { is_open }` and `Deleted`.
//!
//! A deleted lock keeps its row so that its id can be reactivated by a later
//! create. All transitions are decided here; stores only persist the result.

use crate::error::{CoreError, CoreResult};
use crate::types::DbId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    Active { is_open: bool },
    Deleted,
}

impl LockState {
    /// The single liveness predicate for persisted lock rows.
    pub fn from_row(is_open: bool, deleted: bool) -> Self {
        if deleted {
            LockState::Deleted
        } else {
            LockState::Active { is_open }
        }
    }

    pub fn is_active(self) -> bool {
        matches!(self, LockState::Active { .. })
    }

    /// Open or close an active lock. Setting the current value again is
    /// allowed. `None` for a deleted lock.
    pub fn toggled(self, is_open: bool) -> Option<LockState> {
        match self {
            LockState::Active { .. } => Some(LockState::Active { is_open }),
            LockState::Deleted => None,
        }
    }

    /// `None` when the lock is already deleted.
    pub fn deleted(self) -> Option<LockState> {
        match self {
            LockState::Active { .. } => Some(LockState::Deleted),
            LockState::Deleted => None,
        }
    }
}

/// What a create request does given the current state of the id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreatePlan {
    /// No row with this id exists.
    Insert,
    /// A deleted row exists; bring it back closed with the new privilege.
    Reactivate,
    /// An active lock already holds this id.
    Reject,
}

pub fn plan_create(existing: Option<LockState>) -> CreatePlan {
    match existing {
        None => CreatePlan::Insert,
        Some(LockState::Deleted) => CreatePlan::Reactivate,
        Some(LockState::Active { .. }) => CreatePlan::Reject,
    }
}

pub fn validate_lock_id(id: DbId) -> CoreResult<()> {
    if id <= 0 {
        return Err(CoreError::Validation(
            "Lock id must be a positive integer".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn row_flags_map_to_state() {
        assert_eq!(LockState::from_row(true, false), LockState::Active { is_open: true });
        assert_eq!(LockState::from_row(true, true), LockState::Deleted);
        assert!(!LockState::from_row(false, true).is_active());
    }

    #[test]
    fn toggle_allows_same_value_and_rejects_deleted() {
        let open = LockState::Active { is_open: true };
        assert_eq!(open.toggled(true), Some(open));
        assert_eq!(open.toggled(false), Some(LockState::Active { is_open: false }));
        assert_eq!(LockState::Deleted.toggled(true), None);
    }

    #[test]
    fn delete_is_not_repeatable() {
        let state = LockState::Active { is_open: false };
        let deleted = state.deleted().unwrap();
        assert_eq!(deleted, LockState::Deleted);
        assert_eq!(deleted.deleted(), None);
    }

    #[test]
    fn create_plan_follows_existing_state() {
        assert_eq!(plan_create(None), CreatePlan::Insert);
        assert_eq!(plan_create(Some(LockState::Deleted)), CreatePlan::Reactivate);
        assert_eq!(
            plan_create(Some(LockState::Active { is_open: false })),
            CreatePlan::Reject
        );
    }

    #[test]
    fn lock_id_must_be_positive() {
        assert!(validate_lock_id(1).is_ok());
        assert_matches!(validate_lock_id(0), Err(CoreError::Validation(_)));
        assert_matches!(validate_lock_id(-4), Err(CoreError::Validation(_)));
    }
}
