//! Storage boundary used by the API layer.
//!
//! The traits are split per aggregate so that callers can depend on the
//! narrowest capability they need; [`Store`] bundles them for `AppState`.
//! Two implementations exist: [`postgres::PgStore`] over the repositories and
//! [`memory::MemoryStore`] for tests and local development.

use async_trait::async_trait;
use seclock_core::pagination::{Page, PageRequest};
use seclock_core::types::DbId;

use crate::error::DbResult;
use crate::models::lock::{Lock, LockCreation};
use crate::models::log::{NewSystemEvent, NewUserAction, SystemEventEntry, UserActionEntry};
use crate::models::privilege::{CreatePrivilege, Privilege, UpdatePrivilege};
use crate::models::user::{CreateUser, StoredToken, User, UserProfile};

pub mod memory;
pub mod postgres;

#[async_trait]
pub trait PrivilegeStore: Send + Sync {
    async fn privilege_by_id(&self, id: DbId) -> DbResult<Option<Privilege>>;
    async fn privilege_by_name(&self, name: &str) -> DbResult<Option<Privilege>>;
    async fn list_privileges(&self) -> DbResult<Vec<Privilege>>;
    async fn create_privilege(&self, input: &CreatePrivilege) -> DbResult<Privilege>;
    async fn update_privilege(
        &self,
        id: DbId,
        input: &UpdatePrivilege,
    ) -> DbResult<Option<Privilege>>;
    /// Fails with a foreign key violation while the privilege is referenced.
    async fn delete_privilege(&self, id: DbId) -> DbResult<bool>;
}

/// User lookups only ever return live (non-deleted) accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, input: &CreateUser) -> DbResult<User>;
    async fn user_by_id(&self, id: DbId) -> DbResult<Option<User>>;
    async fn user_by_login(&self, login: &str) -> DbResult<Option<User>>;
    async fn user_profile(&self, id: DbId) -> DbResult<Option<UserProfile>>;
    async fn list_user_profiles(&self) -> DbResult<Vec<UserProfile>>;
    async fn count_users(&self) -> DbResult<i64>;
    async fn store_token(&self, id: DbId, token: &StoredToken) -> DbResult<bool>;
    /// Compare-and-set on the stored token digest.
    async fn swap_token(&self, id: DbId, expected_hash: &str, token: &StoredToken)
        -> DbResult<bool>;
    async fn clear_token(&self, id: DbId) -> DbResult<bool>;
    async fn assign_privilege(&self, id: DbId, privilege_id: DbId) -> DbResult<bool>;
    async fn soft_delete_user(&self, id: DbId) -> DbResult<bool>;
}

/// Lock lookups only ever return live (non-deleted) locks.
#[async_trait]
pub trait LockStore: Send + Sync {
    async fn create_lock(&self, id: DbId, privilege_id: DbId) -> DbResult<LockCreation>;
    async fn lock_by_id(&self, id: DbId) -> DbResult<Option<Lock>>;
    async fn list_locks(&self) -> DbResult<Vec<Lock>>;
    async fn set_lock_open(&self, id: DbId, is_open: bool) -> DbResult<Option<Lock>>;
    async fn soft_delete_lock(&self, id: DbId) -> DbResult<bool>;
}

#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn append_user_action(&self, entry: &NewUserAction) -> DbResult<()>;
    async fn append_system_event(&self, event: &NewSystemEvent) -> DbResult<()>;
    async fn query_user_actions(
        &self,
        kinds: &[i16],
        page: PageRequest,
    ) -> DbResult<Page<UserActionEntry>>;
    async fn query_system_events(
        &self,
        kinds: &[i16],
        page: PageRequest,
    ) -> DbResult<Page<SystemEventEntry>>;
    async fn lock_history(&self, lock_id: DbId, page: PageRequest)
        -> DbResult<Page<UserActionEntry>>;
}

#[async_trait]
pub trait Store: PrivilegeStore + UserStore + LockStore + AuditStore {
    /// Cheap reachability probe for health checks.
    async fn ping(&self) -> DbResult<()>;
}
