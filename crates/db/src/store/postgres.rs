//! [`Store`] implementation backed by Postgres.

use async_trait::async_trait;
use seclock_core::pagination::{Page, PageRequest};
use seclock_core::types::DbId;

use super::{AuditStore, LockStore, PrivilegeStore, Store, UserStore};
use crate::error::DbResult;
use crate::models::lock::{Lock, LockCreation};
use crate::models::log::{NewSystemEvent, NewUserAction, SystemEventEntry, UserActionEntry};
use crate::models::privilege::{CreatePrivilege, Privilege, UpdatePrivilege};
use crate::models::user::{CreateUser, StoredToken, User, UserProfile};
use crate::repositories::{LockRepo, PrivilegeRepo, SystemLogRepo, UserLogRepo, UserRepo};
use crate::DbPool;

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PrivilegeStore for PgStore {
    async fn privilege_by_id(&self, id: DbId) -> DbResult<Option<Privilege>> {
        Ok(PrivilegeRepo::find_by_id(&self.pool, id).await?)
    }

    async fn privilege_by_name(&self, name: &str) -> DbResult<Option<Privilege>> {
        Ok(PrivilegeRepo::find_by_name(&self.pool, name).await?)
    }

    async fn list_privileges(&self) -> DbResult<Vec<Privilege>> {
        Ok(PrivilegeRepo::list(&self.pool).await?)
    }

    async fn create_privilege(&self, input: &CreatePrivilege) -> DbResult<Privilege> {
        Ok(PrivilegeRepo::create(&self.pool, input).await?)
    }

    async fn update_privilege(
        &self,
        id: DbId,
        input: &UpdatePrivilege,
    ) -> DbResult<Option<Privilege>> {
        Ok(PrivilegeRepo::update(&self.pool, id, input).await?)
    }

    async fn delete_privilege(&self, id: DbId) -> DbResult<bool> {
        Ok(PrivilegeRepo::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, input: &CreateUser) -> DbResult<User> {
        Ok(UserRepo::create(&self.pool, input).await?)
    }

    async fn user_by_id(&self, id: DbId) -> DbResult<Option<User>> {
        Ok(UserRepo::find_by_id(&self.pool, id).await?)
    }

    async fn user_by_login(&self, login: &str) -> DbResult<Option<User>> {
        Ok(UserRepo::find_by_login(&self.pool, login).await?)
    }

    async fn user_profile(&self, id: DbId) -> DbResult<Option<UserProfile>> {
        Ok(UserRepo::find_profile(&self.pool, id).await?)
    }

    async fn list_user_profiles(&self) -> DbResult<Vec<UserProfile>> {
        Ok(UserRepo::list_profiles(&self.pool).await?)
    }

    async fn count_users(&self) -> DbResult<i64> {
        Ok(UserRepo::count(&self.pool).await?)
    }

    async fn store_token(&self, id: DbId, token: &StoredToken) -> DbResult<bool> {
        Ok(UserRepo::set_token(&self.pool, id, &token.token_hash, token.expires_at).await?)
    }

    async fn swap_token(
        &self,
        id: DbId,
        expected_hash: &str,
        token: &StoredToken,
    ) -> DbResult<bool> {
        Ok(UserRepo::swap_token(
            &self.pool,
            id,
            expected_hash,
            &token.token_hash,
            token.expires_at,
        )
        .await?)
    }

    async fn clear_token(&self, id: DbId) -> DbResult<bool> {
        Ok(UserRepo::clear_token(&self.pool, id).await?)
    }

    async fn assign_privilege(&self, id: DbId, privilege_id: DbId) -> DbResult<bool> {
        Ok(UserRepo::set_privilege(&self.pool, id, privilege_id).await?)
    }

    async fn soft_delete_user(&self, id: DbId) -> DbResult<bool> {
        Ok(UserRepo::soft_delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl LockStore for PgStore {
    async fn create_lock(&self, id: DbId, privilege_id: DbId) -> DbResult<LockCreation> {
        Ok(LockRepo::create_or_reactivate(&self.pool, id, privilege_id).await?)
    }

    async fn lock_by_id(&self, id: DbId) -> DbResult<Option<Lock>> {
        Ok(LockRepo::find_by_id(&self.pool, id).await?)
    }

    async fn list_locks(&self) -> DbResult<Vec<Lock>> {
        Ok(LockRepo::list(&self.pool).await?)
    }

    async fn set_lock_open(&self, id: DbId, is_open: bool) -> DbResult<Option<Lock>> {
        Ok(LockRepo::set_open(&self.pool, id, is_open).await?)
    }

    async fn soft_delete_lock(&self, id: DbId) -> DbResult<bool> {
        Ok(LockRepo::soft_delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl AuditStore for PgStore {
    async fn append_user_action(&self, entry: &NewUserAction) -> DbResult<()> {
        Ok(UserLogRepo::insert(&self.pool, entry).await?)
    }

    async fn append_system_event(&self, event: &NewSystemEvent) -> DbResult<()> {
        Ok(SystemLogRepo::insert(&self.pool, event).await?)
    }

    async fn query_user_actions(
        &self,
        kinds: &[i16],
        page: PageRequest,
    ) -> DbResult<Page<UserActionEntry>> {
        let (rows, total) = UserLogRepo::query(&self.pool, kinds, page).await?;
        Ok(Page::new(rows.into_iter().map(Into::into).collect(), total, page))
    }

    async fn query_system_events(
        &self,
        kinds: &[i16],
        page: PageRequest,
    ) -> DbResult<Page<SystemEventEntry>> {
        let (rows, total) = SystemLogRepo::query(&self.pool, kinds, page).await?;
        Ok(Page::new(rows.into_iter().map(Into::into).collect(), total, page))
    }

    async fn lock_history(
        &self,
        lock_id: DbId,
        page: PageRequest,
    ) -> DbResult<Page<UserActionEntry>> {
        let (rows, total) = UserLogRepo::for_lock(&self.pool, lock_id, page).await?;
        Ok(Page::new(rows.into_iter().map(Into::into).collect(), total, page))
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> DbResult<()> {
        Ok(crate::health_check(&self.pool).await?)
    }
}
