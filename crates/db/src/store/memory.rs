//! In-memory [`Store`] for tests and local development.
//!
//! Mirrors the Postgres constraints that the API relies on: unique login,
//! email and privilege name; privileges that are still referenced cannot be
//! deleted; lookups skip soft-deleted rows. Not optimized for performance.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;
use seclock_core::locks::{plan_create, CreatePlan};
use seclock_core::pagination::{Page, PageRequest};
use seclock_core::privileges::{
    PrivilegeFlags, PRIVILEGE_ADMIN, PRIVILEGE_EMPLOYEE, PRIVILEGE_VIEWER,
};
use seclock_core::types::DbId;

use super::{AuditStore, LockStore, PrivilegeStore, Store, UserStore};
use crate::error::{DbError, DbResult};
use crate::models::lock::{Lock, LockCreation};
use crate::models::log::{
    NewSystemEvent, NewUserAction, SystemEventEntry, SystemEventRow, UserActionEntry,
    UserActionRow,
};
use crate::models::privilege::{CreatePrivilege, Privilege, UpdatePrivilege};
use crate::models::user::{CreateUser, StoredToken, User, UserProfile};

#[derive(Debug, Default)]
struct MemoryState {
    privileges: BTreeMap<DbId, Privilege>,
    users: BTreeMap<DbId, User>,
    locks: BTreeMap<DbId, Lock>,
    user_actions: Vec<UserActionRow>,
    system_events: Vec<SystemEventRow>,
    next_privilege_id: DbId,
    next_user_id: DbId,
    next_log_id: DbId,
}

impl MemoryState {
    fn seeded() -> Self {
        let mut state = Self::default();
        let employee = PrivilegeFlags {
            view_locks: true,
            edit_locks: true,
            ..PrivilegeFlags::default()
        };
        let viewer = PrivilegeFlags {
            view_locks: true,
            ..PrivilegeFlags::default()
        };
        for (name, description, flags) in [
            (PRIVILEGE_ADMIN, "Full access", PrivilegeFlags::all()),
            (PRIVILEGE_EMPLOYEE, "Operate locks", employee),
            (PRIVILEGE_VIEWER, "Read-only access to locks", viewer),
        ] {
            state.insert_privilege(name.to_string(), Some(description.to_string()), flags);
        }
        state
    }

    fn insert_privilege(
        &mut self,
        name: String,
        description: Option<String>,
        flags: PrivilegeFlags,
    ) -> Privilege {
        self.next_privilege_id += 1;
        let privilege = Privilege {
            id: self.next_privilege_id,
            name,
            description,
            view_locks: flags.view_locks,
            view_users: flags.view_users,
            view_logs: flags.view_logs,
            edit_locks: flags.edit_locks,
            edit_users: flags.edit_users,
            created_at: Utc::now(),
        };
        self.privileges.insert(privilege.id, privilege.clone());
        privilege
    }

    fn next_log_id(&mut self) -> DbId {
        self.next_log_id += 1;
        self.next_log_id
    }

    fn live_user(&self, id: DbId) -> Option<&User> {
        self.users.get(&id).filter(|u| u.state().is_active())
    }

    fn live_user_mut(&mut self, id: DbId) -> Option<&mut User> {
        self.users.get_mut(&id).filter(|u| u.state().is_active())
    }

    fn login_of(&self, user_id: Option<DbId>) -> Option<String> {
        user_id
            .and_then(|id| self.users.get(&id))
            .and_then(|u| u.login.clone())
    }

    fn profile(&self, user: &User) -> Option<UserProfile> {
        let privilege = self.privileges.get(&user.privilege_id)?;
        Some(UserProfile {
            id: user.id,
            login: user.login.clone()?,
            email: user.email.clone()?,
            name: user.name.clone(),
            privilege_id: privilege.id,
            privilege_name: privilege.name.clone(),
            view_locks: privilege.view_locks,
            view_users: privilege.view_users,
            view_logs: privilege.view_logs,
            edit_locks: privilege.edit_locks,
            edit_users: privilege.edit_users,
        })
    }

    fn user_action_entries<F>(&self, filter: F, page: PageRequest) -> Page<UserActionEntry>
    where
        F: Fn(&UserActionRow) -> bool,
    {
        let mut rows: Vec<&UserActionRow> = self
            .user_actions
            .iter()
            .filter(|row| filter(*row))
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let total = rows.len() as i64;
        let entries = paged(rows, page)
            .map(|row| {
                let mut row = row.clone();
                row.user_login = self.login_of(row.user_id);
                UserActionEntry::from(row)
            })
            .collect();
        Page::new(entries, total, page)
    }
}

fn paged<T>(rows: Vec<T>, page: PageRequest) -> impl Iterator<Item = T> {
    let offset = usize::try_from(page.offset()).unwrap_or(0);
    let size = usize::try_from(page.size).unwrap_or(0);
    rows.into_iter().skip(offset).take(size)
}

/// In-memory store seeded with the `Admin`, `Employee` and `Viewer` privileges.
#[derive(Debug)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
    fail_audit_writes: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(MemoryState::seeded()),
            fail_audit_writes: AtomicBool::new(false),
        }
    }

    /// Make every audit append fail with [`DbError::Unavailable`].
    pub fn set_fail_audit_writes(&self, fail: bool) {
        self.fail_audit_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of entries in each audit stream, as `(user_actions, system_events)`.
    pub fn audit_counts(&self) -> DbResult<(usize, usize)> {
        let state = self.read()?;
        Ok((state.user_actions.len(), state.system_events.len()))
    }

    /// The stored user row, soft-deleted or not.
    pub fn user_row(&self, id: DbId) -> DbResult<Option<User>> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    fn read(&self) -> DbResult<RwLockReadGuard<'_, MemoryState>> {
        self.state
            .read()
            .map_err(|_| DbError::Unavailable("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> DbResult<RwLockWriteGuard<'_, MemoryState>> {
        self.state
            .write()
            .map_err(|_| DbError::Unavailable("memory store lock poisoned".to_string()))
    }

    fn check_audit_writable(&self) -> DbResult<()> {
        if self.fail_audit_writes.load(Ordering::SeqCst) {
            return Err(DbError::Unavailable("audit writes disabled".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl PrivilegeStore for MemoryStore {
    async fn privilege_by_id(&self, id: DbId) -> DbResult<Option<Privilege>> {
        Ok(self.read()?.privileges.get(&id).cloned())
    }

    async fn privilege_by_name(&self, name: &str) -> DbResult<Option<Privilege>> {
        Ok(self
            .read()?
            .privileges
            .values()
            .find(|p| p.name == name)
            .cloned())
    }

    async fn list_privileges(&self) -> DbResult<Vec<Privilege>> {
        Ok(self.read()?.privileges.values().cloned().collect())
    }

    async fn create_privilege(&self, input: &CreatePrivilege) -> DbResult<Privilege> {
        let mut state = self.write()?;
        if state.privileges.values().any(|p| p.name == input.name) {
            return Err(DbError::UniqueViolation {
                constraint: "uq_user_privileges_name".to_string(),
            });
        }
        Ok(state.insert_privilege(input.name.clone(), input.description.clone(), input.flags))
    }

    async fn update_privilege(
        &self,
        id: DbId,
        input: &UpdatePrivilege,
    ) -> DbResult<Option<Privilege>> {
        let mut state = self.write()?;
        let Some(privilege) = state.privileges.get_mut(&id) else {
            return Ok(None);
        };
        privilege.description = input.description.clone();
        privilege.view_locks = input.flags.view_locks;
        privilege.view_users = input.flags.view_users;
        privilege.view_logs = input.flags.view_logs;
        privilege.edit_locks = input.flags.edit_locks;
        privilege.edit_users = input.flags.edit_users;
        Ok(Some(privilege.clone()))
    }

    async fn delete_privilege(&self, id: DbId) -> DbResult<bool> {
        let mut state = self.write()?;
        if state.users.values().any(|u| u.privilege_id == id) {
            return Err(DbError::ForeignKeyViolation {
                constraint: "fk_users_privilege".to_string(),
            });
        }
        if state.locks.values().any(|l| l.privilege_id == id) {
            return Err(DbError::ForeignKeyViolation {
                constraint: "fk_locks_privilege".to_string(),
            });
        }
        Ok(state.privileges.remove(&id).is_some())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, input: &CreateUser) -> DbResult<User> {
        let mut state = self.write()?;
        if !state.privileges.contains_key(&input.privilege_id) {
            return Err(DbError::ForeignKeyViolation {
                constraint: "fk_users_privilege".to_string(),
            });
        }
        if state
            .users
            .values()
            .any(|u| u.login.as_deref() == Some(input.login.as_str()))
        {
            return Err(DbError::UniqueViolation {
                constraint: "uq_users_login".to_string(),
            });
        }
        if state
            .users
            .values()
            .any(|u| u.email.as_deref() == Some(input.email.as_str()))
        {
            return Err(DbError::UniqueViolation {
                constraint: "uq_users_email".to_string(),
            });
        }

        state.next_user_id += 1;
        let user = User {
            id: state.next_user_id,
            login: Some(input.login.clone()),
            password_hash: Some(input.password_hash.clone()),
            email: Some(input.email.clone()),
            name: input.name.clone(),
            privilege_id: input.privilege_id,
            token_hash: None,
            token_expires_at: None,
            deleted: false,
            created_at: Utc::now(),
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn user_by_id(&self, id: DbId) -> DbResult<Option<User>> {
        Ok(self.read()?.live_user(id).cloned())
    }

    async fn user_by_login(&self, login: &str) -> DbResult<Option<User>> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|u| u.state().is_active() && u.login.as_deref() == Some(login))
            .cloned())
    }

    async fn user_profile(&self, id: DbId) -> DbResult<Option<UserProfile>> {
        let state = self.read()?;
        Ok(state.live_user(id).and_then(|u| state.profile(u)))
    }

    async fn list_user_profiles(&self) -> DbResult<Vec<UserProfile>> {
        let state = self.read()?;
        Ok(state
            .users
            .values()
            .filter(|u| u.state().is_active())
            .filter_map(|u| state.profile(u))
            .collect())
    }

    async fn count_users(&self) -> DbResult<i64> {
        let state = self.read()?;
        Ok(state.users.values().filter(|u| u.state().is_active()).count() as i64)
    }

    async fn store_token(&self, id: DbId, token: &StoredToken) -> DbResult<bool> {
        let mut state = self.write()?;
        let Some(user) = state.live_user_mut(id) else {
            return Ok(false);
        };
        user.token_hash = Some(token.token_hash.clone());
        user.token_expires_at = Some(token.expires_at);
        Ok(true)
    }

    async fn swap_token(
        &self,
        id: DbId,
        expected_hash: &str,
        token: &StoredToken,
    ) -> DbResult<bool> {
        let mut state = self.write()?;
        let Some(user) = state.live_user_mut(id) else {
            return Ok(false);
        };
        if user.token_hash.as_deref() != Some(expected_hash) {
            return Ok(false);
        }
        user.token_hash = Some(token.token_hash.clone());
        user.token_expires_at = Some(token.expires_at);
        Ok(true)
    }

    async fn clear_token(&self, id: DbId) -> DbResult<bool> {
        let mut state = self.write()?;
        let Some(user) = state.live_user_mut(id) else {
            return Ok(false);
        };
        user.token_hash = None;
        user.token_expires_at = None;
        Ok(true)
    }

    async fn assign_privilege(&self, id: DbId, privilege_id: DbId) -> DbResult<bool> {
        let mut state = self.write()?;
        if !state.privileges.contains_key(&privilege_id) {
            return Err(DbError::ForeignKeyViolation {
                constraint: "fk_users_privilege".to_string(),
            });
        }
        let Some(user) = state.live_user_mut(id) else {
            return Ok(false);
        };
        user.privilege_id = privilege_id;
        Ok(true)
    }

    async fn soft_delete_user(&self, id: DbId) -> DbResult<bool> {
        let mut state = self.write()?;
        let Some(user) = state.live_user_mut(id) else {
            return Ok(false);
        };
        user.login = None;
        user.password_hash = None;
        user.email = None;
        user.name = None;
        user.token_hash = None;
        user.token_expires_at = None;
        user.deleted = true;
        Ok(true)
    }
}

#[async_trait]
impl LockStore for MemoryStore {
    async fn create_lock(&self, id: DbId, privilege_id: DbId) -> DbResult<LockCreation> {
        let mut state = self.write()?;
        if !state.privileges.contains_key(&privilege_id) {
            return Err(DbError::ForeignKeyViolation {
                constraint: "fk_locks_privilege".to_string(),
            });
        }
        let existing = state.locks.get(&id).map(Lock::state);
        let fresh = Lock {
            id,
            privilege_id,
            is_open: false,
            deleted: false,
            last_modified: Utc::now(),
        };
        let outcome = match plan_create(existing) {
            CreatePlan::Insert => LockCreation::Created(fresh.clone()),
            CreatePlan::Reactivate => LockCreation::Reactivated(fresh.clone()),
            CreatePlan::Reject => return Ok(LockCreation::AlreadyActive),
        };
        state.locks.insert(id, fresh);
        Ok(outcome)
    }

    async fn lock_by_id(&self, id: DbId) -> DbResult<Option<Lock>> {
        Ok(self
            .read()?
            .locks
            .get(&id)
            .filter(|l| l.state().is_active())
            .cloned())
    }

    async fn list_locks(&self) -> DbResult<Vec<Lock>> {
        Ok(self
            .read()?
            .locks
            .values()
            .filter(|l| l.state().is_active())
            .cloned()
            .collect())
    }

    async fn set_lock_open(&self, id: DbId, is_open: bool) -> DbResult<Option<Lock>> {
        let mut state = self.write()?;
        let Some(lock) = state.locks.get_mut(&id) else {
            return Ok(None);
        };
        if lock.state().toggled(is_open).is_none() {
            return Ok(None);
        }
        lock.is_open = is_open;
        lock.last_modified = Utc::now();
        Ok(Some(lock.clone()))
    }

    async fn soft_delete_lock(&self, id: DbId) -> DbResult<bool> {
        let mut state = self.write()?;
        let Some(lock) = state.locks.get_mut(&id) else {
            return Ok(false);
        };
        if lock.state().deleted().is_none() {
            return Ok(false);
        }
        lock.deleted = true;
        lock.last_modified = Utc::now();
        Ok(true)
    }
}

#[async_trait]
impl AuditStore for MemoryStore {
    async fn append_user_action(&self, entry: &NewUserAction) -> DbResult<()> {
        self.check_audit_writable()?;
        let mut state = self.write()?;
        let id = state.next_log_id();
        state.user_actions.push(UserActionRow {
            id,
            user_id: entry.user_id,
            user_login: None,
            lock_id: entry.lock_id,
            action: entry.action.id(),
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn append_system_event(&self, event: &NewSystemEvent) -> DbResult<()> {
        self.check_audit_writable()?;
        let mut state = self.write()?;
        let id = state.next_log_id();
        state.system_events.push(SystemEventRow {
            id,
            action_kind: event.action.id(),
            ip_address: event.ip_address.clone(),
            user_agent: event.user_agent.clone(),
            user_id: event.user_id,
            user_login: None,
            endpoint: event.endpoint.clone(),
            method: event.method.clone(),
            detail: event.detail.clone(),
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn query_user_actions(
        &self,
        kinds: &[i16],
        page: PageRequest,
    ) -> DbResult<Page<UserActionEntry>> {
        let state = self.read()?;
        Ok(state.user_action_entries(|row| kinds.contains(&row.action), page))
    }

    async fn query_system_events(
        &self,
        kinds: &[i16],
        page: PageRequest,
    ) -> DbResult<Page<SystemEventEntry>> {
        let state = self.read()?;
        let mut rows: Vec<&SystemEventRow> = state
            .system_events
            .iter()
            .filter(|r| kinds.contains(&r.action_kind))
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let total = rows.len() as i64;
        let entries = paged(rows, page)
            .map(|row| {
                let mut row = row.clone();
                row.user_login = state.login_of(row.user_id);
                SystemEventEntry::from(row)
            })
            .collect();
        Ok(Page::new(entries, total, page))
    }

    async fn lock_history(
        &self,
        lock_id: DbId,
        page: PageRequest,
    ) -> DbResult<Page<UserActionEntry>> {
        let state = self.read()?;
        Ok(state.user_action_entries(|row| row.lock_id == Some(lock_id), page))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> DbResult<()> {
        self.read().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use seclock_core::audit::ActionKind;

    use super::*;

    fn new_user(login: &str, email: &str) -> CreateUser {
        CreateUser {
            login: login.to_string(),
            password_hash: "hash".to_string(),
            email: email.to_string(),
            name: None,
            privilege_id: 1,
        }
    }

    fn token(hash: &str) -> StoredToken {
        StoredToken {
            token_hash: hash.to_string(),
            expires_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn seeds_three_privileges() {
        let store = MemoryStore::new();
        let names: Vec<String> = store
            .list_privileges()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Admin", "Employee", "Viewer"]);
        let admin = store.privilege_by_name("Admin").await.unwrap().unwrap();
        assert_eq!(admin.flags(), PrivilegeFlags::all());
    }

    #[tokio::test]
    async fn duplicate_login_and_email_are_unique_violations() {
        let store = MemoryStore::new();
        store.create_user(&new_user("alice", "a@example.com")).await.unwrap();

        assert_matches!(
            store.create_user(&new_user("alice", "b@example.com")).await,
            Err(DbError::UniqueViolation { constraint }) if constraint == "uq_users_login"
        );
        assert_matches!(
            store.create_user(&new_user("bob", "a@example.com")).await,
            Err(DbError::UniqueViolation { constraint }) if constraint == "uq_users_email"
        );
    }

    #[tokio::test]
    async fn soft_deleted_user_frees_login_and_is_hidden() {
        let store = MemoryStore::new();
        let user = store.create_user(&new_user("alice", "a@example.com")).await.unwrap();

        assert!(store.soft_delete_user(user.id).await.unwrap());
        assert!(!store.soft_delete_user(user.id).await.unwrap());
        assert!(store.user_by_id(user.id).await.unwrap().is_none());
        assert_eq!(store.count_users().await.unwrap(), 0);

        store.create_user(&new_user("alice", "a@example.com")).await.unwrap();
    }

    #[tokio::test]
    async fn soft_delete_nulls_every_scrubbed_column() {
        let store = MemoryStore::new();
        let mut input = new_user("alice", "a@example.com");
        input.name = Some("Alice".to_string());
        let user = store.create_user(&input).await.unwrap();
        store.store_token(user.id, &token("one")).await.unwrap();

        assert!(store.soft_delete_user(user.id).await.unwrap());

        let row = store.user_row(user.id).unwrap().expect("row is kept");
        assert!(row.deleted);
        assert_eq!(row.login, None);
        assert_eq!(row.password_hash, None);
        assert_eq!(row.email, None);
        assert_eq!(row.name, None);
        assert_eq!(row.token_hash, None);
        assert_eq!(row.token_expires_at, None);
        assert_eq!(row.privilege_id, user.privilege_id);
    }

    #[tokio::test]
    async fn swap_token_is_compare_and_set() {
        let store = MemoryStore::new();
        let user = store.create_user(&new_user("alice", "a@example.com")).await.unwrap();
        store.store_token(user.id, &token("one")).await.unwrap();

        assert!(store.swap_token(user.id, "one", &token("two")).await.unwrap());
        assert!(!store.swap_token(user.id, "one", &token("three")).await.unwrap());
        let stored = store.user_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.token_hash.as_deref(), Some("two"));
    }

    #[tokio::test]
    async fn lock_create_delete_reactivate() {
        let store = MemoryStore::new();
        assert_matches!(store.create_lock(5, 2).await.unwrap(), LockCreation::Created(_));
        store.set_lock_open(5, true).await.unwrap();
        assert_matches!(store.create_lock(5, 2).await.unwrap(), LockCreation::AlreadyActive);

        assert!(store.soft_delete_lock(5).await.unwrap());
        assert!(!store.soft_delete_lock(5).await.unwrap());
        assert!(store.set_lock_open(5, true).await.unwrap().is_none());
        assert!(store.list_locks().await.unwrap().is_empty());

        let lock = match store.create_lock(5, 3).await.unwrap() {
            LockCreation::Reactivated(lock) => lock,
            other => panic!("expected reactivation, got {other:?}"),
        };
        assert!(!lock.is_open);
        assert_eq!(lock.privilege_id, 3);
    }

    #[tokio::test]
    async fn referenced_privilege_cannot_be_deleted() {
        let store = MemoryStore::new();
        store.create_lock(1, 3).await.unwrap();
        assert_matches!(
            store.delete_privilege(3).await,
            Err(DbError::ForeignKeyViolation { .. })
        );
        assert!(store.delete_privilege(2).await.unwrap());
        assert!(!store.delete_privilege(2).await.unwrap());
    }

    #[tokio::test]
    async fn user_actions_are_newest_first_and_paged() {
        let store = MemoryStore::new();
        for lock_id in 1..=5 {
            store
                .append_user_action(&NewUserAction {
                    user_id: None,
                    lock_id: Some(lock_id),
                    action: ActionKind::Create,
                })
                .await
                .unwrap();
        }

        let page = store
            .query_user_actions(&[1], PageRequest::new(Some(1), Some(2)))
            .await
            .unwrap();
        assert_eq!(page.total_count, 5);
        assert_eq!(page.total_pages, 3);
        let ids: Vec<Option<DbId>> = page.entries.iter().map(|e| e.lock_id).collect();
        assert_eq!(ids, vec![Some(5), Some(4)]);
        assert_eq!(page.entries[0].actor, "System");

        let history = store.lock_history(3, PageRequest::default()).await.unwrap();
        assert_eq!(history.total_count, 1);
    }

    #[tokio::test]
    async fn deleted_actor_renders_as_deleted() {
        let store = MemoryStore::new();
        let user = store.create_user(&new_user("alice", "a@example.com")).await.unwrap();
        store
            .append_system_event(&NewSystemEvent::new(ActionKind::Login).with_actor(Some(user.id)))
            .await
            .unwrap();

        let before = store.query_system_events(&[5], PageRequest::default()).await.unwrap();
        assert_eq!(before.entries[0].actor, "alice");

        store.soft_delete_user(user.id).await.unwrap();
        let after = store.query_system_events(&[5], PageRequest::default()).await.unwrap();
        assert_eq!(after.entries[0].actor, "[deleted]");
    }

    #[tokio::test]
    async fn audit_failure_injection() {
        let store = MemoryStore::new();
        store.set_fail_audit_writes(true);
        assert_matches!(
            store
                .append_system_event(&NewSystemEvent::new(ActionKind::ApiCall))
                .await,
            Err(DbError::Unavailable(_))
        );
        assert_eq!(store.audit_counts().unwrap(), (0, 0));
    }
}
