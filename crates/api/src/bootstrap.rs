//! First-run seeding of an Admin account.

use seclock_core::error::{CoreError, CoreResult};
use seclock_core::privileges::PRIVILEGE_ADMIN;
use seclock_core::users::Registration;
use seclock_db::Store;

use crate::auth::credentials::create_user;
use crate::config::BootstrapAdmin;

/// Create the configured Admin user when the store has no live users.
///
/// Returns whether an account was created.
pub async fn ensure_admin(
    store: &dyn Store,
    admin: &BootstrapAdmin,
    password_min_length: usize,
) -> CoreResult<bool> {
    if store.count_users().await? > 0 {
        return Ok(false);
    }

    let privilege = store
        .privilege_by_name(PRIVILEGE_ADMIN)
        .await?
        .ok_or_else(|| CoreError::not_found("Privilege", PRIVILEGE_ADMIN))?;

    let user = create_user(
        store,
        Registration {
            login: admin.login.clone(),
            password: admin.password.clone(),
            email: admin.email.clone(),
            name: None,
            privilege_id: privilege.id,
        },
        password_min_length,
    )
    .await?;

    tracing::info!(user_id = user.id, login = %admin.login, "Bootstrap admin created");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use seclock_db::store::UserStore;
    use seclock_db::MemoryStore;

    use super::*;

    fn admin() -> BootstrapAdmin {
        BootstrapAdmin {
            login: "root".into(),
            password: "rootpass".into(),
            email: "root@localhost".into(),
        }
    }

    #[tokio::test]
    async fn seeds_admin_once() {
        let store = MemoryStore::new();
        assert!(ensure_admin(&store, &admin(), 4).await.unwrap());
        assert!(!ensure_admin(&store, &admin(), 4).await.unwrap());

        let user = store.user_by_login("root").await.unwrap().unwrap();
        let profile = store.user_profile(user.id).await.unwrap().unwrap();
        assert_eq!(profile.privilege_name, PRIVILEGE_ADMIN);
        assert!(profile.edit_users);
    }
}
