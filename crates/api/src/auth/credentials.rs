//! Account creation and login credential checks.

use seclock_core::error::{CoreError, CoreResult};
use seclock_core::users::{validate_registration, Registration};
use seclock_db::models::user::{CreateUser, User};
use seclock_db::Store;

use super::password::{burn_verification, hash_password, verify_password};

/// Validate, hash and persist a new account.
///
/// Login and email collisions surface as `Conflict` naming the field; an
/// unknown privilege is `NotFound`.
pub async fn create_user(
    store: &dyn Store,
    input: Registration,
    password_min_length: usize,
) -> CoreResult<User> {
    let input = input.normalized();
    validate_registration(&input, password_min_length)?;

    if store.privilege_by_id(input.privilege_id).await?.is_none() {
        return Err(CoreError::not_found("Privilege", input.privilege_id));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| CoreError::Internal(format!("Password hashing error: {e}")))?;

    let user = store
        .create_user(&CreateUser {
            login: input.login,
            password_hash,
            email: input.email,
            name: input.name,
            privilege_id: input.privilege_id,
        })
        .await?;
    tracing::info!(user_id = user.id, privilege_id = user.privilege_id, "User created");
    Ok(user)
}

/// Check a login/password pair against live accounts.
///
/// Returns the user on a match and `None` for an unknown login or a wrong
/// password; the two cases cost the same hashing effort.
pub async fn verify_credentials(
    store: &dyn Store,
    login: &str,
    password: &str,
) -> CoreResult<Option<User>> {
    let Some(user) = store.user_by_login(login).await? else {
        burn_verification(password);
        return Ok(None);
    };
    let Some(hash) = user.password_hash.as_deref() else {
        burn_verification(password);
        return Ok(None);
    };

    let matches = verify_password(password, hash)
        .map_err(|e| CoreError::Internal(format!("Password verification error: {e}")))?;
    Ok(matches.then_some(user))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use seclock_db::MemoryStore;

    use super::*;

    fn registration(login: &str, email: &str) -> Registration {
        Registration {
            login: login.into(),
            password: "pass1234".into(),
            email: email.into(),
            name: None,
            privilege_id: 2,
        }
    }

    #[tokio::test]
    async fn stores_hash_not_password() {
        let store = MemoryStore::new();
        let user = create_user(&store, registration("alice", "a@example.com"), 4)
            .await
            .unwrap();
        let hash = user.password_hash.unwrap();
        assert_ne!(hash, "pass1234");
        assert!(hash.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn duplicate_email_names_the_field() {
        let store = MemoryStore::new();
        create_user(&store, registration("alice", "a@example.com"), 4)
            .await
            .unwrap();
        assert_matches!(
            create_user(&store, registration("bob", "a@example.com"), 4).await,
            Err(CoreError::Conflict { field: Some("email"), .. })
        );
    }

    #[tokio::test]
    async fn unknown_privilege_is_not_found() {
        let store = MemoryStore::new();
        let mut input = registration("alice", "a@example.com");
        input.privilege_id = 99;
        assert_matches!(
            create_user(&store, input, 4).await,
            Err(CoreError::NotFound { entity: "Privilege", .. })
        );
    }

    #[tokio::test]
    async fn verify_credentials_outcomes() {
        let store = MemoryStore::new();
        create_user(&store, registration("alice", "a@example.com"), 4)
            .await
            .unwrap();

        assert!(verify_credentials(&store, "alice", "pass1234").await.unwrap().is_some());
        assert!(verify_credentials(&store, "alice", "wrong").await.unwrap().is_none());
        assert!(verify_credentials(&store, "nobody", "pass1234").await.unwrap().is_none());
    }
}
