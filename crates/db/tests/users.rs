//! Integration tests for the `users` repository against a real database.
//!
//! Covers the scrubbing soft delete (and the `ck_users_deleted_scrubbed`
//! check backing it), the compare-and-set token swap, and the mapping of
//! unique violations onto the conflicting field.

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use seclock_core::error::CoreError;
use seclock_db::models::user::{CreateUser, StoredToken, User};
use seclock_db::repositories::UserRepo;
use seclock_db::store::UserStore;
use seclock_db::{DbError, PgStore};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_user(login: &str, email: &str) -> CreateUser {
    CreateUser {
        login: login.to_string(),
        password_hash: "$argon2id$placeholder".to_string(),
        email: email.to_string(),
        name: Some("Test User".to_string()),
        privilege_id: 2,
    }
}

fn token(hash: &str) -> StoredToken {
    StoredToken {
        token_hash: hash.to_string(),
        expires_at: Utc::now() + Duration::hours(1),
    }
}

/// Read a user row regardless of its deleted flag.
async fn raw_row(pool: &PgPool, id: i64) -> User {
    sqlx::query_as::<_, User>(
        "SELECT id, login, password_hash, email, name, privilege_id,
                token_hash, token_expires_at, deleted, created_at
         FROM users WHERE id = $1",
    )
    .bind(id)
    .fetch_one(pool)
    .await
    .unwrap()
}

// ---------------------------------------------------------------------------
// Soft delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_soft_delete_nulls_every_scrubbed_column(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("alice", "alice@test.com"))
        .await
        .unwrap();
    let stored = token("digest-1");
    assert!(UserRepo::set_token(&pool, user.id, &stored.token_hash, stored.expires_at)
        .await
        .unwrap());

    assert!(UserRepo::soft_delete(&pool, user.id).await.unwrap());

    let row = raw_row(&pool, user.id).await;
    assert!(row.deleted);
    assert_eq!(row.login, None);
    assert_eq!(row.password_hash, None);
    assert_eq!(row.email, None);
    assert_eq!(row.name, None);
    assert_eq!(row.token_hash, None);
    assert_eq!(row.token_expires_at, None);
    assert_eq!(row.privilege_id, 2, "privilege reference is kept");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_soft_delete_is_irreversible_and_frees_login(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("alice", "alice@test.com"))
        .await
        .unwrap();

    assert!(UserRepo::soft_delete(&pool, user.id).await.unwrap());
    assert!(
        !UserRepo::soft_delete(&pool, user.id).await.unwrap(),
        "second soft_delete should report nothing deleted"
    );
    assert!(UserRepo::find_by_id(&pool, user.id).await.unwrap().is_none());
    assert!(UserRepo::find_by_login(&pool, "alice").await.unwrap().is_none());
    assert_eq!(UserRepo::count(&pool).await.unwrap(), 0);

    // Token and privilege writes no longer reach the deleted row.
    assert!(!UserRepo::set_token(&pool, user.id, "late", Utc::now()).await.unwrap());
    assert!(!UserRepo::set_privilege(&pool, user.id, 1).await.unwrap());

    let again = UserRepo::create(&pool, &new_user("alice", "alice@test.com"))
        .await
        .unwrap();
    assert_ne!(again.id, user.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deleted_row_must_be_scrubbed(pool: PgPool) {
    let user = UserRepo::create(&pool, &new_user("alice", "alice@test.com"))
        .await
        .unwrap();

    let err = sqlx::query("UPDATE users SET deleted = true WHERE id = $1")
        .bind(user.id)
        .execute(&pool)
        .await
        .unwrap_err();
    let constraint = err
        .as_database_error()
        .and_then(|db| db.constraint())
        .map(str::to_string);
    assert_eq!(constraint.as_deref(), Some("ck_users_deleted_scrubbed"));
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_swap_token_only_replaces_expected_digest(pool: PgPool) {
    let store = PgStore::new(pool.clone());
    let user = store.create_user(&new_user("alice", "alice@test.com")).await.unwrap();
    store.store_token(user.id, &token("one")).await.unwrap();

    assert!(!store.swap_token(user.id, "stale", &token("two")).await.unwrap());
    assert!(store.swap_token(user.id, "one", &token("two")).await.unwrap());
    assert!(!store.swap_token(user.id, "one", &token("three")).await.unwrap());

    let current = store.user_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(current.token_hash.as_deref(), Some("two"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_swaps_from_same_token_have_one_winner(pool: PgPool) {
    let store = PgStore::new(pool.clone());
    let user = store.create_user(&new_user("alice", "alice@test.com")).await.unwrap();
    store.store_token(user.id, &token("one")).await.unwrap();

    let (left, right) = (token("left"), token("right"));
    let (first, second) = tokio::join!(
        store.swap_token(user.id, "one", &left),
        store.swap_token(user.id, "one", &right),
    );
    let wins = [first.unwrap(), second.unwrap()];
    assert_eq!(wins.iter().filter(|won| **won).count(), 1);

    let current = store.user_by_id(user.id).await.unwrap().unwrap();
    let expected = if wins[0] { "left" } else { "right" };
    assert_eq!(current.token_hash.as_deref(), Some(expected));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_clear_token_removes_digest_and_expiry(pool: PgPool) {
    let store = PgStore::new(pool.clone());
    let user = store.create_user(&new_user("alice", "alice@test.com")).await.unwrap();
    store.store_token(user.id, &token("one")).await.unwrap();

    assert!(store.clear_token(user.id).await.unwrap());

    let row = raw_row(&pool, user.id).await;
    assert_eq!(row.token_hash, None);
    assert_eq!(row.token_expires_at, None);
}

// ---------------------------------------------------------------------------
// Constraint mapping
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_login_and_email_name_their_field(pool: PgPool) {
    let store = PgStore::new(pool);
    store.create_user(&new_user("alice", "alice@test.com")).await.unwrap();

    let err = store
        .create_user(&new_user("alice", "other@test.com"))
        .await
        .unwrap_err();
    assert_matches!(&err, DbError::UniqueViolation { constraint } if constraint == "uq_users_login");
    assert_matches!(CoreError::from(err), CoreError::Conflict { field: Some("login"), .. });

    let err = store
        .create_user(&new_user("bob", "alice@test.com"))
        .await
        .unwrap_err();
    assert_matches!(CoreError::from(err), CoreError::Conflict { field: Some("email"), .. });
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_privilege_is_a_foreign_key_violation(pool: PgPool) {
    let store = PgStore::new(pool);
    let mut input = new_user("alice", "alice@test.com");
    input.privilege_id = 999;

    assert_matches!(
        store.create_user(&input).await,
        Err(DbError::ForeignKeyViolation { constraint }) if constraint == "fk_users_privilege"
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_profile_carries_privilege_flags(pool: PgPool) {
    let store = PgStore::new(pool);
    let user = store.create_user(&new_user("alice", "alice@test.com")).await.unwrap();

    let profile = store.user_profile(user.id).await.unwrap().unwrap();
    assert_eq!(profile.privilege_name, "Employee");
    assert_eq!(store.list_user_profiles().await.unwrap().len(), 1);
}
