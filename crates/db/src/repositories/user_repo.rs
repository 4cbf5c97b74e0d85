//! Repository for the `users` table.

use seclock_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::user::{CreateUser, User, UserProfile};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, login, password_hash, email, name, privilege_id, \
                       token_hash, token_expires_at, deleted, created_at";

/// Live users joined with their privilege flags.
const PROFILE_SELECT: &str = "SELECT u.id, u.login, u.email, u.name, u.privilege_id, \
                                     p.name AS privilege_name, p.view_locks, p.view_users, \
                                     p.view_logs, p.edit_locks, p.edit_users \
                              FROM users u \
                              JOIN user_privileges p ON p.id = u.privilege_id \
                              WHERE u.deleted = false";

pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (login, password_hash, email, name, privilege_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.login)
            .bind(&input.password_hash)
            .bind(&input.email)
            .bind(&input.name)
            .bind(input.privilege_id)
            .fetch_one(pool)
            .await
    }

    /// Find a live user by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1 AND deleted = false");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a live user by login (case-sensitive).
    pub async fn find_by_login(pool: &PgPool, login: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE login = $1 AND deleted = false");
        sqlx::query_as::<_, User>(&query)
            .bind(login)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_profile(pool: &PgPool, id: DbId) -> Result<Option<UserProfile>, sqlx::Error> {
        let query = format!("{PROFILE_SELECT} AND u.id = $1");
        sqlx::query_as::<_, UserProfile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_profiles(pool: &PgPool) -> Result<Vec<UserProfile>, sqlx::Error> {
        let query = format!("{PROFILE_SELECT} ORDER BY u.id ASC");
        sqlx::query_as::<_, UserProfile>(&query).fetch_all(pool).await
    }

    /// Count live users.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE deleted = false")
            .fetch_one(pool)
            .await
    }

    /// Overwrite the stored token. Last write wins.
    pub async fn set_token(
        pool: &PgPool,
        id: DbId,
        token_hash: &str,
        expires_at: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET token_hash = $2, token_expires_at = $3
             WHERE id = $1 AND deleted = false",
        )
        .bind(id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Replace the stored token only if it still equals `expected_hash`.
    ///
    /// The comparison and the write happen in one statement, so of two
    /// concurrent swaps from the same token at most one succeeds.
    pub async fn swap_token(
        pool: &PgPool,
        id: DbId,
        expected_hash: &str,
        token_hash: &str,
        expires_at: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET token_hash = $3, token_expires_at = $4
             WHERE id = $1 AND token_hash = $2 AND deleted = false",
        )
        .bind(id)
        .bind(expected_hash)
        .bind(token_hash)
        .bind(expires_at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn clear_token(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET token_hash = NULL, token_expires_at = NULL
             WHERE id = $1 AND deleted = false",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn set_privilege(
        pool: &PgPool,
        id: DbId,
        privilege_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET privilege_id = $2 WHERE id = $1 AND deleted = false",
        )
        .bind(id)
        .bind(privilege_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Scrub identifying columns and mark the user deleted.
    ///
    /// Returns `false` if the user is absent or already deleted.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET
                login = NULL, password_hash = NULL, email = NULL, name = NULL,
                token_hash = NULL, token_expires_at = NULL, deleted = true
             WHERE id = $1 AND deleted = false",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
