//! Repository for the `user_privileges` table.

use seclock_core::types::DbId;
use sqlx::PgPool;

use crate::models::privilege::{CreatePrivilege, Privilege, UpdatePrivilege};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description, view_locks, view_users, view_logs, \
                       edit_locks, edit_users, created_at";

pub struct PrivilegeRepo;

impl PrivilegeRepo {
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Privilege>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_privileges WHERE id = $1");
        sqlx::query_as::<_, Privilege>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a privilege by name (case-sensitive).
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Privilege>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_privileges WHERE name = $1");
        sqlx::query_as::<_, Privilege>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Privilege>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_privileges ORDER BY id ASC");
        sqlx::query_as::<_, Privilege>(&query).fetch_all(pool).await
    }

    pub async fn create(pool: &PgPool, input: &CreatePrivilege) -> Result<Privilege, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_privileges
                (name, description, view_locks, view_users, view_logs, edit_locks, edit_users)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Privilege>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.flags.view_locks)
            .bind(input.flags.view_users)
            .bind(input.flags.view_logs)
            .bind(input.flags.edit_locks)
            .bind(input.flags.edit_users)
            .fetch_one(pool)
            .await
    }

    /// Replace description and flags. Returns `None` if the id does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePrivilege,
    ) -> Result<Option<Privilege>, sqlx::Error> {
        let query = format!(
            "UPDATE user_privileges SET
                description = $2, view_locks = $3, view_users = $4, view_logs = $5,
                edit_locks = $6, edit_users = $7
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Privilege>(&query)
            .bind(id)
            .bind(&input.description)
            .bind(input.flags.view_locks)
            .bind(input.flags.view_users)
            .bind(input.flags.view_logs)
            .bind(input.flags.edit_locks)
            .bind(input.flags.edit_users)
            .fetch_optional(pool)
            .await
    }

    /// Returns `true` if a row was deleted. Fails with a foreign key
    /// violation while any user or lock references the privilege.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM user_privileges WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
