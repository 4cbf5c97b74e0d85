//! Repository for the `locks` table.

use seclock_core::locks::{plan_create, CreatePlan, LockState};
use seclock_core::types::DbId;
use sqlx::PgPool;

use crate::models::lock::{Lock, LockCreation};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, privilege_id, is_open, deleted, last_modified";

pub struct LockRepo;

impl LockRepo {
    /// Insert a new lock or reactivate a deleted one with the same id.
    ///
    /// The existing row (if any) is locked for the duration of the
    /// transaction so the decision and the write cannot interleave with a
    /// concurrent create, delete or toggle.
    pub async fn create_or_reactivate(
        pool: &PgPool,
        id: DbId,
        privilege_id: DbId,
    ) -> Result<LockCreation, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let existing: Option<(bool, bool)> =
            sqlx::query_as("SELECT is_open, deleted FROM locks WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let existing = existing.map(|(is_open, deleted)| LockState::from_row(is_open, deleted));

        let outcome = match plan_create(existing) {
            CreatePlan::Insert => {
                let query = format!(
                    "INSERT INTO locks (id, privilege_id, is_open, deleted)
                     VALUES ($1, $2, false, false)
                     RETURNING {COLUMNS}"
                );
                let lock = sqlx::query_as::<_, Lock>(&query)
                    .bind(id)
                    .bind(privilege_id)
                    .fetch_one(&mut *tx)
                    .await?;
                LockCreation::Created(lock)
            }
            CreatePlan::Reactivate => {
                let query = format!(
                    "UPDATE locks SET privilege_id = $2, is_open = false, deleted = false,
                                      last_modified = NOW()
                     WHERE id = $1
                     RETURNING {COLUMNS}"
                );
                let lock = sqlx::query_as::<_, Lock>(&query)
                    .bind(id)
                    .bind(privilege_id)
                    .fetch_one(&mut *tx)
                    .await?;
                LockCreation::Reactivated(lock)
            }
            CreatePlan::Reject => LockCreation::AlreadyActive,
        };

        tx.commit().await?;
        Ok(outcome)
    }

    /// Find a live lock by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Lock>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM locks WHERE id = $1 AND deleted = false");
        sqlx::query_as::<_, Lock>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List live locks ordered by id.
    pub async fn list(pool: &PgPool) -> Result<Vec<Lock>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM locks WHERE deleted = false ORDER BY id ASC");
        sqlx::query_as::<_, Lock>(&query).fetch_all(pool).await
    }

    /// Set `is_open` on a live lock. Returns `None` if absent or deleted.
    pub async fn set_open(
        pool: &PgPool,
        id: DbId,
        is_open: bool,
    ) -> Result<Option<Lock>, sqlx::Error> {
        let query = format!(
            "UPDATE locks SET is_open = $2, last_modified = NOW()
             WHERE id = $1 AND deleted = false
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Lock>(&query)
            .bind(id)
            .bind(is_open)
            .fetch_optional(pool)
            .await
    }

    /// Returns `false` if the lock is absent or already deleted.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE locks SET deleted = true, last_modified = NOW()
             WHERE id = $1 AND deleted = false",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
