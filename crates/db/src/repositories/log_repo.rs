//! Repositories for the append-only `log_entries` and `system_log` tables.
//!
//! Both streams are read newest first; `id` breaks ties between rows written
//! in the same instant.

use seclock_core::pagination::PageRequest;
use seclock_core::types::DbId;
use sqlx::PgPool;

use crate::models::log::{NewSystemEvent, NewUserAction, SystemEventRow, UserActionRow};

const USER_ACTION_SELECT: &str = "SELECT l.id, l.user_id, u.login AS user_login, l.lock_id, \
                                         l.action, l.created_at \
                                  FROM log_entries l \
                                  LEFT JOIN users u ON u.id = l.user_id";

const SYSTEM_EVENT_SELECT: &str = "SELECT s.id, s.action_kind, s.ip_address, s.user_agent, \
                                           s.user_id, u.login AS user_login, s.endpoint, \
                                           s.method, s.detail, s.created_at \
                                    FROM system_log s \
                                    LEFT JOIN users u ON u.id = s.user_id";

pub struct UserLogRepo;

impl UserLogRepo {
    pub async fn insert(pool: &PgPool, entry: &NewUserAction) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO log_entries (user_id, lock_id, action) VALUES ($1, $2, $3)")
            .bind(entry.user_id)
            .bind(entry.lock_id)
            .bind(entry.action.id())
            .execute(pool)
            .await?;
        Ok(())
    }

    /// One page of entries whose action is in `kinds`, plus the total count.
    pub async fn query(
        pool: &PgPool,
        kinds: &[i16],
        page: PageRequest,
    ) -> Result<(Vec<UserActionRow>, i64), sqlx::Error> {
        let query = format!(
            "{USER_ACTION_SELECT} WHERE l.action = ANY($1)
             ORDER BY l.created_at DESC, l.id DESC
             LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, UserActionRow>(&query)
            .bind(kinds)
            .bind(page.size)
            .bind(page.offset())
            .fetch_all(pool)
            .await?;
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM log_entries WHERE action = ANY($1)")
            .bind(kinds)
            .fetch_one(pool)
            .await?;
        Ok((rows, total))
    }

    /// One page of entries for a single lock, plus the total count.
    pub async fn for_lock(
        pool: &PgPool,
        lock_id: DbId,
        page: PageRequest,
    ) -> Result<(Vec<UserActionRow>, i64), sqlx::Error> {
        let query = format!(
            "{USER_ACTION_SELECT} WHERE l.lock_id = $1
             ORDER BY l.created_at DESC, l.id DESC
             LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, UserActionRow>(&query)
            .bind(lock_id)
            .bind(page.size)
            .bind(page.offset())
            .fetch_all(pool)
            .await?;
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM log_entries WHERE lock_id = $1")
            .bind(lock_id)
            .fetch_one(pool)
            .await?;
        Ok((rows, total))
    }
}

pub struct SystemLogRepo;

impl SystemLogRepo {
    pub async fn insert(pool: &PgPool, event: &NewSystemEvent) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO system_log
                (action_kind, ip_address, user_agent, user_id, endpoint, method, detail)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(event.action.id())
        .bind(&event.ip_address)
        .bind(&event.user_agent)
        .bind(event.user_id)
        .bind(&event.endpoint)
        .bind(&event.method)
        .bind(&event.detail)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn query(
        pool: &PgPool,
        kinds: &[i16],
        page: PageRequest,
    ) -> Result<(Vec<SystemEventRow>, i64), sqlx::Error> {
        let query = format!(
            "{SYSTEM_EVENT_SELECT} WHERE s.action_kind = ANY($1)
             ORDER BY s.created_at DESC, s.id DESC
             LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, SystemEventRow>(&query)
            .bind(kinds)
            .bind(page.size)
            .bind(page.offset())
            .fetch_all(pool)
            .await?;
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM system_log WHERE action_kind = ANY($1)")
                .bind(kinds)
                .fetch_one(pool)
                .await?;
        Ok((rows, total))
    }
}
