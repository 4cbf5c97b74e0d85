//! Handlers for the `/locks` resource.
//!
//! Every mutation is written first and audited second: a user action on the
//! lock's stream plus, for create and toggle, a system event.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use seclock_core::audit::ActionKind;
use seclock_core::error::CoreError;
use seclock_core::locks::validate_lock_id;
use seclock_core::pagination::Page;
use seclock_core::types::DbId;
use seclock_db::models::lock::{Lock, LockCreation};
use seclock_db::models::log::UserActionEntry;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::rbac::{RequireEditLocks, RequireViewLocks, RequireViewLogs};
use crate::middleware::request_log::RequestMeta;
use crate::query::PageParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /locks`.
#[derive(Debug, Deserialize)]
pub struct CreateLockRequest {
    pub id: DbId,
    /// Defaults to the caller's own privilege.
    pub privilege_id: Option<DbId>,
}

/// Request body for `PUT /locks/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateLockRequest {
    pub is_open: bool,
}

/// GET /api/locks
pub async fn list(
    State(state): State<AppState>,
    RequireViewLocks(_): RequireViewLocks,
) -> AppResult<Json<DataResponse<Vec<Lock>>>> {
    let locks = state.store.list_locks().await?;
    Ok(Json(DataResponse { data: locks }))
}

/// GET /api/locks/{id}
pub async fn get(
    State(state): State<AppState>,
    RequireViewLocks(_): RequireViewLocks,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<Json<DataResponse<Lock>>> {
    let lock = state
        .store
        .lock_by_id(id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Lock", id)))?;
    Ok(Json(DataResponse { data: lock }))
}

/// POST /api/locks
///
/// Creates the lock, or brings a deleted one with the same id back closed.
/// Only an active lock with the id is a conflict.
pub async fn create(
    State(state): State<AppState>,
    meta: RequestMeta,
    RequireEditLocks(user): RequireEditLocks,
    ApiJson(input): ApiJson<CreateLockRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Lock>>)> {
    validate_lock_id(input.id)?;

    let privilege_id = input.privilege_id.unwrap_or(user.claims.privilege_id);
    if state.store.privilege_by_id(privilege_id).await?.is_none() {
        return Err(AppError::Core(CoreError::not_found("Privilege", privilege_id)));
    }

    let (lock, detail) = match state.store.create_lock(input.id, privilege_id).await? {
        LockCreation::Created(lock) => (lock, format!("Lock {} created", input.id)),
        LockCreation::Reactivated(lock) => (lock, format!("Lock {} reactivated", input.id)),
        LockCreation::AlreadyActive => {
            return Err(AppError::Core(CoreError::conflict_on(
                "id",
                format!("Lock {} already exists", input.id),
            )));
        }
    };

    tracing::info!(lock_id = lock.id, privilege_id, user_id = user.user_id, "{detail}");
    state
        .audit
        .user_action(Some(user.user_id), Some(lock.id), ActionKind::Create)
        .await;
    state
        .audit
        .system_event(
            meta.event(ActionKind::LockCreation)
                .with_actor(Some(user.user_id))
                .with_detail(detail),
        )
        .await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: lock })))
}

/// PUT /api/locks/{id}
///
/// Sets the open state. Setting the current value again is allowed and still
/// bumps `last_modified`.
pub async fn update(
    State(state): State<AppState>,
    meta: RequestMeta,
    RequireEditLocks(user): RequireEditLocks,
    ApiPath(id): ApiPath<DbId>,
    ApiJson(input): ApiJson<UpdateLockRequest>,
) -> AppResult<Json<DataResponse<Lock>>> {
    let lock = state
        .store
        .set_lock_open(id, input.is_open)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Lock", id)))?;

    let verb = if lock.is_open { "opened" } else { "closed" };
    state
        .audit
        .user_action(Some(user.user_id), Some(id), ActionKind::Update)
        .await;
    state
        .audit
        .system_event(
            meta.event(ActionKind::LockStatusChange)
                .with_actor(Some(user.user_id))
                .with_detail(format!("Lock {id} {verb}")),
        )
        .await;

    Ok(Json(DataResponse { data: lock }))
}

/// DELETE /api/locks/{id}
pub async fn delete(
    State(state): State<AppState>,
    RequireEditLocks(user): RequireEditLocks,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<StatusCode> {
    if !state.store.soft_delete_lock(id).await? {
        return Err(AppError::Core(CoreError::not_found("Lock", id)));
    }

    tracing::info!(lock_id = id, user_id = user.user_id, "Lock deleted");
    state
        .audit
        .user_action(Some(user.user_id), Some(id), ActionKind::Delete)
        .await;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/locks/{id}/logs
///
/// The lock's user-action entries, newest first. History outlives deletion.
pub async fn history(
    State(state): State<AppState>,
    RequireViewLogs(_): RequireViewLogs,
    ApiPath(id): ApiPath<DbId>,
    ApiQuery(params): ApiQuery<PageParams>,
) -> AppResult<Json<Page<UserActionEntry>>> {
    let page = state.store.lock_history(id, params.page_request()).await?;
    Ok(Json(page))
}
