//! Handlers for the `/users` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use seclock_core::audit::ActionKind;
use seclock_core::error::CoreError;
use seclock_core::privileges::Capability;
use seclock_core::types::DbId;
use seclock_db::models::user::UserProfile;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{authorize_self_or, RequireEditUsers, RequireViewUsers};
use crate::middleware::request_log::RequestMeta;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PUT /users/{id}/privilege`.
#[derive(Debug, Deserialize)]
pub struct AssignPrivilegeRequest {
    pub privilege_id: DbId,
}

/// GET /api/users
pub async fn list(
    State(state): State<AppState>,
    RequireViewUsers(_): RequireViewUsers,
) -> AppResult<Json<DataResponse<Vec<UserProfile>>>> {
    let users = state.store.list_user_profiles().await?;
    Ok(Json(DataResponse { data: users }))
}

/// GET /api/users/{id}
///
/// Users may always read their own record; anyone else needs `view_users`.
pub async fn get(
    State(state): State<AppState>,
    meta: RequestMeta,
    auth_user: AuthUser,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<Json<DataResponse<UserProfile>>> {
    authorize_self_or(&state, &meta, &auth_user, id, Capability::ViewUsers).await?;
    let user = state
        .store
        .user_profile(id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("User", id)))?;
    Ok(Json(DataResponse { data: user }))
}

/// DELETE /api/users/{id}
///
/// Irreversibly scrubs the account. A second delete is a 404.
pub async fn delete(
    State(state): State<AppState>,
    meta: RequestMeta,
    RequireEditUsers(admin): RequireEditUsers,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<StatusCode> {
    if !state.store.soft_delete_user(id).await? {
        return Err(AppError::Core(CoreError::not_found("User", id)));
    }

    tracing::info!(user_id = id, deleted_by = admin.user_id, "User deleted");
    state
        .audit
        .system_event(
            meta.event(ActionKind::UserDeletion)
                .with_actor(Some(admin.user_id))
                .with_detail(format!("User {id} deleted")),
        )
        .await;

    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/users/{id}/privilege
///
/// Takes effect in the user's token at the next login or refresh.
pub async fn assign_privilege(
    State(state): State<AppState>,
    meta: RequestMeta,
    RequireEditUsers(admin): RequireEditUsers,
    ApiPath(id): ApiPath<DbId>,
    ApiJson(input): ApiJson<AssignPrivilegeRequest>,
) -> AppResult<Json<DataResponse<UserProfile>>> {
    let privilege = state
        .store
        .privilege_by_id(input.privilege_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Privilege", input.privilege_id)))?;

    if !state.store.assign_privilege(id, privilege.id).await? {
        return Err(AppError::Core(CoreError::not_found("User", id)));
    }
    let user = state
        .store
        .user_profile(id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("User", id)))?;

    state
        .audit
        .system_event(
            meta.event(ActionKind::PrivilegeChange)
                .with_actor(Some(admin.user_id))
                .with_detail(format!("User {id} assigned privilege {}", privilege.name)),
        )
        .await;

    Ok(Json(DataResponse { data: user }))
}
