//! Handlers for the `/privileges` resource.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use seclock_core::audit::ActionKind;
use seclock_core::error::CoreError;
use seclock_core::privileges::{Capability, PrivilegeFlags};
use seclock_core::types::DbId;
use seclock_db::models::privilege::{CreatePrivilege, Privilege, UpdatePrivilege};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{authorize_self_or, RequireEditUsers};
use crate::middleware::request_log::RequestMeta;
use crate::response::DataResponse;
use crate::state::AppState;

/// The privilege currently assigned to a user.
#[derive(Debug, Serialize)]
pub struct UserPrivilege {
    pub user_id: DbId,
    pub privilege_id: DbId,
    pub privilege_name: String,
    #[serde(flatten)]
    pub flags: PrivilegeFlags,
}

/// GET /api/privileges
pub async fn list(
    State(state): State<AppState>,
    RequireEditUsers(_): RequireEditUsers,
) -> AppResult<Json<DataResponse<Vec<Privilege>>>> {
    let privileges = state.store.list_privileges().await?;
    Ok(Json(DataResponse { data: privileges }))
}

/// GET /api/privileges/{id}
pub async fn get(
    State(state): State<AppState>,
    RequireEditUsers(_): RequireEditUsers,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<Json<DataResponse<Privilege>>> {
    let privilege = find(&state, id).await?;
    Ok(Json(DataResponse { data: privilege }))
}

/// POST /api/privileges
pub async fn create(
    State(state): State<AppState>,
    meta: RequestMeta,
    RequireEditUsers(admin): RequireEditUsers,
    ApiJson(mut input): ApiJson<CreatePrivilege>,
) -> AppResult<(StatusCode, Json<DataResponse<Privilege>>)> {
    input.name = input.name.trim().to_string();
    if input.name.is_empty() {
        return Err(AppError::Core(CoreError::Validation("name is required".into())));
    }

    let privilege = state.store.create_privilege(&input).await?;
    state.invalidate_privileges().await;
    record_change(&state, &meta, admin.user_id, format!("Privilege {} created", privilege.name)).await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: privilege })))
}

/// PUT /api/privileges/{id}
///
/// Replaces the description and all five flags. The name cannot change.
pub async fn update(
    State(state): State<AppState>,
    meta: RequestMeta,
    RequireEditUsers(admin): RequireEditUsers,
    ApiPath(id): ApiPath<DbId>,
    ApiJson(input): ApiJson<UpdatePrivilege>,
) -> AppResult<Json<DataResponse<Privilege>>> {
    let privilege = state
        .store
        .update_privilege(id, &input)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Privilege", id)))?;
    state.invalidate_privileges().await;
    record_change(&state, &meta, admin.user_id, format!("Privilege {} updated", privilege.name)).await;

    Ok(Json(DataResponse { data: privilege }))
}

/// DELETE /api/privileges/{id}
///
/// Fails with 409 while any user or lock still references the privilege.
pub async fn delete(
    State(state): State<AppState>,
    meta: RequestMeta,
    RequireEditUsers(admin): RequireEditUsers,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<StatusCode> {
    if !state.store.delete_privilege(id).await? {
        return Err(AppError::Core(CoreError::not_found("Privilege", id)));
    }
    state.invalidate_privileges().await;
    record_change(&state, &meta, admin.user_id, format!("Privilege {id} deleted")).await;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/privileges/rights
///
/// Privilege name to flags, served from the cache.
pub async fn rights(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> AppResult<Json<DataResponse<BTreeMap<String, PrivilegeFlags>>>> {
    let rights = state.privilege_rights().await?;
    Ok(Json(DataResponse { data: rights }))
}

/// GET /api/privileges/user/{id}
pub async fn of_user(
    State(state): State<AppState>,
    meta: RequestMeta,
    auth_user: AuthUser,
    ApiPath(user_id): ApiPath<DbId>,
) -> AppResult<Json<DataResponse<UserPrivilege>>> {
    authorize_self_or(&state, &meta, &auth_user, user_id, Capability::ViewUsers).await?;
    let profile = state
        .store
        .user_profile(user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("User", user_id)))?;

    Ok(Json(DataResponse {
        data: UserPrivilege {
            user_id,
            privilege_id: profile.privilege_id,
            flags: profile.flags(),
            privilege_name: profile.privilege_name,
        },
    }))
}

async fn find(state: &AppState, id: DbId) -> AppResult<Privilege> {
    state
        .store
        .privilege_by_id(id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Privilege", id)))
}

async fn record_change(state: &AppState, meta: &RequestMeta, actor: DbId, detail: String) {
    state
        .audit
        .system_event(
            meta.event(ActionKind::PrivilegeChange)
                .with_actor(Some(actor))
                .with_detail(detail),
        )
        .await;
}
