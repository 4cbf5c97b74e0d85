//! Capability-based access control extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose token does not
//! carry the capability. Denials are answered with 403 and recorded as an
//! `Unauthorized Access` system event.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use seclock_core::audit::ActionKind;
use seclock_core::guard::{require_capability, require_self_or_capability, Access};
use seclock_core::privileges::Capability;
use seclock_core::types::DbId;

use super::auth::AuthUser;
use super::request_log::RequestMeta;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Require `capability`, recording the denial if it is missing.
pub async fn authorize(
    state: &AppState,
    meta: &RequestMeta,
    user: &AuthUser,
    capability: Capability,
) -> AppResult<()> {
    if let Err(err) = require_capability(&user.claims, capability) {
        record_denial(state, meta, user, capability).await;
        return Err(err.into());
    }
    Ok(())
}

/// Allow the user to act on their own record, otherwise require `capability`.
pub async fn authorize_self_or(
    state: &AppState,
    meta: &RequestMeta,
    user: &AuthUser,
    target: DbId,
    capability: Capability,
) -> AppResult<Access> {
    match require_self_or_capability(&user.claims, target, capability) {
        Ok(access) => Ok(access),
        Err(err) => {
            record_denial(state, meta, user, capability).await;
            Err(err.into())
        }
    }
}

async fn record_denial(state: &AppState, meta: &RequestMeta, user: &AuthUser, capability: Capability) {
    tracing::warn!(
        user_id = user.user_id,
        capability = %capability,
        method = %meta.method,
        path = %meta.path,
        "Access denied"
    );
    state
        .audit
        .system_event(
            meta.event(ActionKind::UnauthorizedAccess)
                .with_actor(Some(user.user_id))
                .with_detail(format!("Missing capability {capability}")),
        )
        .await;
}

macro_rules! capability_extractor {
    ($(#[$doc:meta])* $name:ident => $capability:expr) => {
        $(#[$doc])*
        pub struct $name(pub AuthUser);

        impl FromRequestParts<AppState> for $name {
            type Rejection = AppError;

            async fn from_request_parts(
                parts: &mut Parts,
                state: &AppState,
            ) -> Result<Self, Self::Rejection> {
                let user = AuthUser::from_request_parts(parts, state).await?;
                let meta = RequestMeta::from_parts(parts);
                authorize(state, &meta, &user, $capability).await?;
                Ok($name(user))
            }
        }
    };
}

capability_extractor!(
    /// Requires `view_locks`.
    RequireViewLocks => Capability::ViewLocks
);
capability_extractor!(
    /// Requires `edit_locks`.
    RequireEditLocks => Capability::EditLocks
);
capability_extractor!(
    /// Requires `view_users`.
    RequireViewUsers => Capability::ViewUsers
);
capability_extractor!(
    /// Requires `edit_users`.
    RequireEditUsers => Capability::EditUsers
);
capability_extractor!(
    /// Requires `view_logs`.
    RequireViewLogs => Capability::ViewLogs
);

