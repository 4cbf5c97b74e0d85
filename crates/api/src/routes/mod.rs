pub mod auth;
pub mod health;
pub mod locks;
pub mod logs;
pub mod privileges;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                  register (open, or edit_users when privileged)
/// /auth/login                     login (public)
/// /auth/refresh                   refresh (public, current token required)
/// /auth/verify                    bearer check
/// /auth/validate                  token check without failing
/// /auth/logout                    logout (requires auth)
///
/// /users                          list (view_users)
/// /users/{id}                     get (self or view_users), delete (edit_users)
/// /users/{id}/privilege           reassign (edit_users)
///
/// /privileges                     list, create (edit_users)
/// /privileges/rights              name -> flags (requires auth)
/// /privileges/user/{id}           a user's privilege (self or view_users)
/// /privileges/{id}                get, update, delete (edit_users)
///
/// /locks                          list (view_locks), create (edit_locks)
/// /locks/{id}                     get (view_locks), update, delete (edit_locks)
/// /locks/{id}/logs                lock history (view_logs)
///
/// /logs                           user-action stream (view_logs)
/// /system-logs                    system stream (view_logs), append (requires auth)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/privileges", privileges::router())
        .nest("/locks", locks::router())
        .merge(logs::router())
}
