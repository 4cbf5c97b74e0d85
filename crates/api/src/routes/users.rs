//! Route definitions for the `/users` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET    /                  -> list
/// GET    /{id}              -> get
/// DELETE /{id}              -> delete
/// PUT    /{id}/privilege    -> assign_privilege
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list))
        .route("/{id}", get(users::get).delete(users::delete))
        .route("/{id}/privilege", put(users::assign_privilege))
}
