//! Route definitions for the `/locks` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::locks;
use crate::state::AppState;

/// Routes mounted at `/locks`.
///
/// ```text
/// GET    /             -> list
/// POST   /             -> create
/// GET    /{id}         -> get
/// PUT    /{id}         -> update
/// DELETE /{id}         -> delete
/// GET    /{id}/logs    -> history
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(locks::list).post(locks::create))
        .route(
            "/{id}",
            get(locks::get).put(locks::update).delete(locks::delete),
        )
        .route("/{id}/logs", get(locks::history))
}
