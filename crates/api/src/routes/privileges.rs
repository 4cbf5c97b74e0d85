//! Route definitions for the `/privileges` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::privileges;
use crate::state::AppState;

/// Routes mounted at `/privileges`.
///
/// The static `/rights` and `/user/{id}` segments take precedence over
/// `/{id}`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(privileges::list).post(privileges::create))
        .route("/rights", get(privileges::rights))
        .route("/user/{id}", get(privileges::of_user))
        .route(
            "/{id}",
            get(privileges::get)
                .put(privileges::update)
                .delete(privileges::delete),
        )
}
