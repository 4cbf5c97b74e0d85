//! Route definitions for the audit streams.

use axum::routing::get;
use axum::Router;

use crate::handlers::logs;
use crate::state::AppState;

/// Routes merged at the `/api` root.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/logs", get(logs::user_actions))
        .route(
            "/system-logs",
            get(logs::system_events).post(logs::record_event),
        )
}
