//! Shared response envelope types for API handlers.
//!
//! Resource endpoints respond with a `{ "data": ... }` envelope. Auth
//! endpoints return their payload unwrapped.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
