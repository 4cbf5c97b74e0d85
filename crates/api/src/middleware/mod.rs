//! Request extractors and middleware.
//!
//! - [`auth::AuthUser`] -- bearer token checked against signature, store and expiry.
//! - [`rbac`] -- capability extractors (`RequireViewLocks`, `RequireEditUsers`, ...).
//! - [`request_log`] -- request metadata and the per-request `API Call` event.

pub mod auth;
pub mod rbac;
pub mod request_log;
