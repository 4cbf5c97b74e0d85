//! Request metadata and per-request `API Call` recording.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts, OriginalUri, Request, State};
use axum::http::request::Parts;
use axum::http::{HeaderMap, Method};
use axum::middleware::Next;
use axum::response::Response;
use seclock_core::audit::ActionKind;
use seclock_db::models::log::NewSystemEvent;

use super::auth::bearer_token;
use crate::auth::jwt::decode_token_ignoring_expiry;
use crate::state::AppState;

/// Who called what, captured for system events.
#[derive(Debug, Clone)]
pub struct RequestMeta {
    pub method: Method,
    pub path: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestMeta {
    pub fn from_parts(parts: &Parts) -> Self {
        let connect_ip = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string());

        // Nested routers strip their prefix from `uri`; record the full path.
        let path = parts
            .extensions
            .get::<OriginalUri>()
            .map_or_else(|| parts.uri.path(), |OriginalUri(uri)| uri.path())
            .to_string();

        Self {
            method: parts.method.clone(),
            path,
            ip_address: forwarded_for(&parts.headers).or(connect_ip),
            user_agent: parts
                .headers
                .get(axum::http::header::USER_AGENT)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        }
    }

    /// A system event of `kind` stamped with this request's details.
    pub fn event(&self, kind: ActionKind) -> NewSystemEvent {
        NewSystemEvent::new(kind).with_request(
            self.method.as_str(),
            self.path.clone(),
            self.ip_address.clone(),
            self.user_agent.clone(),
        )
    }
}

impl<S: Send + Sync> FromRequestParts<S> for RequestMeta {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}

/// First address in `X-Forwarded-For`, when a proxy set one.
fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
}

/// Whether a request is recorded as an `API Call`.
///
/// Reading the system log is excluded so that paging through it does not
/// grow it.
fn is_recorded(method: &Method, path: &str) -> bool {
    path.starts_with("/api/") && !(method == Method::GET && path.ends_with("/system-logs"))
}

/// Middleware recording an `API Call` system event for each API request.
///
/// The actor is taken from a signature-valid bearer token when one is sent;
/// an expired token still identifies its caller here. The append runs in
/// the background so the handler never waits on the audit store.
pub async fn record_api_call(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let meta = RequestMeta::from_parts(&parts);

    if is_recorded(&meta.method, &meta.path) {
        let actor = bearer_token(&parts.headers)
            .ok()
            .and_then(|token| decode_token_ignoring_expiry(token, &state.config.jwt).ok())
            .map(|claims| claims.sub);
        state
            .audit
            .spawn_system_event(meta.event(ActionKind::ApiCall).with_actor(actor));
    }

    next.run(Request::from_parts(parts, body)).await
}
