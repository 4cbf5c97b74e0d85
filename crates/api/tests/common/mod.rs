#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use seclock_api::auth::credentials::create_user;
use seclock_api::auth::jwt::JwtConfig;
use seclock_api::config::{RegistrationMode, ServerConfig, StoreBackend};
use seclock_api::router::build_app_router;
use seclock_api::state::AppState;
use seclock_core::types::DbId;
use seclock_core::users::Registration;
use seclock_db::store::UserStore;
use seclock_db::MemoryStore;
use tower::ServiceExt;

/// Seeded privilege ids (see the in-memory store and the seed migration).
pub const ADMIN: DbId = 1;
pub const EMPLOYEE: DbId = 2;
pub const VIEWER: DbId = 3;

pub const PASSWORD: &str = "test-password";

/// Build a test `ServerConfig` with safe defaults and the in-memory store.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        store: StoreBackend::Memory,
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            token_expiry_mins: 60,
        },
        password_min_length: 4,
        registration_mode: RegistrationMode::Open,
        privilege_cache_ttl_secs: 300,
        bootstrap_admin: None,
    }
}

/// The full application router over a fresh in-memory store.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: ServerConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), config);
        Self {
            router: build_app_router(state.clone()),
            state,
            store,
        }
    }

    /// Create a user holding `privilege_id` and issue their token.
    pub async fn user(&self, login: &str, privilege_id: DbId) -> (DbId, String) {
        let user = create_user(
            self.store.as_ref(),
            Registration {
                login: login.to_string(),
                password: PASSWORD.to_string(),
                email: format!("{login}@test.com"),
                name: None,
                privilege_id,
            },
            4,
        )
        .await
        .expect("user creation should succeed");
        let profile = self
            .store
            .user_profile(user.id)
            .await
            .unwrap()
            .expect("profile for new user");
        let issued = self.state.tokens().issue(&profile).await.unwrap();
        (user.id, issued.token)
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(serde_json::to_vec(&json).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response<Body> {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(
        &self,
        uri: &str,
        token: Option<&str>,
        body: serde_json::Value,
    ) -> Response<Body> {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: serde_json::Value) -> Response<Body> {
        self.send(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> Response<Body> {
        self.send(Method::DELETE, uri, token, None).await
    }

    /// Let background audit appends (the per-request `API Call`) finish.
    pub async fn settle(&self) {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    /// System events of one kind, newest first, read straight from the store.
    pub async fn system_events(&self, kind: i16) -> Vec<seclock_db::models::log::SystemEventEntry> {
        use seclock_db::store::AuditStore;
        self.store
            .query_system_events(&[kind], seclock_core::pagination::PageRequest::new(None, Some(1023)))
            .await
            .unwrap()
            .entries
    }
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
