use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use seclock_core::privilege_cache::PrivilegeCache;
use seclock_core::privileges::PrivilegeFlags;
use seclock_db::Store;
use tokio::sync::Mutex;

use crate::audit::AuditLogger;
use crate::auth::tokens::TokenService;
use crate::config::ServerConfig;
use crate::error::AppResult;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<ServerConfig>,
    pub audit: AuditLogger,
    pub privilege_cache: Arc<Mutex<PrivilegeCache>>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: ServerConfig) -> Self {
        let ttl = chrono::Duration::seconds(config.privilege_cache_ttl_secs);
        Self {
            audit: AuditLogger::new(Arc::clone(&store)),
            store,
            config: Arc::new(config),
            privilege_cache: Arc::new(Mutex::new(PrivilegeCache::new(ttl))),
        }
    }

    pub fn tokens(&self) -> TokenService<'_> {
        TokenService::new(self.store.as_ref(), &self.config.jwt)
    }

    /// Privilege name -> flags, reloaded from the store when stale.
    pub async fn privilege_rights(&self) -> AppResult<BTreeMap<String, PrivilegeFlags>> {
        let mut cache = self.privilege_cache.lock().await;
        let now = Utc::now();
        if cache.is_stale(now) {
            let privileges = self.store.list_privileges().await?;
            cache.replace(privileges.iter().map(|p| (p.name.clone(), p.flags())), now);
            tracing::debug!(count = cache.entries().len(), "Privilege cache reloaded");
        }
        Ok(cache.entries().clone())
    }

    /// Force the next [`privilege_rights`](Self::privilege_rights) call to reload.
    pub async fn invalidate_privileges(&self) {
        self.privilege_cache.lock().await.invalidate();
    }
}
