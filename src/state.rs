use std::sync::Arc;

use crate::{
    config::Config,
    db::{Database, error::DatabaseError},
    services::{LoginAttemptLimiter, LruResponseCache, RateLimiter, ResponseCache},
};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Config,
    pub cache: Arc<dyn ResponseCache>,
    pub login_limiter: Arc<dyn RateLimiter>,
}

pub type SharedAppState = Arc<AppState>;

impl AppState {
    pub async fn init(config: Config) -> Result<Self, DatabaseError> {
        let db = Database::open(&config.application.data_dir).await?;

        let cache = Arc::new(LruResponseCache::new(
            config.cache.ttl(),
            config.cache.max_items,
        ));
        let login_limiter = Arc::new(LoginAttemptLimiter::new(
            config.validation.max_login_attempts,
            config.validation.login_timeout(),
        ));

        if !config.application.require_auth {
            tracing::warn!("Authentication is not enforced on protected routes");
        }

        Ok(AppState {
            db,
            config,
            cache,
            login_limiter,
        })
    }
}
