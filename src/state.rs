use std::sync::Arc;

use sqlx::PgPool;

use crate::access::store::PgAccessStore;
use crate::config::cors::CorsConfig;
use crate::config::database::init_db_pool;
use crate::config::jwt::JwtConfig;
use crate::notify::{SharedSink, TracingSink};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub access: PgAccessStore,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub notifier: SharedSink,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("db", &self.db)
            .field("jwt_config", &self.jwt_config)
            .field("cors_config", &self.cors_config)
            .finish_non_exhaustive()
    }
}

pub async fn init_app_state() -> AppState {
    let db = init_db_pool().await;
    AppState {
        access: PgAccessStore::new(db.clone()),
        db,
        jwt_config: JwtConfig::from_env(),
        cors_config: CorsConfig::from_env(),
        notifier: Arc::new(TracingSink),
    }
}
