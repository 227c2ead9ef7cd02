use axum::Router;
use sqlx::PgPool;

use crate::{
    config::{AppConfig, SecurityConfig},
    database,
    error::Result,
    routes,
};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Hashing parameters handed to `account_service` by request handlers.
    pub security: SecurityConfig,
}

impl AppState {
    pub fn new(db: PgPool, config: &AppConfig) -> Self {
        Self {
            db,
            security: config.security.clone(),
        }
    }

    pub fn bcrypt_cost(&self) -> u32 {
        self.security.bcrypt_cost
    }
}

pub async fn build(config: &AppConfig) -> Result<Router> {
    let pool = database::create_pool(&config.database).await?;
    let state = AppState::new(pool, config);

    tracing::info!("Password hashing cost set to {}", state.bcrypt_cost());

    Ok(routes::create_router().with_state(state))
}
