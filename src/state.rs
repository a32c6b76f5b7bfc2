//! Shared application state

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

use crate::auth::role_client::{HttpRoleAuthority, RoleAuthority};
use crate::config::Config;
use crate::db::persons::PgPersonStore;
use crate::workflow::registry::RegistrationWorkflow;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<RegistrationWorkflow>,
    pub authority: Arc<dyn RoleAuthority>,
}

impl AppState {
    /// Create a new AppState
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        let store = Arc::new(PgPersonStore::new(pool));
        let authority: Arc<dyn RoleAuthority> = Arc::new(HttpRoleAuthority::new(
            config.auth_service_url.clone(),
            Duration::from_millis(config.auth_timeout_ms),
        )?);

        Ok(Self {
            registry: Arc::new(RegistrationWorkflow::with_timeout(
                store,
                Duration::from_millis(config.store_timeout_ms),
            )),
            authority,
        })
    }
}
