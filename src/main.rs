//! person-registry — person registration service
//!
//! Long-running service that:
//! - Registers and manages person records (create/read/list/delete/replace)
//! - Enforces email/document uniqueness with a deterministic conflict outcome
//! - Gates every request behind an external role authority (fail-closed)

mod api;
mod auth;
mod config;
mod db;
mod domain;
mod error;
mod state;
mod workflow;

use config::Config;
use state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "person_registry=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting person-registry (env: {})", config.environment);

    let state = AppState::new(&config).await?;
    let app = api::create_router(state);

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("person-registry listening on {addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
