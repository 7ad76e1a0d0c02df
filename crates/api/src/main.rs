use std::sync::Arc;

use anyhow::Result;
use persistence::repositories::{AccountRepository, DemandRepository, ResourceRepository};
use skillhive_api::{
    app::{self, AppState, Stores},
    config, middleware,
    services::{bootstrap_super_admin, EmailOtpNotifier, EmailService},
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Load configuration
    let config = config::Config::load()?;

    // Initialize logging
    middleware::logging::init_logging(&config.logging);
    middleware::init_metrics()?;

    info!("Starting SkillHive API v{}", env!("CARGO_PKG_VERSION"));

    // Create database pool
    let pool = persistence::db::create_pool(&config.database.pool_config()).await?;

    // Run migrations
    info!("Running database migrations...");
    persistence::db::run_migrations(&pool).await?;
    info!("Migrations completed");

    let stores = Stores {
        accounts: Arc::new(AccountRepository::new(pool.clone())),
        demands: Arc::new(DemandRepository::new(pool.clone())),
        resources: Arc::new(ResourceRepository::new(pool.clone())),
    };
    let notifier = Arc::new(EmailOtpNotifier::new(EmailService::new(
        config.email.clone(),
    )));

    let addr = config.socket_addr()?;
    let state = AppState::new(config, Some(pool), stores, notifier)?;

    bootstrap_super_admin(&state.account_admin, &state.config.auth).await?;

    // Build application
    let app = app::create_app(state);

    // Start server
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
