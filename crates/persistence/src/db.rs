//! PostgreSQL pool and schema setup for the SkillHive store.

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use std::str::FromStr;
use std::time::Duration;

/// Reported to PostgreSQL so SkillHive sessions show up in `pg_stat_activity`.
pub const APPLICATION_NAME: &str = "skillhive";

/// Pool sizing and timeouts for the accounts, demands and resources store.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

impl DatabaseConfig {
    /// Parses the URL and tags connections with [`APPLICATION_NAME`].
    pub fn connect_options(&self) -> Result<PgConnectOptions, sqlx::Error> {
        Ok(PgConnectOptions::from_str(&self.url)?.application_name(APPLICATION_NAME))
    }
}

/// Opens the pool. Upload batches hold one connection for their whole
/// transaction, so `max_connections` bounds concurrent uploads too.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .connect_with(config.connect_options()?)
        .await?;
    tracing::info!(
        max_connections = config.max_connections,
        "Database pool ready"
    );
    Ok(pool)
}

/// Applies the embedded `users`, `demands` and `resources` migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("src/migrations").run(pool).await
}
