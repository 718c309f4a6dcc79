use anyhow::{Context, Result};
use printvault_core::ImportConfig;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

/// Connect a pool sized from configuration.
pub async fn create_pool(config: &ImportConfig) -> Result<PgPool> {
    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set to persist imported assets")?;

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds))
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!(
        max_connections = config.db_max_connections,
        "Database pool ready"
    );

    Ok(pool)
}

/// Apply pending migrations from the workspace `migrations/` directory.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .context("Failed to run database migrations")?;
    Ok(())
}
