use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::info;

use crate::config::Config;
use crate::types::AppResult;

pub use documents::*;
pub use pool::*;

pub mod documents;
pub mod pool;

pub async fn create_pool(config: &Config) -> AppResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&config.database_url())
        .await?;

    // Test connection
    health_check(&pool).await?;

    info!(
        host = %config.database.host,
        max_connections = config.database.max_connections,
        "Database pool ready"
    );
    Ok(pool)
}

/// Create the `vector` extension, the `documents` table and its ANN index.
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations completed");
    Ok(())
}
