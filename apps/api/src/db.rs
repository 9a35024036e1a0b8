use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use tracing::info;

use crate::config::DatabaseConfig;

/// Creates a PostgreSQL connection pool without connecting.
/// Connections open on first use, so startup never waits on the datastore.
pub fn create_pool(config: &DatabaseConfig) -> Result<PgPool> {
    let options = PgConnectOptions::from_str(&config.url)
        .context("DATABASE_URL is not a valid PostgreSQL URL")?
        .password(&config.service_key);

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect_lazy_with(options);

    info!("PostgreSQL pool configured (lazy connect)");
    Ok(pool)
}
