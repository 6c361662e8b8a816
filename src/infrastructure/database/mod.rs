//! Database Module
//!
//! PostgreSQL connection pool, embedded migrations and small query helpers
//! shared by the repositories.

use std::future::Future;
use std::time::{Duration, Instant};

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::DatabaseSettings;
use crate::infrastructure::metrics;
use crate::shared::error::AppError;

/// Create a PostgreSQL connection pool
pub async fn create_pool(settings: &DatabaseSettings) -> Result<PgPool, AppError> {
    let url = settings
        .url
        .as_deref()
        .ok_or_else(|| AppError::Internal("database.url is not configured".into()))?;

    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout))
        .connect(url)
        .await?;

    Ok(pool)
}

/// Run database migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Publish pool gauges to the metrics registry
pub fn record_pool_stats(pool: &PgPool) {
    let size = pool.size();
    let idle = pool.num_idle() as u32;
    metrics::update_db_pool_stats(idle, size.saturating_sub(idle), pool.options().get_max_connections());
}

/// Run a query future and record its latency under `operation`/`table`.
pub async fn timed<T, F>(operation: &str, table: &str, query: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    let start = Instant::now();
    let result = query.await;
    metrics::record_db_query(operation, table, start.elapsed().as_secs_f64());
    result.map_err(AppError::from)
}

/// Convert a row count to the unsigned count used by the domain.
pub fn to_count(n: i64) -> u64 {
    u64::try_from(n).unwrap_or_default()
}
