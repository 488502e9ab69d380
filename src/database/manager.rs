use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate key: {0}")]
    Conflict(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Connection pool management for the service database.
pub struct DatabaseManager;

impl DatabaseManager {
    /// Build the pool from configuration. The pool connects lazily so the
    /// process can come up (and report a degraded health state) while the
    /// database is still unreachable.
    pub fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        url::Url::parse(&config.url).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect_lazy(&config.url)?;

        Ok(pool)
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }

    /// Create the two entity tables when absent. Development convenience
    /// mirroring the original deployment; managed environments run real
    /// migrations instead.
    pub async fn ensure_schema(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query(CREATE_TRACEABILITY_RECORDS).execute(pool).await?;
        sqlx::query(CREATE_CONTRACTS).execute(pool).await?;
        info!("Database schema ensured");
        Ok(())
    }

    /// Close the pool (e.g., on shutdown)
    pub async fn close(pool: &PgPool) {
        pool.close().await;
        info!("Closed database pool");
    }
}

/// True when the error is a Postgres unique-constraint violation. The UNIQUE
/// constraint is the sole concurrency guard for generated identifiers.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

const CREATE_TRACEABILITY_RECORDS: &str = r#"
CREATE TABLE IF NOT EXISTS traceability_records (
    id BIGSERIAL PRIMARY KEY,
    traceability_hash TEXT NOT NULL UNIQUE,
    product_id TEXT NOT NULL,
    farmer_id TEXT NOT NULL,
    aggregation_center_id TEXT NOT NULL,
    "timestamp" TIMESTAMPTZ NOT NULL
)
"#;

const CREATE_CONTRACTS: &str = r#"
CREATE TABLE IF NOT EXISTS contracts (
    id BIGSERIAL PRIMARY KEY,
    contract_id TEXT NOT NULL UNIQUE,
    buyer_id TEXT NOT NULL,
    seller_id TEXT NOT NULL,
    product_id TEXT NOT NULL,
    agreed_price DOUBLE PRECISION NOT NULL,
    delivery_date TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'Pending'
)
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(url: &str) -> DatabaseConfig {
        DatabaseConfig {
            url: url.to_string(),
            max_connections: 2,
            acquire_timeout_secs: 1,
            bootstrap_schema: false,
        }
    }

    #[test]
    fn connect_rejects_a_malformed_url() {
        let err = DatabaseManager::connect(&test_config("not a url")).unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidDatabaseUrl));
    }

    #[tokio::test]
    async fn connect_is_lazy_for_a_well_formed_url() {
        // No database is listening here; a lazy pool must still build.
        let pool = DatabaseManager::connect(&test_config("postgres://postgres@127.0.0.1:5432/farmchain_test"));
        assert!(pool.is_ok());
    }

    #[test]
    fn unique_violation_detection_ignores_other_errors() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
        assert!(!is_unique_violation(&sqlx::Error::PoolTimedOut));
    }
}
