//! Persistence Layer
//!
//! SQLite-backed storage for the spot catalog, baseline forecasts and the
//! published live snapshot. Async access via sqlx.
//!
//! # Database Schema
//!
//! ## spots
//! Reference catalog: id (PK), name, region, lat, lng. Seeded at startup,
//! never mutated by the engine.
//!
//! ## forecasts
//! Latest external forecast per spot, 1:1 with spots (cascade delete).
//! Measure columns are nullable: the supplier may only manage a partial row.
//!
//! ## live_stream
//! Latest published estimate per spot, 1:1 with spots (cascade delete).
//! Written exclusively by the live engine, upsert semantics.
//!
//! ## live_meta
//! Singleton status row (id = 1): last recompute timestamp, cosmetic agent
//! count, display reliability, configured interval, status label.

pub mod models;
pub mod repository;

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

use crate::domain::services::pipeline::RELIABILITY;

/// Database connection pool
pub type DbPool = SqlitePool;

/// Fixed identity of the singleton status row.
pub const META_ROW_ID: i64 = 1;

/// Cosmetic number of active sensing agents reported in the status row.
pub const ACTIVE_ROBOTS: i64 = 124;

/// Status label written after every completed cycle.
pub const STATUS_OPTIMAL: &str = "OPTIMAL";

/// Database initialization error
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Database connection error: {0}")]
    ConnectionError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrationError(String),

    #[error("Query error: {0}")]
    QueryError(String),
}

/// Initialize the database connection pool.
///
/// Creates the four relations if they do not exist and seeds the singleton
/// status row. The live engine must not be scheduled before this succeeds;
/// a failure here aborts startup.
///
/// # Arguments
/// - `database_url`: SQLite database URL (e.g., "sqlite://data/houle.db")
/// - `update_frequency_ms`: configured recompute interval, recorded in the
///   status row for the front end
pub async fn init_database(
    database_url: &str,
    update_frequency_ms: u64,
) -> Result<DbPool, DatabaseError> {
    info!("Initializing database: {}", database_url);

    // Ensure data directory exists
    if let Some(db_path) = database_url.strip_prefix("sqlite://") {
        if let Some(parent) = Path::new(db_path).parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::ConnectionError(sqlx::Error::Configuration(Box::new(e)))
            })?;
        }
    }

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    run_migrations(&pool, update_frequency_ms).await?;

    info!("✓ Database initialized successfully");

    Ok(pool)
}

/// Run database migrations
async fn run_migrations(pool: &DbPool, update_frequency_ms: u64) -> Result<(), DatabaseError> {
    info!("Running database migrations...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS spots (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            region TEXT NOT NULL,
            lat REAL NOT NULL,
            lng REAL NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| DatabaseError::MigrationError(format!("Failed to create spots table: {}", e)))?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS forecasts (
            spot_id TEXT PRIMARY KEY REFERENCES spots(id) ON DELETE CASCADE,
            wave_height REAL,
            wave_period REAL,
            wave_direction REAL,
            wind_speed REAL,
            wind_direction REAL,
            peak_wave_height REAL,
            last_updated DATETIME
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| {
        DatabaseError::MigrationError(format!("Failed to create forecasts table: {}", e))
    })?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS live_stream (
            spot_id TEXT PRIMARY KEY REFERENCES spots(id) ON DELETE CASCADE,
            wave_height REAL NOT NULL,
            wave_period REAL NOT NULL,
            wind_speed REAL NOT NULL,
            reliability TEXT NOT NULL DEFAULT '100.00',
            updated_at DATETIME NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| {
        DatabaseError::MigrationError(format!("Failed to create live_stream table: {}", e))
    })?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS live_meta (
            id INTEGER PRIMARY KEY,
            timestamp DATETIME NOT NULL,
            active_robots INTEGER NOT NULL,
            global_reliability TEXT NOT NULL,
            update_frequency_ms INTEGER NOT NULL,
            system_status TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| {
        DatabaseError::MigrationError(format!("Failed to create live_meta table: {}", e))
    })?;

    // Seed the singleton status row if absent
    sqlx::query(
        r#"
        INSERT INTO live_meta (id, timestamp, active_robots, global_reliability, update_frequency_ms, system_status)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ON CONFLICT(id) DO NOTHING
        "#,
    )
    .bind(META_ROW_ID)
    .bind(Utc::now())
    .bind(ACTIVE_ROBOTS)
    .bind(RELIABILITY)
    .bind(update_frequency_ms as i64)
    .bind(STATUS_OPTIMAL)
    .execute(pool)
    .await
    .map_err(|e| DatabaseError::MigrationError(format!("Failed to seed live_meta row: {}", e)))?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_forecasts_last_updated ON forecasts(last_updated)")
        .execute(pool)
        .await
        .map_err(|e| DatabaseError::MigrationError(format!("Failed to create index: {}", e)))?;

    info!("✓ Database migrations completed successfully");

    Ok(())
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database URL (e.g., "sqlite://data/houle.db")
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://data/houle.db".to_string(),
        }
    }
}

impl DatabaseConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        let url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://data/houle.db".to_string());

        Self { url }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_database_init() {
        let pool = init_database("sqlite::memory:", 2000).await;
        assert!(pool.is_ok());
    }

    #[tokio::test]
    async fn test_migrations_create_all_tables() {
        let pool = init_database("sqlite::memory:", 2000).await.unwrap();

        let result: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN ('spots', 'forecasts', 'live_stream', 'live_meta')"
        )
        .fetch_one(&pool)
        .await
        .unwrap();

        assert_eq!(result.0, 4);
    }

    #[tokio::test]
    async fn test_migrations_seed_singleton_meta_row() {
        let pool = init_database("sqlite::memory:", 2000).await.unwrap();

        let row: (i64, String, i64) = sqlx::query_as(
            "SELECT active_robots, system_status, update_frequency_ms FROM live_meta WHERE id = 1",
        )
        .fetch_one(&pool)
        .await
        .unwrap();

        assert_eq!(row.0, ACTIVE_ROBOTS);
        assert_eq!(row.1, STATUS_OPTIMAL);
        assert_eq!(row.2, 2000);
    }

    #[test]
    fn test_database_config_default() {
        let config = DatabaseConfig::default();
        assert_eq!(config.url, "sqlite://data/houle.db");
    }
}
