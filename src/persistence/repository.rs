//! Database Repositories
//!
//! Data access layer for the spot catalog, the baseline forecast store and
//! the published live snapshot.

use chrono::{DateTime, Utc};
use tracing::{debug, error};

use super::models::*;
use super::{DatabaseError, DbPool, ACTIVE_ROBOTS, META_ROW_ID, STATUS_OPTIMAL};
use crate::config::DEFAULT_LIVE_INTERVAL_MS;
use crate::domain::entities::spot::Spot;
use crate::domain::services::pipeline::RELIABILITY;

/// Spot catalog repository. Read-mostly: the catalog is seeded once at
/// startup and never mutated by the engine.
pub struct SpotRepository {
    pool: DbPool,
}

impl SpotRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Idempotently seed the catalog.
    pub async fn seed(&self, spots: &[Spot]) -> Result<(), DatabaseError> {
        for spot in spots {
            sqlx::query(
                r#"
                INSERT INTO spots (id, name, region, lat, lng)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(id) DO UPDATE SET
                    name = ?2, region = ?3, lat = ?4, lng = ?5
                "#,
            )
            .bind(&spot.id)
            .bind(&spot.name)
            .bind(&spot.region)
            .bind(spot.lat)
            .bind(spot.lng)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to seed spot {}: {}", spot.id, e);
                DatabaseError::QueryError(format!("Failed to seed spot: {}", e))
            })?;
        }

        debug!("Seeded {} spots", spots.len());
        Ok(())
    }

    /// Get the full catalog, northernmost first.
    pub async fn list_all(&self) -> Result<Vec<SpotRecord>, DatabaseError> {
        let records =
            sqlx::query_as::<_, SpotRecord>("SELECT * FROM spots ORDER BY lat DESC")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    error!("Failed to list spots: {}", e);
                    DatabaseError::QueryError(format!("Failed to list spots: {}", e))
                })?;

        Ok(records)
    }
}

/// Baseline forecast repository. Written by the ingestion job, read by the
/// live engine.
pub struct ForecastRepository {
    pool: DbPool,
}

impl ForecastRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create-or-replace the forecast row for one spot.
    pub async fn upsert(&self, forecast: UpsertForecast) -> Result<(), DatabaseError> {
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO forecasts (
                spot_id, wave_height, wave_period, wave_direction,
                wind_speed, wind_direction, peak_wave_height, last_updated
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(spot_id) DO UPDATE SET
                wave_height = ?2, wave_period = ?3, wave_direction = ?4,
                wind_speed = ?5, wind_direction = ?6, peak_wave_height = ?7,
                last_updated = ?8
            "#,
        )
        .bind(&forecast.spot_id)
        .bind(forecast.wave_height)
        .bind(forecast.wave_period)
        .bind(forecast.wave_direction)
        .bind(forecast.wind_speed)
        .bind(forecast.wind_direction)
        .bind(forecast.peak_wave_height)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to upsert forecast for {}: {}", forecast.spot_id, e);
            DatabaseError::QueryError(format!("Failed to upsert forecast: {}", e))
        })?;

        debug!("Updated forecast for {}", forecast.spot_id);
        Ok(())
    }

    /// Get every forecast row.
    pub async fn get_all(&self) -> Result<Vec<ForecastRecord>, DatabaseError> {
        let records = sqlx::query_as::<_, ForecastRecord>("SELECT * FROM forecasts")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to get forecasts: {}", e);
                DatabaseError::QueryError(format!("Failed to get forecasts: {}", e))
            })?;

        Ok(records)
    }

    /// Timestamp of the most recent forecast write, if any.
    pub async fn latest_update(&self) -> Result<Option<DateTime<Utc>>, DatabaseError> {
        let row: (Option<DateTime<Utc>>,) =
            sqlx::query_as("SELECT MAX(last_updated) FROM forecasts")
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    error!("Failed to read forecast freshness: {}", e);
                    DatabaseError::QueryError(format!("Failed to read forecast freshness: {}", e))
                })?;

        Ok(row.0)
    }
}

/// Live snapshot repository. The live engine is the only writer; the HTTP
/// façade only reads.
pub struct LiveRepository {
    pool: DbPool,
}

impl LiveRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create-or-replace the published estimate for one spot.
    ///
    /// Always stamps the fixed display reliability and the commit time.
    /// Visible to readers as soon as it returns.
    pub async fn upsert_estimate(
        &self,
        spot_id: &str,
        wave_height: f64,
        wave_period: f64,
        wind_speed: f64,
    ) -> Result<(), DatabaseError> {
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO live_stream (spot_id, wave_height, wave_period, wind_speed, reliability, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(spot_id) DO UPDATE SET
                wave_height = ?2, wave_period = ?3, wind_speed = ?4,
                reliability = ?5, updated_at = ?6
            "#,
        )
        .bind(spot_id)
        .bind(wave_height)
        .bind(wave_period)
        .bind(wind_speed)
        .bind(RELIABILITY)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to publish estimate for {}: {}", spot_id, e);
            DatabaseError::QueryError(format!("Failed to publish estimate: {}", e))
        })?;

        debug!("Published estimate for {}", spot_id);
        Ok(())
    }

    /// Full snapshot read: every published estimate plus the status row,
    /// with documented defaults if the status row is somehow absent.
    pub async fn read_all(
        &self,
    ) -> Result<(Vec<LiveEstimateRecord>, LiveMetaRecord), DatabaseError> {
        let estimates = sqlx::query_as::<_, LiveEstimateRecord>("SELECT * FROM live_stream")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to read live snapshot: {}", e);
                DatabaseError::QueryError(format!("Failed to read live snapshot: {}", e))
            })?;

        let meta = sqlx::query_as::<_, LiveMetaRecord>("SELECT * FROM live_meta WHERE id = ?1")
            .bind(META_ROW_ID)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to read live meta: {}", e);
                DatabaseError::QueryError(format!("Failed to read live meta: {}", e))
            })?
            .unwrap_or_else(|| LiveMetaRecord {
                id: META_ROW_ID,
                timestamp: Utc::now(),
                active_robots: ACTIVE_ROBOTS,
                global_reliability: RELIABILITY.to_string(),
                update_frequency_ms: DEFAULT_LIVE_INTERVAL_MS as i64,
                system_status: STATUS_OPTIMAL.to_string(),
            });

        Ok((estimates, meta))
    }

    /// Per-cycle status stamp: last recompute time and status label.
    pub async fn touch_meta(&self) -> Result<(), DatabaseError> {
        sqlx::query(
            "UPDATE live_meta SET timestamp = ?1, system_status = ?2 WHERE id = ?3",
        )
        .bind(Utc::now())
        .bind(STATUS_OPTIMAL)
        .bind(META_ROW_ID)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to stamp live meta: {}", e);
            DatabaseError::QueryError(format!("Failed to stamp live meta: {}", e))
        })?;

        Ok(())
    }
}
