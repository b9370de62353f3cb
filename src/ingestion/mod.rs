//! Baseline Forecast Ingestion
//!
//! Periodic refresh of the forecast store from the external weather API.
//! Runs on its own slow cadence (hours); the live engine only ever reads
//! what this job writes and tolerates it being stale or absent.

pub mod stormglass;

use async_trait::async_trait;
use chrono::Utc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info};

use crate::persistence::models::UpsertForecast;
use crate::persistence::repository::{ForecastRepository, SpotRepository};
use crate::persistence::{DatabaseError, DbPool};

/// Pause between per-spot fetches, to respect the provider's rate limits.
const INTER_SPOT_PAUSE: Duration = Duration::from_millis(100);

/// One spot's conditions as returned by the remote weather source.
#[derive(Debug, Clone, PartialEq)]
pub struct SourcedForecast {
    pub wave_height: f64,
    pub wave_period: f64,
    pub wave_direction: f64,
    pub wind_speed: f64,
    pub wind_direction: f64,
    pub peak_wave_height: f64,
}

/// A remote point-weather source.
#[async_trait]
pub trait ForecastSource: Send + Sync {
    async fn fetch_point(&self, lat: f64, lng: f64) -> Result<SourcedForecast, IngestionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum IngestionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Weather API error: {status} - {body}")]
    Api { status: u16, body: String },

    #[error("Empty forecast payload")]
    EmptyPayload,

    #[error("Storage error: {0}")]
    Storage(#[from] DatabaseError),
}

/// Refresh the forecast store for every spot in the catalog.
///
/// Skips the whole refresh while the newest stored forecast is younger than
/// `cache_window` (the external API bills per request). A per-spot fetch
/// failure writes a degraded placeholder row and moves on; only storage
/// failures abort the refresh.
///
/// Returns the number of spots refreshed from the remote source.
pub async fn refresh_forecasts(
    source: &dyn ForecastSource,
    pool: &DbPool,
    cache_window: Duration,
) -> Result<usize, IngestionError> {
    let forecasts = ForecastRepository::new(pool.clone());

    if let Some(latest) = forecasts.latest_update().await? {
        let age = Utc::now() - latest;
        if age < chrono::Duration::from_std(cache_window).unwrap_or(chrono::Duration::zero()) {
            info!(
                "Forecast cache is fresh ({}min old), skipping fetch to protect API limits",
                age.num_minutes()
            );
            return Ok(0);
        }
    }

    let spots = SpotRepository::new(pool.clone()).list_all().await?;
    info!("Starting forecast fetch for {} spots...", spots.len());

    let mut fetched = 0usize;
    for (i, spot) in spots.iter().enumerate() {
        match source.fetch_point(spot.lat, spot.lng).await {
            Ok(sourced) => {
                forecasts
                    .upsert(UpsertForecast {
                        spot_id: spot.id.clone(),
                        wave_height: Some(sourced.wave_height),
                        wave_period: Some(sourced.wave_period),
                        wave_direction: Some(sourced.wave_direction),
                        wind_speed: Some(sourced.wind_speed),
                        wind_direction: Some(sourced.wind_direction),
                        peak_wave_height: Some(sourced.peak_wave_height),
                    })
                    .await?;
                fetched += 1;
            }
            Err(e) => {
                error!("Failed to fetch forecast for {}: {}", spot.name, e);
                // Keep the row present on fetch failure
                forecasts
                    .upsert(UpsertForecast {
                        spot_id: spot.id.clone(),
                        wave_height: Some(1.0),
                        wave_period: Some(10.0),
                        wave_direction: None,
                        wind_speed: Some(15.0),
                        wind_direction: None,
                        peak_wave_height: None,
                    })
                    .await?;
            }
        }

        if i + 1 < spots.len() {
            sleep(INTER_SPOT_PAUSE).await;
        }
    }

    info!(
        "Forecast refresh complete: {}/{} spots fetched from source",
        fetched,
        spots.len()
    );
    Ok(fetched)
}
