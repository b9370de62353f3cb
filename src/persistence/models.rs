//! Database Records
//!
//! Row types for the four relations plus the write-side input structs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::domain::entities::forecast::BaselineForecast;
use crate::domain::entities::spot::Spot;

/// One row of the spot catalog.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SpotRecord {
    pub id: String,
    pub name: String,
    pub region: String,
    pub lat: f64,
    pub lng: f64,
}

impl From<&SpotRecord> for Spot {
    fn from(record: &SpotRecord) -> Self {
        Spot::new(
            &record.id,
            &record.name,
            &record.region,
            record.lat,
            record.lng,
        )
    }
}

/// One row of the baseline forecast store. Measure columns are nullable:
/// the supplier may only have managed a partial write.
#[derive(Debug, Clone, FromRow)]
pub struct ForecastRecord {
    pub spot_id: String,
    pub wave_height: Option<f64>,
    pub wave_period: Option<f64>,
    pub wave_direction: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
    pub peak_wave_height: Option<f64>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl ForecastRecord {
    /// Resolves the row into a complete baseline, per-field fallbacks
    /// substituted for missing readings.
    pub fn to_baseline(&self) -> BaselineForecast {
        BaselineForecast::from_partial(
            self.wave_height,
            self.wave_period,
            self.wave_direction,
            self.wind_speed,
            self.wind_direction,
            self.peak_wave_height,
        )
    }
}

/// Write-side input for a forecast upsert.
#[derive(Debug, Clone)]
pub struct UpsertForecast {
    pub spot_id: String,
    pub wave_height: Option<f64>,
    pub wave_period: Option<f64>,
    pub wave_direction: Option<f64>,
    pub wind_speed: Option<f64>,
    pub wind_direction: Option<f64>,
    pub peak_wave_height: Option<f64>,
}

/// One row of the published live snapshot.
#[derive(Debug, Clone, FromRow)]
pub struct LiveEstimateRecord {
    pub spot_id: String,
    pub wave_height: f64,
    pub wave_period: f64,
    pub wind_speed: f64,
    pub reliability: String,
    pub updated_at: DateTime<Utc>,
}

/// The singleton status row.
#[derive(Debug, Clone, FromRow)]
pub struct LiveMetaRecord {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub active_robots: i64,
    pub global_reliability: String,
    pub update_frequency_ms: i64,
    pub system_status: String,
}
