//! Read-only HTTP façade.
//!
//! Serves the spot catalog, the raw baseline forecasts and the live
//! snapshot to the browser front end. Strictly read-only against storage:
//! the live engine is the sole writer and these handlers never interfere
//! with its write path. If the latest cycle failed, readers keep getting
//! the last successfully published snapshot.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::persistence::models::{ForecastRecord, LiveEstimateRecord, SpotRecord};
use crate::persistence::repository::{ForecastRepository, LiveRepository, SpotRepository};
use crate::persistence::{DatabaseError, DbPool};

#[derive(Clone)]
pub struct ApiState {
    pub pool: DbPool,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/api/spots", get(get_spots))
        .route("/api/forecasts", get(get_forecasts))
        .route("/api/live", get(get_live))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

type ApiError = (StatusCode, Json<serde_json::Value>);

fn db_error(context: &str, err: DatabaseError) -> ApiError {
    error!("{}: {}", context, err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Database error" })),
    )
}

/// Wire shape of one forecast row.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ForecastView {
    wave_height: Option<f64>,
    wave_period: Option<f64>,
    wave_direction: Option<f64>,
    wind_speed: Option<f64>,
    wind_direction: Option<f64>,
    peak_wave_height: Option<f64>,
    last_updated: Option<DateTime<Utc>>,
}

impl From<&ForecastRecord> for ForecastView {
    fn from(record: &ForecastRecord) -> Self {
        ForecastView {
            wave_height: record.wave_height,
            wave_period: record.wave_period,
            wave_direction: record.wave_direction,
            wind_speed: record.wind_speed,
            wind_direction: record.wind_direction,
            peak_wave_height: record.peak_wave_height,
            last_updated: record.last_updated,
        }
    }
}

/// Wire shape of the live snapshot.
#[derive(Debug, Serialize)]
struct LiveView {
    #[serde(rename = "_meta")]
    meta: MetaView,
    spots: HashMap<String, LiveSpotView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MetaView {
    timestamp: DateTime<Utc>,
    active_robots: i64,
    global_reliability: String,
    update_frequency_ms: i64,
    system_status: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LiveSpotView {
    wave_height: String,
    wave_period: f64,
    wind_speed: String,
    reliability: String,
}

impl From<&LiveEstimateRecord> for LiveSpotView {
    fn from(record: &LiveEstimateRecord) -> Self {
        LiveSpotView {
            wave_height: format!("{:.2}", record.wave_height),
            wave_period: record.wave_period,
            wind_speed: format!("{:.1}", record.wind_speed),
            reliability: record.reliability.clone(),
        }
    }
}

/// GET /api/spots: the full catalog, northernmost first.
async fn get_spots(State(state): State<ApiState>) -> Result<Json<Vec<SpotRecord>>, ApiError> {
    let spots = SpotRepository::new(state.pool.clone())
        .list_all()
        .await
        .map_err(|e| db_error("GET /api/spots", e))?;

    Ok(Json(spots))
}

/// GET /api/forecasts: raw baseline forecasts keyed by spot id.
async fn get_forecasts(
    State(state): State<ApiState>,
) -> Result<Json<HashMap<String, ForecastView>>, ApiError> {
    let rows = ForecastRepository::new(state.pool.clone())
        .get_all()
        .await
        .map_err(|e| db_error("GET /api/forecasts", e))?;

    let forecasts = rows
        .iter()
        .map(|row| (row.spot_id.clone(), ForecastView::from(row)))
        .collect();

    Ok(Json(forecasts))
}

/// GET /api/live: the published snapshot plus the system status block.
async fn get_live(State(state): State<ApiState>) -> Result<Json<LiveView>, ApiError> {
    let (estimates, meta) = LiveRepository::new(state.pool.clone())
        .read_all()
        .await
        .map_err(|e| db_error("GET /api/live", e))?;

    let spots = estimates
        .iter()
        .map(|row| (row.spot_id.clone(), LiveSpotView::from(row)))
        .collect();

    Ok(Json(LiveView {
        meta: MetaView {
            timestamp: meta.timestamp,
            active_robots: meta.active_robots,
            global_reliability: meta.global_reliability,
            update_frequency_ms: meta.update_frequency_ms,
            system_status: meta.system_status,
        },
        spots,
    }))
}

/// Health check endpoint
async fn health_check(State(state): State<ApiState>) -> Json<serde_json::Value> {
    let database_ok = sqlx::query("SELECT 1").execute(&state.pool).await.is_ok();

    Json(json!({
        "status": "running",
        "database": database_ok,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_spot_view_formats_display_strings() {
        let record = LiveEstimateRecord {
            spot_id: "hossegor".to_string(),
            wave_height: 1.5678,
            wave_period: 10.0,
            wind_speed: 15.75,
            reliability: "100.00".to_string(),
            updated_at: Utc::now(),
        };

        let view = LiveSpotView::from(&record);
        assert_eq!(view.wave_height, "1.57");
        assert_eq!(view.wind_speed, "15.8");
        assert_eq!(view.reliability, "100.00");
    }

    #[test]
    fn test_live_view_meta_key_is_underscored() {
        let view = LiveView {
            meta: MetaView {
                timestamp: Utc::now(),
                active_robots: 124,
                global_reliability: "100.00".to_string(),
                update_frequency_ms: 2000,
                system_status: "OPTIMAL".to_string(),
            },
            spots: HashMap::new(),
        };

        let value = serde_json::to_value(&view).unwrap();
        assert!(value.get("_meta").is_some());
        assert!(value["_meta"].get("activeRobots").is_some());
        assert!(value["_meta"].get("updateFrequencyMs").is_some());
    }

    #[test]
    fn test_forecast_view_uses_camel_case_keys() {
        let record = ForecastRecord {
            spot_id: "biarritz".to_string(),
            wave_height: Some(1.1),
            wave_period: Some(9.0),
            wave_direction: None,
            wind_speed: Some(14.0),
            wind_direction: None,
            peak_wave_height: Some(1.6),
            last_updated: None,
        };

        let value = serde_json::to_value(ForecastView::from(&record)).unwrap();
        assert!(value.get("waveHeight").is_some());
        assert!(value.get("peakWaveHeight").is_some());
        assert!(value.get("wave_height").is_none());
    }
}
