//! StormGlass point-weather client.
//!
//! Fetches the next 24 h of hourly readings for one position and condenses
//! them into a single baseline: hour zero is the current conditions, the
//! peak wave height is the maximum over the window.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;

use super::{ForecastSource, IngestionError, SourcedForecast};

/// StormGlass API endpoint
const STORMGLASS_API_BASE: &str = "https://api.stormglass.io";

/// Readings requested from the API
const POINT_PARAMS: &str = "waveHeight,wavePeriod,waveDirection,windSpeed,windDirection";

/// Per-reading defaults when the provider has no value for an hour.
const DEFAULT_WAVE_HEIGHT: f64 = 0.5;
const DEFAULT_WAVE_PERIOD: f64 = 8.0;
const DEFAULT_WAVE_DIRECTION: f64 = 270.0;
const DEFAULT_WIND_SPEED: f64 = 10.0;
const DEFAULT_WIND_DIRECTION: f64 = 90.0;

pub struct StormGlassClient {
    client: Client,
    api_key: String,
    api_base: String,
}

impl StormGlassClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            api_base: STORMGLASS_API_BASE.to_string(),
        }
    }

    /// Client against a non-default endpoint (test servers).
    pub fn with_api_base(api_key: &str, api_base: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            api_base: api_base.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PointResponse {
    #[serde(default)]
    hours: Vec<HourReading>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct HourReading {
    wave_height: Option<SourceValue>,
    wave_period: Option<SourceValue>,
    wave_direction: Option<SourceValue>,
    wind_speed: Option<SourceValue>,
    wind_direction: Option<SourceValue>,
}

/// StormGlass wraps every reading per source model; we request the "sg"
/// consensus value only.
#[derive(Debug, Deserialize)]
struct SourceValue {
    sg: Option<f64>,
}

fn reading_or(value: &Option<SourceValue>, default: f64) -> f64 {
    value.as_ref().and_then(|v| v.sg).unwrap_or(default)
}

fn condense(payload: &PointResponse) -> Result<SourcedForecast, IngestionError> {
    let current = payload.hours.first().ok_or(IngestionError::EmptyPayload)?;

    let current_wave = reading_or(&current.wave_height, DEFAULT_WAVE_HEIGHT);
    let peak_wave = payload
        .hours
        .iter()
        .filter_map(|h| h.wave_height.as_ref().and_then(|v| v.sg))
        .fold(current_wave, f64::max);

    Ok(SourcedForecast {
        wave_height: current_wave,
        wave_period: reading_or(&current.wave_period, DEFAULT_WAVE_PERIOD),
        wave_direction: reading_or(&current.wave_direction, DEFAULT_WAVE_DIRECTION),
        wind_speed: reading_or(&current.wind_speed, DEFAULT_WIND_SPEED),
        wind_direction: reading_or(&current.wind_direction, DEFAULT_WIND_DIRECTION),
        peak_wave_height: peak_wave,
    })
}

#[async_trait]
impl ForecastSource for StormGlassClient {
    async fn fetch_point(&self, lat: f64, lng: f64) -> Result<SourcedForecast, IngestionError> {
        let start = Utc::now().timestamp();
        let end = start + 24 * 3600;
        let url = format!(
            "{}/v2/weather/point?lat={}&lng={}&params={}&start={}&end={}",
            self.api_base, lat, lng, POINT_PARAMS, start, end
        );

        let response = self
            .client
            .get(&url)
            .header("Authorization", &self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(IngestionError::Api {
                status: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let payload: PointResponse = response.json().await?;
        condense(&payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> PointResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_condense_takes_hour_zero_and_peak() {
        let payload = parse(
            r#"{
                "hours": [
                    {"waveHeight": {"sg": 1.4}, "wavePeriod": {"sg": 11.2},
                     "waveDirection": {"sg": 285.0}, "windSpeed": {"sg": 6.1},
                     "windDirection": {"sg": 250.0}},
                    {"waveHeight": {"sg": 2.3}},
                    {"waveHeight": {"sg": 1.9}}
                ]
            }"#,
        );

        let forecast = condense(&payload).unwrap();
        assert_eq!(forecast.wave_height, 1.4);
        assert_eq!(forecast.wave_period, 11.2);
        assert_eq!(forecast.wind_speed, 6.1);
        assert_eq!(forecast.peak_wave_height, 2.3);
    }

    #[test]
    fn test_condense_defaults_for_missing_readings() {
        let payload = parse(r#"{"hours": [{}]}"#);

        let forecast = condense(&payload).unwrap();
        assert_eq!(forecast.wave_height, 0.5);
        assert_eq!(forecast.wave_period, 8.0);
        assert_eq!(forecast.wave_direction, 270.0);
        assert_eq!(forecast.wind_speed, 10.0);
        assert_eq!(forecast.wind_direction, 90.0);
        assert_eq!(forecast.peak_wave_height, 0.5);
    }

    #[test]
    fn test_condense_handles_null_source_value() {
        let payload = parse(r#"{"hours": [{"waveHeight": {"sg": null}}]}"#);

        let forecast = condense(&payload).unwrap();
        assert_eq!(forecast.wave_height, 0.5);
    }

    #[test]
    fn test_condense_rejects_empty_window() {
        let payload = parse(r#"{"hours": []}"#);
        assert!(matches!(
            condense(&payload),
            Err(IngestionError::EmptyPayload)
        ));
    }

    #[test]
    fn test_missing_hours_key_is_empty_window() {
        let payload = parse(r#"{}"#);
        assert!(condense(&payload).is_err());
    }
}
