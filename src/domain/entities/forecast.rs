use serde::{Deserialize, Serialize};

/// Fallback wave height (meters) when a spot has no usable forecast.
pub const FALLBACK_WAVE_HEIGHT: f64 = 1.5;
/// Fallback wave period (seconds).
pub const FALLBACK_WAVE_PERIOD: f64 = 10.0;
/// Fallback wind speed.
pub const FALLBACK_WIND_SPEED: f64 = 15.0;
/// Fallback wind direction (degrees, westerly).
pub const FALLBACK_WIND_DIRECTION: f64 = 270.0;

/// Latest externally supplied wave/wind prediction for one spot.
///
/// Refreshed on a slow cadence (hours) by the ingestion job; the live engine
/// only ever reads it. All fields are resolved: a forecast handed to the
/// pipeline never has holes, missing readings were already replaced by the
/// fallback values above.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineForecast {
    pub wave_height: f64,
    pub wave_period: f64,
    pub wave_direction: f64,
    pub wind_speed: f64,
    pub wind_direction: f64,
    pub peak_wave_height: f64,
}

impl BaselineForecast {
    /// The baseline used for spots with no forecast row at all.
    pub fn fallback() -> Self {
        BaselineForecast {
            wave_height: FALLBACK_WAVE_HEIGHT,
            wave_period: FALLBACK_WAVE_PERIOD,
            wave_direction: FALLBACK_WIND_DIRECTION,
            wind_speed: FALLBACK_WIND_SPEED,
            wind_direction: FALLBACK_WIND_DIRECTION,
            peak_wave_height: FALLBACK_WAVE_HEIGHT,
        }
    }

    /// Resolves a partially populated forecast row, filling each missing
    /// field with its documented fallback.
    pub fn from_partial(
        wave_height: Option<f64>,
        wave_period: Option<f64>,
        wave_direction: Option<f64>,
        wind_speed: Option<f64>,
        wind_direction: Option<f64>,
        peak_wave_height: Option<f64>,
    ) -> Self {
        let wave_height = wave_height.unwrap_or(FALLBACK_WAVE_HEIGHT);
        BaselineForecast {
            wave_height,
            wave_period: wave_period.unwrap_or(FALLBACK_WAVE_PERIOD),
            wave_direction: wave_direction.unwrap_or(FALLBACK_WIND_DIRECTION),
            wind_speed: wind_speed.unwrap_or(FALLBACK_WIND_SPEED),
            wind_direction: wind_direction.unwrap_or(FALLBACK_WIND_DIRECTION),
            peak_wave_height: peak_wave_height.unwrap_or(wave_height),
        }
    }
}
