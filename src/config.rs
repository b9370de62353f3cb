//! Runtime configuration, loaded from the environment (.env supported).

use std::time::Duration;

use crate::persistence::DatabaseConfig;

/// Default recompute cadence for the live engine.
pub const DEFAULT_LIVE_INTERVAL_MS: u64 = 2000;

/// Default forecast refresh cadence. The external weather API bills per
/// request; hours, not seconds.
pub const DEFAULT_FORECAST_REFRESH_HOURS: u64 = 6;

/// Default HTTP listen port.
pub const DEFAULT_PORT: u16 = 3000;

/// Service configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP listen port.
    pub port: u16,
    /// Interval between live recomputation cycles.
    pub live_interval: Duration,
    /// Interval between forecast refresh attempts; also the cache window
    /// under which a refresh is skipped.
    pub forecast_refresh: Duration,
    /// StormGlass API key. Without it the refresh job is not started and
    /// the engine runs on fallback baselines.
    pub stormglass_api_key: Option<String>,
    /// Storage settings.
    pub database: DatabaseConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            live_interval: Duration::from_millis(DEFAULT_LIVE_INTERVAL_MS),
            forecast_refresh: Duration::from_secs(DEFAULT_FORECAST_REFRESH_HOURS * 3600),
            stormglass_api_key: None,
            database: DatabaseConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let live_interval_ms = std::env::var("LIVE_INTERVAL_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_LIVE_INTERVAL_MS);

        let forecast_refresh_hours = std::env::var("FORECAST_REFRESH_HOURS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_FORECAST_REFRESH_HOURS);

        let stormglass_api_key = std::env::var("STORMGLASS_API_KEY")
            .ok()
            .filter(|s| !s.is_empty());

        Self {
            port,
            live_interval: Duration::from_millis(live_interval_ms),
            forecast_refresh: Duration::from_secs(forecast_refresh_hours * 3600),
            stormglass_api_key,
            database: DatabaseConfig::from_env(),
        }
    }
}
