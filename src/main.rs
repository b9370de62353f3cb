use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use houle::api::{self, ApiState};
use houle::application::live_engine::LiveEngine;
use houle::config::AppConfig;
use houle::domain::entities::spot::default_catalog;
use houle::ingestion::{self, stormglass::StormGlassClient};
use houle::persistence::{self, repository::SpotRepository};
use houle::task_runner::{self, TaskPolicy};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "houle=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();

    info!("Démarrage du service houle : conditions live des spots de surf");
    info!("Agents de correction: bathymétrie, topologie, inertie de tempête, vision, satellite, baromètre");

    // Storage must be ready before any cycle is scheduled
    let pool = persistence::init_database(
        &config.database.url,
        config.live_interval.as_millis() as u64,
    )
    .await?;

    SpotRepository::new(pool.clone())
        .seed(&default_catalog())
        .await?;
    info!("Spot catalog seeded ({} spots)", default_catalog().len());

    // Live estimate engine, the sole writer to the live tables
    let engine = LiveEngine::new(pool.clone());
    let live_interval = config.live_interval;
    tokio::spawn(async move {
        engine.run(live_interval).await;
    });
    info!("Live engine scheduled every {:?}", config.live_interval);

    // Baseline forecast refresh, hours cadence
    match config.stormglass_api_key.as_deref() {
        Some(key) => {
            let source = Arc::new(StormGlassClient::new(key));
            let refresh_pool = pool.clone();
            let window = config.forecast_refresh;
            tokio::spawn(async move {
                task_runner::run_at_interval(
                    "forecast-refresh",
                    window,
                    TaskPolicy::default(),
                    move || {
                        let source = source.clone();
                        let pool = refresh_pool.clone();
                        async move {
                            ingestion::refresh_forecasts(source.as_ref(), &pool, window)
                                .await
                                .map(|_| ())
                                .map_err(|e| e.to_string())
                        }
                    },
                )
                .await;
            });
            info!(
                "Forecast refresh scheduled every {:?}",
                config.forecast_refresh
            );
        }
        None => {
            warn!("STORMGLASS_API_KEY is not set; running on fallback baselines");
        }
    }

    let app = api::router(ApiState { pool: pool.clone() });

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Set up graceful shutdown
    let shutdown_signal = async {
        let ctrl_c = async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Received Ctrl+C signal"),
                Err(e) => error!("Failed to install Ctrl+C handler: {}", e),
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut sig) => {
                    sig.recv().await;
                    info!("Received SIGTERM signal");
                }
                Err(e) => error!("Failed to install SIGTERM handler: {}", e),
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }
    };

    info!("Server started successfully. Press Ctrl+C to stop.");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Shutdown complete");
    Ok(())
}
