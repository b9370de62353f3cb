//! Live Estimate Engine
//!
//! Owns the recurring recomputation schedule: every cycle it reads the spot
//! catalog and the baseline forecast store once, runs the correction
//! pipeline for every spot and republishes the live snapshot. It is the only
//! writer to the live tables.
//!
//! Cycles are strictly serialized; a failed cycle is logged and the next
//! tick retries naturally. A single spot's failure never aborts the cycle
//! for the remaining spots.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::domain::entities::forecast::BaselineForecast;
use crate::domain::entities::spot::Spot;
use crate::domain::services::pipeline;
use crate::persistence::models::SpotRecord;
use crate::persistence::repository::{ForecastRepository, LiveRepository, SpotRepository};
use crate::persistence::{DatabaseError, DbPool};
use crate::task_runner::{self, TaskPolicy};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("storage error: {0}")]
    Storage(#[from] DatabaseError),

    #[error("pipeline rejected {spot_id}: {reason}")]
    Pipeline { spot_id: String, reason: String },
}

/// Counters owned by the engine instance. Updated once per cycle,
/// observability only.
#[derive(Debug, Clone, Default)]
pub struct EngineStats {
    pub cycles_run: u64,
    pub estimates_written: u64,
    pub spots_failed: u64,
    pub last_cycle_at: Option<DateTime<Utc>>,
}

/// Outcome of one pass over the catalog.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub spots_published: usize,
    pub spots_failed: usize,
    pub elapsed: Duration,
}

pub struct LiveEngine {
    spots: SpotRepository,
    forecasts: ForecastRepository,
    live: LiveRepository,
    rng: StdRng,
    stats: EngineStats,
}

impl LiveEngine {
    pub fn new(pool: DbPool) -> Self {
        Self::with_rng(pool, StdRng::from_entropy())
    }

    /// Engine with a caller-supplied random source, so tests can pin seeds.
    pub fn with_rng(pool: DbPool, rng: StdRng) -> Self {
        Self {
            spots: SpotRepository::new(pool.clone()),
            forecasts: ForecastRepository::new(pool.clone()),
            live: LiveRepository::new(pool),
            rng,
            stats: EngineStats::default(),
        }
    }

    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    /// One complete pass over the spot set.
    ///
    /// Catalog and forecasts are read once up front, so every spot in the
    /// cycle sees the same baseline generation. Per-spot failures are
    /// isolated; an error here means the cycle's read or status phase
    /// failed as a whole.
    pub async fn run_cycle(&mut self) -> Result<CycleReport, EngineError> {
        let started = Instant::now();

        let spots = self.spots.list_all().await?;
        let forecasts = self.forecasts.get_all().await?;
        let baselines: HashMap<String, BaselineForecast> = forecasts
            .iter()
            .map(|row| (row.spot_id.clone(), row.to_baseline()))
            .collect();

        self.live.touch_meta().await?;

        let mut published = 0usize;
        let mut failed = 0usize;
        for record in &spots {
            match self.publish_spot(record, baselines.get(&record.id)).await {
                Ok(()) => published += 1,
                Err(e) => {
                    failed += 1;
                    warn!("Skipping {} this cycle: {}", record.id, e);
                }
            }
        }

        self.stats.cycles_run += 1;
        self.stats.estimates_written += published as u64;
        self.stats.spots_failed += failed as u64;
        self.stats.last_cycle_at = Some(Utc::now());

        let report = CycleReport {
            spots_published: published,
            spots_failed: failed,
            elapsed: started.elapsed(),
        };
        debug!(
            "Cycle {} complete: {} published, {} failed in {:?}",
            self.stats.cycles_run, report.spots_published, report.spots_failed, report.elapsed
        );

        Ok(report)
    }

    async fn publish_spot(
        &mut self,
        record: &SpotRecord,
        baseline: Option<&BaselineForecast>,
    ) -> Result<(), EngineError> {
        let resolved;
        let baseline = match baseline {
            Some(b) => b,
            None => {
                debug!("No baseline forecast for {}, using fallback", record.id);
                resolved = BaselineForecast::fallback();
                &resolved
            }
        };

        let spot = Spot::from(record);
        let refined =
            pipeline::refine(&spot, baseline, &mut self.rng).map_err(|reason| {
                EngineError::Pipeline {
                    spot_id: record.id.clone(),
                    reason,
                }
            })?;

        self.live
            .upsert_estimate(
                &record.id,
                refined.wave_height,
                refined.wave_period,
                refined.wind_speed,
            )
            .await?;

        Ok(())
    }

    /// Run the engine on its recurring schedule. Never returns; abort the
    /// surrounding task to stop it.
    pub async fn run(self, period: Duration) {
        let engine = Arc::new(Mutex::new(self));
        task_runner::run_at_interval(
            "live-estimate",
            period,
            TaskPolicy::default(),
            move || {
                let engine = engine.clone();
                async move {
                    engine
                        .lock()
                        .await
                        .run_cycle()
                        .await
                        .map(|_| ())
                        .map_err(|e| e.to_string())
                }
            },
        )
        .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::spot::default_catalog;
    use crate::persistence::init_database;

    async fn engine_over_seeded_pool() -> (LiveEngine, DbPool) {
        let pool = init_database("sqlite::memory:", 2000).await.unwrap();
        SpotRepository::new(pool.clone())
            .seed(&default_catalog())
            .await
            .unwrap();
        (
            LiveEngine::with_rng(pool.clone(), StdRng::seed_from_u64(7)),
            pool,
        )
    }

    #[tokio::test]
    async fn test_cycle_publishes_every_spot_on_fallbacks() {
        let (mut engine, pool) = engine_over_seeded_pool().await;

        let report = engine.run_cycle().await.unwrap();
        assert_eq!(report.spots_published, default_catalog().len());
        assert_eq!(report.spots_failed, 0);

        let (estimates, _) = LiveRepository::new(pool).read_all().await.unwrap();
        assert_eq!(estimates.len(), default_catalog().len());
    }

    #[tokio::test]
    async fn test_stats_accumulate_across_cycles() {
        let (mut engine, _pool) = engine_over_seeded_pool().await;

        engine.run_cycle().await.unwrap();
        engine.run_cycle().await.unwrap();

        let stats = engine.stats();
        assert_eq!(stats.cycles_run, 2);
        assert_eq!(
            stats.estimates_written,
            2 * default_catalog().len() as u64
        );
        assert_eq!(stats.spots_failed, 0);
        assert!(stats.last_cycle_at.is_some());
    }
}
