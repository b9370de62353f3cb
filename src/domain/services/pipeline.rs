//! Correction pipeline: turns a spot's baseline forecast into the published
//! live estimate.
//!
//! The agents run in a fixed order. Bathymetry and topology read only the
//! spot's attributes; the storm tracker produces the wave value that the
//! vision, satellite and barometer agents each read independently. The final
//! wave height is the consensus average of those three readings scaled by
//! the bathymetry factor.

use rand::Rng;
use tracing::debug;

use crate::domain::entities::forecast::BaselineForecast;
use crate::domain::entities::spot::Spot;
use crate::domain::services::agents;
use crate::domain::value_objects::bearing::Bearing;
use crate::domain::value_objects::wave_height::WaveHeight;
use crate::domain::value_objects::wind_speed::WindSpeed;

/// Display reliability stamped on every published estimate. A fixed
/// display constant, never derived from the readings.
pub const RELIABILITY: &str = "100.00";

/// Refined conditions for one spot, ready to publish.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefinedConditions {
    pub wave_height: f64,
    pub wave_period: f64,
    pub wind_speed: f64,
}

/// Runs the six agents over one spot's resolved baseline.
///
/// Pure except for the injected random source. Fails only on non-finite
/// input values; the caller isolates such failures per spot.
pub fn refine<R: Rng>(
    spot: &Spot,
    baseline: &BaselineForecast,
    rng: &mut R,
) -> Result<RefinedConditions, String> {
    let base_wave = WaveHeight::clamped(baseline.wave_height)?;
    let base_wind = WindSpeed::clamped(baseline.wind_speed)?;
    let wind_dir = Bearing::new(baseline.wind_direction)?;

    let depth_factor = agents::bathymetry(spot.lat, spot.lng);
    let local_wind = agents::topology(&spot.region, base_wind.value(), wind_dir.degrees());
    let storm_wave = agents::storm_inertia(base_wave.value(), rng);

    let (vision, confidence) = agents::computer_vision(storm_wave, rng);
    let satellite = agents::satellite(storm_wave, rng);
    let barometer = agents::barometer(storm_wave, rng);

    debug!(
        spot = %spot.id,
        confidence,
        depth_factor,
        "consensus readings collected"
    );

    let consensus = (vision + satellite + barometer) / 3.0;
    let wave_height = WaveHeight::clamped(consensus * depth_factor)?;
    let wind_speed = WindSpeed::clamped(local_wind)?;

    Ok(RefinedConditions {
        wave_height: wave_height.value(),
        wave_period: baseline.wave_period,
        wind_speed: wind_speed.value(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn hossegor() -> Spot {
        Spot::new(
            "hossegor",
            "La Gravière",
            "Landes",
            43.6645,
            -1.4427,
        )
    }

    #[test]
    fn test_refine_hossegor_band() {
        let mut rng = StdRng::seed_from_u64(7);
        let baseline = BaselineForecast::fallback();

        for _ in 0..200 {
            let refined = refine(&hossegor(), &baseline, &mut rng).unwrap();
            // 1.5 × storm [1.03, 1.07] × consensus drift [0.99, 1.01]
            //     × bathymetry [0.98, 1.02]
            let lo = 1.5 * 1.03 * 0.99 * 0.98;
            let hi = 1.5 * 1.07 * 1.01 * 1.02;
            assert!(
                refined.wave_height >= lo && refined.wave_height <= hi,
                "wave {} outside [{}, {}]",
                refined.wave_height,
                lo,
                hi
            );
            assert!((refined.wind_speed - 15.0 * 1.05).abs() < 1e-9);
            assert_eq!(refined.wave_period, 10.0);
        }
    }

    #[test]
    fn test_refine_flat_sea_stays_flat() {
        let mut rng = StdRng::seed_from_u64(7);
        let baseline = BaselineForecast {
            wave_height: 0.0,
            ..BaselineForecast::fallback()
        };
        let refined = refine(&hossegor(), &baseline, &mut rng).unwrap();
        assert_eq!(refined.wave_height, 0.0);
    }

    #[test]
    fn test_refine_clamps_negative_baseline_to_zero() {
        let mut rng = StdRng::seed_from_u64(7);
        let baseline = BaselineForecast {
            wave_height: -3.0,
            wind_speed: -10.0,
            ..BaselineForecast::fallback()
        };
        let refined = refine(&hossegor(), &baseline, &mut rng).unwrap();
        assert_eq!(refined.wave_height, 0.0);
        assert_eq!(refined.wind_speed, 0.0);
    }

    #[test]
    fn test_refine_rejects_non_finite_baseline() {
        let mut rng = StdRng::seed_from_u64(7);
        let baseline = BaselineForecast {
            wave_height: f64::INFINITY,
            ..BaselineForecast::fallback()
        };
        assert!(refine(&hossegor(), &baseline, &mut rng).is_err());
    }

    #[test]
    fn test_refine_wind_does_not_depend_on_wave_noise() {
        // The jittered agents never touch wind speed: two runs with different
        // seeds must agree on it exactly.
        let baseline = BaselineForecast::fallback();
        let mut rng_a = StdRng::seed_from_u64(1);
        let mut rng_b = StdRng::seed_from_u64(2);
        let a = refine(&hossegor(), &baseline, &mut rng_a).unwrap();
        let b = refine(&hossegor(), &baseline, &mut rng_b).unwrap();
        assert_eq!(a.wind_speed, b.wind_speed);
        assert_eq!(a.wave_period, b.wave_period);
    }
}
