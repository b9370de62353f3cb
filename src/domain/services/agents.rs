//! The six correction agents.
//!
//! Each agent is one independent transform in the pipeline: a pure function
//! of the spot's attributes, the running wave value and (for the jittered
//! ones) an injected random source. None of them suspends; the pipeline is
//! plain in-memory arithmetic.

use rand::Rng;

use crate::domain::services::region;

/// Residual storm energy bounds applied by the storm tracker.
pub const RESIDUAL_ENERGY_MIN: f64 = 0.03;
pub const RESIDUAL_ENERGY_MAX: f64 = 0.07;

/// Maximum relative correction of the satellite reading.
pub const SATELLITE_TOLERANCE: f64 = 0.01;

/// Maximum relative jitter of the barometric reading.
pub const BAROMETER_TOLERANCE: f64 = 0.02;

/// Seabed stability factor for the given position, in [0.98, 1.02].
///
/// The sandbars do not move between cycles: the factor depends only on the
/// coordinates, never on the wave value.
pub fn bathymetry(lat: f64, lng: f64) -> f64 {
    let phase = lat.to_radians().sin() * 3.7 + lng.to_radians().cos() * 2.3;
    1.0 + 0.02 * phase.sin()
}

/// Hyper-local wind speed after coastal relief (venturi) adjustment.
///
/// Must be called with a resolved baseline: the fallback substitution has
/// already happened upstream. The wind direction is part of the agent's
/// contract but the current relief model only discriminates by region.
pub fn topology(spot_region: &str, base_wind_speed: f64, _base_wind_dir: f64) -> f64 {
    base_wind_speed * region::adjustment_for(spot_region).multiplier
}

/// Wave height with residual storm energy added.
pub fn storm_inertia<R: Rng>(base_wave: f64, rng: &mut R) -> f64 {
    base_wave * (1.0 + rng.gen_range(RESIDUAL_ENERGY_MIN..=RESIDUAL_ENERGY_MAX))
}

/// Beach camera reading: exact pass-through of the wave value, plus a
/// confidence percentage used only for observability.
pub fn computer_vision<R: Rng>(base_wave: f64, rng: &mut R) -> (f64, u8) {
    (base_wave, rng.gen_range(95..=99))
}

/// Satellite reading: precise offshore, slightly smoothed at the coast.
pub fn satellite<R: Rng>(base_wave: f64, rng: &mut R) -> f64 {
    base_wave * (1.0 + rng.gen_range(-SATELLITE_TOLERANCE..=SATELLITE_TOLERANCE))
}

/// Barometric reading: micro-pressure noise around the true wave state.
pub fn barometer<R: Rng>(base_wave: f64, rng: &mut R) -> f64 {
    base_wave * (1.0 + rng.gen_range(-BAROMETER_TOLERANCE..=BAROMETER_TOLERANCE))
}
