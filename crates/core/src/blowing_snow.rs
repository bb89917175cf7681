//! Blowing-snow sublimation flux for one grid cell and time step
//!
//! The entry point converts the forcing wind to 10 m, describes its sub-grid
//! variability, and averages the per-wind flux over equal-probability wind
//! intervals. Each interval contributes `flux × occurrence probability / N`.
//! With the uniform wind model (or zero spread) a single evaluation at the mean
//! wind stands in for the whole distribution.
//!
//! Degenerate inputs that the model patches over locally are reported as
//! [`Anomaly`] records alongside the flux instead of being silently absorbed.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{BlowingSnowConfig, WindDistribution};
use crate::core_types::BlowingSnowForcing;
use crate::error::BlowingSnowError;
use crate::physics::constants::MIN_SUBLIMATION_FLUX;
use crate::physics::shear_stress::ShearSource;
use crate::physics::sublimation_flux::{flux_for_wind, FluxContext, IncrementFlux, SuspensionLayer};
use crate::physics::thermodynamics::AirState;
use crate::physics::threshold::SnowSurfaceState;
use crate::wind_distribution::{
    clamp_representative, sheltered_wind, wind_at_10m, TerrainParameters, WindStatistics,
};

/// A degenerate-input policy that fired during the evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Anomaly {
    /// Wind standard deviation exceeded its bound and was replaced
    WindVarianceFallback { computed: f64, substituted: f64 },
    /// An interval straddled the median; the minimum wind was used
    ProbabilityRange { index: usize, lower: f64, upper: f64 },
    /// Shear-stress Newton solve ran out of iterations
    ShearSolverFallback { wind_speed: f64, substituted: f64 },
    /// Suspension top coincided with the saltation height
    ZeroWidthSuspension { wind_speed: f64, height: f64 },
    /// Total flux fell below the physical floor and was clamped
    FluxFloor { computed: f64 },
}

/// Flux result with per-wind breakdown
#[derive(Debug, Clone, PartialEq)]
pub struct BlowingSnowFlux {
    /// Sublimation flux (kg/(m²·s)); negative is a loss from the snowpack
    pub flux: f64,
    /// Wind distribution used; `None` when there was no snow
    pub wind: Option<WindStatistics>,
    /// Latent heat of vaporization at the snow surface (J/kg); `None` when
    /// there was no snow
    pub latent_heat_vaporization: Option<f64>,
    /// One entry per evaluated wind speed
    pub increments: Vec<IncrementFlux>,
    pub anomalies: Vec<Anomaly>,
}

impl BlowingSnowFlux {
    fn no_snow() -> Self {
        Self {
            flux: 0.0,
            wind: None,
            latent_heat_vaporization: None,
            increments: Vec::new(),
            anomalies: Vec::new(),
        }
    }

    /// Whether any degenerate-input policy fired
    pub fn is_degraded(&self) -> bool {
        !self.anomalies.is_empty()
    }
}

fn record_increment(increment: &IncrementFlux, anomalies: &mut Vec<Anomaly>) {
    if increment.shear.source == ShearSource::Fallback {
        anomalies.push(Anomaly::ShearSolverFallback {
            wind_speed: increment.wind_speed,
            substituted: increment.shear.shear_velocity,
        });
    }
    if let Some(layers) = &increment.layers {
        if let SuspensionLayer::ZeroWidth { height } = layers.suspension {
            anomalies.push(Anomaly::ZeroWidthSuspension {
                wind_speed: increment.wind_speed,
                height,
            });
        }
    }
}

/// Expected blowing-snow sublimation flux for one forcing record.
///
/// Returns exactly zero without further checks when there is no snowpack.
///
/// # Errors
/// - `BlowingSnowError::Config` for an invalid configuration
/// - `BlowingSnowError::InvalidForcing` for non-finite or out-of-range forcing
/// - `BlowingSnowError::ShearStress` / `SuspensionIntegral` when a numerical
///   kernel fails for one of the wind speeds
pub fn sublimation_flux(
    forcing: &BlowingSnowForcing,
    config: &BlowingSnowConfig,
) -> Result<BlowingSnowFlux, BlowingSnowError> {
    config.validate()?;
    if forcing.snow_depth.value() <= 0.0 {
        return Ok(BlowingSnowFlux::no_snow());
    }
    forcing.validate()?;

    let roughness = forcing.snow_roughness();
    let terrain = TerrainParameters::from_forcing(forcing);
    let wind10 = wind_at_10m(forcing.wind_speed.value(), roughness);
    let stats = WindStatistics::new(wind10, forcing.lag_one, terrain.sigma_slope);

    let mut anomalies = Vec::new();
    if let Some(computed) = stats.variance_fallback {
        anomalies.push(Anomaly::WindVarianceFallback {
            computed,
            substituted: stats.std_dev,
        });
    }

    let context = FluxContext {
        air: AirState::from_forcing(forcing, config.saturation),
        surface: SnowSurfaceState {
            air_temperature: forcing.air_temperature.value(),
            age_hours: forcing.snow_age_hours(),
            liquid_water: forcing.surface_liquid_water.value(),
        },
        roughness,
        fetch: terrain.fetch,
    };

    let depth = forcing.snow_depth.value();
    let vegetation_height = forcing.vegetation.height();
    let element_density = forcing.vegetation.element_density();
    let evaluate = |u10: f64| {
        let sheltered = sheltered_wind(u10, depth, vegetation_height, element_density);
        flux_for_wind(&context, u10, sheltered, config)
    };

    let mut increments = Vec::with_capacity(config.wind_increments);
    let mut total = 0.0;

    if config.wind_distribution == WindDistribution::Spatial && stats.std_dev != 0.0 {
        let weight = 1.0 / config.wind_increments as f64;
        for interval in stats.intervals(config.wind_increments) {
            if interval.range_fallback {
                anomalies.push(Anomaly::ProbabilityRange {
                    index: interval.index,
                    lower: interval.lower,
                    upper: interval.upper,
                });
            }
            let increment = evaluate(interval.representative)?;
            record_increment(&increment, &mut anomalies);
            total += weight * increment.weighted_flux();
            increments.push(increment);
        }
    } else {
        let increment = evaluate(clamp_representative(stats.mean))?;
        record_increment(&increment, &mut anomalies);
        total = increment.weighted_flux();
        increments.push(increment);
    }

    if total < MIN_SUBLIMATION_FLUX {
        warn!(
            computed = total,
            floor = MIN_SUBLIMATION_FLUX,
            "Blowing snow sublimation flux clamped to minimum"
        );
        anomalies.push(Anomaly::FluxFloor { computed: total });
        total = MIN_SUBLIMATION_FLUX;
    }

    debug!(
        wind10,
        sigma_w = stats.std_dev,
        flux = total,
        anomalies = anomalies.len(),
        "Blowing snow sublimation flux"
    );

    Ok(BlowingSnowFlux {
        flux: total,
        wind: Some(stats),
        latent_heat_vaporization: Some(context.air.latent_heat_vaporization),
        increments,
        anomalies,
    })
}

/// Evaluate independent forcing records in parallel.
///
/// Results are returned in input order; one failing record does not affect
/// the others.
pub fn sublimation_flux_batch(
    forcings: &[BlowingSnowForcing],
    config: &BlowingSnowConfig,
) -> Vec<Result<BlowingSnowFlux, BlowingSnowError>> {
    forcings
        .par_iter()
        .map(|forcing| sublimation_flux(forcing, config))
        .collect()
}
