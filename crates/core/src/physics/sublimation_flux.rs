//! Sublimation flux for a single representative wind speed
//!
//! Ties the threshold regressions, the shear-stress solve and the sublimation
//! profile together. The two-layer model follows Liston and Sturm (1998):
//! the saltation layer carries a uniform mass concentration and sublimates at
//! the rate evaluated at its mid-height, while the suspension layer above it is
//! integrated numerically up to the height where the concentration vanishes.
//!
//! # Scientific References
//! - Liston, G.E. and Sturm, M. (1998). "A snow-transport model for complex terrain"
//!   Journal of Glaciology, 44(148), 498-516 (eq. 6, saltation transport)
//! - Pomeroy, J.W. and Gray, D.M. (1990). "Saltation of snow" Water Resources
//!   Research, 26(7), 1583-1594 (saltation height and particle speed)

use tracing::{debug, warn};

use super::constants::{G_STD, PARTICLE_SPEED_RATIO, SALTATION_CONSTANT};
use super::profile::{ProfileOutput, SublimationProfile};
use super::shear_stress::{solve_shear_stress, SaltationShear};
use super::thermodynamics::AirState;
use super::threshold::{occurrence_probability, threshold_shear_velocity, SnowSurfaceState};
use crate::config::{BlowingSnowConfig, FluxModel};
use crate::error::BlowingSnowError;
use crate::numerics::romberg::{romberg, Quadrature};

/// Scaling coefficient of the single-layer power law
const SIMPLE_FLUX_COEFFICIENT: f64 = 0.25;

/// Fetch length scale of the transport development factor (m)
const FETCH_DEVELOPMENT_LENGTH: f64 = 500.0;

/// Everything the per-wind flux needs that does not depend on the wind speed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FluxContext {
    pub air: AirState,
    pub surface: SnowSurfaceState,
    /// Snow-surface roughness length (m)
    pub roughness: f64,
    /// Upwind fetch (m)
    pub fetch: f64,
}

/// Outcome of the suspension-layer integral
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SuspensionLayer {
    Integrated(Quadrature),
    /// The suspension top coincides with the saltation height; no flux
    ZeroWidth { height: f64 },
}

impl SuspensionLayer {
    pub fn flux(&self) -> f64 {
        match self {
            SuspensionLayer::Integrated(q) => q.value,
            SuspensionLayer::ZeroWidth { .. } => 0.0,
        }
    }
}

/// Two-layer breakdown of the full flux model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerFluxes {
    /// Saltation transport rate (kg/(m·s)), fetch-corrected when enabled
    pub saltation_transport: f64,
    /// Saltation layer height (m)
    pub saltation_height: f64,
    /// Saltation layer mass concentration (kg/m³)
    pub saltation_concentration: f64,
    /// Loss-rate coefficient at mid saltation layer (1/s)
    pub saltation_rate: f64,
    /// Saltation layer flux (kg/(m²·s))
    pub saltation: f64,
    /// Height where the suspended concentration vanishes (m)
    pub suspension_top: f64,
    pub suspension: SuspensionLayer,
}

/// Flux and diagnostics for one wind speed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IncrementFlux {
    /// Representative 10 m wind speed (m/s)
    pub wind_speed: f64,
    pub occurrence_probability: f64,
    pub shear: SaltationShear,
    /// Threshold shear velocity (m/s)
    pub threshold_shear: f64,
    /// Layer breakdown; `None` for the simple model or when there is no flux
    pub layers: Option<LayerFluxes>,
    /// Sublimation flux while blowing snow occurs (kg/(m²·s)), not yet weighted
    /// by the occurrence probability
    pub flux: f64,
}

impl IncrementFlux {
    /// Contribution to the expected flux, `flux × occurrence probability`
    pub fn weighted_flux(&self) -> f64 {
        self.flux * self.occurrence_probability
    }
}

/// Fetch development factor applied to the saltation transport rate
pub fn fetch_factor(fetch: f64) -> f64 {
    let scaled = 3.0 * fetch / FETCH_DEVELOPMENT_LENGTH;
    1.0 + ((-scaled).exp() - 1.0) / scaled
}

/// Saltation transport rate (kg/(m·s)), Liston and Sturm eq. 6
pub fn saltation_transport(air_density: f64, shear_velocity: f64, threshold_shear: f64) -> f64 {
    (SALTATION_CONSTANT * air_density / G_STD)
        * (threshold_shear / shear_velocity)
        * (shear_velocity * shear_velocity - threshold_shear * threshold_shear)
}

/// Saltation layer height (m)
pub fn saltation_height(shear_velocity: f64) -> f64 {
    1.6 * shear_velocity * shear_velocity / (2.0 * G_STD)
}

/// Single-layer flux, `0.25 · undersaturation · U10⁵ / F`
pub fn simple_flux(air: &AirState, u10: f64) -> f64 {
    let height_adjustment =
        1.0 - 0.027 * air.humidity_reference_height.ln() + 0.027 * 2.0_f64.ln();
    let undersaturation = air.undersaturation() * height_adjustment;
    SIMPLE_FLUX_COEFFICIENT * undersaturation * u10.powi(5) / air.denominator
}

/// Saltation plus suspension flux for a wind that exceeds the threshold.
///
/// # Errors
/// `BlowingSnowError::SuspensionIntegral` when the quadrature fails.
pub fn two_layer_flux(
    context: &FluxContext,
    u10: f64,
    shear_velocity: f64,
    threshold_shear: f64,
    config: &BlowingSnowConfig,
) -> Result<LayerFluxes, BlowingSnowError> {
    let mut transport = saltation_transport(context.air.air_density, shear_velocity, threshold_shear);
    if config.fetch_correction {
        transport *= fetch_factor(context.fetch);
    }
    let height = saltation_height(shear_velocity);
    let particle_speed = PARTICLE_SPEED_RATIO * threshold_shear;
    let concentration = transport / (height * particle_speed);

    let profile = SublimationProfile::new(&context.air, u10, height, concentration, shear_velocity);
    let saltation_rate = profile.local_sublimation(0.5 * height, ProfileOutput::RateCoefficient);
    let saltation = concentration * saltation_rate * height;

    let suspension_top = profile.suspension_top();
    let suspension = if suspension_top > height {
        let quadrature = romberg(height, suspension_top, &config.integration, |z| {
            profile.local_sublimation(z, ProfileOutput::MassRate)
        })
        .map_err(|source| {
            warn!(
                u10,
                shear_velocity,
                saltation_height = height,
                suspension_top,
                error = %source,
                "Suspension layer integration failed"
            );
            BlowingSnowError::SuspensionIntegral {
                wind_speed: u10,
                source,
            }
        })?;
        SuspensionLayer::Integrated(quadrature)
    } else {
        warn!(
            u10,
            shear_velocity,
            saltation_height = height,
            "Suspension layer has zero width, skipping integral"
        );
        SuspensionLayer::ZeroWidth { height }
    };

    Ok(LayerFluxes {
        saltation_transport: transport,
        saltation_height: height,
        saltation_concentration: concentration,
        saltation_rate,
        saltation,
        suspension_top,
        suspension,
    })
}

/// Sublimation flux at representative wind speed `u10`.
///
/// `sheltered_wind` is the vegetation-adjusted wind that drives the occurrence
/// probability; the shear solve and the flux itself use `u10`. The flux is zero
/// unless the shear velocity exceeds the threshold and the air is undersaturated.
///
/// # Errors
/// Propagates shear-stress and suspension-integral failures.
pub fn flux_for_wind(
    context: &FluxContext,
    u10: f64,
    sheltered_wind: f64,
    config: &BlowingSnowConfig,
) -> Result<IncrementFlux, BlowingSnowError> {
    let probability = occurrence_probability(&context.surface, sheltered_wind, config.occurrence);
    let shear = solve_shear_stress(u10, context.roughness, config.root_tolerance)?;
    let threshold_shear = threshold_shear_velocity(
        &context.surface,
        u10,
        context.roughness,
        probability,
        shear.shear_velocity,
        config.threshold,
    );

    let (flux, layers) =
        if shear.shear_velocity > threshold_shear && context.air.is_undersaturated() {
            match config.flux_model {
                FluxModel::Simple => (simple_flux(&context.air, u10), None),
                FluxModel::Full => {
                    let layers =
                        two_layer_flux(context, u10, shear.shear_velocity, threshold_shear, config)?;
                    (layers.saltation + layers.suspension.flux(), Some(layers))
                }
            }
        } else {
            (0.0, None)
        };

    debug!(
        u10,
        sheltered_wind,
        probability,
        ushear = shear.shear_velocity,
        threshold_shear,
        flux,
        "Blowing snow increment"
    );

    Ok(IncrementFlux {
        wind_speed: u10,
        occurrence_probability: probability,
        shear,
        threshold_shear,
        layers,
        flux,
    })
}
