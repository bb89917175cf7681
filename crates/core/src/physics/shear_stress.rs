//! Shear velocity during saltation
//!
//! During saltation the effective roughness length grows with the shear
//! velocity itself (Owen 1964): `z0 = 0.12 u*² / (2g)`. Substituting into the
//! logarithmic wind profile gives an implicit equation in `u*`,
//!
//! `exp(κ U_r / u*) = 2 g Z_r / (0.12 u*²)`
//!
//! solved here with the safeguarded Newton iteration.

use tracing::warn;

use super::constants::{G_STD, REFERENCE_WIND_HEIGHT, SALTATION_ROUGHNESS_COEFF, VON_KARMAN};
use crate::error::{BlowingSnowError, NumericsError};
use crate::numerics::newton::{newton_safe, ImplicitEquation, RootOutcome};

/// Lower end of the shear-velocity bracket (m/s)
pub const SHEAR_BRACKET_LOWER: f64 = 1.0e-7;

/// Width added above the log-law estimate for the upper bracket end (m/s)
pub const SHEAR_BRACKET_MARGIN: f64 = 5.0;

/// Shear velocity substituted when the Newton iteration does not converge (m/s)
pub const FALLBACK_SHEAR_VELOCITY: f64 = 0.025;

/// Residual of the saltation shear-stress equation at a reference height
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShearStressEquation {
    /// Wind speed at the reference height (m/s)
    pub reference_wind: f64,
    /// Reference height (m)
    pub reference_height: f64,
}

impl ImplicitEquation for ShearStressEquation {
    fn evaluate(&self, ushear: f64) -> (f64, f64) {
        let growth = (VON_KARMAN * self.reference_wind / ushear).exp();
        let roughness_term = 2.0 * G_STD * self.reference_height / SALTATION_ROUGHNESS_COEFF;
        let f = growth - roughness_term / (ushear * ushear);
        let df = -VON_KARMAN * self.reference_wind * growth / (ushear * ushear)
            + 2.0 * roughness_term / (ushear * ushear * ushear);
        (f, df)
    }
}

/// How the shear velocity was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShearSource {
    /// Converged Newton solve
    Newton,
    /// Saltation roughness fell below the surface roughness; log law over the surface
    SurfaceLogLaw,
    /// Newton budget exhausted; fixed fallback value, clamped to the surface
    /// log law like a converged root
    Fallback,
}

/// Shear velocity and saltation roughness for one 10 m wind speed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SaltationShear {
    /// Shear velocity `u*` (m/s)
    pub shear_velocity: f64,
    /// Saltation roughness length (m)
    pub saltation_roughness: f64,
    pub source: ShearSource,
}

/// Shear velocity from the log law over a fixed roughness length
pub fn log_law_shear_velocity(u10: f64, roughness: f64) -> f64 {
    VON_KARMAN * u10 / (REFERENCE_WIND_HEIGHT / roughness).ln()
}

/// Saltation roughness length implied by a shear velocity
pub fn saltation_roughness(ushear: f64) -> f64 {
    SALTATION_ROUGHNESS_COEFF * ushear * ushear / (2.0 * G_STD)
}

/// Solve for the shear velocity at 10 m wind speed `u10` over snow of roughness `roughness`.
///
/// If the solved saltation roughness is smaller than the surface roughness the
/// surface dominates: roughness is clamped to it and `u*` is taken straight from
/// the log law.
///
/// # Errors
/// `BlowingSnowError::ShearStress` when the bracket does not contain a root. Under
/// physical wind speeds this indicates a configuration error upstream.
pub fn solve_shear_stress(
    u10: f64,
    roughness: f64,
    tolerance: f64,
) -> Result<SaltationShear, BlowingSnowError> {
    let log_law = log_law_shear_velocity(u10, roughness);
    let equation = ShearStressEquation {
        reference_wind: u10,
        reference_height: REFERENCE_WIND_HEIGHT,
    };

    let outcome = newton_safe(
        &equation,
        SHEAR_BRACKET_LOWER,
        log_law + SHEAR_BRACKET_MARGIN,
        tolerance,
    )
    .map_err(|source| BlowingSnowError::ShearStress {
        wind_speed: u10,
        source,
    })?;

    shear_from_outcome(outcome, u10, roughness)
}

/// Resolve a Newton outcome into the shear velocity and saltation roughness.
///
/// A solve that fell back stays marked [`ShearSource::Fallback`] even when the
/// surface roughness then takes over.
///
/// # Errors
/// `BlowingSnowError::ShearStress` when the root is not a positive finite number.
pub fn shear_from_outcome(
    outcome: RootOutcome,
    u10: f64,
    roughness: f64,
) -> Result<SaltationShear, BlowingSnowError> {
    let converged = outcome.is_converged();
    if let RootOutcome::FellBack { last_estimate, .. } = outcome {
        warn!(
            u10,
            last_estimate,
            fallback = FALLBACK_SHEAR_VELOCITY,
            "Shear stress solve did not converge, using fallback shear velocity"
        );
    }
    let ushear = outcome.value_or(FALLBACK_SHEAR_VELOCITY);

    if !ushear.is_finite() || ushear <= 0.0 {
        return Err(BlowingSnowError::ShearStress {
            wind_speed: u10,
            source: NumericsError::NonFinite {
                context: "shear velocity",
            },
        });
    }

    let z0_salt = saltation_roughness(ushear);
    if z0_salt < roughness {
        return Ok(SaltationShear {
            shear_velocity: log_law_shear_velocity(u10, roughness),
            saltation_roughness: roughness,
            source: if converged {
                ShearSource::SurfaceLogLaw
            } else {
                ShearSource::Fallback
            },
        });
    }

    Ok(SaltationShear {
        shear_velocity: ushear,
        saltation_roughness: z0_salt,
        source: if converged {
            ShearSource::Newton
        } else {
            ShearSource::Fallback
        },
    })
}
