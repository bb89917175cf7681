//! Runtime model configuration
//!
//! Each variant switch of the blowing-snow parameterization is an explicit
//! value here, so alternative formulations can be exercised side by side in one
//! process. `BlowingSnowConfig::default()` reproduces the reference behavior:
//! full two-layer flux, spatially distributed wind, variable threshold, fetch
//! correction and statistical occurrence probability.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::numerics::romberg::{RombergSettings, EXTRAPOLATION_POINTS, MAX_REFINEMENTS};

/// Number of equal-probability wind intervals in the reference model
pub const DEFAULT_WIND_INCREMENTS: usize = 10;

/// Largest accepted number of wind intervals
pub const MAX_WIND_INCREMENTS: usize = 1000;

/// Step tolerance for the shear-velocity Newton solve (m/s)
pub const DEFAULT_ROOT_TOLERANCE: f64 = 1.0e-6;

/// Sublimation flux sub-model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FluxModel {
    /// Saltation layer plus integrated suspension layer (Liston and Sturm 1998)
    #[default]
    Full,
    /// Single-layer fifth-power scaling law in `U10`
    Simple,
}

/// Treatment of sub-grid wind variability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WindDistribution {
    /// Laplace-distributed 10 m wind split into equal-probability intervals
    #[default]
    Spatial,
    /// Single deterministic mean wind speed
    Uniform,
}

/// Threshold shear velocity formulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ThresholdModel {
    /// Temperature-dependent threshold after Li and Pomeroy (1997)
    #[default]
    Variable,
    /// Fixed threshold of 0.25 m/s
    Constant,
}

/// Probability of blowing-snow occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OccurrenceModel {
    /// Logistic regression on wind, temperature and snow age (Li and Pomeroy 1997)
    #[default]
    Statistical,
    /// Blowing snow always occurs (probability 1)
    Constant,
}

/// Saturation vapor pressure curve used for the humidity deficit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SaturationCurve {
    /// Tetens formula over liquid water
    #[default]
    Water,
    /// Tetens formula with the polynomial below-freezing correction
    IceCorrected,
}

/// Complete configuration for one flux evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlowingSnowConfig {
    pub flux_model: FluxModel,
    pub wind_distribution: WindDistribution,
    pub threshold: ThresholdModel,
    pub occurrence: OccurrenceModel,
    pub saturation: SaturationCurve,
    /// Scale saltation transport by the fetch-development factor
    pub fetch_correction: bool,
    /// Number of equal-probability wind intervals (even, >= 2)
    pub wind_increments: usize,
    /// Suspension-layer quadrature settings
    pub integration: RombergSettings,
    /// Newton step tolerance for the shear-stress equation
    pub root_tolerance: f64,
}

impl Default for BlowingSnowConfig {
    fn default() -> Self {
        Self {
            flux_model: FluxModel::Full,
            wind_distribution: WindDistribution::Spatial,
            threshold: ThresholdModel::Variable,
            occurrence: OccurrenceModel::Statistical,
            saturation: SaturationCurve::Water,
            fetch_correction: true,
            wind_increments: DEFAULT_WIND_INCREMENTS,
            integration: RombergSettings::default(),
            root_tolerance: DEFAULT_ROOT_TOLERANCE,
        }
    }
}

impl BlowingSnowConfig {
    /// Check that every numeric setting is usable.
    ///
    /// # Errors
    /// Returns `ConfigError` naming the first invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(2..=MAX_WIND_INCREMENTS).contains(&self.wind_increments)
            || self.wind_increments % 2 == 1
        {
            return Err(ConfigError::WindIncrements(self.wind_increments));
        }
        let tol = self.integration.tolerance;
        if !tol.is_finite() || tol <= 0.0 {
            return Err(ConfigError::IntegrationTolerance(tol));
        }
        if !(EXTRAPOLATION_POINTS..=MAX_REFINEMENTS).contains(&self.integration.max_refinements) {
            return Err(ConfigError::MaxRefinements {
                min: EXTRAPOLATION_POINTS,
                max: MAX_REFINEMENTS,
                got: self.integration.max_refinements,
            });
        }
        if !self.root_tolerance.is_finite() || self.root_tolerance <= 0.0 {
            return Err(ConfigError::RootTolerance(self.root_tolerance));
        }
        Ok(())
    }

    /// Use the single-layer scaling law instead of the two-layer model
    pub fn with_flux_model(mut self, flux_model: FluxModel) -> Self {
        self.flux_model = flux_model;
        self
    }

    /// Switch between distributed and deterministic wind
    pub fn with_wind_distribution(mut self, wind_distribution: WindDistribution) -> Self {
        self.wind_distribution = wind_distribution;
        self
    }

    /// Select the threshold shear velocity formulation
    pub fn with_threshold(mut self, threshold: ThresholdModel) -> Self {
        self.threshold = threshold;
        self
    }

    /// Select the occurrence probability formulation
    pub fn with_occurrence(mut self, occurrence: OccurrenceModel) -> Self {
        self.occurrence = occurrence;
        self
    }

    /// Select the saturation vapor pressure curve
    pub fn with_saturation(mut self, saturation: SaturationCurve) -> Self {
        self.saturation = saturation;
        self
    }

    /// Enable or disable the fetch correction on saltation transport
    pub fn with_fetch_correction(mut self, enabled: bool) -> Self {
        self.fetch_correction = enabled;
        self
    }
}
