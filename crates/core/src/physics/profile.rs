//! Sublimation-rate profile above the snow surface
//!
//! At height `z` the model derives a mean particle radius and mass from
//! empirical radius-height power laws, the particle ventilation velocity, and
//! from there a per-particle mass-loss rate. Dividing by particle mass gives the
//! sublimation loss-rate coefficient `ψ(z)` (1/s). The suspended mass
//! concentration `φ(z)` decays as a power law above the saltation layer.
//!
//! `ψ(z)` alone, evaluated mid-layer, closes the saltation-layer flux. The
//! product `ψ(z)·φ(z)` (kg/(m³·s)) is the suspension-layer integrand.
//!
//! Radiation absorption by snow particles is neglected.
//!
//! # Scientific References
//! - Pomeroy, J.W. and Male, D.H. (1986). "Physical modelling of blowing snow for
//!   agricultural production" (terminal fall velocity)
//! - Pomeroy, J.W. (1988). "Wind transport of snow" Ph.D. thesis, University of
//!   Saskatchewan (turbulent fluctuation velocity)
//! - Lee, L.W. (1975). "Sublimation of snow in turbulent atmosphere" Ph.D. thesis,
//!   University of Wyoming (ventilation velocity)
//! - Kind, R.J. (1992). "One-dimensional aeolian suspension above beds of loose
//!   particles" Atmospheric Environment, 26A, 927-931 (suspended concentration)

use std::f64::consts::{FRAC_PI_4, PI};

use super::constants::{ICE_DENSITY, KINEMATIC_VISCOSITY, SETTLING_VELOCITY, VON_KARMAN};
use super::thermodynamics::AirState;

/// Which quantity [`SublimationProfile::local_sublimation`] returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileOutput {
    /// Loss-rate coefficient `ψ(z)` (1/s)
    RateCoefficient,
    /// Mass sublimation rate `ψ(z)·φ(z)` (kg/(m³·s))
    MassRate,
}

/// Fixed parameters of the profile for one wind speed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SublimationProfile {
    /// 10 m wind speed (m/s)
    pub wind_speed: f64,
    /// Saturation vapor pressure (Pa)
    pub saturation_vapor_pressure: f64,
    /// Actual vapor pressure (Pa)
    pub vapor_pressure: f64,
    /// Sublimation denominator `F`
    pub denominator: f64,
    /// Humidity reference height (m)
    pub humidity_reference_height: f64,
    /// Saltation layer height (m)
    pub saltation_height: f64,
    /// Saltation layer mass concentration (kg/m³)
    pub saltation_concentration: f64,
    /// Shear velocity (m/s)
    pub shear_velocity: f64,
}

impl SublimationProfile {
    pub fn new(
        air: &AirState,
        wind_speed: f64,
        saltation_height: f64,
        saltation_concentration: f64,
        shear_velocity: f64,
    ) -> Self {
        Self {
            wind_speed,
            saturation_vapor_pressure: air.saturation_vapor_pressure,
            vapor_pressure: air.vapor_pressure,
            denominator: air.denominator,
            humidity_reference_height: air.humidity_reference_height,
            saltation_height,
            saltation_concentration,
            shear_velocity,
        }
    }

    /// Sublimation loss-rate coefficient `ψ(z)` (1/s); negative when sublimating
    pub fn rate_coefficient(&self, z: f64) -> f64 {
        // Mean radius (m) and gamma shape parameter of the size distribution
        let radius = 4.6e-5 * z.powf(-0.258);
        let alpha = 4.08 + 12.6 * z;
        let mass = (4.0 / 3.0)
            * PI
            * ICE_DENSITY
            * radius.powi(3)
            * (1.0 + 3.0 / alpha + 2.0 / (alpha * alpha));
        let mean_radius = ((3.0 * mass) / (4.0 * PI * ICE_DENSITY)).cbrt();

        // Pomeroy and Male (1986)
        let terminal_velocity = 1.1e7 * mean_radius.powf(1.8);
        // Pomeroy (1988)
        let fluctuation_velocity = 0.005 * self.wind_speed.powf(1.36);
        // Lee (1975)
        let ventilation_velocity = terminal_velocity + 3.0 * fluctuation_velocity * FRAC_PI_4.cos();

        let reynolds = 2.0 * mean_radius * ventilation_velocity / KINEMATIC_VISCOSITY;
        let nusselt = 1.79 + 0.606 * reynolds.sqrt();

        let undersaturation = (self.vapor_pressure / self.saturation_vapor_pressure - 1.0)
            * (1.0 - 0.027 * (z / self.humidity_reference_height).ln());
        let dm_dt = 2.0 * PI * mean_radius * undersaturation * nusselt / self.denominator;

        dm_dt / mass
    }

    /// Suspended snow mass concentration `φ(z)` (kg/m³), Kind (1992)
    pub fn concentration(&self, z: f64) -> f64 {
        let ratio = self.settling_ratio();
        let exponent = -SETTLING_VELOCITY / (VON_KARMAN * self.shear_velocity);
        self.saltation_concentration
            * ((ratio + 1.0) * (z / self.saltation_height).powf(exponent) - ratio)
    }

    /// `T = 0.5 u*² / (U10 · w_s)`, the ratio controlling the concentration decay
    pub fn settling_ratio(&self) -> f64 {
        0.5 * self.shear_velocity * self.shear_velocity / (self.wind_speed * SETTLING_VELOCITY)
    }

    /// Height at which the suspended concentration falls to zero
    pub fn suspension_top(&self) -> f64 {
        let ratio = self.settling_ratio();
        self.saltation_height
            * (ratio / (ratio + 1.0)).powf(VON_KARMAN * self.shear_velocity / -SETTLING_VELOCITY)
    }

    /// Local sublimation at height `z` in the requested form
    pub fn local_sublimation(&self, z: f64, output: ProfileOutput) -> f64 {
        match output {
            ProfileOutput::RateCoefficient => self.rate_coefficient(z),
            ProfileOutput::MassRate => self.rate_coefficient(z) * self.concentration(z),
        }
    }
}
