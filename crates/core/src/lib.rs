//! Blowing-Snow Sublimation Core Library
//!
//! Estimates the mass flux lost to sublimation while wind lofts snow above a
//! snowpack. A host land-surface model calls [`sublimation_flux`] once per grid
//! cell and time step and adds the result to the snowpack mass balance.
//!
//! ## Model Structure
//!
//! - Sub-grid 10 m wind split into equal-probability Laplace intervals
//! - Shear velocity from the implicit saltation roughness relation (safeguarded Newton)
//! - Occurrence probability and threshold shear after Li and Pomeroy (1997)
//! - Saltation plus suspension layer flux after Liston and Sturm (1998), with
//!   the suspension layer integrated by Romberg quadrature

// Core types and utilities
pub mod config;
pub mod core_types;
pub mod error;

// Numerical kernels (no snow physics)
pub mod numerics;

// Physics and the flux driver
pub mod blowing_snow;
pub mod physics;
pub mod wind_distribution;

// Re-export core types
pub use core_types::{BlowingSnowForcing, SurfaceCover, VegetationGeometry};
pub use core_types::{
    Celsius, Hours, JoulesPerKg, KgPerCubicMeter, Kelvin, Meters, MetersPerSecond, Pascals,
};

// Re-export configuration and errors
pub use config::{
    BlowingSnowConfig, FluxModel, OccurrenceModel, SaturationCurve, ThresholdModel,
    WindDistribution,
};
pub use error::{BlowingSnowError, ConfigError, NumericsError};

// Re-export the driver
pub use blowing_snow::{sublimation_flux, sublimation_flux_batch, Anomaly, BlowingSnowFlux};
