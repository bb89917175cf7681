//! Physics of blowing-snow sublimation
//!
//! Leaf-first: `constants` and `thermodynamics` feed the `shear_stress`,
//! `threshold` and `profile` sub-models, which `sublimation_flux` assembles into
//! the flux for one representative wind speed.

pub mod constants;
pub mod profile;
pub mod shear_stress;
pub mod sublimation_flux;
pub mod thermodynamics;
pub mod threshold;

pub use profile::{ProfileOutput, SublimationProfile};
pub use shear_stress::{
    shear_from_outcome, solve_shear_stress, SaltationShear, ShearSource, ShearStressEquation,
};
pub use sublimation_flux::{flux_for_wind, FluxContext, IncrementFlux, LayerFluxes, SuspensionLayer};
pub use thermodynamics::{saturation_vapor_pressure, AirState};
pub use threshold::{
    occurrence_probability, threshold_shear_velocity, threshold_wind_speed_10m, SnowSurfaceState,
};
