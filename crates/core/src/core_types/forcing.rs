//! Forcing bundle for one blowing-snow evaluation
//!
//! Everything the host energy-balance solver hands over for a single grid cell
//! and time step. Nothing here is retained between calls.

use serde::{Deserialize, Serialize};

use super::units::{Celsius, Hours, JoulesPerKg, KgPerCubicMeter, Meters, MetersPerSecond, Pascals};
use crate::error::BlowingSnowError;

/// Index of the snow-surface entry in the roughness-length array
pub const SNOW_SURFACE_INDEX: usize = 2;

/// Land cover beneath the snowpack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SurfaceCover {
    /// Vegetated tile: fetch and slope variance come from the forcing
    #[default]
    Vegetated,
    /// Bare soil tile: fetch and slope variance use fixed open-terrain values
    BareSoil,
}

/// Vegetation geometry used for the burial correction
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VegetationGeometry {
    /// Zero-plane displacement height
    pub displacement: Meters,
    /// Vegetation roughness length
    pub roughness: Meters,
}

impl VegetationGeometry {
    /// Effective vegetation height, `1.5 × displacement`
    pub fn height(&self) -> f64 {
        1.5 * self.displacement.value()
    }

    /// Roughness element density, `(4/3) × roughness / displacement`.
    ///
    /// Zero when there is no displacement height (no standing vegetation).
    pub fn element_density(&self) -> f64 {
        let d = self.displacement.value();
        if d <= 0.0 {
            0.0
        } else {
            (4.0 / 3.0) * (self.roughness.value() / d)
        }
    }
}

/// Meteorological and surface-state inputs for one call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlowingSnowForcing {
    /// Model time step
    pub time_step: Hours,
    pub air_temperature: Celsius,
    /// Time steps since the last snowfall
    pub steps_since_snowfall: u32,
    /// Liquid water in the surface layer
    pub surface_liquid_water: Meters,
    /// Wind speed 2 m above the snow surface
    pub wind_speed: MetersPerSecond,
    /// Latent heat of sublimation
    pub latent_heat_sublimation: JoulesPerKg,
    pub air_density: KgPerCubicMeter,
    pub air_pressure: Pascals,
    /// Actual vapor pressure of the air
    pub vapor_pressure: Pascals,
    /// Roughness lengths by surface type; entry 2 is the snow surface
    pub roughness_lengths: [Meters; 3],
    /// Reference height of the humidity measurement
    pub humidity_reference_height: Meters,
    pub snow_depth: Meters,
    /// Lag-one autocorrelation of the terrain
    pub lag_one: f64,
    /// Standard deviation of terrain slope
    pub sigma_slope: f64,
    pub snow_surface_temperature: Celsius,
    pub surface: SurfaceCover,
    /// Upwind fetch distance
    pub fetch: Meters,
    pub vegetation: VegetationGeometry,
}

impl BlowingSnowForcing {
    /// Roughness length of the snow surface
    pub fn snow_roughness(&self) -> f64 {
        self.roughness_lengths[SNOW_SURFACE_INDEX].value()
    }

    /// Snow age in hours, `steps_since_snowfall × time_step`
    pub fn snow_age_hours(&self) -> f64 {
        f64::from(self.steps_since_snowfall) * self.time_step.value()
    }

    /// Reject inputs the physics cannot evaluate.
    ///
    /// # Errors
    /// `BlowingSnowError::InvalidForcing` naming the offending field.
    pub fn validate(&self) -> Result<(), BlowingSnowError> {
        let finite = [
            ("time_step", self.time_step.value()),
            ("air_temperature", self.air_temperature.value()),
            ("surface_liquid_water", self.surface_liquid_water.value()),
            ("wind_speed", self.wind_speed.value()),
            ("latent_heat_sublimation", self.latent_heat_sublimation.value()),
            ("air_density", self.air_density.value()),
            ("vapor_pressure", self.vapor_pressure.value()),
            ("humidity_reference_height", self.humidity_reference_height.value()),
            ("snow_depth", self.snow_depth.value()),
            ("lag_one", self.lag_one),
            ("sigma_slope", self.sigma_slope),
            ("snow_surface_temperature", self.snow_surface_temperature.value()),
            ("fetch", self.fetch.value()),
            ("vegetation.displacement", self.vegetation.displacement.value()),
            ("vegetation.roughness", self.vegetation.roughness.value()),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(BlowingSnowError::invalid_forcing(field, "must be finite"));
            }
        }

        let z0 = self.snow_roughness();
        if !z0.is_finite() || z0 <= 0.0 {
            return Err(BlowingSnowError::invalid_forcing(
                "roughness_lengths[2]",
                "snow roughness length must be positive",
            ));
        }
        if self.humidity_reference_height.value() <= 0.0 {
            return Err(BlowingSnowError::invalid_forcing(
                "humidity_reference_height",
                "must be positive",
            ));
        }
        if self.surface == SurfaceCover::Vegetated && self.fetch.value() <= 0.0 {
            return Err(BlowingSnowError::invalid_forcing(
                "fetch",
                "must be positive over vegetated tiles",
            ));
        }
        Ok(())
    }
}
