//! FFI-exposed input and option types.
//!
//! `BlowingSnowInputs` mirrors the argument list a host energy-balance routine
//! passes for one grid cell and time step. `BlowingSnowOptions` exposes the
//! model variant switches as plain flags.

use blowing_snow_core::{
    BlowingSnowConfig, BlowingSnowForcing, Celsius, FluxModel, Hours, JoulesPerKg,
    KgPerCubicMeter, Meters, MetersPerSecond, OccurrenceModel, Pascals, SaturationCurve,
    SurfaceCover, ThresholdModel, VegetationGeometry, WindDistribution,
};

use crate::error::DefaultBlowingSnowError;

/// Meteorological and surface-state inputs for one evaluation.
///
/// FFI-safe with a stable C layout (`#[repr(C)]`). All quantities are SI
/// unless noted.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlowingSnowInputs {
    /// Model time step (hours).
    pub dt: f64,
    /// Air temperature (°C).
    pub air_temp: f64,
    /// Time steps since the last snowfall.
    pub last_snow: i32,
    /// Liquid water in the surface layer (m).
    pub surface_liquid_water: f64,
    /// Wind speed 2 m above the snow surface (m/s).
    pub wind: f64,
    /// Latent heat of sublimation (J/kg).
    pub ls: f64,
    /// Air density (kg/m³).
    pub air_dens: f64,
    /// Air pressure (Pa).
    pub press: f64,
    /// Actual vapor pressure of the air (Pa).
    pub vapor_pressure: f64,
    /// Roughness lengths by surface type (m); entry 2 is the snow surface.
    pub zo: [f64; 3],
    /// Humidity reference height (m).
    pub zrh: f64,
    /// Snow depth (m).
    pub snow_depth: f64,
    /// Lag-one autocorrelation of terrain.
    pub lag_one: f64,
    /// Standard deviation of terrain slope.
    pub sigma_slope: f64,
    /// Snow surface temperature (°C).
    pub snow_surface_temp: f64,
    /// Vegetation class index of this tile.
    pub iveg: i32,
    /// Number of vegetation classes; `iveg == nveg` marks the bare-soil tile.
    pub nveg: i32,
    /// Upwind fetch (m).
    pub fetch: f64,
    /// Vegetation displacement height (m).
    pub displacement: f64,
    /// Vegetation roughness length (m).
    pub roughness: f64,
}

/// Model variant switches.
///
/// Obtain the reference settings from `blowing_snow_default_options()` and
/// override individual flags.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct BlowingSnowOptions {
    /// Use the single-layer scaling law instead of saltation plus suspension.
    pub simple: bool,
    /// Average over the sub-grid wind distribution.
    pub spatial_wind: bool,
    /// Use the temperature-dependent threshold shear velocity.
    pub variable_threshold: bool,
    /// Apply the fetch correction to saltation transport.
    pub fetch: bool,
    /// Compute the occurrence probability (otherwise blowing snow always occurs).
    pub calc_prob: bool,
    /// Apply the below-freezing correction to saturation vapor pressure.
    pub ice_saturation: bool,
    /// Number of equal-probability wind intervals (even, at least 2).
    pub wind_increments: u32,
}

impl Default for BlowingSnowOptions {
    fn default() -> Self {
        Self::from(&BlowingSnowConfig::default())
    }
}

impl From<&BlowingSnowConfig> for BlowingSnowOptions {
    fn from(config: &BlowingSnowConfig) -> Self {
        Self {
            simple: config.flux_model == FluxModel::Simple,
            spatial_wind: config.wind_distribution == WindDistribution::Spatial,
            variable_threshold: config.threshold == ThresholdModel::Variable,
            fetch: config.fetch_correction,
            calc_prob: config.occurrence == OccurrenceModel::Statistical,
            ice_saturation: config.saturation == SaturationCurve::IceCorrected,
            wind_increments: u32::try_from(config.wind_increments).unwrap_or(u32::MAX),
        }
    }
}

impl BlowingSnowOptions {
    pub(crate) fn to_config(self) -> Result<BlowingSnowConfig, DefaultBlowingSnowError> {
        let config = BlowingSnowConfig {
            flux_model: if self.simple {
                FluxModel::Simple
            } else {
                FluxModel::Full
            },
            wind_distribution: if self.spatial_wind {
                WindDistribution::Spatial
            } else {
                WindDistribution::Uniform
            },
            threshold: if self.variable_threshold {
                ThresholdModel::Variable
            } else {
                ThresholdModel::Constant
            },
            occurrence: if self.calc_prob {
                OccurrenceModel::Statistical
            } else {
                OccurrenceModel::Constant
            },
            saturation: if self.ice_saturation {
                SaturationCurve::IceCorrected
            } else {
                SaturationCurve::Water
            },
            fetch_correction: self.fetch,
            wind_increments: self.wind_increments as usize,
            ..BlowingSnowConfig::default()
        };
        config
            .validate()
            .map_err(|e| DefaultBlowingSnowError::invalid_option(e.to_string()))?;
        Ok(config)
    }
}

fn finite(name: &str, value: f64) -> Result<f64, DefaultBlowingSnowError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DefaultBlowingSnowError::invalid_input(name, value, "must be finite"))
    }
}

fn non_negative(name: &str, value: f64) -> Result<f64, DefaultBlowingSnowError> {
    if finite(name, value)? >= 0.0 {
        Ok(value)
    } else {
        Err(DefaultBlowingSnowError::invalid_input(name, value, "must not be negative"))
    }
}

fn positive(name: &str, value: f64) -> Result<f64, DefaultBlowingSnowError> {
    if finite(name, value)? > 0.0 {
        Ok(value)
    } else {
        Err(DefaultBlowingSnowError::invalid_input(name, value, "must be positive"))
    }
}

fn temperature(name: &str, value: f64) -> Result<Celsius, DefaultBlowingSnowError> {
    if finite(name, value)? >= -273.15 {
        Ok(Celsius::new(value))
    } else {
        Err(DefaultBlowingSnowError::invalid_input(name, value, "is below absolute zero"))
    }
}

impl BlowingSnowInputs {
    /// Range-check every field and build the typed forcing record.
    ///
    /// Checks run before the unit constructors so that no invalid value from C
    /// reaches an assertion.
    pub(crate) fn to_forcing(self) -> Result<BlowingSnowForcing, DefaultBlowingSnowError> {
        let last_snow = u32::try_from(self.last_snow).map_err(|_| {
            DefaultBlowingSnowError::invalid_input(
                "last_snow",
                f64::from(self.last_snow),
                "must not be negative",
            )
        })?;
        let surface = if self.iveg == self.nveg {
            SurfaceCover::BareSoil
        } else {
            SurfaceCover::Vegetated
        };

        Ok(BlowingSnowForcing {
            time_step: Hours::new(non_negative("dt", self.dt)?),
            air_temperature: temperature("air_temp", self.air_temp)?,
            steps_since_snowfall: last_snow,
            surface_liquid_water: Meters::new(finite(
                "surface_liquid_water",
                self.surface_liquid_water,
            )?),
            wind_speed: MetersPerSecond::new(non_negative("wind", self.wind)?),
            latent_heat_sublimation: JoulesPerKg::new(positive("ls", self.ls)?),
            air_density: KgPerCubicMeter::new(positive("air_dens", self.air_dens)?),
            air_pressure: Pascals::new(non_negative("press", self.press)?),
            vapor_pressure: Pascals::new(non_negative("vapor_pressure", self.vapor_pressure)?),
            roughness_lengths: [
                Meters::new(finite("zo[0]", self.zo[0])?),
                Meters::new(finite("zo[1]", self.zo[1])?),
                Meters::new(finite("zo[2]", self.zo[2])?),
            ],
            humidity_reference_height: Meters::new(finite("zrh", self.zrh)?),
            snow_depth: Meters::new(finite("snow_depth", self.snow_depth)?),
            lag_one: finite("lag_one", self.lag_one)?,
            sigma_slope: finite("sigma_slope", self.sigma_slope)?,
            snow_surface_temperature: temperature("snow_surface_temp", self.snow_surface_temp)?,
            surface,
            fetch: Meters::new(finite("fetch", self.fetch)?),
            vegetation: VegetationGeometry {
                displacement: Meters::new(finite("displacement", self.displacement)?),
                roughness: Meters::new(finite("roughness", self.roughness)?),
            },
        })
    }
}
