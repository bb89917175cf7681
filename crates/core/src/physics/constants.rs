//! Physical and empirical constants for blowing-snow sublimation

/// Standard gravity (m/s²)
pub const G_STD: f64 = 9.80616;

/// Von Kármán constant
pub const VON_KARMAN: f64 = 0.40;

/// Density of ice (kg/m³)
pub const ICE_DENSITY: f64 = 917.0;

/// Molecular weight of water (kg/mol)
pub const MOLECULAR_WEIGHT_WATER: f64 = 18.016e-3;

/// Universal gas constant (J/(mol·K))
pub const GAS_CONSTANT: f64 = 8.3143;

/// Gas constant for dry air (J/(kg·K)), used in the saturation vapor density
pub const DRY_AIR_GAS_CONSTANT: f64 = 287.0;

/// Thermal conductivity of air (W/(m·K))
pub const AIR_THERMAL_CONDUCTIVITY: f64 = 0.0245187;

/// Kinematic viscosity of air (m²/s)
pub const KINEMATIC_VISCOSITY: f64 = 1.3e-5;

/// Saltation transport constant (Liston and Sturm 1998)
pub const SALTATION_CONSTANT: f64 = 0.68;

/// Fixed threshold shear velocity (m/s)
pub const UTHRESH: f64 = 0.25;

/// Particle settling velocity in the suspension layer (m/s)
pub const SETTLING_VELOCITY: f64 = 0.3;

/// Horizontal saltating particle speed per unit threshold shear velocity
/// (Pomeroy and Gray 1990)
pub const PARTICLE_SPEED_RATIO: f64 = 2.8;

/// Charnock-type coefficient linking saltation roughness to `u*²/(2g)`
pub const SALTATION_ROUGHNESS_COEFF: f64 = 0.12;

/// Height of the 10 m wind
pub const REFERENCE_WIND_HEIGHT: f64 = 10.0;

/// Height of the wind supplied by the host model, above the snow surface
pub const FORCING_WIND_HEIGHT: f64 = 2.0;

/// Liquid water depth (m) separating dry from wet surface snow
pub const WET_SNOW_LIQUID_WATER: f64 = 0.001;

/// Floor applied to the returned flux (kg/(m²·s))
pub const MIN_SUBLIMATION_FLUX: f64 = -5.0e-5;

/// Bounds on the representative 10 m wind speed per interval (m/s)
pub const MIN_REPRESENTATIVE_WIND: f64 = 0.4;
pub const MAX_REPRESENTATIVE_WIND: f64 = 25.0;
