//! Semantic unit types for type-safe physical quantity handling
//!
//! Newtype wrappers keep the forcing bundle honest about its units: a wind speed
//! cannot be passed where a roughness length is expected, and air temperature in
//! Celsius is never confused with the Kelvin value used by the thermodynamics.
//!
//! # Design Philosophy
//! - Every quantity wraps `f64`; the suspension-layer quadrature and the Newton
//!   shear solve both need double precision end to end
//! - Common traits (Ord, Deref, Display, From) come from one macro so each type
//!   only spells out what is specific to it (validation, conversions)
//! - Serde support for serialization of forcing records
//! - Total ordering via Ord trait (NaN handled as greater than all values)
//!
//! # Usage
//! ```
//! use blowing_snow_core::core_types::units::{Celsius, Kelvin, MetersPerSecond};
//!
//! let temp = Celsius::new(-10.0);
//! let kelvin: Kelvin = temp.into();
//! assert!((*kelvin - 263.15).abs() < 1e-9);
//!
//! let slow = MetersPerSecond::new(2.0);
//! let fast = MetersPerSecond::new(9.0);
//! assert_eq!(slow.max(fast), fast);
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Deref, Mul, Sub};

/// Shared trait plumbing for `f64` quantity newtypes.
macro_rules! scalar_unit {
    ($name:ident, $suffix:literal, $precision:literal) => {
        impl Eq for $name {}

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> Ordering {
                self.0.total_cmp(&other.0)
            }
        }

        impl Deref for $name {
            type Target = f64;
            #[inline]
            fn deref(&self) -> &f64 {
                &self.0
            }
        }

        impl From<$name> for f64 {
            fn from(v: $name) -> f64 {
                v.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!("{:.", $precision, "} ", $suffix), self.0)
            }
        }
    };
}

// ============================================================================
// TEMPERATURE TYPES
// ============================================================================

/// Temperature in degrees Celsius
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Celsius(f64);

scalar_unit!(Celsius, "°C", 2);

impl Celsius {
    /// Celsius to Kelvin conversion offset (0°C = 273.15 K)
    const CELSIUS_KELVIN_OFFSET: f64 = 273.15;

    /// Water freezing point
    pub const FREEZING: Celsius = Celsius(0.0);

    /// Create a new Celsius temperature. Asserts value >= absolute zero (-273.15°C).
    #[inline]
    #[must_use]
    #[track_caller]
    pub const fn new(value: f64) -> Self {
        assert!(
            value >= -Self::CELSIUS_KELVIN_OFFSET,
            "Celsius::new: value is below absolute zero (-273.15°C)"
        );
        Celsius(value)
    }

    /// Get the raw f64 value
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Convert to Kelvin
    #[inline]
    #[must_use]
    pub fn to_kelvin(self) -> Kelvin {
        Kelvin(self.0 + Self::CELSIUS_KELVIN_OFFSET)
    }
}

impl From<Celsius> for Kelvin {
    fn from(c: Celsius) -> Kelvin {
        c.to_kelvin()
    }
}

impl From<f64> for Celsius {
    fn from(v: f64) -> Self {
        Celsius(v)
    }
}

/// Absolute temperature in Kelvin
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Kelvin(f64);

scalar_unit!(Kelvin, "K", 2);

impl Kelvin {
    /// Create a new absolute temperature. Asserts value >= 0 K.
    #[inline]
    #[must_use]
    #[track_caller]
    pub const fn new(value: f64) -> Self {
        assert!(value >= 0.0, "Kelvin::new: negative absolute temperature");
        Kelvin(value)
    }

    /// Get the raw f64 value
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Convert to Celsius
    #[inline]
    #[must_use]
    pub fn to_celsius(self) -> Celsius {
        Celsius(self.0 - Celsius::CELSIUS_KELVIN_OFFSET)
    }
}

// ============================================================================
// LENGTH / VELOCITY / TIME
// ============================================================================

/// Length in meters (heights, depths, roughness lengths, fetch)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Meters(f64);

scalar_unit!(Meters, "m", 4);

impl Meters {
    /// Create a new length. Negative values are accepted: a snow depth below
    /// zero is a valid "no snowpack" signal from the host model.
    #[inline]
    #[must_use]
    pub const fn new(value: f64) -> Self {
        Meters(value)
    }

    /// Get the raw f64 value
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<f64> for Meters {
    fn from(v: f64) -> Self {
        Meters(v)
    }
}

impl Add for Meters {
    type Output = Meters;
    fn add(self, rhs: Meters) -> Meters {
        Meters(self.0 + rhs.0)
    }
}

impl Sub for Meters {
    type Output = Meters;
    fn sub(self, rhs: Meters) -> Meters {
        Meters(self.0 - rhs.0)
    }
}

impl Mul<f64> for Meters {
    type Output = Meters;
    fn mul(self, rhs: f64) -> Meters {
        Meters(self.0 * rhs)
    }
}

/// Velocity in meters per second
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct MetersPerSecond(f64);

scalar_unit!(MetersPerSecond, "m/s", 2);

impl MetersPerSecond {
    /// Create a new speed. Asserts value >= 0.
    #[inline]
    #[must_use]
    #[track_caller]
    pub const fn new(value: f64) -> Self {
        assert!(value >= 0.0, "MetersPerSecond::new: negative speed is invalid");
        MetersPerSecond(value)
    }

    /// Get the raw f64 value
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Clamp into an inclusive speed range
    #[inline]
    #[must_use]
    pub fn clamp_to(self, min: f64, max: f64) -> Self {
        MetersPerSecond(self.0.clamp(min, max))
    }
}

impl Mul<f64> for MetersPerSecond {
    type Output = MetersPerSecond;
    fn mul(self, rhs: f64) -> MetersPerSecond {
        MetersPerSecond(self.0 * rhs)
    }
}

/// Duration in hours (model time step)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Hours(f64);

scalar_unit!(Hours, "h", 2);

impl Hours {
    /// Create a new duration. Asserts value >= 0.
    #[inline]
    #[must_use]
    #[track_caller]
    pub const fn new(value: f64) -> Self {
        assert!(value >= 0.0, "Hours::new: negative duration is invalid");
        Hours(value)
    }

    /// Get the raw f64 value
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

// ============================================================================
// THERMODYNAMIC QUANTITIES
// ============================================================================

/// Pressure in Pascals (air pressure, vapor pressure)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Pascals(f64);

scalar_unit!(Pascals, "Pa", 1);

impl Pascals {
    /// Create a new pressure. Asserts value >= 0.
    #[inline]
    #[must_use]
    #[track_caller]
    pub const fn new(value: f64) -> Self {
        assert!(value >= 0.0, "Pascals::new: negative pressure is invalid");
        Pascals(value)
    }

    /// Get the raw f64 value
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

/// Density in kg/m³
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct KgPerCubicMeter(f64);

scalar_unit!(KgPerCubicMeter, "kg/m³", 3);

impl KgPerCubicMeter {
    /// Create a new density. Asserts value > 0.
    #[inline]
    #[must_use]
    #[track_caller]
    pub const fn new(value: f64) -> Self {
        assert!(value > 0.0, "KgPerCubicMeter::new: density must be positive");
        KgPerCubicMeter(value)
    }

    /// Get the raw f64 value
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

/// Specific latent heat in J/kg
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct JoulesPerKg(f64);

scalar_unit!(JoulesPerKg, "J/kg", 0);

impl JoulesPerKg {
    /// Create a new specific energy. Asserts value > 0.
    #[inline]
    #[must_use]
    #[track_caller]
    pub const fn new(value: f64) -> Self {
        assert!(value > 0.0, "JoulesPerKg::new: latent heat must be positive");
        JoulesPerKg(value)
    }

    /// Get the raw f64 value
    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}
