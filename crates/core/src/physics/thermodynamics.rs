//! Thermodynamic state of the air above the snowpack
//!
//! Quantities that do not depend on wind speed are computed once per call and
//! shared by every wind interval.
//!
//! # Scientific References
//! - Liston, G.E. and Sturm, M. (1998). "A snow-transport model for complex terrain"
//!   Journal of Glaciology, 44(148), 498-516 (Appendix, eqs. A-7, A-8)
//! - Essery, R., Li, L. and Pomeroy, J. (1999). "A distributed model of blowing snow
//!   over complex terrain" Hydrological Processes, 13, 2423-2438 (eq. 6)

use super::constants::{
    AIR_THERMAL_CONDUCTIVITY, DRY_AIR_GAS_CONSTANT, GAS_CONSTANT, MOLECULAR_WEIGHT_WATER,
};
use crate::config::SaturationCurve;
use crate::core_types::{BlowingSnowForcing, Celsius, Kelvin};

/// Saturation vapor pressure (Pa) by the Tetens formula.
///
/// With `SaturationCurve::IceCorrected`, temperatures below freezing are scaled by
/// `1 + 0.00972 T + 0.000042 T²`.
pub fn saturation_vapor_pressure(temperature: Celsius, curve: SaturationCurve) -> f64 {
    const A_SVP: f64 = 610.78;
    const B_SVP: f64 = 17.269;
    const C_SVP: f64 = 237.3;

    let t = temperature.value();
    let es = A_SVP * ((B_SVP * t) / (C_SVP + t)).exp();
    match curve {
        SaturationCurve::IceCorrected if t < 0.0 => es * (1.0 + 0.00972 * t + 0.000042 * t * t),
        _ => es,
    }
}

/// Latent heat of vaporization (J/kg) at the snow surface temperature
pub fn latent_heat_of_vaporization(snow_surface_temperature: Celsius) -> f64 {
    2.501e6 - 0.002361e6 * snow_surface_temperature.value()
}

/// Saturation density of water vapor (kg/m³), Liston and Sturm eq. A-8
pub fn saturation_vapor_density(es: f64, air_temperature: Kelvin) -> f64 {
    0.622 * es / (DRY_AIR_GAS_CONSTANT * air_temperature.value())
}

/// Diffusivity of water vapor in air (m²/s), Liston and Sturm eq. A-7
pub fn vapor_diffusivity(air_temperature: Kelvin) -> f64 {
    2.06e-5 * (air_temperature.value() / 273.0).powf(1.75)
}

/// Denominator `F` of the particle mass-loss rate `dm/dt` (m·s/kg).
///
/// Sum of the heat-conduction and vapor-diffusion resistances, Essery et al. eq. 6.
pub fn sublimation_denominator(
    latent_heat_sublimation: f64,
    air_temperature: Kelvin,
    es: f64,
) -> f64 {
    let tk = air_temperature.value();
    let ls = latent_heat_sublimation;
    let conduction = (ls / (AIR_THERMAL_CONDUCTIVITY * tk))
        * (ls * MOLECULAR_WEIGHT_WATER / (GAS_CONSTANT * tk) - 1.0);
    let diffusion =
        1.0 / (vapor_diffusivity(air_temperature) * saturation_vapor_density(es, air_temperature));
    conduction + diffusion
}

/// Wind-independent air properties for one call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AirState {
    /// Saturation vapor pressure at air temperature (Pa)
    pub saturation_vapor_pressure: f64,
    /// Actual vapor pressure (Pa)
    pub vapor_pressure: f64,
    /// Sublimation denominator `F`
    pub denominator: f64,
    /// Latent heat of vaporization at the snow surface (J/kg)
    pub latent_heat_vaporization: f64,
    pub air_density: f64,
    /// Humidity reference height (m)
    pub humidity_reference_height: f64,
}

impl AirState {
    pub fn from_forcing(forcing: &BlowingSnowForcing, curve: SaturationCurve) -> Self {
        let es = saturation_vapor_pressure(forcing.air_temperature, curve);
        let tk = forcing.air_temperature.to_kelvin();
        Self {
            saturation_vapor_pressure: es,
            vapor_pressure: forcing.vapor_pressure.value(),
            denominator: sublimation_denominator(forcing.latent_heat_sublimation.value(), tk, es),
            latent_heat_vaporization: latent_heat_of_vaporization(forcing.snow_surface_temperature),
            air_density: forcing.air_density.value(),
            humidity_reference_height: forcing.humidity_reference_height.value(),
        }
    }

    /// Relative humidity minus one; negative when the air is undersaturated
    pub fn undersaturation(&self) -> f64 {
        self.vapor_pressure / self.saturation_vapor_pressure - 1.0
    }

    /// True when there is a vapor-pressure deficit to drive sublimation
    pub fn is_undersaturated(&self) -> bool {
        self.vapor_pressure < self.saturation_vapor_pressure
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn tetens_at_freezing_is_a_svp() {
        let es = saturation_vapor_pressure(Celsius::FREEZING, SaturationCurve::Water);
        assert_relative_eq!(es, 610.78, epsilon = 1e-9);
    }

    #[test]
    fn ice_correction_lowers_cold_svp() {
        let t = Celsius::new(-10.0);
        let water = saturation_vapor_pressure(t, SaturationCurve::Water);
        let ice = saturation_vapor_pressure(t, SaturationCurve::IceCorrected);
        assert_relative_eq!(water, 285.7, epsilon = 0.5);
        assert!(ice < water);
        assert_relative_eq!(ice / water, 1.0 - 0.0972 + 0.0042, epsilon = 1e-12);
    }

    #[test]
    fn ice_correction_ignored_above_freezing() {
        let t = Celsius::new(5.0);
        assert_eq!(
            saturation_vapor_pressure(t, SaturationCurve::Water),
            saturation_vapor_pressure(t, SaturationCurve::IceCorrected)
        );
    }

    #[test]
    fn latent_heat_of_vaporization_decreases_with_temperature() {
        assert_relative_eq!(latent_heat_of_vaporization(Celsius::FREEZING), 2.501e6);
        assert!(
            latent_heat_of_vaporization(Celsius::new(-10.0))
                > latent_heat_of_vaporization(Celsius::new(0.0))
        );
    }

    #[test]
    fn denominator_is_positive_and_order_1e7() {
        let tk = Kelvin::new(263.15);
        let es = saturation_vapor_pressure(Celsius::new(-10.0), SaturationCurve::Water);
        let f = sublimation_denominator(2.838e6, tk, es);
        assert!(f > 1.0e7 && f < 1.0e8, "F = {f}");
    }
}
