//! Sub-grid distribution of the 10 m wind speed
//!
//! The grid-cell wind is treated as the median of a Laplace distribution whose
//! spread grows with terrain slope variability. The range `[0, 2·Uo]` is split
//! into intervals of equal probability mass, and each interval is represented
//! by the conditional expectation of the wind speed inside it.
//!
//! # Scientific References
//! - Bowling, L.C., Pomeroy, J.W. and Lettenmaier, D.P. (2004). "Parameterization
//!   of blowing-snow sublimation in a macroscale hydrology model" Journal of
//!   Hydrometeorology, 5, 745-762

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core_types::{BlowingSnowForcing, SurfaceCover};
use crate::physics::constants::{
    FORCING_WIND_HEIGHT, MAX_REPRESENTATIVE_WIND, MIN_REPRESENTATIVE_WIND, REFERENCE_WIND_HEIGHT,
};

/// Fetch assumed over bare-soil tiles (m)
pub const BARE_SOIL_FETCH: f64 = 1500.0;

/// Slope standard deviation assumed over bare-soil tiles
pub const BARE_SOIL_SIGMA_SLOPE: f64 = 0.0002;

/// Largest wind standard deviation accepted before the fallback is used (m/s)
pub const MAX_WIND_STD_DEV: f64 = 10.0;

/// Wind standard deviation substituted for a runaway value (m/s)
pub const FALLBACK_WIND_STD_DEV: f64 = 0.22;

/// Convert the wind 2 m above the snow to 10 m through the log law over `roughness`
pub fn wind_at_10m(wind: f64, roughness: f64) -> f64 {
    wind * (REFERENCE_WIND_HEIGHT / roughness).ln()
        / ((FORCING_WIND_HEIGHT + roughness) / roughness).ln()
}

/// Clamp a representative wind speed to the range the regressions were fit on
pub fn clamp_representative(wind: f64) -> f64 {
    wind.clamp(MIN_REPRESENTATIVE_WIND, MAX_REPRESENTATIVE_WIND)
}

/// Fetch and slope variability for the tile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainParameters {
    /// Upwind fetch (m)
    pub fetch: f64,
    /// Standard deviation of terrain slope
    pub sigma_slope: f64,
}

impl TerrainParameters {
    /// Bare-soil tiles ignore the forcing fetch and slope and use open-terrain values
    pub fn from_forcing(forcing: &BlowingSnowForcing) -> Self {
        match forcing.surface {
            SurfaceCover::BareSoil => Self {
                fetch: BARE_SOIL_FETCH,
                sigma_slope: BARE_SOIL_SIGMA_SLOPE,
            },
            SurfaceCover::Vegetated => Self {
                fetch: forcing.fetch.value(),
                sigma_slope: forcing.sigma_slope,
            },
        }
    }
}

/// Location and spread of the Laplace wind distribution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindStatistics {
    /// Median 10 m wind speed `Uo` (m/s)
    pub mean: f64,
    /// Spread `sigma_w` (m/s); may be zero or negative for degenerate terrain input
    pub std_dev: f64,
    /// The computed spread was out of range and [`FALLBACK_WIND_STD_DEV`] was used
    pub variance_fallback: Option<f64>,
}

impl WindStatistics {
    /// `sigma_w = Uo · (2.4 − (0.4/0.9)·lag_one) · sigma_slope`
    pub fn new(wind10: f64, lag_one: f64, sigma_slope: f64) -> Self {
        let ratio = (2.4 - (0.4 / 0.9) * lag_one) * sigma_slope;
        let std_dev = wind10 * ratio;
        if std_dev.abs() > MAX_WIND_STD_DEV {
            warn!(
                sigma_w = std_dev,
                wind10,
                lag_one,
                sigma_slope,
                fallback = FALLBACK_WIND_STD_DEV,
                "Wind standard deviation out of range, using fallback"
            );
            return Self {
                mean: wind10,
                std_dev: FALLBACK_WIND_STD_DEV,
                variance_fallback: Some(std_dev),
            };
        }
        Self {
            mean: wind10,
            std_dev,
            variance_fallback: None,
        }
    }

    /// Bounds of equal-probability interval `index` out of `count`.
    ///
    /// The first interval starts at zero and the last ends at `2·Uo`. Bounds are
    /// clamped to be non-negative and a lower bound above the upper collapses
    /// onto it.
    pub fn interval_bounds(&self, index: usize, count: usize) -> (f64, f64) {
        let area = 1.0 / count as f64;
        let p = index as f64;
        let (uo, sigma) = (self.mean, self.std_dev);
        let half = count / 2;

        let (mut lower, mut upper) = if index == 0 {
            (0.0, uo + sigma * (2.0 * (p + 1.0) * area).ln())
        } else if index < half {
            (
                uo + sigma * (2.0 * p * area).ln(),
                uo + sigma * (2.0 * (p + 1.0) * area).ln(),
            )
        } else if index < count - 1 {
            (
                uo - sigma * (2.0 - 2.0 * p * area).ln(),
                uo - sigma * (2.0 - 2.0 * (p + 1.0) * area).ln(),
            )
        } else {
            (uo - sigma * (2.0 - 2.0 * p * area).ln(), 2.0 * uo)
        };

        lower = lower.max(0.0);
        upper = upper.max(0.0);
        if lower > upper {
            lower = upper;
        }
        (lower, upper)
    }

    /// Conditional expectation of the wind speed on `[lower, upper]` for an
    /// interval carrying probability mass `area`.
    ///
    /// `None` when the interval straddles the median, where neither closed form
    /// applies.
    pub fn expected_wind(&self, lower: f64, upper: f64, area: f64) -> Option<f64> {
        let (uo, sigma) = (self.mean, self.std_dev);
        if lower >= uo {
            let tail = |u: f64| (u + sigma) * (-(u - uo) / sigma).exp();
            Some(-0.5 * (tail(upper) - tail(lower)) / area)
        } else if upper <= uo {
            let tail = |u: f64| (u - sigma) * ((u - uo) / sigma).exp();
            Some(0.5 * (tail(upper) - tail(lower)) / area)
        } else {
            None
        }
    }

    /// Split the distribution into `count` representative wind speeds
    pub fn intervals(&self, count: usize) -> Vec<WindInterval> {
        let area = 1.0 / count as f64;
        (0..count)
            .map(|index| {
                let (lower, upper) = self.interval_bounds(index, count);
                let (expected, range_fallback) = match self.expected_wind(lower, upper, area) {
                    Some(u) => (u, false),
                    None => {
                        warn!(
                            index,
                            lower,
                            upper,
                            sigma_w = self.std_dev,
                            uo = self.mean,
                            area,
                            "Problem with probability ranges, using minimum wind"
                        );
                        (MIN_REPRESENTATIVE_WIND, true)
                    }
                };
                WindInterval {
                    index,
                    lower,
                    upper,
                    representative: clamp_representative(expected),
                    range_fallback,
                }
            })
            .collect()
    }
}

/// One equal-probability slice of the wind distribution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindInterval {
    pub index: usize,
    /// Lower bound (m/s)
    pub lower: f64,
    /// Upper bound (m/s)
    pub upper: f64,
    /// Clamped conditional-expectation wind speed (m/s)
    pub representative: f64,
    /// The interval straddled the median and the minimum wind was substituted
    pub range_fallback: bool,
}

/// Reduce the wind for snow partly buried in vegetation.
///
/// Below the effective vegetation height the exposed stems absorb momentum:
/// `U / √(1 + 680·Nd·(hv − depth))`.
pub fn sheltered_wind(wind: f64, snow_depth: f64, height: f64, element_density: f64) -> f64 {
    if snow_depth < height {
        wind / (1.0 + 680.0 * element_density * (height - snow_depth)).sqrt()
    } else {
        wind
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn stats() -> WindStatistics {
        WindStatistics {
            mean: 9.5,
            std_dev: 1.5,
            variance_fallback: None,
        }
    }

    #[test]
    fn log_law_raises_two_metre_wind() {
        let u10 = wind_at_10m(8.0, 0.0005);
        assert!(u10 > 8.0);
        assert_relative_eq!(u10, 8.0 * (20000.0_f64).ln() / (4001.0_f64).ln(), epsilon = 1e-12);
    }

    #[test]
    fn std_dev_follows_slope_and_lag() {
        let s = WindStatistics::new(10.0, 0.9, 0.01);
        assert_relative_eq!(s.std_dev, 10.0 * 2.0 * 0.01, epsilon = 1e-12);
        assert!(s.variance_fallback.is_none());
    }

    #[test]
    fn runaway_std_dev_is_replaced() {
        let s = WindStatistics::new(10.0, 0.0, 1.0);
        assert_eq!(s.std_dev, FALLBACK_WIND_STD_DEV);
        assert_relative_eq!(s.variance_fallback.unwrap_or_default(), 24.0, epsilon = 1e-12);
    }

    #[test]
    fn intervals_tile_zero_to_twice_the_mean() {
        let s = stats();
        let intervals = s.intervals(10);
        assert_eq!(intervals.len(), 10);
        assert_eq!(intervals[0].lower, 0.0);
        assert_eq!(intervals[9].upper, 2.0 * s.mean);
        for pair in intervals.windows(2) {
            assert_relative_eq!(pair[0].upper, pair[1].lower, epsilon = 1e-9);
        }
        for interval in &intervals {
            assert!(interval.lower <= interval.upper);
            assert!(!interval.range_fallback);
            assert!(interval.representative >= interval.lower - 1e-9);
            assert!(interval.representative <= interval.upper + 1e-9);
        }
    }

    #[test]
    fn central_intervals_meet_at_median() {
        let (_, upper) = stats().interval_bounds(4, 10);
        let (lower, _) = stats().interval_bounds(5, 10);
        assert_relative_eq!(upper, 9.5, epsilon = 1e-12);
        assert_relative_eq!(lower, 9.5, epsilon = 1e-12);
    }

    #[test]
    fn representative_winds_are_symmetric_about_median() {
        let s = stats();
        let intervals = s.intervals(10);
        for i in 1..5 {
            let below = s.mean - intervals[i].representative;
            let above = intervals[9 - i].representative - s.mean;
            assert_relative_eq!(below, above, epsilon = 1e-9);
        }
    }

    #[test]
    fn straddling_interval_has_no_closed_form() {
        assert!(stats().expected_wind(9.0, 10.0, 0.1).is_none());
    }

    #[test]
    fn negative_spread_triggers_range_fallback() {
        let s = WindStatistics::new(9.5, 0.8, -0.0003);
        assert!(s.std_dev < 0.0);
        let intervals = s.intervals(10);
        assert!(intervals[0].range_fallback);
        assert_eq!(intervals[0].representative, MIN_REPRESENTATIVE_WIND);
        for interval in &intervals {
            assert!((0.4..=25.0).contains(&interval.representative));
        }
    }

    #[test]
    fn representative_wind_is_clamped() {
        assert_eq!(clamp_representative(0.0), 0.4);
        assert_eq!(clamp_representative(40.0), 25.0);
        assert_eq!(clamp_representative(7.0), 7.0);
    }

    #[test]
    fn burial_reduces_wind_only_below_vegetation_height() {
        let density = 4.0 / 30.0;
        assert_eq!(sheltered_wind(10.0, 0.3, 0.15, density), 10.0);
        let reduced = sheltered_wind(10.0, 0.05, 0.15, density);
        assert_relative_eq!(
            reduced,
            10.0 / (1.0 + 680.0 * density * 0.1).sqrt(),
            epsilon = 1e-12
        );
    }
}
