//! Blowing-Snow Sublimation Validation Suite
//!
//! Checks the numerical kernels and the flux driver against closed-form results
//! and against invariants that must hold for every physically valid forcing.
//!
//! # Test Categories
//! 1. Romberg quadrature exactness and convergence
//! 2. Safeguarded Newton root finding
//! 3. Occurrence probability and threshold regressions
//! 4. Driver invariants (no snow, saturated air, wind clamping, flux bounds)
//! 5. Reference scenario end to end
//!
//! Randomized sweeps use a fixed seed so failures are reproducible.
//!
//! Run tests with: `cargo test --test sublimation_validation`

use approx::assert_relative_eq;
use blowing_snow_core::{
    config::{FluxModel, OccurrenceModel, ThresholdModel, WindDistribution},
    core_types::{
        Celsius, Hours, JoulesPerKg, KgPerCubicMeter, Meters, MetersPerSecond, Pascals,
        SurfaceCover, VegetationGeometry,
    },
    numerics::{newton_safe, romberg, RombergSettings},
    physics::{
        constants::MIN_SUBLIMATION_FLUX, occurrence_probability, saturation_vapor_pressure,
        threshold_shear_velocity, SnowSurfaceState,
    },
    sublimation_flux, sublimation_flux_batch, BlowingSnowConfig, BlowingSnowError,
    BlowingSnowForcing, NumericsError, SaturationCurve,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Scenario from the reference test case: -10°C, 8 m/s at 2 m, 48 h old snow
fn reference_forcing() -> BlowingSnowForcing {
    BlowingSnowForcing {
        time_step: Hours::new(3.0),
        air_temperature: Celsius::new(-10.0),
        steps_since_snowfall: 16,
        surface_liquid_water: Meters::new(0.0),
        wind_speed: MetersPerSecond::new(8.0),
        latent_heat_sublimation: JoulesPerKg::new(2.838e6),
        air_density: KgPerCubicMeter::new(1.3),
        air_pressure: Pascals::new(85000.0),
        vapor_pressure: Pascals::new(260.0),
        roughness_lengths: [Meters::new(0.01), Meters::new(0.01), Meters::new(0.0005)],
        humidity_reference_height: Meters::new(2.0),
        snow_depth: Meters::new(0.3),
        lag_one: 0.8,
        sigma_slope: 0.0003,
        snow_surface_temperature: Celsius::new(-10.0),
        surface: SurfaceCover::Vegetated,
        fetch: Meters::new(300.0),
        vegetation: VegetationGeometry {
            displacement: Meters::new(0.1),
            roughness: Meters::new(0.01),
        },
    }
}

/// A physically valid forcing record with every field drawn at random
fn random_forcing(rng: &mut StdRng) -> BlowingSnowForcing {
    let tair = rng.random_range(-30.0..-0.5);
    let es = saturation_vapor_pressure(Celsius::new(tair), SaturationCurve::Water);
    let z0 = rng.random_range(1.0e-4..0.01);
    BlowingSnowForcing {
        time_step: Hours::new([1.0, 3.0, 24.0][rng.random_range(0..3)]),
        air_temperature: Celsius::new(tair),
        steps_since_snowfall: rng.random_range(0..200),
        surface_liquid_water: Meters::new(rng.random_range(0.0..0.003)),
        wind_speed: MetersPerSecond::new(rng.random_range(0.0..25.0)),
        latent_heat_sublimation: JoulesPerKg::new(2.838e6),
        air_density: KgPerCubicMeter::new(rng.random_range(1.0..1.45)),
        air_pressure: Pascals::new(rng.random_range(60000.0..101325.0)),
        vapor_pressure: Pascals::new(es * rng.random_range(0.3..1.0)),
        roughness_lengths: [Meters::new(0.01), Meters::new(0.01), Meters::new(z0)],
        humidity_reference_height: Meters::new(rng.random_range(1.0..10.0)),
        snow_depth: Meters::new(rng.random_range(0.01..2.0)),
        lag_one: rng.random_range(0.0..1.0),
        sigma_slope: rng.random_range(0.0..0.003),
        snow_surface_temperature: Celsius::new(tair.min(0.0)),
        surface: if rng.random_bool(0.2) {
            SurfaceCover::BareSoil
        } else {
            SurfaceCover::Vegetated
        },
        fetch: Meters::new(rng.random_range(20.0..5000.0)),
        vegetation: VegetationGeometry {
            displacement: Meters::new(rng.random_range(0.0..2.0)),
            roughness: Meters::new(rng.random_range(0.0..0.3)),
        },
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SECTION 1: ROMBERG QUADRATURE
// ═══════════════════════════════════════════════════════════════════════════════

/// Polynomials up to degree four are integrated exactly within the first
/// extrapolation window.
#[test]
fn test_romberg_exact_for_low_degree_polynomials() {
    let mut rng = StdRng::seed_from_u64(0x5EED_0001);
    let settings = RombergSettings::default();
    for _ in 0..200 {
        let c: [f64; 5] = std::array::from_fn(|_| rng.random_range(-3.0..3.0));
        let a = rng.random_range(-5.0..5.0);
        let b = a + rng.random_range(0.1..6.0);
        let poly = |x: f64| c[0] + x * (c[1] + x * (c[2] + x * (c[3] + x * c[4])));
        let antiderivative = |x: f64| {
            x * (c[0] + x * (c[1] / 2.0 + x * (c[2] / 3.0 + x * (c[3] / 4.0 + x * c[4] / 5.0))))
        };
        let exact = antiderivative(b) - antiderivative(a);

        let q = romberg(a, b, &settings, poly).unwrap();
        assert!(q.refinements <= 5, "took {} refinements", q.refinements);
        let scale = exact.abs().max(1.0);
        assert!(
            (q.value - exact).abs() <= 1e-6 * scale,
            "integral {} vs exact {}",
            q.value,
            exact
        );
    }
}

/// Smooth integrands converge and the error estimate honours the tolerance.
#[test]
fn test_romberg_smooth_integrands_converge() {
    let settings = RombergSettings::default();
    let q = romberg(0.0, std::f64::consts::PI, &settings, f64::sin).unwrap();
    assert_relative_eq!(q.value, 2.0, max_relative = 1e-6);
    assert!(q.error_estimate.abs() <= settings.tolerance * q.value.abs());

    let q = romberg(1.0, 8.0, &settings, |z: f64| z.powf(-2.5)).unwrap();
    let exact = (1.0 - 8.0_f64.powf(-1.5)) / 1.5;
    assert_relative_eq!(q.value, exact, max_relative = 1e-5);
}

/// Tightening the tolerance never needs fewer refinements.
#[test]
fn test_romberg_refinements_grow_with_tolerance() {
    let f = |x: f64| (-x * x).exp();
    let coarse = RombergSettings {
        tolerance: 1e-4,
        ..RombergSettings::default()
    };
    let fine = RombergSettings {
        tolerance: 1e-12,
        ..RombergSettings::default()
    };
    let a = romberg(0.0, 3.0, &coarse, f).unwrap();
    let b = romberg(0.0, 3.0, &fine, f).unwrap();
    assert!(b.refinements >= a.refinements);
    assert!(b.error_estimate.abs() <= a.error_estimate.abs());
}

/// For a smooth integrand the error estimate shrinks with every extra
/// refinement until it reaches round-off.
#[test]
fn test_romberg_error_estimate_does_not_grow() {
    let exact = 10.0_f64.exp() - 1.0;
    let roundoff = 1e-13 * exact;
    let never_satisfied = |max_refinements| RombergSettings {
        tolerance: 0.0,
        max_refinements,
    };

    let estimates: Vec<f64> = (5..=12)
        .map(|stages| match romberg(0.0, 10.0, &never_satisfied(stages), f64::exp) {
            Err(NumericsError::NotConverged {
                refinements,
                error_estimate,
                ..
            }) => {
                assert_eq!(refinements, stages);
                error_estimate
            }
            Ok(q) => q.error_estimate,
            Err(other) => panic!("unexpected error {other:?}"),
        })
        .collect();

    for pair in estimates.windows(2) {
        assert!(
            pair[1] <= pair[0].max(roundoff),
            "error estimate grew from {} to {}",
            pair[0],
            pair[1]
        );
    }
    assert!(estimates[0] > 1e3 * estimates[3]);
    assert!(*estimates.last().unwrap() < roundoff);
}

/// Zero-width intervals are rejected rather than refined.
#[test]
fn test_romberg_zero_width_interval_is_an_error() {
    let err = romberg(0.25, 0.25, &RombergSettings::default(), |x| x).unwrap_err();
    assert_eq!(err, NumericsError::DegenerateInterval { at: 0.25 });
}

// ═══════════════════════════════════════════════════════════════════════════════
// SECTION 2: SAFEGUARDED NEWTON
// ═══════════════════════════════════════════════════════════════════════════════

/// Every bracketed root of a random monotone cubic is found to tolerance.
#[test]
fn test_newton_finds_bracketed_roots() {
    let mut rng = StdRng::seed_from_u64(0x5EED_0002);
    for _ in 0..500 {
        let root = rng.random_range(-10.0..10.0);
        let slope = rng.random_range(0.1..5.0);
        let cubic = rng.random_range(0.0..2.0);
        let eq = move |x: f64| {
            let d = x - root;
            (slope * d + cubic * d * d * d, slope + 3.0 * cubic * d * d)
        };
        let lower = root - rng.random_range(0.01..20.0);
        let upper = root + rng.random_range(0.01..20.0);

        let outcome = newton_safe(&eq, lower, upper, 1e-10).unwrap();
        assert!(outcome.is_converged());
        let x = outcome.value_or(f64::NAN);
        assert!((x - root).abs() < 1e-8, "root {} vs {}", x, root);
        assert!(eq(x).0.abs() < 1e-6);
    }
}

/// Same-sign end points always produce the bracketing error.
#[test]
fn test_newton_rejects_unbracketed_interval() {
    let mut rng = StdRng::seed_from_u64(0x5EED_0003);
    for _ in 0..100 {
        let offset = rng.random_range(0.1..10.0);
        let eq = move |x: f64| (x * x + offset, 2.0 * x);
        let lower = rng.random_range(-5.0..0.0);
        let upper = rng.random_range(0.0..5.0);
        assert!(matches!(
            newton_safe(&eq, lower, upper, 1e-9),
            Err(NumericsError::NotBracketed { .. })
        ));
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SECTION 3: OCCURRENCE AND THRESHOLD
// ═══════════════════════════════════════════════════════════════════════════════

/// Dry snow never blows at or below 3 m/s; above that the probability rises with wind.
#[test]
fn test_dry_snow_occurrence_cutoff_and_monotonicity() {
    let mut rng = StdRng::seed_from_u64(0x5EED_0004);
    for _ in 0..200 {
        let state = SnowSurfaceState {
            air_temperature: rng.random_range(-30.0..0.0),
            age_hours: rng.random_range(1.0..500.0),
            liquid_water: rng.random_range(0.0..0.001),
        };
        let below = rng.random_range(0.0..=3.0);
        assert_eq!(
            occurrence_probability(&state, below, OccurrenceModel::Statistical),
            0.0
        );

        let mut previous = 0.0;
        let mut u = 3.0;
        while u < 30.0 {
            u += rng.random_range(0.01..1.0);
            let p = occurrence_probability(&state, u, OccurrenceModel::Statistical);
            assert!((0.0..=1.0).contains(&p));
            assert!(p >= previous, "probability fell from {previous} to {p} at {u}");
            previous = p;
        }
    }
}

/// The constant threshold is 0.25 m/s whatever the inputs.
#[test]
fn test_constant_threshold_is_fixed() {
    let mut rng = StdRng::seed_from_u64(0x5EED_0005);
    for _ in 0..200 {
        let state = SnowSurfaceState {
            air_temperature: rng.random_range(-40.0..5.0),
            age_hours: rng.random_range(0.0..500.0),
            liquid_water: rng.random_range(0.0..0.01),
        };
        let ut = threshold_shear_velocity(
            &state,
            rng.random_range(0.4..25.0),
            rng.random_range(1e-5..0.1),
            rng.random_range(0.0..1.0),
            rng.random_range(0.0..2.0),
            ThresholdModel::Constant,
        );
        assert_eq!(ut, 0.25);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SECTION 4: DRIVER INVARIANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// No snowpack means exactly zero flux, even for otherwise extreme forcing.
#[test]
fn test_no_snow_gives_zero_flux() {
    let mut rng = StdRng::seed_from_u64(0x5EED_0006);
    for _ in 0..100 {
        let mut f = random_forcing(&mut rng);
        f.snow_depth = Meters::new(rng.random_range(-1.0..=0.0));
        f.lag_one = f64::NAN;
        let result = sublimation_flux(&f, &BlowingSnowConfig::default()).unwrap();
        assert_eq!(result.flux, 0.0);
    }
}

/// Saturated or supersaturated air never sublimates at any wind speed.
#[test]
fn test_saturated_air_gives_zero_flux() {
    let mut rng = StdRng::seed_from_u64(0x5EED_0007);
    for _ in 0..60 {
        let mut f = random_forcing(&mut rng);
        let es = saturation_vapor_pressure(f.air_temperature, SaturationCurve::Water);
        f.vapor_pressure = Pascals::new(es * rng.random_range(1.0..1.5));
        let result = sublimation_flux(&f, &BlowingSnowConfig::default()).unwrap();
        assert!(result.increments.iter().all(|inc| inc.flux == 0.0));
        assert_eq!(result.flux, 0.0);
    }
}

/// Representative winds stay in [0.4, 25] m/s and the flux stays in [floor, 0].
#[test]
fn test_random_forcing_respects_bounds() {
    let mut rng = StdRng::seed_from_u64(0x5EED_0008);
    let configs = [
        BlowingSnowConfig::default(),
        BlowingSnowConfig::default().with_wind_distribution(WindDistribution::Uniform),
        BlowingSnowConfig::default().with_threshold(ThresholdModel::Constant),
        BlowingSnowConfig::default().with_fetch_correction(false),
    ];
    for _ in 0..60 {
        let f = random_forcing(&mut rng);
        for config in &configs {
            let result = sublimation_flux(&f, config).unwrap();
            for inc in &result.increments {
                assert!(
                    (0.4..=25.0).contains(&inc.wind_speed),
                    "wind {} out of range",
                    inc.wind_speed
                );
                assert!(inc.shear.shear_velocity > 0.0);
                assert!((0.0..=1.0).contains(&inc.occurrence_probability));
            }
            assert!(result.flux <= 0.0, "flux {} positive", result.flux);
            assert!(result.flux >= MIN_SUBLIMATION_FLUX);
        }
    }
}

/// Doubling the vapor-pressure deficit never weakens sublimation.
#[test]
fn test_drier_air_sublimates_more() {
    let mut drier = reference_forcing();
    drier.vapor_pressure = Pascals::new(200.0);
    let config = BlowingSnowConfig::default();
    let base = sublimation_flux(&reference_forcing(), &config).unwrap();
    let dry = sublimation_flux(&drier, &config).unwrap();
    assert!(dry.flux < base.flux);
}

/// The batch API agrees with one-at-a-time evaluation.
#[test]
fn test_batch_matches_serial() {
    let mut rng = StdRng::seed_from_u64(0x5EED_0009);
    let forcings: Vec<_> = (0..32).map(|_| random_forcing(&mut rng)).collect();
    let config = BlowingSnowConfig::default();
    let batch = sublimation_flux_batch(&forcings, &config);
    for (forcing, parallel) in forcings.iter().zip(&batch) {
        let serial = sublimation_flux(forcing, &config).unwrap();
        assert_eq!(parallel.as_ref().unwrap().flux, serial.flux);
    }
}

/// Configuration mistakes surface before any physics runs.
#[test]
fn test_invalid_config_is_an_error() {
    let mut config = BlowingSnowConfig::default();
    config.integration.tolerance = -1.0;
    assert!(matches!(
        sublimation_flux(&reference_forcing(), &config),
        Err(BlowingSnowError::Config(_))
    ));
}

// ═══════════════════════════════════════════════════════════════════════════════
// SECTION 5: REFERENCE SCENARIO
// ═══════════════════════════════════════════════════════════════════════════════

/// The reference scenario sublimates without hitting the floor.
#[test]
fn test_reference_scenario_end_to_end() {
    let result = sublimation_flux(&reference_forcing(), &BlowingSnowConfig::default()).unwrap();
    assert!(result.flux < 0.0, "flux = {}", result.flux);
    assert!(result.flux >= MIN_SUBLIMATION_FLUX);
    assert!(result.anomalies.is_empty(), "{:?}", result.anomalies);

    let wind = result.wind.unwrap();
    assert!(wind.mean > 9.0 && wind.mean < 10.0);
    for inc in &result.increments {
        assert!(inc.occurrence_probability > 0.1 && inc.occurrence_probability < 0.4);
        assert!(inc.shear.shear_velocity > inc.threshold_shear);
    }
}

/// One-hour time steps age the snow less and raise the occurrence probability.
#[test]
fn test_reference_scenario_hourly_step() {
    let mut hourly = reference_forcing();
    hourly.time_step = Hours::new(1.0);
    let config = BlowingSnowConfig::default();
    let three_hourly = sublimation_flux(&reference_forcing(), &config).unwrap();
    let result = sublimation_flux(&hourly, &config).unwrap();
    assert!(result.flux < three_hourly.flux);
    assert!(result.flux >= MIN_SUBLIMATION_FLUX);
}

/// The simple scaling law and the two-layer model agree on sign.
#[test]
fn test_simple_model_sublimates_in_reference_scenario() {
    let config = BlowingSnowConfig::default().with_flux_model(FluxModel::Simple);
    let result = sublimation_flux(&reference_forcing(), &config).unwrap();
    assert!(result.flux < 0.0);
    assert!(result.flux >= MIN_SUBLIMATION_FLUX);
    assert!(result.increments.iter().all(|inc| inc.layers.is_none()));
}
