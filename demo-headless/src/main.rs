use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use blowing_snow_core::physics::saturation_vapor_pressure;
use blowing_snow_core::wind_distribution::WindStatistics;
use blowing_snow_core::{
    sublimation_flux, sublimation_flux_batch, Anomaly, BlowingSnowConfig, BlowingSnowFlux,
    BlowingSnowForcing, Celsius, FluxModel, Hours, JoulesPerKg, KgPerCubicMeter, Meters,
    MetersPerSecond, OccurrenceModel, Pascals, SaturationCurve, SurfaceCover, ThresholdModel,
    VegetationGeometry, WindDistribution,
};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Blowing-snow sublimation flux for a single grid cell
#[derive(Parser, Debug)]
#[allow(clippy::struct_excessive_bools)]
#[command(name = "blowing-snow")]
#[command(about = "Blowing-snow sublimation flux calculator", long_about = None)]
struct Args {
    /// Forcing record as JSON (overrides the individual forcing flags)
    #[arg(long)]
    forcing: Option<PathBuf>,

    /// Model configuration as JSON (missing fields take reference values)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Air temperature in °C
    #[arg(short, long, default_value_t = -10.0, allow_hyphen_values = true)]
    temperature: f64,

    /// Wind speed 2 m above the snow surface in m/s
    #[arg(short, long, default_value_t = 8.0)]
    wind_speed: f64,

    /// Relative humidity in % (sets the vapor pressure)
    #[arg(long, default_value_t = 90.0)]
    humidity: f64,

    /// Snow depth in m
    #[arg(long, default_value_t = 0.3)]
    snow_depth: f64,

    /// Hours since the last snowfall
    #[arg(long, default_value_t = 48.0)]
    snow_age: f64,

    /// Use the single-layer scaling law
    #[arg(long)]
    simple: bool,

    /// Use the mean wind only (no sub-grid distribution)
    #[arg(long)]
    uniform_wind: bool,

    /// Use the fixed 0.25 m/s threshold shear velocity
    #[arg(long)]
    constant_threshold: bool,

    /// Assume blowing snow always occurs
    #[arg(long)]
    always_blowing: bool,

    /// Disable the fetch correction
    #[arg(long)]
    no_fetch: bool,

    /// Apply the below-freezing correction to saturation vapor pressure
    #[arg(long)]
    ice_saturation: bool,

    /// Number of wind increments (even)
    #[arg(long)]
    increments: Option<usize>,

    /// Sweep wind speed from 0 to this value (m/s) and print one row per step
    #[arg(long)]
    sweep: Option<f64>,

    /// Sweep step in m/s
    #[arg(long, default_value_t = 1.0)]
    sweep_step: f64,

    /// Evaluate N randomly perturbed forcing records in parallel
    #[arg(long)]
    ensemble: Option<usize>,

    /// Seed for the ensemble generator
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Log level filter (overridden by `RUST_LOG`)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

/// Serializable summary of one evaluation
#[derive(Serialize)]
struct Report {
    flux: f64,
    wind: Option<WindStatistics>,
    latent_heat_vaporization: Option<f64>,
    increments: usize,
    anomalies: Vec<Anomaly>,
}

impl From<&BlowingSnowFlux> for Report {
    fn from(result: &BlowingSnowFlux) -> Self {
        Self {
            flux: result.flux,
            wind: result.wind,
            latent_heat_vaporization: result.latent_heat_vaporization,
            increments: result.increments.len(),
            anomalies: result.anomalies.clone(),
        }
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("{}: {e}", path.display()))
}

fn build_config(args: &Args) -> Result<BlowingSnowConfig, String> {
    let mut config = match &args.config {
        Some(path) => read_json(path)?,
        None => BlowingSnowConfig::default(),
    };
    if args.simple {
        config = config.with_flux_model(FluxModel::Simple);
    }
    if args.uniform_wind {
        config = config.with_wind_distribution(WindDistribution::Uniform);
    }
    if args.constant_threshold {
        config = config.with_threshold(ThresholdModel::Constant);
    }
    if args.always_blowing {
        config = config.with_occurrence(OccurrenceModel::Constant);
    }
    if args.no_fetch {
        config = config.with_fetch_correction(false);
    }
    if args.ice_saturation {
        config = config.with_saturation(SaturationCurve::IceCorrected);
    }
    if let Some(increments) = args.increments {
        config.wind_increments = increments;
    }
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

/// Vapor pressure at `humidity` percent of saturation over water
fn vapor_pressure(temperature: f64, humidity: f64) -> f64 {
    saturation_vapor_pressure(Celsius::new(temperature), SaturationCurve::Water) * humidity / 100.0
}

fn build_forcing(args: &Args) -> Result<BlowingSnowForcing, String> {
    if let Some(path) = &args.forcing {
        return read_json(path);
    }
    if !(args.temperature.is_finite() && args.temperature > -273.15) {
        return Err(format!("temperature must be above absolute zero, got {}", args.temperature));
    }
    if !(args.wind_speed.is_finite() && args.wind_speed >= 0.0) {
        return Err(format!("wind speed must be non-negative, got {}", args.wind_speed));
    }
    if !(0.0..=100.0).contains(&args.humidity) {
        return Err(format!("humidity must be within 0..=100, got {}", args.humidity));
    }
    if !(args.snow_age.is_finite() && args.snow_age >= 0.0) {
        return Err(format!("snow age must be non-negative, got {}", args.snow_age));
    }

    let time_step = 3.0;
    Ok(BlowingSnowForcing {
        time_step: Hours::new(time_step),
        air_temperature: Celsius::new(args.temperature),
        steps_since_snowfall: (args.snow_age / time_step).round() as u32,
        surface_liquid_water: Meters::new(0.0),
        wind_speed: MetersPerSecond::new(args.wind_speed),
        latent_heat_sublimation: JoulesPerKg::new(2.838e6),
        air_density: KgPerCubicMeter::new(1.3),
        air_pressure: Pascals::new(85000.0),
        vapor_pressure: Pascals::new(vapor_pressure(args.temperature, args.humidity)),
        roughness_lengths: [Meters::new(0.01), Meters::new(0.01), Meters::new(0.0005)],
        humidity_reference_height: Meters::new(2.0),
        snow_depth: Meters::new(args.snow_depth),
        lag_one: 0.8,
        sigma_slope: 0.0003,
        snow_surface_temperature: Celsius::new(args.temperature.min(0.0)),
        surface: SurfaceCover::Vegetated,
        fetch: Meters::new(300.0),
        vegetation: VegetationGeometry {
            displacement: Meters::new(0.1),
            roughness: Meters::new(0.01),
        },
    })
}

fn print_single(result: &BlowingSnowFlux, forcing: &BlowingSnowForcing, json: bool) {
    if json {
        match serde_json::to_string_pretty(&Report::from(result)) {
            Ok(text) => println!("{text}"),
            Err(e) => error!("Failed to serialize report: {e}"),
        }
        return;
    }

    println!("=== Blowing Snow Sublimation ===\n");
    println!(
        "Air: {:.1}°C, {:.0} Pa vapor pressure, wind {:.1} m/s at 2 m",
        forcing.air_temperature.value(),
        forcing.vapor_pressure.value(),
        forcing.wind_speed.value()
    );
    println!(
        "Snow: {:.2} m deep, {:.0} h old\n",
        forcing.snow_depth.value(),
        forcing.snow_age_hours()
    );

    if let Some(lv) = result.latent_heat_vaporization {
        println!("Latent heat of vaporization at the surface: {lv:.4e} J/kg");
    }
    if let Some(wind) = &result.wind {
        println!("10 m wind: mean {:.2} m/s, std dev {:.2} m/s\n", wind.mean, wind.std_dev);
    }
    if !result.increments.is_empty() {
        println!("Incr | U10 (m/s) | Prob   | u* (m/s) | u*t (m/s) | Flux (kg/m²/s)");
        println!("-----|-----------|--------|----------|-----------|---------------");
        for (i, increment) in result.increments.iter().enumerate() {
            println!(
                "{:4} | {:9.3} | {:6.4} | {:8.4} | {:9.4} | {:14.4e}",
                i,
                increment.wind_speed,
                increment.occurrence_probability,
                increment.shear.shear_velocity,
                increment.threshold_shear,
                increment.flux
            );
        }
        println!();
    }
    for anomaly in &result.anomalies {
        println!("Anomaly: {anomaly:?}");
    }
    println!("Sublimation flux: {:.4e} kg/(m²·s)", result.flux);
    println!(
        "Over the time step: {:.4} mm water equivalent",
        -result.flux * forcing.time_step.value() * 3600.0
    );
}

fn run_sweep(
    base: &BlowingSnowForcing,
    config: &BlowingSnowConfig,
    max_wind: f64,
    step: f64,
) -> Result<(), String> {
    if !(step.is_finite() && step > 0.0) {
        return Err(format!("sweep step must be positive, got {step}"));
    }
    let count = (max_wind / step).floor() as usize + 1;
    let forcings: Vec<BlowingSnowForcing> = (0..count)
        .map(|i| BlowingSnowForcing {
            wind_speed: MetersPerSecond::new(i as f64 * step),
            ..*base
        })
        .collect();
    let results = sublimation_flux_batch(&forcings, config);

    println!("Wind (m/s) | Flux (kg/m²/s) | Anomalies");
    println!("-----------|----------------|----------");
    for (forcing, result) in forcings.iter().zip(results) {
        let result = result.map_err(|e| e.to_string())?;
        println!(
            "{:10.2} | {:14.4e} | {}",
            forcing.wind_speed.value(),
            result.flux,
            result.anomalies.len()
        );
    }
    Ok(())
}

fn run_ensemble(
    base: &BlowingSnowForcing,
    config: &BlowingSnowConfig,
    members: usize,
    seed: u64,
) -> Result<(), String> {
    let mut rng = StdRng::seed_from_u64(seed);
    let base_temp = base.air_temperature.value();
    let base_es = saturation_vapor_pressure(base.air_temperature, SaturationCurve::Water);
    let humidity = (base.vapor_pressure.value() / base_es).clamp(0.0, 1.0);

    let forcings: Vec<BlowingSnowForcing> = (0..members)
        .map(|_| {
            let temperature = (base_temp + rng.random_range(-3.0..3.0)).min(-0.1);
            let wind = (base.wind_speed.value() * rng.random_range(0.5..1.5)).max(0.0);
            BlowingSnowForcing {
                air_temperature: Celsius::new(temperature),
                snow_surface_temperature: Celsius::new(temperature),
                wind_speed: MetersPerSecond::new(wind),
                vapor_pressure: Pascals::new(vapor_pressure(temperature, humidity * 100.0)),
                ..*base
            }
        })
        .collect();

    info!(members, seed, "Evaluating ensemble");
    let results = sublimation_flux_batch(&forcings, config);

    let mut fluxes = Vec::with_capacity(members);
    let mut degraded = 0;
    for result in results {
        let result = result.map_err(|e| e.to_string())?;
        if result.is_degraded() {
            degraded += 1;
        }
        fluxes.push(result.flux);
    }
    if fluxes.is_empty() {
        return Err("ensemble must have at least one member".to_string());
    }

    let mean = fluxes.iter().sum::<f64>() / fluxes.len() as f64;
    let min = fluxes.iter().copied().fold(f64::INFINITY, f64::min);
    let max = fluxes.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    println!("=== Ensemble ({members} members, seed {seed}) ===");
    println!("Mean flux: {mean:.4e} kg/(m²·s)");
    println!("Range:     {min:.4e} .. {max:.4e}");
    println!("Degraded:  {degraded}");
    Ok(())
}

fn run(args: &Args) -> Result<(), String> {
    let config = build_config(args)?;
    let forcing = build_forcing(args)?;

    if let Some(max_wind) = args.sweep {
        return run_sweep(&forcing, &config, max_wind, args.sweep_step);
    }
    if let Some(members) = args.ensemble {
        return run_ensemble(&forcing, &config, members, args.seed);
    }

    let result = sublimation_flux(&forcing, &config).map_err(|e| e.to_string())?;
    print_single(&result, &forcing, args.json);
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args.log_level);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("{message}");
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}
