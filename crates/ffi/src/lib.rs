//! C-ABI boundary for the blowing-snow sublimation model.
//!
//! A host energy-balance solver fills a `BlowingSnowInputs` record per grid cell
//! and time step and calls `blowing_snow_calc`. Failures return a non-zero
//! `BlowingSnowErrorCode`; the message is available from
//! `blowing_snow_get_last_error()` on the same thread.

mod error;
mod helpers;
mod inputs;

pub use error::{blowing_snow_get_last_error, blowing_snow_get_last_error_code, BlowingSnowErrorCode};
pub use inputs::{BlowingSnowInputs, BlowingSnowOptions};

use blowing_snow_core::sublimation_flux;

use crate::error::DefaultBlowingSnowError;
use crate::helpers::{clear_last_error, track_error, track_result};

/// Reference model options: full two-layer flux, spatial wind, variable
/// threshold, fetch correction, computed occurrence probability, ten wind
/// increments.
#[no_mangle]
pub extern "C" fn blowing_snow_default_options() -> BlowingSnowOptions {
    BlowingSnowOptions::default()
}

/// Compute the blowing-snow sublimation flux for one grid cell and time step.
///
/// Parameters
/// - `inputs`: Forcing record. Must be non-null.
/// - `options`: Model switches, or null for `blowing_snow_default_options()`.
/// - `out_flux`: Receives the flux in kg/(m²·s); negative is a loss from the
///   snowpack, never below -5e-5. Set to 0 on failure.
///
/// Returns
/// - `BlowingSnowErrorCode::Ok` (0): success, `out_flux` holds the flux
/// - `BlowingSnowErrorCode::NullPointer`: `inputs` or `out_flux` is null
/// - `BlowingSnowErrorCode::InvalidInput`: a field is non-finite or out of range
/// - `BlowingSnowErrorCode::InvalidConfig`: the options are inconsistent
/// - `BlowingSnowErrorCode::NotBracketed` / `NotConverged` / `NumericalFailure`:
///   a numerical kernel failed
///
/// Error Details
/// - Call `blowing_snow_get_last_error()` to retrieve human-readable error description
///
/// # Safety
/// - `inputs` must point to a valid `BlowingSnowInputs`.
/// - `options` must be null or point to a valid `BlowingSnowOptions`.
/// - `out_flux` must be a valid, non-null pointer to writable memory.
///
/// Example (C)
/// ```c
/// BlowingSnowInputs in = { /* ... */ };
/// double flux = 0.0;
/// if (blowing_snow_calc(&in, NULL, &flux) != Ok) {
///     fprintf(stderr, "%s\n", blowing_snow_get_last_error());
/// }
/// ```
#[no_mangle]
pub unsafe extern "C" fn blowing_snow_calc(
    inputs: *const BlowingSnowInputs,
    options: *const BlowingSnowOptions,
    out_flux: *mut f64,
) -> BlowingSnowErrorCode {
    if out_flux.is_null() {
        return track_error(&DefaultBlowingSnowError::null_pointer("out_flux"));
    }
    // SAFETY: checked non-null above; caller guarantees it is writable.
    unsafe {
        *out_flux = 0.0;
    }
    if inputs.is_null() {
        return track_error(&DefaultBlowingSnowError::null_pointer("inputs"));
    }

    // SAFETY: non-null and valid per the caller contract; both types are Copy.
    let inputs = unsafe { *inputs };
    let options = if options.is_null() {
        BlowingSnowOptions::default()
    } else {
        // SAFETY: non-null and valid per the caller contract.
        unsafe { *options }
    };

    let config = match track_result(options.to_config()) {
        Ok(config) => config,
        Err(code) => return code,
    };
    let forcing = match track_result(inputs.to_forcing()) {
        Ok(forcing) => forcing,
        Err(code) => return code,
    };

    match sublimation_flux(&forcing, &config) {
        Ok(result) => {
            // SAFETY: checked non-null above.
            unsafe {
                *out_flux = result.flux;
            }
            clear_last_error();
            BlowingSnowErrorCode::Ok
        }
        Err(error) => track_error(&DefaultBlowingSnowError::from(&error)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;
    use std::ptr;

    fn reference_inputs() -> BlowingSnowInputs {
        BlowingSnowInputs {
            dt: 3.0,
            air_temp: -10.0,
            last_snow: 16,
            surface_liquid_water: 0.0,
            wind: 8.0,
            ls: 2.838e6,
            air_dens: 1.3,
            press: 85000.0,
            vapor_pressure: 260.0,
            zo: [0.01, 0.01, 0.0005],
            zrh: 2.0,
            snow_depth: 0.3,
            lag_one: 0.8,
            sigma_slope: 0.0003,
            snow_surface_temp: -10.0,
            iveg: 0,
            nveg: 3,
            fetch: 300.0,
            displacement: 0.1,
            roughness: 0.01,
        }
    }

    fn last_error() -> String {
        let ptr = blowing_snow_get_last_error();
        assert!(!ptr.is_null());
        unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
    }

    #[test]
    fn reference_scenario_returns_negative_flux() {
        let inputs = reference_inputs();
        let mut flux = f64::NAN;
        let code = unsafe { blowing_snow_calc(&inputs, ptr::null(), &mut flux) };
        assert_eq!(code, BlowingSnowErrorCode::Ok);
        assert!(flux < 0.0 && flux >= -5.0e-5, "flux = {flux}");
        assert_eq!(blowing_snow_get_last_error_code(), BlowingSnowErrorCode::Ok);
        assert!(blowing_snow_get_last_error().is_null());
    }

    #[test]
    fn explicit_default_options_match_null_options() {
        let inputs = reference_inputs();
        let options = blowing_snow_default_options();
        let (mut a, mut b) = (0.0, 0.0);
        unsafe {
            blowing_snow_calc(&inputs, ptr::null(), &mut a);
            blowing_snow_calc(&inputs, &options, &mut b);
        }
        approx::assert_relative_eq!(a, b);
    }

    #[test]
    fn null_output_is_rejected() {
        let inputs = reference_inputs();
        let code = unsafe { blowing_snow_calc(&inputs, ptr::null(), ptr::null_mut()) };
        assert_eq!(code, BlowingSnowErrorCode::NullPointer);
        assert!(last_error().contains("out_flux"));
    }

    #[test]
    fn null_inputs_are_rejected() {
        let mut flux = 1.0;
        let code = unsafe { blowing_snow_calc(ptr::null(), ptr::null(), &mut flux) };
        assert_eq!(code, BlowingSnowErrorCode::NullPointer);
        assert_eq!(flux, 0.0);
        assert_eq!(blowing_snow_get_last_error_code(), BlowingSnowErrorCode::NullPointer);
    }

    #[test]
    fn non_finite_wind_is_invalid_input() {
        let mut inputs = reference_inputs();
        inputs.wind = f64::NAN;
        let mut flux = 0.0;
        let code = unsafe { blowing_snow_calc(&inputs, ptr::null(), &mut flux) };
        assert_eq!(code, BlowingSnowErrorCode::InvalidInput);
        assert!(last_error().contains("wind"));
    }

    #[test]
    fn negative_snow_age_is_invalid_input() {
        let mut inputs = reference_inputs();
        inputs.last_snow = -1;
        let mut flux = 0.0;
        let code = unsafe { blowing_snow_calc(&inputs, ptr::null(), &mut flux) };
        assert_eq!(code, BlowingSnowErrorCode::InvalidInput);
    }

    #[test]
    fn odd_increment_count_is_invalid_config() {
        let inputs = reference_inputs();
        let mut options = blowing_snow_default_options();
        options.wind_increments = 7;
        let mut flux = 0.0;
        let code = unsafe { blowing_snow_calc(&inputs, &options, &mut flux) };
        assert_eq!(code, BlowingSnowErrorCode::InvalidConfig);
        assert!(last_error().contains('7'));
    }

    #[test]
    fn huge_increment_count_is_invalid_config() {
        let inputs = reference_inputs();
        let mut options = blowing_snow_default_options();
        options.wind_increments = u32::MAX - 1;
        let mut flux = 1.0;
        let code = unsafe { blowing_snow_calc(&inputs, &options, &mut flux) };
        assert_eq!(code, BlowingSnowErrorCode::InvalidConfig);
        assert_eq!(flux, 0.0);
    }

    #[test]
    fn no_snow_gives_zero_flux() {
        let mut inputs = reference_inputs();
        inputs.snow_depth = 0.0;
        let mut flux = 1.0;
        let code = unsafe { blowing_snow_calc(&inputs, ptr::null(), &mut flux) };
        assert_eq!(code, BlowingSnowErrorCode::Ok);
        assert_eq!(flux, 0.0);
    }

    #[test]
    fn bare_soil_tile_ignores_vegetated_fetch() {
        let mut inputs = reference_inputs();
        inputs.iveg = 3;
        inputs.fetch = 0.0;
        let mut flux = 0.0;
        let code = unsafe { blowing_snow_calc(&inputs, ptr::null(), &mut flux) };
        assert_eq!(code, BlowingSnowErrorCode::Ok);
        assert!(flux < 0.0);
    }

    #[test]
    fn options_round_trip_through_config() {
        let mut options = blowing_snow_default_options();
        options.simple = true;
        options.calc_prob = false;
        let config = options.to_config().unwrap();
        assert_eq!(BlowingSnowOptions::from(&config), options);
    }
}
