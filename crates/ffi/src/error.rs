use std::cell::RefCell;
use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

use blowing_snow_core::{BlowingSnowError, NumericsError};

/// An error that can cross the C boundary as a code plus a diagnostic message.
///
/// ```rust,ignore
/// let err = DefaultBlowingSnowError::null_pointer("out_flux");
/// assert_eq!(err.code(), BlowingSnowErrorCode::NullPointer);
/// assert_eq!(err.msg(), "Parameter 'out_flux' cannot be null");
/// ```
pub(crate) trait FfiError {
    fn code(&self) -> BlowingSnowErrorCode;

    /// Message stored for `blowing_snow_get_last_error`.
    fn msg(&self) -> &str;
}

/// Default implementation of `FfiError` for the blowing-snow entry points.
///
/// Wraps a `BlowingSnowErrorCode` with a message and provides constructors for
/// each failure (except Ok, which represents success).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DefaultBlowingSnowError {
    code: BlowingSnowErrorCode,
    msg: String,
}

impl DefaultBlowingSnowError {
    /// Create error for null pointer passed where non-null required.
    ///
    /// # Arguments
    /// * `param_name` - The name of the parameter that was null (e.g., `"inputs"`, `"out_flux"`)
    pub fn null_pointer(param_name: &str) -> Self {
        Self {
            code: BlowingSnowErrorCode::NullPointer,
            msg: format!("Parameter '{param_name}' cannot be null"),
        }
    }

    /// Create error for an input field the model cannot accept.
    ///
    /// # Arguments
    /// * `param_name` - The name of the invalid field (e.g., `"wind"`, `"air_dens"`)
    /// * `value` - The rejected value
    /// * `constraint` - Description of the constraint (e.g., `"must be finite"`)
    pub fn invalid_input(param_name: &str, value: f64, constraint: &str) -> Self {
        Self {
            code: BlowingSnowErrorCode::InvalidInput,
            msg: format!("Input {param_name}: {constraint}, got {value}"),
        }
    }

    /// Create error for an option the model cannot accept.
    pub fn invalid_option(message: String) -> Self {
        Self {
            code: BlowingSnowErrorCode::InvalidConfig,
            msg: message,
        }
    }
}

impl From<&BlowingSnowError> for DefaultBlowingSnowError {
    fn from(error: &BlowingSnowError) -> Self {
        let code = match error {
            BlowingSnowError::Config(_) => BlowingSnowErrorCode::InvalidConfig,
            BlowingSnowError::InvalidForcing(_) => BlowingSnowErrorCode::InvalidInput,
            BlowingSnowError::ShearStress { source, .. }
            | BlowingSnowError::SuspensionIntegral { source, .. } => match source {
                NumericsError::NotBracketed { .. } => BlowingSnowErrorCode::NotBracketed,
                NumericsError::NotConverged { .. } => BlowingSnowErrorCode::NotConverged,
                NumericsError::DegenerateInterval { .. }
                | NumericsError::CoincidentAbscissas
                | NumericsError::NonFinite { .. } => BlowingSnowErrorCode::NumericalFailure,
            },
        };
        Self {
            code,
            msg: error.to_string(),
        }
    }
}

impl FfiError for DefaultBlowingSnowError {
    fn code(&self) -> BlowingSnowErrorCode {
        self.code
    }

    fn msg(&self) -> &str {
        &self.msg
    }
}

/// FFI error codes returned by blowing-snow functions.
/// Follows standard C convention: 0 = success, non-zero = error.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlowingSnowErrorCode {
    /// Operation completed successfully.
    Ok = 0,

    /// Invalid pointer: null pointer passed where non-null required.
    NullPointer = 1,

    /// An input field is non-finite or outside its physical range.
    InvalidInput = 2,

    /// Options are inconsistent (e.g. an odd number of wind increments).
    InvalidConfig = 3,

    /// The shear-stress equation has no sign change on its bracket.
    NotBracketed = 4,

    /// The suspension-layer integral exhausted its refinement budget.
    NotConverged = 5,

    /// Any other numerical breakdown (non-finite intermediate, degenerate interval).
    NumericalFailure = 6,
}

impl From<DefaultBlowingSnowError> for BlowingSnowErrorCode {
    fn from(error: DefaultBlowingSnowError) -> Self {
        error.code
    }
}

thread_local! {
    /// Message and code of the last failed call on this thread. The message is
    /// owned here so the pointer handed to C stays valid until the next call.
    static LAST_ERROR: RefCell<(Option<CString>, BlowingSnowErrorCode)> = const { RefCell::new((None, BlowingSnowErrorCode::Ok)) };
}

/// Internal helper to read `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error<F, R>(f: F) -> R
where
    F: FnOnce(&(Option<CString>, BlowingSnowErrorCode)) -> R,
{
    LAST_ERROR.with_borrow(f)
}

/// Internal helper to mutate `LAST_ERROR` thread-local storage (cstring, code).
pub(crate) fn with_last_error_mut<F, R>(f: F) -> R
where
    F: FnOnce(&mut (Option<CString>, BlowingSnowErrorCode)) -> R,
{
    LAST_ERROR.with_borrow_mut(f)
}

/// Retrieve the most recent FFI error message as a null-terminated C string.
///
/// Returns:
/// - A borrowed pointer to the error message if the last call on this thread failed.
/// - `null` if no error has occurred or the message cannot be converted to a C string.
///
/// Error state is per thread. The pointer stays valid until the next
/// `blowing_snow_calc` on this thread or thread exit, and must not be freed.
///
/// Example:
/// ```c
/// double flux = 0.0;
/// BlowingSnowErrorCode err = blowing_snow_calc(&inputs, NULL, &flux);
/// if (err != Ok) {
///     const char* error = blowing_snow_get_last_error();
///     if (error) {
///         fprintf(stderr, "blowing snow failed: %s\n", error);
///     }
/// }
/// ```
#[no_mangle]
pub extern "C" fn blowing_snow_get_last_error() -> *const c_char {
    with_last_error(|(cstring, _code)| cstring.as_ref().map_or(ptr::null(), |cs| cs.as_ptr()))
}

/// Retrieve the most recent FFI error code.
///
/// Returns:
/// - `BlowingSnowErrorCode::Ok` (0) if the last call on this thread succeeded
/// - The specific error code from the last failed operation
#[no_mangle]
pub extern "C" fn blowing_snow_get_last_error_code() -> BlowingSnowErrorCode {
    with_last_error(|(_cstring, code)| *code)
}
