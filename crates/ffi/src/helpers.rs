use crate::error::{with_last_error_mut, BlowingSnowErrorCode, DefaultBlowingSnowError, FfiError};
use std::ffi::CString;

/// Set the thread-local error message and code.
/// Internal helper for FFI functions to record failure details.
/// Accepts any type implementing `FfiError` trait.
pub(crate) fn set_last_error(error: &impl FfiError) {
    with_last_error_mut(|(cstring, code)| {
        *cstring = CString::new(error.msg()).ok();
        *code = error.code();
    });
}

/// Track an error by setting it in thread-local storage and returning its code.
#[inline]
pub(crate) fn track_error(error: &impl FfiError) -> BlowingSnowErrorCode {
    tracing::warn!(code = ?error.code(), message = error.msg(), "Blowing snow FFI call failed");
    set_last_error(error);
    error.code()
}

/// Record the error of a failed result and hand back its code.
pub(crate) fn track_result<T>(
    result: Result<T, DefaultBlowingSnowError>,
) -> Result<T, BlowingSnowErrorCode> {
    result.map_err(|error| track_error(&error))
}

/// Clear the thread-local error message and code.
/// Internal helper called on successful operations.
pub(crate) fn clear_last_error() {
    with_last_error_mut(|(cstring, code)| {
        *cstring = None;
        *code = BlowingSnowErrorCode::Ok;
    });
}
