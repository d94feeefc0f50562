//! Exported `extern "C"` functions for the auto exposure C API.
//!
//! # Symbol prefix
//!
//! All public symbols use the `aec_` prefix.

use std::ptr;

use crate::AutoExposure;
use crate::config::Config;

use super::panic_guard::{ffi_guard, ffi_guard_ptr};
use super::types::{AecConfig, AecDyCfg, AecError, AecHandle, AecResult, AecStat};

/// Runs `f` on the session behind `handle`, mapping errors to codes.
fn with_session(
    handle: *mut AecHandle,
    f: impl FnOnce(&mut AutoExposure) -> Result<(), crate::Error>,
) -> AecError {
    if handle.is_null() {
        return AecError::NullPointer;
    }
    // Safety: the caller guarantees the pointer is valid and not aliased.
    let handle = unsafe { &mut *handle };
    match f(&mut handle.inner) {
        Ok(()) => AecError::None,
        Err(err) => err.into(),
    }
}

// ─── Version ─────────────────────────────────────────────────────────

/// Returns a pointer to a static null-terminated version string.
///
/// The returned pointer is valid for the lifetime of the process.
#[unsafe(no_mangle)]
pub extern "C" fn aec_version() -> *const std::ffi::c_char {
    c"0.1.0".as_ptr()
}

// ─── Lifecycle ───────────────────────────────────────────────────────

/// Returns a default-initialized configuration.
#[unsafe(no_mangle)]
pub extern "C" fn aec_config_default() -> AecConfig {
    AecConfig::from_rust(&Config::default())
}

/// Creates an uninitialized session handle.
///
/// Returns `NULL` on internal error. The caller owns the returned pointer
/// and must free it with [`aec_destroy()`].
#[unsafe(no_mangle)]
pub extern "C" fn aec_create() -> *mut AecHandle {
    ffi_guard_ptr! {
        let boxed = Box::new(AecHandle { inner: AutoExposure::new() });
        Box::into_raw(boxed)
    }
}

/// Destroys a session handle and frees its memory.
///
/// Passing `NULL` is a safe no-op. After this call the pointer is invalid.
#[unsafe(no_mangle)]
pub extern "C" fn aec_destroy(handle: *mut AecHandle) {
    if !handle.is_null() {
        // Safety: created via Box::into_raw in aec_create, and the caller
        // guarantees single ownership.
        let _ = unsafe { Box::from_raw(handle) };
    }
}

/// Validates `config` and initializes the session.
///
/// Returns `AecError::InvalidMeasuringMode` for an unknown `meas_mode` and
/// `AecError::InvalidConfig` for any other violated bound.
#[unsafe(no_mangle)]
pub extern "C" fn aec_init(handle: *mut AecHandle, config: *const AecConfig) -> AecError {
    ffi_guard! {
        if config.is_null() {
            return AecError::NullPointer;
        }
        // Safety: the caller guarantees the pointer is valid.
        let config = unsafe { &*config };
        with_session(handle, |aec| aec.init(config.to_rust()?))
    }
}

/// Releases the session. The handle may be initialized again.
#[unsafe(no_mangle)]
pub extern "C" fn aec_release(handle: *mut AecHandle) -> AecError {
    ffi_guard! {
        with_session(handle, AutoExposure::release)
    }
}

/// Starts the control loop from the initial route exposure.
#[unsafe(no_mangle)]
pub extern "C" fn aec_start(handle: *mut AecHandle) -> AecError {
    ffi_guard! {
        with_session(handle, AutoExposure::start)
    }
}

/// Stops the control loop.
#[unsafe(no_mangle)]
pub extern "C" fn aec_stop(handle: *mut AecHandle) -> AecError {
    ffi_guard! {
        with_session(handle, AutoExposure::stop)
    }
}

// ─── Configuration ───────────────────────────────────────────────────

/// Replaces the configuration without resetting convergence.
///
/// On error the previous configuration stays in effect.
#[unsafe(no_mangle)]
pub extern "C" fn aec_update_config(handle: *mut AecHandle, config: *const AecConfig) -> AecError {
    ffi_guard! {
        if config.is_null() {
            return AecError::NullPointer;
        }
        // Safety: the caller guarantees the pointer is valid.
        let config = unsafe { &*config };
        with_session(handle, |aec| aec.update_config(config.to_rust()?))
    }
}

/// Applies the flicker period and measurement window.
#[unsafe(no_mangle)]
pub extern "C" fn aec_set_dynamic_config(handle: *mut AecHandle, dy_cfg: AecDyCfg) -> AecError {
    ffi_guard! {
        with_session(handle, |aec| aec.set_dynamic_config(dy_cfg.to_rust()?))
    }
}

// ─── Processing ──────────────────────────────────────────────────────

/// Runs one control cycle on `stat` and writes the result to `result_out`.
///
/// Returns `AecError::OutOfRange` when the exposure had to be clamped; the
/// result is written in that case too.
#[unsafe(no_mangle)]
pub extern "C" fn aec_run(
    handle: *mut AecHandle,
    stat: *const AecStat,
    result_out: *mut AecResult,
) -> AecError {
    ffi_guard! {
        if stat.is_null() || result_out.is_null() {
            return AecError::NullPointer;
        }
        // Safety: the caller guarantees the pointer is valid.
        let frame = unsafe { &*stat }.to_rust();
        with_session(handle, |aec| {
            let result = aec.run(&frame)?;
            // Safety: the caller guarantees the pointer is valid for writes.
            unsafe { ptr::write(result_out, AecResult::from_rust(&result)) };
            result.check_range()
        })
    }
}

/// Copies the result of the most recent cycle to `result_out`.
///
/// Returns `AecError::NoResultYet` before the first cycle.
#[unsafe(no_mangle)]
pub extern "C" fn aec_get_results(handle: *const AecHandle, result_out: *mut AecResult) -> AecError {
    ffi_guard! {
        if handle.is_null() || result_out.is_null() {
            return AecError::NullPointer;
        }
        // Safety: the caller guarantees the pointers are valid.
        let handle = unsafe { &*handle };
        match handle.inner.get_results() {
            Ok(result) => {
                // Safety: the caller guarantees the pointer is valid for writes.
                unsafe { ptr::write(result_out, AecResult::from_rust(&result)) };
                AecError::None
            }
            Err(err) => err.into(),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
