//! Unwind barriers for the `aec_*` entry points.
//!
//! A panic must not unwind into the C caller. Each entry point wraps its
//! body in one of the macros below, which turn a panic into an error value
//! the caller can check.

/// Runs `$body`, returning `$on_panic` instead if it panics.
macro_rules! catch_or {
    ($on_panic:expr, $($body:tt)*) => {{
        match ::std::panic::catch_unwind(::std::panic::AssertUnwindSafe(move || { $($body)* })) {
            Ok(value) => value,
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .copied()
                    .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
                    .unwrap_or("non-string panic payload");
                tracing::error!(message, "panic in exposure control C API");
                $on_panic
            }
        }
    }};
}

/// Guards a body returning [`AecError`](super::types::AecError); a panic
/// becomes `AecError::Internal`.
macro_rules! ffi_guard {
    ($($body:tt)*) => {
        $crate::ffi::panic_guard::catch_or!($crate::ffi::types::AecError::Internal, $($body)*)
    };
}

/// Guards a body returning a raw pointer; a panic becomes null.
macro_rules! ffi_guard_ptr {
    ($($body:tt)*) => {
        $crate::ffi::panic_guard::catch_or!(::std::ptr::null_mut(), $($body)*)
    };
}

pub(crate) use catch_or;
pub(crate) use ffi_guard;
pub(crate) use ffi_guard_ptr;

#[cfg(test)]
mod tests {
    use crate::ffi::types::AecError;

    #[test]
    fn error_codes_pass_through() {
        for code in [AecError::None, AecError::NoResultYet, AecError::OutOfRange] {
            let guarded: AecError = ffi_guard! { code };
            assert_eq!(guarded, code);
        }
    }

    #[test]
    fn panicking_cycle_reports_internal_error() {
        let frames: Vec<u8> = Vec::new();
        let guarded: AecError = ffi_guard! {
            if frames[3] > 0 { AecError::None } else { AecError::InvalidConfig }
        };
        assert_eq!(guarded, AecError::Internal);
    }

    #[test]
    fn formatted_panic_reports_internal_error() {
        let zone = 26;
        let guarded: AecError = ffi_guard! {
            panic!("zone {zone} outside the grid");
        };
        assert_eq!(guarded, AecError::Internal);
    }

    #[test]
    fn panicking_constructor_returns_null() {
        let handle: *mut u32 = ffi_guard_ptr! {
            panic!("handle allocation failed");
        };
        assert!(handle.is_null());

        let handle: *mut u32 = ffi_guard_ptr! { Box::into_raw(Box::new(5u32)) };
        assert!(!handle.is_null());
        // Safety: `handle` came from `Box::into_raw` above.
        drop(unsafe { Box::from_raw(handle) });
    }
}
