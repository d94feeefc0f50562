//! C-compatible FFI layer for the auto exposure session.
//!
//! This module exposes `extern "C"` functions and `#[repr(C)]` types that
//! allow C and C++ camera HALs to drive the Rust control loop.
//!
//! # Symbol prefix
//!
//! - Functions: `aec_*`
//! - Types: `Aec*`
//!
//! # Thread safety
//!
//! **NOT thread-safe.** All calls on the same [`AecHandle`](types::AecHandle)
//! must be serialized by the caller. Results can be observed from other
//! threads on the Rust side through [`ResultReader`](crate::ResultReader).

pub mod types;

mod conversions;
pub mod functions;
mod panic_guard;
