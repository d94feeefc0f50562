//! C-compatible type definitions for the auto exposure C API.
//!
//! All types here are `#[repr(C)]` and are safe to pass across FFI
//! boundaries. Mode selectors travel as raw `uint32_t` codes and are
//! range-checked on entry, so a bad value from C is an error, not
//! undefined behaviour.

use isp_aec_core::common::{
    GAIN_RANGE_LEN, HIST_BIN_COUNT, ROUTE_DOTS, TIME_FACTOR_LEN, ZONE_COUNT,
};

use crate::AutoExposure;

// ---------------------------------------------------------------------------
// Error codes
// ---------------------------------------------------------------------------

/// Error codes returned by C API functions.
///
/// `0` = success, negative = error.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AecError {
    /// Operation succeeded.
    None = 0,
    /// Null pointer passed to a function that requires non-null.
    NullPointer = -1,
    /// Internal error (panic caught at FFI boundary).
    Internal = -2,
    /// A configuration value violates its bound; nothing was changed.
    InvalidConfig = -3,
    /// The session was not initialized or has been released.
    NotInitialized = -4,
    /// `aec_init` on an initialized session.
    AlreadyInitialized = -5,
    /// Call not valid in the current lifecycle state.
    InvalidState = -6,
    /// Unknown measuring mode code.
    InvalidMeasuringMode = -7,
    /// All zone weights are zero.
    NoActiveZones = -8,
    /// The exposure was clamped; the result was still written.
    OutOfRange = -9,
    /// No control cycle has completed yet.
    NoResultYet = -10,
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// One frame of hardware exposure statistics.
///
/// Layout: 25 zone means (`uint8_t`) at offset 0, 16 histogram bins
/// (`uint16_t`) at offset 26. 58 bytes in total.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct AecStat {
    pub exp_mean: [u8; ZONE_COUNT],
    pub hist_bins: [u16; HIST_BIN_COUNT],
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Flat static configuration.
///
/// Obtain a default-initialized instance via `aec_config_default()`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct AecConfig {
    // -- Measurement --
    /// Row-major 5x5 zone weights.
    pub grid_weights: [u8; ZONE_COUNT],
    /// 0 disabled, 1 RGB combined, 2 R, 3 G, 4 B, 5 Y.
    pub hist_mode: u32,
    /// 1 or 2.
    pub meas_mode: u32,

    // -- Control loop --
    pub set_point: f32,
    pub clm_tolerance: f32,
    pub damp_over_still: f32,
    pub damp_under_still: f32,
    pub damp_over_video: f32,
    pub damp_under_video: f32,
    /// 1 still image, 2 video.
    pub damping_mode: u32,
    /// 1 disabled, 2 fix, 3 adaptive.
    pub sem_mode: u32,
    pub step_size: u8,

    // -- Exposure conversion --
    /// 1 linear.
    pub ecm_mode: u32,
    pub ecm_time_dot: [f32; ROUTE_DOTS],
    pub ecm_gain_dot: [f32; ROUTE_DOTS],
    /// 0 off, 1 100 Hz, 2 120 Hz.
    pub ecm_flicker_select: u32,
    pub gain_factor: f32,
    pub gain_bias: f32,

    // -- Sensor --
    pub line_periods_per_field: f32,
    pub pixel_clock_freq_mhz: f32,
    pub pixel_periods_per_line: f32,
    /// Four rows of `[gain_min, gain_max, slope, intercept, reg_step,
    /// reg_min, reg_max]`.
    pub gain_range: [f32; GAIN_RANGE_LEN],
    /// `[reg_scale, reg_offset, min_lines, line_margin]`.
    pub time_factor: [f32; TIME_FACTOR_LEN],
}

/// Measurement window in pixels.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AecWindow {
    pub h_offs: u16,
    pub v_offs: u16,
    pub h_size: u16,
    pub v_size: u16,
}

/// Settings that may change while streaming.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct AecDyCfg {
    /// 0 off, 1 100 Hz, 2 120 Hz.
    pub flicker: u32,
    pub win: AecWindow,
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// Result of one control cycle.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct AecResult {
    /// Integration time in seconds.
    pub coarse_integration_time: f32,
    pub analog_gain: f32,
    pub analog_gain_code_global: f32,
    pub reg_integration_time: i32,
    pub reg_gain: i32,
    pub exposure: f32,
    pub pixel_clock_freq_mhz: f32,
    pub pixel_periods_per_line: f32,
    pub meas_mode: u32,
    pub meas_win: AecWindow,
    pub actives: u32,
    pub grid_weights: [u8; ZONE_COUNT],
    pub step_size: u8,
    pub hist_mode: u32,
    pub gain_factor: f32,
    pub gain_bias: f32,
    pub measured_brightness: f32,
    pub correction: f32,
    pub converged: bool,
    pub out_of_range: bool,
    pub scene_change: bool,
    pub damping_mode: u32,
    pub frame_index: u64,
}

// ---------------------------------------------------------------------------
// Opaque handle
// ---------------------------------------------------------------------------

/// Opaque handle to an auto exposure session.
///
/// Created via `aec_create()`, destroyed via `aec_destroy()`.
///
/// **NOT thread-safe**: all calls on the same handle must be serialized.
pub struct AecHandle {
    pub(crate) inner: AutoExposure,
}
