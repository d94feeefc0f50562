//! Shared constants of the exposure control loop.

/// Number of zones along each side of the measurement grid.
pub const GRID_SIZE: usize = 5;

/// Number of luminance zones delivered by the statistics hardware.
pub const ZONE_COUNT: usize = GRID_SIZE * GRID_SIZE;

/// Number of histogram bins delivered by the statistics hardware.
pub const HIST_BIN_COUNT: usize = 16;

/// Upper bound of the full-range luminance scale.
pub const LUMA_MAX: f32 = 255.0;

/// Number of (time, gain) dots describing the exposure route.
pub const ROUTE_DOTS: usize = 6;

/// Rows and columns of the gain-range lookup table.
pub const GAIN_RANGE_ROWS: usize = 4;
pub const GAIN_RANGE_COLUMNS: usize = 7;
pub const GAIN_RANGE_LEN: usize = GAIN_RANGE_ROWS * GAIN_RANGE_COLUMNS;

/// Number of time-factor coefficients.
pub const TIME_FACTOR_LEN: usize = 4;

/// Measured brightness is floored at this value before computing the
/// exposure ratio, so a black frame still produces a finite correction.
pub const MIN_MEASURED_BRIGHTNESS: f32 = 1.0;

/// Bounds of the raw relative exposure correction before damping.
pub const MIN_RAW_CORRECTION: f32 = -0.99;
pub const MAX_RAW_CORRECTION: f32 = 16.0;

/// Relative deviation of the measured brightness from the brightness
/// predicted by the previous frame and the exposure change, treated as a
/// scene change.
pub const SCENE_CHANGE_BRIGHTNESS_RATIO: f32 = 0.25;

/// Predicted brightness is floored at this value when computing the
/// relative deviation, so quantization of dark frames is not a scene cut.
pub const SCENE_CHANGE_MIN_BRIGHTNESS: f32 = 16.0;

/// Histogram distance (half the L1 distance of normalized histograms)
/// between consecutive frames treated as a scene change.
pub const SCENE_CHANGE_HISTOGRAM_DISTANCE: f32 = 0.30;

/// Histograms are only compared when the exposure of the two frames
/// differs by at most this ratio, i.e. the controller held the exposure.
pub const SCENE_STEADY_EXPOSURE_RATIO: f32 = 1e-4;

/// Histogram bins counted as under-exposed (from the bottom) and
/// over-exposed (from the top).
pub const UNDER_EXPOSED_BINS: usize = 2;
pub const OVER_EXPOSED_BINS: usize = 2;

/// Relative mismatch between requested and applied exposure above which
/// the conversion is reported as saturated.
pub const SATURATION_TOLERANCE: f32 = 1e-3;

/// Route dot the controller starts from after `start`.
pub const INITIAL_ROUTE_DOT: usize = 2;

/// Returns `true` if every value is finite.
pub fn all_finite(values: &[f32]) -> bool {
    values.iter().all(|v| v.is_finite())
}
