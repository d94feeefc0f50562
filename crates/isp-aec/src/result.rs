//! Per-cycle exposure result and its lock-free snapshot.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use isp_aec_core::common::ZONE_COUNT;
use isp_aec_core::exposure_conversion::Saturation;
use isp_aec_core::modes::{DampingMode, HistMode, MeasuringMode};
use isp_aec_core::Error;

use crate::config::Window;

/// Outcome of one control cycle: the sensor settings to apply plus the
/// measurement context they were derived from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExposureResult {
    /// Integration time in seconds.
    pub coarse_integration_time: f32,
    pub analog_gain: f32,
    /// Analog gain after linearization (`gain * gain_factor + gain_bias`).
    pub analog_gain_code_global: f32,
    pub reg_integration_time: i32,
    pub reg_gain: i32,
    /// Applied exposure, integration time times gain.
    pub exposure: f32,
    pub pixel_clock_freq_mhz: f32,
    pub pixel_periods_per_line: f32,
    pub meas_mode: MeasuringMode,
    pub meas_win: Window,
    /// Number of zones with a non-zero weight.
    pub actives: u32,
    pub grid_weights: [u8; ZONE_COUNT],
    pub step_size: u8,
    pub hist_mode: HistMode,
    pub gain_factor: f32,
    pub gain_bias: f32,
    /// Brightness measured in this cycle, full-range scale.
    pub measured_brightness: f32,
    /// Relative exposure change that was requested.
    pub correction: f32,
    pub converged: bool,
    /// Damping regime the scene evaluation chose.
    pub damping_mode: DampingMode,
    pub scene_change: bool,
    pub saturation: Option<Saturation>,
    /// Cycle counter, starting at 1 for the first result of a session.
    pub frame_index: u64,
}

impl ExposureResult {
    /// The requested exposure was clamped to the sensor envelope.
    pub fn out_of_range(&self) -> bool {
        self.saturation.is_some()
    }

    /// `Err(Error::OutOfRange)` when the exposure was clamped. The result
    /// itself stays valid and should still be applied.
    pub fn check_range(&self) -> Result<(), Error> {
        if self.out_of_range() {
            Err(Error::OutOfRange)
        } else {
            Ok(())
        }
    }
}

/// Read handle onto the most recent [`ExposureResult`].
///
/// Cloned readers share one slot. Reading never blocks the control loop,
/// so a reader may live on another thread.
#[derive(Debug, Clone, Default)]
pub struct ResultReader {
    slot: Arc<ArcSwapOption<ExposureResult>>,
}

impl ResultReader {
    /// Latest published result, if any.
    pub fn latest(&self) -> Option<ExposureResult> {
        self.slot.load_full().map(|result| *result)
    }

    /// Like [`latest`](Self::latest), with [`Error::NoResultYet`] when
    /// nothing has been published.
    pub fn get(&self) -> Result<ExposureResult, Error> {
        self.latest().ok_or(Error::NoResultYet)
    }

    pub(crate) fn publish(&self, result: ExposureResult) {
        self.slot.store(Some(Arc::new(result)));
    }

    pub(crate) fn clear(&self) {
        self.slot.store(None);
    }
}
