//! Simulated static scene for closed-loop tests.
//!
//! The sensor response is linear: a zone with relative reflectance `r`
//! reports a full-range brightness of `luminance * r * exposure`, clipped
//! at 255 and quantized by the statistics block of the chosen measuring
//! mode.

use isp_aec_core::common::{HIST_BIN_COUNT, LUMA_MAX, ZONE_COUNT};
use isp_aec_core::modes::MeasuringMode;
use isp_aec_core::statistics::StatisticsFrame;

/// Mode 2 luminance gain applied on top of its offset of 16.
const MODE2_GAIN: f32 = 0.25 + 0.5 + 0.1094;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScene {
    /// Full-range brightness per unit exposure of a reflectance-1 zone.
    pub luminance: f32,
    pub reflectance: [f32; ZONE_COUNT],
}

impl LinearScene {
    /// A flat scene that measures `set_point` at `target_exposure`.
    pub fn for_target(set_point: f32, target_exposure: f32) -> Self {
        Self {
            luminance: set_point / target_exposure,
            reflectance: [1.0; ZONE_COUNT],
        }
    }

    /// Full-range brightness of zone `zone` at `exposure`, clipped.
    pub fn zone_brightness(&self, zone: usize, exposure: f32) -> f32 {
        (self.luminance * self.reflectance[zone] * exposure).clamp(0.0, LUMA_MAX)
    }

    /// Statistics the hardware would report at `exposure`.
    pub fn frame(&self, exposure: f32, mode: MeasuringMode) -> StatisticsFrame {
        let mut frame = StatisticsFrame::default();
        let per_zone = u16::MAX / ZONE_COUNT as u16;
        for zone in 0..ZONE_COUNT {
            let full = self.zone_brightness(zone, exposure);
            let code = match mode {
                MeasuringMode::Mode1 => full * 255.0 / 256.0,
                MeasuringMode::Mode2 => 16.0 + full * MODE2_GAIN,
            };
            frame.exp_mean[zone] = code.round().clamp(0.0, 255.0) as u8;
            let bin = ((full / 256.0) * HIST_BIN_COUNT as f32) as usize;
            frame.hist_bins[bin.min(HIST_BIN_COUNT - 1)] += per_zone;
        }
        frame
    }
}
