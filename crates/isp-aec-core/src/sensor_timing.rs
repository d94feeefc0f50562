//! Sensor line timing and integration-time register mapping.

use crate::common::{TIME_FACTOR_LEN, all_finite};
use crate::error::ConfigError;

/// Readout timing of the sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorTiming {
    /// Lines per field (frame length in lines).
    pub line_periods_per_field: f32,
    pub pixel_clock_freq_mhz: f32,
    /// Pixel clock periods per line (line length in pixels).
    pub pixel_periods_per_line: f32,
}

impl Default for SensorTiming {
    /// 30 fps at a 48 MHz pixel clock.
    fn default() -> Self {
        Self {
            line_periods_per_field: 1000.0,
            pixel_clock_freq_mhz: 48.0,
            pixel_periods_per_line: 1600.0,
        }
    }
}

impl SensorTiming {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let values = [
            self.line_periods_per_field,
            self.pixel_clock_freq_mhz,
            self.pixel_periods_per_line,
        ];
        if !all_finite(&values) || values.iter().any(|&v| v <= 0.0) {
            return Err(ConfigError::SensorTiming);
        }
        Ok(())
    }

    /// Duration of one line in seconds.
    pub fn line_time_s(&self) -> f32 {
        self.pixel_periods_per_line / (self.pixel_clock_freq_mhz * 1e6)
    }
}

/// Coefficients mapping integration time onto sensor lines and registers:
/// `[reg_scale, reg_offset, min_lines, line_margin]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeFactor(pub [f32; TIME_FACTOR_LEN]);

impl Default for TimeFactor {
    fn default() -> Self {
        Self([1.0, 0.0, 1.0, 4.0])
    }
}

impl TimeFactor {
    pub fn reg_scale(&self) -> f32 {
        self.0[0]
    }

    pub fn reg_offset(&self) -> f32 {
        self.0[1]
    }

    /// Shortest integration in lines (at least one).
    pub fn min_lines(&self) -> f32 {
        self.0[2].max(1.0)
    }

    /// Lines of a field the integration may not use.
    pub fn line_margin(&self) -> f32 {
        self.0[3]
    }

    pub fn validate(&self, timing: &SensorTiming) -> Result<(), ConfigError> {
        if !all_finite(&self.0) || self.reg_scale() <= 0.0 || self.line_margin() < 0.0 {
            return Err(ConfigError::TimeFactor);
        }
        if self.min_lines() > timing.line_periods_per_field - self.line_margin() {
            return Err(ConfigError::TimeFactor);
        }
        Ok(())
    }
}

/// Integration-time limits and register mapping derived from
/// [`SensorTiming`] and [`TimeFactor`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegrationLimits {
    line_time_s: f32,
    min_time_s: f32,
    max_time_s: f32,
    reg_scale: f32,
    reg_offset: f32,
}

impl IntegrationLimits {
    pub fn new(timing: &SensorTiming, time_factor: &TimeFactor) -> Self {
        let line_time_s = timing.line_time_s();
        Self {
            line_time_s,
            min_time_s: time_factor.min_lines() * line_time_s,
            max_time_s: (timing.line_periods_per_field - time_factor.line_margin()) * line_time_s,
            reg_scale: time_factor.reg_scale(),
            reg_offset: time_factor.reg_offset(),
        }
    }

    pub fn line_time_s(&self) -> f32 {
        self.line_time_s
    }

    pub fn min_time_s(&self) -> f32 {
        self.min_time_s
    }

    pub fn max_time_s(&self) -> f32 {
        self.max_time_s
    }

    /// Integration-time register code for `time_s`.
    pub fn register(&self, time_s: f32) -> i32 {
        (time_s / self.line_time_s * self.reg_scale + self.reg_offset).round() as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timing_is_thirty_fps() {
        let timing = SensorTiming::default();
        timing.validate().unwrap();
        let frame_time = timing.line_time_s() * timing.line_periods_per_field;
        assert!((frame_time - 1.0 / 30.0).abs() < 1e-6);
    }

    #[test]
    fn limits_respect_margin() {
        let timing = SensorTiming::default();
        let limits = IntegrationLimits::new(&timing, &TimeFactor::default());
        assert!((limits.min_time_s() - timing.line_time_s()).abs() < 1e-9);
        assert!((limits.max_time_s() - 996.0 * timing.line_time_s()).abs() < 1e-7);
    }

    #[test]
    fn register_counts_lines() {
        let limits = IntegrationLimits::new(&SensorTiming::default(), &TimeFactor::default());
        assert_eq!(limits.register(0.01), 300);
        let shifted = IntegrationLimits::new(
            &SensorTiming::default(),
            &TimeFactor([2.0, 3.0, 1.0, 4.0]),
        );
        assert_eq!(shifted.register(0.01), 603);
    }

    #[test]
    fn invalid_timing_is_rejected() {
        let timing = SensorTiming {
            pixel_clock_freq_mhz: 0.0,
            ..SensorTiming::default()
        };
        assert_eq!(timing.validate(), Err(ConfigError::SensorTiming));
        let timing = SensorTiming {
            line_periods_per_field: f32::NAN,
            ..SensorTiming::default()
        };
        assert_eq!(timing.validate(), Err(ConfigError::SensorTiming));
    }

    #[test]
    fn invalid_time_factor_is_rejected() {
        let timing = SensorTiming::default();
        assert_eq!(
            TimeFactor([0.0, 0.0, 1.0, 4.0]).validate(&timing),
            Err(ConfigError::TimeFactor)
        );
        assert_eq!(
            TimeFactor([1.0, 0.0, 999.0, 4.0]).validate(&timing),
            Err(ConfigError::TimeFactor)
        );
        TimeFactor::default().validate(&timing).unwrap();
    }
}
