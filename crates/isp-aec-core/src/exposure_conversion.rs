//! Exposure Conversion Model (ECM).
//!
//! Turns a requested exposure (integration time x analog gain) into a
//! concrete time/gain pair along the [`ExposureRoute`], bounded by the
//! sensor line timing, locked to the flicker period and clamped to the
//! gain-range table. Register codes are derived for both.

use crate::common::{INITIAL_ROUTE_DOT, SATURATION_TOLERANCE};
use crate::error::ConfigError;
use crate::exposure_route::ExposureRoute;
use crate::gain_range::GainRange;
use crate::modes::{EcmMode, FlickerPeriod};
use crate::sensor_timing::{IntegrationLimits, SensorTiming, TimeFactor};

/// Everything the conversion model is built from.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ExposureConversionConfig {
    pub mode: EcmMode,
    pub route: ExposureRoute,
    pub timing: SensorTiming,
    pub time_factor: TimeFactor,
    pub gain_range: GainRange,
    /// Linearized gain is `gain * gain_factor + gain_bias`.
    pub gain_factor: f32,
    pub gain_bias: f32,
    pub flicker: FlickerPeriod,
}

/// Which end of the exposure envelope a conversion was clamped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Saturation {
    /// Less exposure was requested than the envelope allows.
    Minimum,
    /// More exposure was requested than the envelope allows.
    Maximum,
}

/// Output of [`ExposureConversion::convert`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conversion {
    /// Integration time in seconds.
    pub time_s: f32,
    pub gain: f32,
    /// Applied exposure, `time_s * gain`.
    pub exposure: f32,
    pub reg_integration_time: i32,
    pub reg_gain: i32,
    /// Gain after the configured linearization.
    pub gain_code: f32,
    /// Set if the requested exposure could not be met.
    pub saturation: Option<Saturation>,
}

/// Validated conversion model with its derived envelope.
#[derive(Debug, Clone)]
pub struct ExposureConversion {
    mode: EcmMode,
    route: ExposureRoute,
    limits: IntegrationLimits,
    gain_range: GainRange,
    gain_factor: f32,
    gain_bias: f32,
    flicker_period_s: Option<f32>,
    time_min_s: f32,
    time_max_s: f32,
    gain_min: f32,
    gain_max: f32,
}

impl ExposureConversion {
    pub fn new(config: &ExposureConversionConfig) -> Result<Self, ConfigError> {
        config.route.validate()?;
        config.timing.validate()?;
        config.time_factor.validate(&config.timing)?;
        config.gain_range.validate()?;
        if !config.gain_factor.is_finite() || config.gain_factor == 0.0 {
            return Err(ConfigError::GainFactor(config.gain_factor));
        }
        if !config.gain_bias.is_finite() {
            return Err(ConfigError::GainBias);
        }

        let limits = IntegrationLimits::new(&config.timing, &config.time_factor);
        let (route_time_min, route_time_max) = config.route.time_span();
        let mut time_min_s = limits.min_time_s().max(route_time_min);
        let mut time_max_s = limits.max_time_s().min(route_time_max);
        if time_max_s < time_min_s {
            return Err(ConfigError::TimeSpan);
        }

        let flicker_period_s = config.flicker.period_s();
        if let Some(period) = flicker_period_s {
            // Tolerate f32 rounding of exact multiples.
            let periods = (time_max_s / period + 1e-4).floor();
            if periods < 1.0 {
                return Err(ConfigError::FlickerPeriod);
            }
            time_min_s = period;
            time_max_s = periods * period;
        }

        let (route_gain_min, route_gain_max) = config.route.gain_span();
        let (table_gain_min, table_gain_max) = config.gain_range.span();
        let gain_min = route_gain_min.max(table_gain_min);
        let gain_max = route_gain_max.min(table_gain_max);
        if gain_max < gain_min {
            return Err(ConfigError::GainSpan);
        }

        Ok(Self {
            mode: config.mode,
            route: config.route,
            limits,
            gain_range: config.gain_range,
            gain_factor: config.gain_factor,
            gain_bias: config.gain_bias,
            flicker_period_s,
            time_min_s,
            time_max_s,
            gain_min,
            gain_max,
        })
    }

    /// Smallest and largest reachable exposure.
    pub fn exposure_bounds(&self) -> (f32, f32) {
        (
            self.time_min_s * self.gain_min,
            self.time_max_s * self.gain_max,
        )
    }

    /// Exposure the controller starts from.
    pub fn initial_exposure(&self) -> f32 {
        let (lo, hi) = self.exposure_bounds();
        self.route.exposure_at(INITIAL_ROUTE_DOT).clamp(lo, hi)
    }

    pub fn flicker_period_s(&self) -> Option<f32> {
        self.flicker_period_s
    }

    /// Converts a requested exposure into time, gain and register codes.
    ///
    /// Never fails: requests outside the envelope are clamped and reported
    /// through [`Conversion::saturation`].
    pub fn convert(&self, requested: f32) -> Conversion {
        let (lo, hi) = self.exposure_bounds();
        let target = requested.clamp(lo, hi);

        let (time_s, gain) = match self.mode {
            EcmMode::Linear => {
                let (route_time, _) = self.route.split(target);
                let mut time_s = route_time.clamp(self.time_min_s, self.time_max_s);
                if let Some(period) = self.flicker_period_s {
                    time_s = (time_s / period).round().max(1.0) * period;
                }
                let gain = (target / time_s).clamp(self.gain_min, self.gain_max);
                (time_s, gain)
            }
        };

        let exposure = time_s * gain;
        let saturation = if exposure < requested * (1.0 - SATURATION_TOLERANCE) {
            Some(Saturation::Maximum)
        } else if exposure > requested * (1.0 + SATURATION_TOLERANCE) {
            Some(Saturation::Minimum)
        } else {
            None
        };

        Conversion {
            time_s,
            gain,
            exposure,
            reg_integration_time: self.limits.register(time_s),
            reg_gain: self.gain_range.register(gain),
            gain_code: gain * self.gain_factor + self.gain_bias,
            saturation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_strategy::proptest;

    fn default_config() -> ExposureConversionConfig {
        ExposureConversionConfig {
            gain_factor: 16.0,
            ..ExposureConversionConfig::default()
        }
    }

    fn with_flicker(flicker: FlickerPeriod) -> ExposureConversion {
        ExposureConversion::new(&ExposureConversionConfig {
            flicker,
            ..default_config()
        })
        .unwrap()
    }

    #[test]
    fn envelope_of_default_config() {
        let ecm = with_flicker(FlickerPeriod::Off);
        let (lo, hi) = ecm.exposure_bounds();
        let line = SensorTiming::default().line_time_s();
        assert!((lo - line).abs() < 1e-9);
        assert!((hi - 0.03 * 16.0).abs() < 1e-5);
        assert!((ecm.initial_exposure() - 0.02).abs() < 1e-7);
    }

    #[test]
    fn convert_within_envelope_is_exact() {
        let ecm = with_flicker(FlickerPeriod::Off);
        let c = ecm.convert(0.04);
        assert!((c.time_s - 0.02).abs() < 1e-6);
        assert!((c.gain - 2.0).abs() < 1e-4);
        assert_eq!(c.saturation, None);
        assert_eq!(c.reg_integration_time, 600);
        assert_eq!(c.reg_gain, 32);
        assert!((c.gain_code - 32.0).abs() < 1e-3);
    }

    #[test]
    fn convert_clamps_and_reports_saturation() {
        let ecm = with_flicker(FlickerPeriod::Off);
        let c = ecm.convert(10.0);
        assert_eq!(c.saturation, Some(Saturation::Maximum));
        assert!((c.exposure - 0.48).abs() < 1e-4);
        let c = ecm.convert(1e-7);
        assert_eq!(c.saturation, Some(Saturation::Minimum));
        assert_eq!(c.gain, 1.0);
    }

    #[test]
    fn flicker_locks_time_to_period() {
        let ecm = with_flicker(FlickerPeriod::Hz100);
        let c = ecm.convert(0.025);
        assert!((c.time_s - 0.01).abs() < 1e-7);
        assert!((c.gain - 2.5).abs() < 1e-4);
        assert!((c.exposure - 0.025).abs() < 1e-5);
        let c = ecm.convert(0.05);
        assert!((c.time_s - 0.03).abs() < 1e-7);
        assert_eq!(c.saturation, None);
    }

    #[test]
    fn flicker_below_one_period_saturates_at_minimum() {
        let ecm = with_flicker(FlickerPeriod::Hz100);
        let c = ecm.convert(0.005);
        assert!((c.time_s - 0.01).abs() < 1e-7);
        assert_eq!(c.gain, 1.0);
        assert_eq!(c.saturation, Some(Saturation::Minimum));
    }

    #[test]
    fn flicker_longer_than_frame_is_rejected() {
        let config = ExposureConversionConfig {
            flicker: FlickerPeriod::Hz100,
            route: ExposureRoute {
                time_dot: [0.0, 0.001, 0.002, 0.004, 0.005, 0.005],
                gain_dot: [1.0, 1.0, 2.0, 2.0, 4.0, 8.0],
            },
            ..default_config()
        };
        assert_eq!(
            ExposureConversion::new(&config).unwrap_err(),
            ConfigError::FlickerPeriod
        );
    }

    #[test]
    fn time_capped_by_line_timing() {
        let config = ExposureConversionConfig {
            route: ExposureRoute {
                time_dot: [0.0, 0.05, 0.05, 0.1, 0.1, 0.1],
                gain_dot: [1.0, 1.0, 2.0, 2.0, 4.0, 8.0],
            },
            ..default_config()
        };
        let ecm = ExposureConversion::new(&config).unwrap();
        let max_time = IntegrationLimits::new(&config.timing, &config.time_factor).max_time_s();
        let c = ecm.convert(0.09);
        assert!((c.time_s - max_time).abs() < 1e-7);
        assert!((c.exposure - 0.09).abs() < 1e-5);
    }

    #[test]
    fn invalid_gain_factor_is_rejected() {
        let config = ExposureConversionConfig {
            gain_factor: 0.0,
            ..default_config()
        };
        assert_eq!(
            ExposureConversion::new(&config).unwrap_err(),
            ConfigError::GainFactor(0.0)
        );
    }

    #[proptest]
    fn flicker_100hz_time_is_multiple_of_period(#[strategy(1e-6f32..10.0)] requested: f32) {
        let ecm = with_flicker(FlickerPeriod::Hz100);
        let c = ecm.convert(requested);
        let periods = c.time_s / 0.01;
        prop_assert!((periods - periods.round()).abs() < 1e-4, "time {}", c.time_s);
        prop_assert!(periods.round() >= 1.0);
    }

    #[proptest]
    fn flicker_120hz_time_is_multiple_of_period(#[strategy(1e-6f32..10.0)] requested: f32) {
        let ecm = with_flicker(FlickerPeriod::Hz120);
        let c = ecm.convert(requested);
        let periods = c.time_s * 120.0;
        prop_assert!((periods - periods.round()).abs() < 1e-3, "time {}", c.time_s);
    }

    #[proptest]
    fn conversion_stays_inside_envelope(#[strategy(1e-6f32..10.0)] requested: f32) {
        let ecm = with_flicker(FlickerPeriod::Off);
        let (lo, hi) = ecm.exposure_bounds();
        let c = ecm.convert(requested);
        prop_assert!(c.exposure >= lo * 0.999 && c.exposure <= hi * 1.001);
        prop_assert!((1.0..=16.0).contains(&c.gain));
        if requested >= lo && requested <= hi {
            prop_assert_eq!(c.saturation, None);
        }
    }
}
