//! Auto exposure configuration.
//!
//! [`Config`] is the static parameter set handed to `init` and
//! `update_config`; [`DynamicConfig`] carries the settings that may change
//! per stream without revalidating the whole set.

use isp_aec_core::damped_controller::ControlParams;
use isp_aec_core::exposure_conversion::{ExposureConversion, ExposureConversionConfig};
use isp_aec_core::exposure_route::ExposureRoute;
use isp_aec_core::gain_range::GainRange;
use isp_aec_core::modes::{DampingMode, EcmMode, FlickerPeriod, HistMode, MeasuringMode, SemMode};
use isp_aec_core::sensor_timing::{SensorTiming, TimeFactor};
use isp_aec_core::statistics::ZoneWeights;
use isp_aec_core::ConfigError;

/// Static configuration of an auto exposure session.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Per-zone weights of the 5x5 measurement grid.
    pub grid_weights: ZoneWeights,
    /// Histogram source channel. Reported back, not used by the loop.
    pub hist_mode: HistMode,
    /// Luminance formula the statistics block applies.
    pub measuring_mode: MeasuringMode,
    /// Target brightness, tolerance, damping and step limit.
    pub control: ControlParams,
    /// Damping regime used while scene evaluation is disabled.
    pub damping_mode: DampingMode,
    pub sem_mode: SemMode,
    pub ecm_mode: EcmMode,
    /// Initial flicker period; [`DynamicConfig`] can override it.
    pub flicker: FlickerPeriod,
    pub route: ExposureRoute,
    /// Gain linearization: `gain_code = gain * gain_factor + gain_bias`.
    pub gain_factor: f32,
    pub gain_bias: f32,
    pub timing: SensorTiming,
    pub gain_range: GainRange,
    pub time_factor: TimeFactor,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grid_weights: ZoneWeights::default(),
            hist_mode: HistMode::default(),
            measuring_mode: MeasuringMode::default(),
            control: ControlParams::default(),
            damping_mode: DampingMode::default(),
            sem_mode: SemMode::default(),
            ecm_mode: EcmMode::default(),
            flicker: FlickerPeriod::default(),
            route: ExposureRoute::default(),
            gain_factor: 16.0,
            gain_bias: 0.0,
            timing: SensorTiming::default(),
            gain_range: GainRange::default(),
            time_factor: TimeFactor::default(),
        }
    }
}

impl Config {
    /// Checks every bound. Nothing is derived or stored.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.build_conversion(self.flicker).map(|_| ())
    }

    /// Builds the conversion model for `flicker`, validating the control
    /// parameters on the way.
    pub(crate) fn build_conversion(
        &self,
        flicker: FlickerPeriod,
    ) -> Result<ExposureConversion, ConfigError> {
        self.control.validate()?;
        ExposureConversion::new(&self.conversion_config(flicker))
    }

    fn conversion_config(&self, flicker: FlickerPeriod) -> ExposureConversionConfig {
        ExposureConversionConfig {
            mode: self.ecm_mode,
            route: self.route,
            timing: self.timing,
            time_factor: self.time_factor,
            gain_range: self.gain_range,
            gain_factor: self.gain_factor,
            gain_bias: self.gain_bias,
            flicker,
        }
    }
}

/// Measurement window on the sensor, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Window {
    pub h_offset: u16,
    pub v_offset: u16,
    pub h_size: u16,
    pub v_size: u16,
}

/// Settings that may change while streaming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DynamicConfig {
    pub flicker: FlickerPeriod,
    /// Window the statistics block measures; echoed in every result.
    pub window: Window,
}
