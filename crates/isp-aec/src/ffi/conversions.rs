//! Conversions between the C API types and the Rust types.

use isp_aec_core::Error;

use crate::config::{Config, DynamicConfig, Window};
use crate::result::ExposureResult;
use crate::{
    ControlParams, DampingCoefficients, DampingMode, EcmMode, ExposureRoute, FlickerPeriod,
    GainRange, HistMode, MeasuringMode, SemMode, SensorTiming, StatisticsFrame, TimeFactor,
    ZoneWeights,
};

use super::types::{AecConfig, AecDyCfg, AecError, AecResult, AecStat, AecWindow};

impl From<Error> for AecError {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidConfig(_) => Self::InvalidConfig,
            Error::NotInitialized => Self::NotInitialized,
            Error::AlreadyInitialized => Self::AlreadyInitialized,
            Error::InvalidState => Self::InvalidState,
            Error::InvalidMeasuringMode(_) => Self::InvalidMeasuringMode,
            Error::NoActiveZones => Self::NoActiveZones,
            Error::OutOfRange => Self::OutOfRange,
            Error::NoResultYet => Self::NoResultYet,
        }
    }
}

impl AecStat {
    pub(crate) fn to_rust(&self) -> StatisticsFrame {
        StatisticsFrame {
            exp_mean: self.exp_mean,
            hist_bins: self.hist_bins,
        }
    }
}

impl AecConfig {
    /// Range-checks the raw mode codes and builds the Rust configuration.
    /// Numeric bounds are left to [`Config::validate`].
    pub(crate) fn to_rust(&self) -> Result<Config, Error> {
        Ok(Config {
            grid_weights: ZoneWeights::from_flat(&self.grid_weights),
            hist_mode: HistMode::try_from(self.hist_mode)?,
            measuring_mode: MeasuringMode::try_from(self.meas_mode)?,
            control: ControlParams {
                set_point: self.set_point,
                tolerance: self.clm_tolerance,
                damping: DampingCoefficients {
                    over_still: self.damp_over_still,
                    under_still: self.damp_under_still,
                    over_video: self.damp_over_video,
                    under_video: self.damp_under_video,
                },
                step_size: self.step_size,
            },
            damping_mode: DampingMode::try_from(self.damping_mode)?,
            sem_mode: SemMode::try_from(self.sem_mode)?,
            ecm_mode: EcmMode::try_from(self.ecm_mode)?,
            flicker: FlickerPeriod::try_from(self.ecm_flicker_select)?,
            route: ExposureRoute {
                time_dot: self.ecm_time_dot,
                gain_dot: self.ecm_gain_dot,
            },
            gain_factor: self.gain_factor,
            gain_bias: self.gain_bias,
            timing: SensorTiming {
                line_periods_per_field: self.line_periods_per_field,
                pixel_clock_freq_mhz: self.pixel_clock_freq_mhz,
                pixel_periods_per_line: self.pixel_periods_per_line,
            },
            gain_range: GainRange(self.gain_range),
            time_factor: TimeFactor(self.time_factor),
        })
    }

    pub(crate) fn from_rust(config: &Config) -> Self {
        let control = &config.control;
        Self {
            grid_weights: config.grid_weights.flatten(),
            hist_mode: config.hist_mode as u32,
            meas_mode: config.measuring_mode as u32,
            set_point: control.set_point,
            clm_tolerance: control.tolerance,
            damp_over_still: control.damping.over_still,
            damp_under_still: control.damping.under_still,
            damp_over_video: control.damping.over_video,
            damp_under_video: control.damping.under_video,
            damping_mode: config.damping_mode as u32,
            sem_mode: config.sem_mode as u32,
            step_size: control.step_size,
            ecm_mode: config.ecm_mode as u32,
            ecm_time_dot: config.route.time_dot,
            ecm_gain_dot: config.route.gain_dot,
            ecm_flicker_select: config.flicker as u32,
            gain_factor: config.gain_factor,
            gain_bias: config.gain_bias,
            line_periods_per_field: config.timing.line_periods_per_field,
            pixel_clock_freq_mhz: config.timing.pixel_clock_freq_mhz,
            pixel_periods_per_line: config.timing.pixel_periods_per_line,
            gain_range: config.gain_range.0,
            time_factor: config.time_factor.0,
        }
    }
}

impl AecWindow {
    pub(crate) fn to_rust(self) -> Window {
        Window {
            h_offset: self.h_offs,
            v_offset: self.v_offs,
            h_size: self.h_size,
            v_size: self.v_size,
        }
    }

    pub(crate) fn from_rust(window: Window) -> Self {
        Self {
            h_offs: window.h_offset,
            v_offs: window.v_offset,
            h_size: window.h_size,
            v_size: window.v_size,
        }
    }
}

impl AecDyCfg {
    pub(crate) fn to_rust(&self) -> Result<DynamicConfig, Error> {
        Ok(DynamicConfig {
            flicker: FlickerPeriod::try_from(self.flicker)?,
            window: self.win.to_rust(),
        })
    }
}

impl AecResult {
    pub(crate) fn from_rust(result: &ExposureResult) -> Self {
        Self {
            coarse_integration_time: result.coarse_integration_time,
            analog_gain: result.analog_gain,
            analog_gain_code_global: result.analog_gain_code_global,
            reg_integration_time: result.reg_integration_time,
            reg_gain: result.reg_gain,
            exposure: result.exposure,
            pixel_clock_freq_mhz: result.pixel_clock_freq_mhz,
            pixel_periods_per_line: result.pixel_periods_per_line,
            meas_mode: result.meas_mode as u32,
            meas_win: AecWindow::from_rust(result.meas_win),
            actives: result.actives,
            grid_weights: result.grid_weights,
            step_size: result.step_size,
            hist_mode: result.hist_mode as u32,
            gain_factor: result.gain_factor,
            gain_bias: result.gain_bias,
            measured_brightness: result.measured_brightness,
            correction: result.correction,
            converged: result.converged,
            out_of_range: result.out_of_range(),
            scene_change: result.scene_change,
            damping_mode: result.damping_mode as u32,
            frame_index: result.frame_index,
        }
    }
}
