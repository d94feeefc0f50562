//! Control loop of an initialized session.
//!
//! Owns the validated configuration, the conversion model derived from it,
//! and the per-stream state of the scene evaluator and the damped
//! controller. One [`Session::run`] call is one control cycle:
//! reduce statistics, evaluate the scene, compute the damped correction,
//! convert it to sensor settings.

use derive_more::Debug;
use isp_aec_core::damped_controller::DampedController;
use isp_aec_core::exposure_conversion::{ExposureConversion, Saturation};
use isp_aec_core::scene_evaluation::SceneEvaluator;
use isp_aec_core::statistics::{self, StatisticsFrame};
use isp_aec_core::Error;

use crate::config::{Config, DynamicConfig};
use crate::result::ExposureResult;

/// Saturation warnings logged per session before going quiet.
const MAX_SATURATION_WARNINGS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum State {
    Idle,
    Running,
}

#[derive(Debug)]
pub(crate) struct Session {
    config: Config,
    dynamic: DynamicConfig,
    #[debug(skip)]
    conversion: ExposureConversion,
    #[debug(skip)]
    scene: SceneEvaluator,
    controller: DampedController,
    state: State,
    frame_counter: u64,
    saturation_warnings: u32,
}

impl Session {
    pub(crate) fn new(config: Config) -> Result<Self, Error> {
        let dynamic = DynamicConfig {
            flicker: config.flicker,
            ..DynamicConfig::default()
        };
        let conversion = config.build_conversion(dynamic.flicker)?;
        let controller = DampedController::new(conversion.initial_exposure());
        Ok(Self {
            config,
            dynamic,
            conversion,
            scene: SceneEvaluator::new(),
            controller,
            state: State::Idle,
            frame_counter: 0,
            saturation_warnings: 0,
        })
    }

    pub(crate) fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn dynamic_config(&self) -> &DynamicConfig {
        &self.dynamic
    }

    pub(crate) fn state(&self) -> State {
        self.state
    }

    /// Exposure currently applied to the sensor.
    pub(crate) fn exposure(&self) -> f32 {
        self.controller.exposure()
    }

    /// Replaces the configuration. Controller and scene history carry
    /// over; the flicker period follows the new configuration.
    pub(crate) fn apply_config(&mut self, config: Config) -> Result<(), Error> {
        let conversion = config.build_conversion(config.flicker)?;
        self.dynamic.flicker = config.flicker;
        self.conversion = conversion;
        self.config = config;
        Ok(())
    }

    pub(crate) fn apply_dynamic_config(&mut self, dynamic: DynamicConfig) -> Result<(), Error> {
        if dynamic.flicker != self.dynamic.flicker {
            self.conversion = self.config.build_conversion(dynamic.flicker)?;
        }
        self.dynamic = dynamic;
        Ok(())
    }

    /// Enters the running state from the initial route exposure.
    pub(crate) fn start(&mut self) -> Result<(), Error> {
        if self.state == State::Running {
            return Err(Error::InvalidState);
        }
        self.controller.reset(self.conversion.initial_exposure());
        self.scene.reset();
        self.state = State::Running;
        Ok(())
    }

    pub(crate) fn stop(&mut self) -> Result<(), Error> {
        if self.state != State::Running {
            return Err(Error::InvalidState);
        }
        self.state = State::Idle;
        Ok(())
    }

    /// Runs one control cycle. On error no state changes.
    pub(crate) fn run(&mut self, frame: &StatisticsFrame) -> Result<ExposureResult, Error> {
        if self.state != State::Running {
            return Err(Error::InvalidState);
        }
        let reduction = statistics::reduce(
            frame,
            &self.config.grid_weights,
            self.config.measuring_mode,
        )?;

        let decision = self.scene.evaluate(
            self.config.sem_mode,
            self.config.damping_mode,
            self.controller.exposure(),
            reduction.brightness,
            &reduction.histogram,
        );
        let (correction, requested) =
            self.controller.update(reduction.brightness, &self.config.control, &decision);
        let applied = self.conversion.convert(requested);
        self.controller.set_applied_exposure(applied.exposure);
        self.frame_counter += 1;

        if let Some(saturation) = applied.saturation {
            self.warn_saturation(saturation, requested, applied.exposure);
        }
        tracing::debug!(
            frame = self.frame_counter,
            brightness = reduction.brightness,
            correction = correction.value,
            damping_mode = ?decision.damping_mode,
            time_s = applied.time_s,
            gain = applied.gain,
            converged = correction.converged,
            "exposure cycle"
        );

        Ok(ExposureResult {
            coarse_integration_time: applied.time_s,
            analog_gain: applied.gain,
            analog_gain_code_global: applied.gain_code,
            reg_integration_time: applied.reg_integration_time,
            reg_gain: applied.reg_gain,
            exposure: applied.exposure,
            pixel_clock_freq_mhz: self.config.timing.pixel_clock_freq_mhz,
            pixel_periods_per_line: self.config.timing.pixel_periods_per_line,
            meas_mode: self.config.measuring_mode,
            meas_win: self.dynamic.window,
            actives: reduction.active_zones as u32,
            grid_weights: self.config.grid_weights.flatten(),
            step_size: self.config.control.step_size,
            hist_mode: self.config.hist_mode,
            gain_factor: self.config.gain_factor,
            gain_bias: self.config.gain_bias,
            measured_brightness: reduction.brightness,
            correction: correction.value,
            converged: correction.converged,
            damping_mode: decision.damping_mode,
            scene_change: decision.scene_change,
            saturation: applied.saturation,
            frame_index: self.frame_counter,
        })
    }

    fn warn_saturation(&mut self, saturation: Saturation, requested: f32, applied: f32) {
        if self.saturation_warnings >= MAX_SATURATION_WARNINGS {
            return;
        }
        self.saturation_warnings += 1;
        tracing::warn!(
            ?saturation,
            requested,
            applied,
            "requested exposure outside the sensor range, clamped"
        );
    }
}
