//! Damped exposure controller.
//!
//! Compares the measured brightness against the set-point and computes a
//! relative exposure correction. The correction is damped asymmetrically
//! (over- vs. under-exposure, still vs. video) and limited to a maximum
//! predicted brightness change per cycle, so several cycles may be needed
//! to converge.

use crate::common::{
    LUMA_MAX, MAX_RAW_CORRECTION, MIN_MEASURED_BRIGHTNESS, MIN_RAW_CORRECTION, all_finite,
};
use crate::error::ConfigError;
use crate::modes::DampingMode;
use crate::scene_evaluation::SceneDecision;

/// Fraction of the remaining brightness error corrected per cycle, in
/// `(0, 1]`. One means undamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DampingCoefficients {
    pub over_still: f32,
    pub under_still: f32,
    pub over_video: f32,
    pub under_video: f32,
}

impl Default for DampingCoefficients {
    fn default() -> Self {
        Self {
            over_still: 0.9,
            under_still: 0.7,
            over_video: 0.5,
            under_video: 0.3,
        }
    }
}

impl DampingCoefficients {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("over_still", self.over_still),
            ("under_still", self.under_still),
            ("over_video", self.over_video),
            ("under_video", self.under_video),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::Damping { name, value });
            }
        }
        Ok(())
    }

    /// Coefficient for `mode`, over-exposed (`over == true`) or
    /// under-exposed.
    pub fn coefficient(&self, mode: DampingMode, over: bool) -> f32 {
        match (mode, over) {
            (DampingMode::StillImage, true) => self.over_still,
            (DampingMode::StillImage, false) => self.under_still,
            (DampingMode::Video, true) => self.over_video,
            (DampingMode::Video, false) => self.under_video,
        }
    }
}

/// Loop parameters of the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlParams {
    /// Target brightness on the full-range scale.
    pub set_point: f32,
    /// Brightness band around the set-point treated as converged.
    pub tolerance: f32,
    pub damping: DampingCoefficients,
    /// Largest predicted brightness change per cycle.
    pub step_size: u8,
}

impl Default for ControlParams {
    fn default() -> Self {
        Self {
            set_point: 128.0,
            tolerance: 4.0,
            damping: DampingCoefficients::default(),
            step_size: 16,
        }
    }
}

impl ControlParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !all_finite(&[self.set_point]) || self.set_point <= 0.0 || self.set_point > LUMA_MAX {
            return Err(ConfigError::SetPoint(self.set_point));
        }
        if !all_finite(&[self.tolerance]) || self.tolerance < 0.0 || self.tolerance >= LUMA_MAX {
            return Err(ConfigError::Tolerance(self.tolerance));
        }
        if self.step_size == 0 {
            return Err(ConfigError::StepSize);
        }
        self.damping.validate()
    }
}

/// Correction computed for one cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correction {
    /// Relative exposure change to apply: the next exposure is
    /// `exposure * (1 + value)`.
    pub value: f32,
    /// Undamped relative change that would hit the set-point.
    pub raw: f32,
    /// Damping coefficient that was applied.
    pub coefficient: f32,
    pub converged: bool,
}

/// Computes the damped, step-limited correction for `measured`.
pub fn compute_correction(
    measured: f32,
    params: &ControlParams,
    decision: &SceneDecision,
) -> Correction {
    if (measured - params.set_point).abs() <= params.tolerance {
        return Correction {
            value: 0.0,
            raw: 0.0,
            coefficient: 0.0,
            converged: true,
        };
    }

    let measured = measured.max(MIN_MEASURED_BRIGHTNESS);
    let raw = (params.set_point / measured - 1.0).clamp(MIN_RAW_CORRECTION, MAX_RAW_CORRECTION);
    let coefficient = if decision.bypass_damping {
        1.0
    } else {
        params.damping.coefficient(decision.damping_mode, raw < 0.0)
    };
    let max_step = params.step_size as f32 / measured;
    let value = (raw * coefficient).clamp(-max_step, max_step);

    Correction {
        value,
        raw,
        coefficient,
        converged: false,
    }
}

/// Controller state carried between cycles: the exposure applied to the
/// sensor. Everything else a cycle produces is published with its result.
#[derive(Debug, Clone, PartialEq)]
pub struct DampedController {
    exposure: f32,
}

impl DampedController {
    pub fn new(initial_exposure: f32) -> Self {
        Self {
            exposure: initial_exposure,
        }
    }

    /// Returns to the not-yet-started state at `initial_exposure`.
    pub fn reset(&mut self, initial_exposure: f32) {
        *self = Self::new(initial_exposure);
    }

    /// Exposure currently applied to the sensor.
    pub fn exposure(&self) -> f32 {
        self.exposure
    }

    /// Computes this cycle's correction and returns it together with the
    /// exposure to request from the conversion model.
    pub fn update(
        &self,
        measured: f32,
        params: &ControlParams,
        decision: &SceneDecision,
    ) -> (Correction, f32) {
        let correction = compute_correction(measured, params, decision);
        tracing::trace!(
            measured,
            correction = correction.value,
            raw = correction.raw,
            "exposure correction"
        );
        (correction, self.exposure * (1.0 + correction.value))
    }

    /// Records the exposure the conversion model actually applied.
    pub fn set_applied_exposure(&mut self, exposure: f32) {
        self.exposure = exposure;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_strategy::proptest;

    fn video() -> SceneDecision {
        SceneDecision {
            damping_mode: DampingMode::Video,
            scene_change: false,
            bypass_damping: false,
        }
    }

    fn still() -> SceneDecision {
        SceneDecision {
            damping_mode: DampingMode::StillImage,
            ..video()
        }
    }

    fn unclamped(damping: DampingCoefficients) -> ControlParams {
        ControlParams {
            damping,
            step_size: u8::MAX,
            ..ControlParams::default()
        }
    }

    #[test]
    fn at_set_point_is_converged() {
        let c = compute_correction(128.0, &ControlParams::default(), &video());
        assert!(c.converged);
        assert_eq!(c.value, 0.0);
        let c = compute_correction(132.0, &ControlParams::default(), &video());
        assert!(c.converged);
        let c = compute_correction(132.5, &ControlParams::default(), &video());
        assert!(!c.converged);
    }

    #[test]
    fn over_and_under_use_their_own_coefficient() {
        let params = unclamped(DampingCoefficients {
            over_video: 0.8,
            under_video: 0.2,
            ..DampingCoefficients::default()
        });

        let over = compute_correction(200.0, &params, &video());
        assert!((over.raw - (128.0 / 200.0 - 1.0)).abs() < 1e-6);
        assert_eq!(over.coefficient, 0.8);
        assert!((over.value - over.raw * 0.8).abs() < 1e-6);

        let under = compute_correction(64.0, &params, &video());
        assert!((under.raw - 1.0).abs() < 1e-6);
        assert_eq!(under.coefficient, 0.2);
        assert!((under.value - 0.2).abs() < 1e-6);
    }

    #[test]
    fn still_mode_uses_still_coefficients() {
        let params = unclamped(DampingCoefficients::default());
        let c = compute_correction(200.0, &params, &still());
        assert_eq!(c.coefficient, params.damping.over_still);
        let c = compute_correction(50.0, &params, &still());
        assert_eq!(c.coefficient, params.damping.under_still);
    }

    #[test]
    fn bypass_applies_full_correction() {
        let params = unclamped(DampingCoefficients::default());
        let decision = SceneDecision {
            bypass_damping: true,
            ..still()
        };
        let c = compute_correction(64.0, &params, &decision);
        assert_eq!(c.coefficient, 1.0);
        assert!((c.value - 1.0).abs() < 1e-6);
    }

    #[test]
    fn step_size_limits_predicted_change() {
        let params = ControlParams::default();
        let c = compute_correction(200.0, &params, &video());
        assert!(c.value < 0.0);
        assert!((200.0 * c.value + 16.0).abs() < 1e-3);
    }

    #[test]
    fn black_frame_gives_finite_correction() {
        let c = compute_correction(0.0, &unclamped(DampingCoefficients::default()), &video());
        assert!(c.value.is_finite());
        assert_eq!(c.raw, MAX_RAW_CORRECTION);
    }

    #[test]
    fn validation_rejects_bad_bounds() {
        let params = ControlParams {
            set_point: 0.0,
            ..ControlParams::default()
        };
        assert_eq!(params.validate(), Err(ConfigError::SetPoint(0.0)));
        let params = ControlParams {
            tolerance: -1.0,
            ..ControlParams::default()
        };
        assert_eq!(params.validate(), Err(ConfigError::Tolerance(-1.0)));
        let params = ControlParams {
            step_size: 0,
            ..ControlParams::default()
        };
        assert_eq!(params.validate(), Err(ConfigError::StepSize));
        let params = ControlParams {
            damping: DampingCoefficients {
                under_still: 0.0,
                ..DampingCoefficients::default()
            },
            ..ControlParams::default()
        };
        assert_eq!(
            params.validate(),
            Err(ConfigError::Damping {
                name: "under_still",
                value: 0.0
            })
        );
        let params = ControlParams {
            damping: DampingCoefficients {
                over_video: f32::NAN,
                ..DampingCoefficients::default()
            },
            ..ControlParams::default()
        };
        assert!(params.validate().is_err());
        ControlParams::default().validate().unwrap();
    }

    #[test]
    fn controller_tracks_applied_exposure() {
        let mut controller = DampedController::new(0.02);
        let (c, requested) = controller.update(200.0, &ControlParams::default(), &video());
        assert!((requested - 0.02 * (1.0 + c.value)).abs() < 1e-9);
        assert_eq!(controller.exposure(), 0.02);
        controller.set_applied_exposure(requested);
        assert_eq!(controller.exposure(), requested);
        assert!(!c.converged);
        controller.reset(0.01);
        assert_eq!(controller, DampedController::new(0.01));
    }

    #[proptest]
    fn correction_never_overshoots(
        #[strategy(0.0f32..=255.0)] measured: f32,
        #[strategy(1.0f32..=255.0)] set_point: f32,
        #[strategy(0.01f32..=1.0)] coefficient: f32,
        #[strategy(1u8..=255)] step_size: u8,
    ) {
        let params = ControlParams {
            set_point,
            tolerance: 0.0,
            damping: DampingCoefficients {
                over_still: coefficient,
                under_still: coefficient,
                over_video: coefficient,
                under_video: coefficient,
            },
            step_size,
        };
        let c = compute_correction(measured, &params, &video());
        let m = measured.max(MIN_MEASURED_BRIGHTNESS);
        let predicted = m * (1.0 + c.value);
        prop_assert!((predicted - m).abs() <= step_size as f32 + 1e-3);
        if m < set_point {
            prop_assert!(predicted <= set_point + 1e-3);
        } else {
            prop_assert!(predicted >= set_point - 1e-3);
        }
    }
}
