//! Scene Evaluation Module (SEM).
//!
//! Resolves the damping regime for one control cycle. With scene
//! evaluation disabled the configured damping mode is used as is;
//! otherwise a frame whose brightness departs from what the previous frame
//! and the exposure change predict, or whose histogram changes at a steady
//! exposure, is classified as a scene cut (still-image damping). Continuous
//! small changes are video.

use crate::common::{
    LUMA_MAX, SCENE_CHANGE_BRIGHTNESS_RATIO, SCENE_CHANGE_HISTOGRAM_DISTANCE,
    SCENE_CHANGE_MIN_BRIGHTNESS, SCENE_STEADY_EXPOSURE_RATIO,
};
use crate::modes::{DampingMode, SemMode};
use crate::statistics::HistogramSummary;

/// Damping regime resolved for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneDecision {
    pub damping_mode: DampingMode,
    /// A scene cut was detected this cycle.
    pub scene_change: bool,
    /// Apply the correction undamped this cycle.
    pub bypass_damping: bool,
}

#[derive(Debug, Clone, Copy)]
struct Observation {
    exposure: f32,
    brightness: f32,
    histogram: HistogramSummary,
}

impl Observation {
    /// Whether `self` follows `previous` without a change of scene content.
    fn is_cut_from(&self, previous: &Observation) -> bool {
        let exposure_ratio = self.exposure / previous.exposure;
        let predicted = (previous.brightness * exposure_ratio).min(LUMA_MAX);
        let deviation =
            (self.brightness - predicted).abs() / predicted.max(SCENE_CHANGE_MIN_BRIGHTNESS);
        if deviation > SCENE_CHANGE_BRIGHTNESS_RATIO {
            return true;
        }
        // Exposure steps shift the whole histogram; only compare at rest.
        (exposure_ratio - 1.0).abs() <= SCENE_STEADY_EXPOSURE_RATIO
            && self.histogram.distance(&previous.histogram) > SCENE_CHANGE_HISTOGRAM_DISTANCE
    }
}

/// Scene evaluator holding one frame of history.
#[derive(Debug, Clone, Default)]
pub struct SceneEvaluator {
    previous: Option<Observation>,
}

impl SceneEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets the previous frame.
    pub fn reset(&mut self) {
        self.previous = None;
    }

    /// Resolves the damping regime for the current frame and remembers it
    /// as the previous frame for the next call.
    ///
    /// `exposure` is the exposure the frame was captured with, so the
    /// controller's own corrections are not mistaken for scene changes.
    pub fn evaluate(
        &mut self,
        sem_mode: SemMode,
        configured: DampingMode,
        exposure: f32,
        brightness: f32,
        histogram: &HistogramSummary,
    ) -> SceneDecision {
        let current = Observation {
            exposure,
            brightness,
            histogram: *histogram,
        };
        let previous = self.previous.replace(current);
        let cut = previous.is_some_and(|previous| current.is_cut_from(&previous));

        match sem_mode {
            SemMode::Disabled => SceneDecision {
                damping_mode: configured,
                scene_change: false,
                bypass_damping: false,
            },
            SemMode::Fix => SceneDecision {
                damping_mode: still_on_cut(cut),
                scene_change: cut,
                bypass_damping: false,
            },
            SemMode::Adaptive => {
                // Nothing to compare the first frame against; converge fast.
                let cut = cut || previous.is_none();
                SceneDecision {
                    damping_mode: still_on_cut(cut),
                    scene_change: cut,
                    bypass_damping: cut,
                }
            }
        }
    }
}

fn still_on_cut(cut: bool) -> DampingMode {
    if cut {
        DampingMode::StillImage
    } else {
        DampingMode::Video
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::HIST_BIN_COUNT;
    use crate::statistics::StatisticsFrame;
    use test_strategy::proptest;

    const E: f32 = 0.02;

    fn hist(mean: u8) -> HistogramSummary {
        HistogramSummary::from_bins(&StatisticsFrame::uniform(mean).hist_bins)
    }

    #[test]
    fn disabled_uses_configured_mode() {
        let mut sem = SceneEvaluator::new();
        for (brightness, configured) in [
            (10.0, DampingMode::StillImage),
            (250.0, DampingMode::StillImage),
            (20.0, DampingMode::Video),
        ] {
            let d = sem.evaluate(SemMode::Disabled, configured, E, brightness, &hist(0));
            assert_eq!(d.damping_mode, configured);
            assert!(!d.scene_change);
            assert!(!d.bypass_damping);
        }
    }

    #[test]
    fn fix_detects_brightness_jump() {
        let mut sem = SceneEvaluator::new();
        let h = hist(128);
        let first = sem.evaluate(SemMode::Fix, DampingMode::StillImage, E, 100.0, &h);
        assert_eq!(first.damping_mode, DampingMode::Video);
        let small = sem.evaluate(SemMode::Fix, DampingMode::StillImage, E, 110.0, &h);
        assert_eq!(small.damping_mode, DampingMode::Video);
        assert!(!small.scene_change);
        let cut = sem.evaluate(SemMode::Fix, DampingMode::StillImage, E, 200.0, &h);
        assert_eq!(cut.damping_mode, DampingMode::StillImage);
        assert!(cut.scene_change);
        assert!(!cut.bypass_damping);
    }

    #[test]
    fn exposure_step_is_not_a_cut() {
        let mut sem = SceneEvaluator::new();
        sem.evaluate(SemMode::Fix, DampingMode::Video, E, 50.0, &hist(50));
        let d = sem.evaluate(SemMode::Fix, DampingMode::Video, 2.0 * E, 100.0, &hist(100));
        assert!(!d.scene_change);
        assert_eq!(d.damping_mode, DampingMode::Video);

        // Same brightness after the exposure doubled: the scene got darker.
        let d = sem.evaluate(SemMode::Fix, DampingMode::Video, 4.0 * E, 100.0, &hist(100));
        assert!(d.scene_change);
    }

    #[test]
    fn prediction_saturates_at_full_scale() {
        let mut sem = SceneEvaluator::new();
        sem.evaluate(SemMode::Fix, DampingMode::Video, E, 200.0, &hist(200));
        let d = sem.evaluate(SemMode::Fix, DampingMode::Video, 2.0 * E, 255.0, &hist(255));
        assert!(!d.scene_change);
    }

    #[test]
    fn dark_frame_quantization_is_not_a_cut() {
        let mut sem = SceneEvaluator::new();
        sem.evaluate(SemMode::Fix, DampingMode::Video, E, 2.0, &hist(2));
        let d = sem.evaluate(SemMode::Fix, DampingMode::Video, 4.0 * E, 5.0, &hist(5));
        assert!(!d.scene_change);
    }

    #[test]
    fn fix_detects_histogram_change() {
        let mut sem = SceneEvaluator::new();
        sem.evaluate(SemMode::Fix, DampingMode::Video, E, 100.0, &hist(0));
        let d = sem.evaluate(SemMode::Fix, DampingMode::Video, E, 100.0, &hist(255));
        assert!(d.scene_change);
        assert_eq!(d.damping_mode, DampingMode::StillImage);
    }

    #[test]
    fn empty_histograms_do_not_trigger() {
        let mut sem = SceneEvaluator::new();
        let empty = HistogramSummary::from_bins(&[0; HIST_BIN_COUNT]);
        sem.evaluate(SemMode::Fix, DampingMode::Video, E, 100.0, &empty);
        let d = sem.evaluate(SemMode::Fix, DampingMode::Video, E, 101.0, &hist(255));
        assert!(!d.scene_change);
    }

    #[test]
    fn adaptive_bypasses_damping_on_first_frame_and_cut() {
        let mut sem = SceneEvaluator::new();
        let h = hist(128);
        let first = sem.evaluate(SemMode::Adaptive, DampingMode::Video, E, 100.0, &h);
        assert!(first.bypass_damping);
        let steady = sem.evaluate(SemMode::Adaptive, DampingMode::Video, E, 102.0, &h);
        assert!(!steady.bypass_damping);
        assert_eq!(steady.damping_mode, DampingMode::Video);
        let cut = sem.evaluate(SemMode::Adaptive, DampingMode::Video, E, 30.0, &h);
        assert!(cut.bypass_damping);
        assert_eq!(cut.damping_mode, DampingMode::StillImage);
    }

    #[test]
    fn reset_forgets_history() {
        let mut sem = SceneEvaluator::new();
        let h = hist(128);
        sem.evaluate(SemMode::Fix, DampingMode::Video, E, 10.0, &h);
        sem.reset();
        let d = sem.evaluate(SemMode::Fix, DampingMode::Video, E, 200.0, &h);
        assert!(!d.scene_change);
    }

    #[proptest]
    fn proportional_response_is_never_a_cut(
        #[strategy(16.0f32..=255.0)] brightness: f32,
        #[strategy(0.001f32..=0.1)] exposure: f32,
        #[strategy(0.25f32..=4.0)] step: f32,
    ) {
        let next = (brightness * step).min(LUMA_MAX);
        let h = hist(128);
        let mut sem = SceneEvaluator::new();
        sem.evaluate(SemMode::Fix, DampingMode::Video, exposure, brightness, &h);
        let d = sem.evaluate(SemMode::Fix, DampingMode::Video, exposure * step, next, &h);
        assert!(!d.scene_change, "{brightness} -> {next}");
    }
}
