//! Statistics and configuration generators for property-based testing.
//!
//! Provides both strategy functions (for use with `#[strategy(...)]`) and
//! `Arbitrary`-deriving structs for common controller test inputs.

use isp_aec_core::common::{HIST_BIN_COUNT, ZONE_COUNT};
use isp_aec_core::damped_controller::DampingCoefficients;
use isp_aec_core::modes::{FlickerPeriod, MeasuringMode, SemMode};
use isp_aec_core::statistics::{StatisticsFrame, ZoneWeights};
use proptest::prelude::*;
use test_strategy::Arbitrary;

/// A measuring mode of the statistics block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub enum MeasuringModeChoice {
    #[weight(1)]
    Mode1,
    #[weight(1)]
    Mode2,
}

impl MeasuringModeChoice {
    pub fn mode(self) -> MeasuringMode {
        match self {
            Self::Mode1 => MeasuringMode::Mode1,
            Self::Mode2 => MeasuringMode::Mode2,
        }
    }
}

/// A flicker period selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub enum FlickerChoice {
    #[weight(2)]
    Off,
    #[weight(1)]
    Hz100,
    #[weight(1)]
    Hz120,
}

impl FlickerChoice {
    pub fn period(self) -> FlickerPeriod {
        match self {
            Self::Off => FlickerPeriod::Off,
            Self::Hz100 => FlickerPeriod::Hz100,
            Self::Hz120 => FlickerPeriod::Hz120,
        }
    }
}

/// A scene evaluation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub enum SemChoice {
    #[weight(1)]
    Disabled,
    #[weight(1)]
    Fix,
    #[weight(1)]
    Adaptive,
}

impl SemChoice {
    pub fn mode(self) -> SemMode {
        match self {
            Self::Disabled => SemMode::Disabled,
            Self::Fix => SemMode::Fix,
            Self::Adaptive => SemMode::Adaptive,
        }
    }
}

/// A statistics frame with arbitrary zone means and histogram.
#[derive(Debug, Clone, Arbitrary)]
pub struct ArbitraryFrame {
    #[strategy(statistics_frame())]
    pub frame: StatisticsFrame,
    #[strategy(zone_weights())]
    pub weights: ZoneWeights,
    pub mode: MeasuringModeChoice,
}

/// Closed-loop convergence scenario: a static scene that reaches the
/// set-point at `target_exposure`.
#[derive(Debug, Clone, Arbitrary)]
pub struct ConvergenceCase {
    #[strategy(0.002f32..=0.4)]
    pub target_exposure: f32,
    #[strategy(64.0f32..=192.0)]
    pub set_point: f32,
    #[strategy(2.0f32..=8.0)]
    pub tolerance: f32,
    #[strategy(damping_coefficients_from(0.2))]
    pub damping: DampingCoefficients,
    pub mode: MeasuringModeChoice,
}

/// Generate 25 zone means over the full `u8` range.
pub fn zone_means() -> impl Strategy<Value = [u8; ZONE_COUNT]> {
    proptest::array::uniform25(any::<u8>())
}

/// Generate 16 histogram bin counts.
pub fn histogram_bins() -> impl Strategy<Value = [u16; HIST_BIN_COUNT]> {
    proptest::array::uniform16(any::<u16>())
}

/// Generate a statistics frame.
pub fn statistics_frame() -> impl Strategy<Value = StatisticsFrame> {
    (zone_means(), histogram_bins()).prop_map(|(exp_mean, hist_bins)| StatisticsFrame {
        exp_mean,
        hist_bins,
    })
}

/// Generate a statistics frame where every zone reports the same mean.
pub fn uniform_frame() -> impl Strategy<Value = StatisticsFrame> {
    any::<u8>().prop_map(StatisticsFrame::uniform)
}

/// Generate zone weights with at least one active zone.
pub fn zone_weights() -> impl Strategy<Value = ZoneWeights> {
    proptest::array::uniform25(0u8..=8)
        .prop_filter("at least one active zone", |w| w.iter().any(|&x| x > 0))
        .prop_map(|w| ZoneWeights::from_flat(&w))
}

/// Generate valid damping coefficients.
pub fn damping_coefficients() -> impl Strategy<Value = DampingCoefficients> {
    damping_coefficients_from(0.05)
}

/// Generate damping coefficients in `[min, 1]`.
pub fn damping_coefficients_from(min: f32) -> impl Strategy<Value = DampingCoefficients> {
    (min..=1.0f32, min..=1.0f32, min..=1.0f32, min..=1.0f32).prop_map(
        |(over_still, under_still, over_video, under_video)| DampingCoefficients {
            over_still,
            under_still,
            over_video,
            under_video,
        },
    )
}
