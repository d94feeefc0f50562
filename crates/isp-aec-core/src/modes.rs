//! Closed mode selectors of the exposure control loop.
//!
//! Every selector converts from its raw hardware/ABI code with
//! [`TryFrom<u32>`]; the "invalid" sentinel of the register interface has
//! no variant, so a constructed value is always usable.

use crate::common::LUMA_MAX;
use crate::error::{ConfigError, Error};

/// Luminance formula the statistics hardware applies per zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeasuringMode {
    /// `Y = (R + G + B) * 85 / 256`.
    #[default]
    Mode1 = 1,
    /// `Y = 16 + 0.25 R + 0.5 G + 0.1094 B`.
    Mode2 = 2,
}

impl MeasuringMode {
    /// Maps a zone mean produced by this formula onto the full-range
    /// `[0, 255]` scale.
    pub fn normalize(self, zone_mean: u8) -> f32 {
        let y = zone_mean as f32;
        let full = match self {
            Self::Mode1 => y * 256.0 / 255.0,
            Self::Mode2 => (y - 16.0) / (0.25 + 0.5 + 0.1094),
        };
        full.clamp(0.0, LUMA_MAX)
    }
}

impl TryFrom<u32> for MeasuringMode {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Mode1),
            2 => Ok(Self::Mode2),
            other => Err(Error::InvalidMeasuringMode(other)),
        }
    }
}

/// Damping regime of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DampingMode {
    StillImage = 1,
    #[default]
    Video = 2,
}

/// Scene evaluation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SemMode {
    /// Use the configured damping mode as is.
    #[default]
    Disabled = 1,
    /// Classify still/video from frame-to-frame changes.
    Fix = 2,
    /// Like `Fix`, and bypass damping on a scene change.
    Adaptive = 3,
}

/// Exposure conversion curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EcmMode {
    #[default]
    Linear = 1,
}

/// Artificial-light flicker period the integration time is locked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlickerPeriod {
    #[default]
    Off = 0,
    /// 100 Hz light flicker (50 Hz mains).
    Hz100 = 1,
    /// 120 Hz light flicker (60 Hz mains).
    Hz120 = 2,
}

impl FlickerPeriod {
    /// Light intensity period in seconds, `None` when off.
    pub fn period_s(self) -> Option<f32> {
        match self {
            Self::Off => None,
            Self::Hz100 => Some(1.0 / 100.0),
            Self::Hz120 => Some(1.0 / 120.0),
        }
    }
}

/// Histogram source channel of the statistics hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistMode {
    Disabled = 0,
    RgbCombined = 1,
    R = 2,
    G = 3,
    B = 4,
    #[default]
    Y = 5,
}

macro_rules! config_enum_try_from {
    ($ty:ident, $name:literal, { $($raw:literal => $variant:ident),+ $(,)? }) => {
        impl TryFrom<u32> for $ty {
            type Error = ConfigError;

            fn try_from(value: u32) -> Result<Self, Self::Error> {
                match value {
                    $($raw => Ok(Self::$variant),)+
                    other => Err(ConfigError::UnknownEnum { name: $name, value: other }),
                }
            }
        }
    };
}

config_enum_try_from!(DampingMode, "damping mode", { 1 => StillImage, 2 => Video });
config_enum_try_from!(SemMode, "scene evaluation mode", { 1 => Disabled, 2 => Fix, 3 => Adaptive });
config_enum_try_from!(EcmMode, "exposure conversion mode", { 1 => Linear });
config_enum_try_from!(FlickerPeriod, "flicker period", { 0 => Off, 1 => Hz100, 2 => Hz120 });
config_enum_try_from!(HistMode, "histogram mode", {
    0 => Disabled, 1 => RgbCombined, 2 => R, 3 => G, 4 => B, 5 => Y,
});
