//! Auto Exposure Control for camera image signal processors.
//!
//! Drives sensor integration time and analog gain from per-frame hardware
//! statistics so that the measured scene brightness settles at a set-point.
//!
//! This is the main public crate: it wraps the building blocks of
//! `isp-aec-core` into a session with an init/start/run/stop/release
//! lifecycle and exposes both a Rust API and a C-compatible FFI.

mod auto_exposure;
mod config;
pub mod ffi;
mod result;
mod session;

pub use auto_exposure::{AutoExposure, AutoExposureBuilder};
pub use config::{Config, DynamicConfig, Window};
pub use result::{ExposureResult, ResultReader};

pub use isp_aec_core::damped_controller::{ControlParams, DampingCoefficients};
pub use isp_aec_core::exposure_conversion::Saturation;
pub use isp_aec_core::exposure_route::ExposureRoute;
pub use isp_aec_core::gain_range::GainRange;
pub use isp_aec_core::modes::{
    DampingMode, EcmMode, FlickerPeriod, HistMode, MeasuringMode, SemMode,
};
pub use isp_aec_core::sensor_timing::{SensorTiming, TimeFactor};
pub use isp_aec_core::statistics::{StatisticsFrame, ZoneWeights};
pub use isp_aec_core::{ConfigError, Error};
