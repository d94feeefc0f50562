//! Auto Exposure Control (AEC) building blocks for camera image signal
//! processors.
//!
//! Contains the statistics reducer, scene evaluation, the damped feedback
//! controller and the exposure conversion model that turns an exposure
//! correction into sensor integration time and analog gain. The session
//! and C API live in the `isp-aec` crate.

pub mod common;
pub mod damped_controller;
pub mod error;
pub mod exposure_conversion;
pub mod exposure_route;
pub mod gain_range;
pub mod modes;
pub mod scene_evaluation;
pub mod sensor_timing;
pub mod statistics;

pub use error::{ConfigError, Error};
