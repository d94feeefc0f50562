//! Exposure route: the path through (integration time, gain) space along
//! which exposure is increased.
//!
//! Six dots `(time[i], gain[i])`, both non-decreasing, define five
//! segments. Exposure inside a segment is reached by raising integration
//! time first, up to the segment's end time, and letting gain absorb the
//! remainder. A segment with constant gain is therefore a pure time ramp,
//! one with constant time a pure gain ramp.

use crate::common::{ROUTE_DOTS, all_finite};
use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExposureRoute {
    /// Integration time of each dot in seconds.
    pub time_dot: [f32; ROUTE_DOTS],
    /// Analog gain of each dot.
    pub gain_dot: [f32; ROUTE_DOTS],
}

impl Default for ExposureRoute {
    /// Time to one flicker period, double gain, time to three periods,
    /// then gain up to 16x.
    fn default() -> Self {
        Self {
            time_dot: [0.0, 0.01, 0.01, 0.03, 0.03, 0.03],
            gain_dot: [1.0, 1.0, 2.0, 2.0, 4.0, 16.0],
        }
    }
}

impl ExposureRoute {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !all_finite(&self.time_dot) || !all_finite(&self.gain_dot) {
            return Err(ConfigError::Route);
        }
        if self.time_dot[0] < 0.0 || self.gain_dot[0] <= 0.0 {
            return Err(ConfigError::Route);
        }
        let non_decreasing = |dots: &[f32; ROUTE_DOTS]| dots.windows(2).all(|w| w[0] <= w[1]);
        if !non_decreasing(&self.time_dot) || !non_decreasing(&self.gain_dot) {
            return Err(ConfigError::Route);
        }
        if self.exposure_at(ROUTE_DOTS - 1) <= 0.0 {
            return Err(ConfigError::EmptyRoute);
        }
        Ok(())
    }

    /// Exposure (time x gain) at dot `index`.
    pub fn exposure_at(&self, index: usize) -> f32 {
        self.time_dot[index] * self.gain_dot[index]
    }

    pub fn time_span(&self) -> (f32, f32) {
        (self.time_dot[0], self.time_dot[ROUTE_DOTS - 1])
    }

    pub fn gain_span(&self) -> (f32, f32) {
        (self.gain_dot[0], self.gain_dot[ROUTE_DOTS - 1])
    }

    /// Splits `exposure` into `(time, gain)` along the route.
    ///
    /// Exposures below the first dot keep its gain, exposures beyond the
    /// last dot keep its time.
    pub fn split(&self, exposure: f32) -> (f32, f32) {
        let split_at = |time: f32, fallback_gain: f32| {
            if time > 0.0 {
                (time, exposure / time)
            } else {
                (0.0, fallback_gain)
            }
        };

        if exposure <= self.exposure_at(0) {
            return split_at(exposure / self.gain_dot[0], self.gain_dot[0]);
        }
        for i in 0..ROUTE_DOTS - 1 {
            if exposure <= self.exposure_at(i + 1) {
                let time = (exposure / self.gain_dot[i]).clamp(self.time_dot[i], self.time_dot[i + 1]);
                return split_at(time, self.gain_dot[i]);
            }
        }
        let last = ROUTE_DOTS - 1;
        split_at(self.time_dot[last], self.gain_dot[last])
    }
}
