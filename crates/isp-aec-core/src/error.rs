//! Error taxonomy of the exposure control loop.

/// Errors returned by exposure control operations.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum Error {
    /// The configuration violates a bound; nothing was changed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
    /// The session has not been initialized (or was released).
    #[error("session not initialized")]
    NotInitialized,
    /// `init` was called on an initialized session.
    #[error("session already initialized")]
    AlreadyInitialized,
    /// The call is not valid in the current lifecycle state.
    #[error("operation not valid in the current session state")]
    InvalidState,
    /// A raw measuring mode value does not name a measuring formula.
    #[error("invalid measuring mode {0}")]
    InvalidMeasuringMode(u32),
    /// Every zone weight is zero, so no brightness can be measured.
    #[error("no active measurement zones")]
    NoActiveZones,
    /// The requested exposure could not be met; the result was clamped.
    /// Raised by the range check of a result, never by `run` itself.
    #[error("exposure out of range (clamped)")]
    OutOfRange,
    /// No control cycle has completed since `init`.
    #[error("no result available yet")]
    NoResultYet,
}

/// The configuration bound that was violated.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("set-point {0} outside (0, 255]")]
    SetPoint(f32),
    #[error("tolerance {0} outside [0, 255)")]
    Tolerance(f32),
    #[error("damping coefficient {name} = {value} outside (0, 1]")]
    Damping { name: &'static str, value: f32 },
    #[error("step size must be at least 1")]
    StepSize,
    #[error("exposure route dots must be finite, non-negative and non-decreasing")]
    Route,
    #[error("exposure route never reaches a positive exposure")]
    EmptyRoute,
    #[error("exposure route time span misses the sensor integration limits")]
    TimeSpan,
    #[error("sensor timing parameters must be finite and positive")]
    SensorTiming,
    #[error("time factor table is invalid")]
    TimeFactor,
    #[error("gain-range table row {0} is invalid")]
    GainRangeRow(usize),
    #[error("gain-range table has no usable row")]
    EmptyGainRange,
    #[error("gain range does not overlap the exposure route")]
    GainSpan,
    #[error("gain linearization factor {0} must be finite and non-zero")]
    GainFactor(f32),
    #[error("gain linearization bias must be finite")]
    GainBias,
    #[error("unknown {name} value {value}")]
    UnknownEnum { name: &'static str, value: u32 },
    #[error("flicker period exceeds the longest integration time")]
    FlickerPeriod,
}
