//! Public auto exposure API.
//!
//! Provides the user-facing [`AutoExposure`] session handle and
//! [`AutoExposureBuilder`] for constructing an initialized session.

use isp_aec_core::statistics::StatisticsFrame;
use isp_aec_core::Error;

use crate::config::{Config, DynamicConfig};
use crate::result::{ExposureResult, ResultReader};
use crate::session::{Session, State};

// ─── AutoExposureBuilder ────────────────────────────────────────────

/// Builder for an initialized [`AutoExposure`] session.
///
/// # Example
/// ```
/// use isp_aec::{AutoExposure, Config};
///
/// let mut config = Config::default();
/// config.control.set_point = 110.0;
///
/// let aec = AutoExposure::builder()
///     .config(config)
///     .build()
///     .unwrap();
/// assert!(aec.is_initialized());
/// ```
pub struct AutoExposureBuilder {
    config: Config,
    dynamic: Option<DynamicConfig>,
    start: bool,
}

impl AutoExposureBuilder {
    fn new() -> Self {
        Self {
            config: Config::default(),
            dynamic: None,
            start: false,
        }
    }

    /// Set the initial configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Override the dynamic settings derived from the configuration.
    pub fn dynamic_config(mut self, dynamic: DynamicConfig) -> Self {
        self.dynamic = Some(dynamic);
        self
    }

    /// Start the control loop right after initialization.
    pub fn start(mut self, start: bool) -> Self {
        self.start = start;
        self
    }

    /// Validate the configuration and build the session.
    pub fn build(self) -> Result<AutoExposure, Error> {
        let mut aec = AutoExposure::new();
        aec.init(self.config)?;
        if let Some(dynamic) = self.dynamic {
            aec.set_dynamic_config(dynamic)?;
        }
        if self.start {
            aec.start()?;
        }
        Ok(aec)
    }
}

// ─── AutoExposure ───────────────────────────────────────────────────

/// Auto exposure control session.
///
/// # Lifecycle
///
/// 1. [`init()`](AutoExposure::init) validates a [`Config`].
/// 2. [`start()`](AutoExposure::start) resets the loop to the initial
///    route exposure.
/// 3. For each statistics frame call [`run()`](AutoExposure::run) and
///    apply the returned sensor settings.
/// 4. [`stop()`](AutoExposure::stop) and [`release()`](AutoExposure::release).
///
/// [`update_config()`](AutoExposure::update_config) may be called at any
/// time after `init` without losing convergence.
#[derive(Debug, Default)]
pub struct AutoExposure {
    session: Option<Session>,
    results: ResultReader,
}

impl AutoExposure {
    /// Creates an uninitialized session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a builder for an initialized session.
    pub fn builder() -> AutoExposureBuilder {
        AutoExposureBuilder::new()
    }

    pub fn is_initialized(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_running(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.state() == State::Running)
    }

    /// Returns the active configuration.
    pub fn config(&self) -> Option<&Config> {
        self.session.as_ref().map(Session::config)
    }

    pub fn dynamic_config(&self) -> Option<&DynamicConfig> {
        self.session.as_ref().map(Session::dynamic_config)
    }

    /// Validates `config` and initializes the session.
    pub fn init(&mut self, config: Config) -> Result<(), Error> {
        if self.session.is_some() {
            return Err(Error::AlreadyInitialized);
        }
        let session = Session::new(config)?;
        tracing::info!(
            set_point = session.config().control.set_point,
            flicker = ?session.config().flicker,
            "auto exposure initialized"
        );
        self.session = Some(session);
        self.results.clear();
        Ok(())
    }

    /// Replaces the configuration. On error the previous configuration
    /// stays in effect.
    pub fn update_config(&mut self, config: Config) -> Result<(), Error> {
        self.session_mut()?.apply_config(config)?;
        tracing::info!("auto exposure configuration updated");
        Ok(())
    }

    pub fn set_dynamic_config(&mut self, dynamic: DynamicConfig) -> Result<(), Error> {
        self.session_mut()?.apply_dynamic_config(dynamic)
    }

    /// Starts the control loop. Fails with [`Error::InvalidState`] if it
    /// is already running.
    pub fn start(&mut self) -> Result<(), Error> {
        let session = self.session_mut()?;
        session.start()?;
        tracing::info!(exposure = session.exposure(), "auto exposure started");
        Ok(())
    }

    /// Stops the control loop. The last result stays readable.
    pub fn stop(&mut self) -> Result<(), Error> {
        self.session_mut()?.stop()?;
        tracing::info!("auto exposure stopped");
        Ok(())
    }

    /// Runs one control cycle on `frame` and publishes the result.
    ///
    /// A clamped exposure is still a valid result: check
    /// [`ExposureResult::check_range`].
    pub fn run(&mut self, frame: &StatisticsFrame) -> Result<ExposureResult, Error> {
        let result = self.session_mut()?.run(frame)?;
        self.results.publish(result);
        Ok(result)
    }

    /// Returns the result of the most recent successful cycle.
    pub fn get_results(&self) -> Result<ExposureResult, Error> {
        if self.session.is_none() {
            return Err(Error::NotInitialized);
        }
        self.results.get()
    }

    /// Returns a reader that observes results from another thread.
    pub fn result_reader(&self) -> ResultReader {
        self.results.clone()
    }

    /// Tears the session down. The handle can be initialized again.
    pub fn release(&mut self) -> Result<(), Error> {
        if self.session.take().is_none() {
            return Err(Error::NotInitialized);
        }
        self.results.clear();
        tracing::info!("auto exposure released");
        Ok(())
    }

    fn session_mut(&mut self) -> Result<&mut Session, Error> {
        self.session.as_mut().ok_or(Error::NotInitialized)
    }
}
