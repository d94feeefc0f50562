//! Property-based test support for the auto exposure controller.
//!
//! Provides statistics and configuration generators plus a simulated
//! linear scene for closed-loop convergence tests.
//!
//! # Usage
//!
//! ```ignore
//! use isp_aec_proptest::generators::*;
//! use test_strategy::proptest;
//!
//! #[proptest]
//! fn my_test(#[strategy(statistics_frame())] frame: StatisticsFrame) {
//!     assert_eq!(frame.exp_mean.len(), 25);
//! }
//! ```

pub mod generators;
pub mod scene;

pub use proptest;
pub use test_strategy;
