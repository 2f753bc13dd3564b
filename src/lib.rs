//! abplan - Sample size and minimum detectable effect planning for A/B tests
//!
//! This library provides the statistical core of an experiment planner: the
//! two-sample z-test relation between sample size and detectable effect,
//! lookup of historical metric observations, duration sweeps and the warning
//! policy that explains every missing number.

pub mod catalog;
pub mod cli;
pub mod enrichment;
pub mod error;
pub mod json_output;
pub mod planner;
