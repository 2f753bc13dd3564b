// A/B test planning: sample size and minimum detectable effect
//
// Two-sample z-test power analysis for binary (conversion-style) and
// continuous (revenue-style) metrics. Given a baseline mean and variance the
// planner answers either direction of the relation:
//
//   "How many users per variant do I need to detect a 2% lift?"
//   "With 40k users per variant, what is the smallest lift I can detect?"
//
// Inputs come either from the request itself or from a historical
// observation catalog keyed by (metric, real estate, lookback days). A
// duration sweep repeats the calculation over several candidate durations.
//
// Nothing in here fails: degenerate inputs leave numeric fields empty and
// explain themselves through warnings. The only state is the read-only
// catalog handed in by the caller.

mod calculator;
mod config;
mod critical_values;
mod diagnostics;
mod formula;
mod model;
mod resolver;
mod sweep;

pub use calculator::{compute_mde_or_sample_size, compute_with_diagnostics};
pub use config::PlannerConfig;
pub use critical_values::{
    lookup_z_alpha_over_2, lookup_z_beta, probit, z_alpha_over_2, z_beta, CriticalValue,
    CriticalValueMode, ZScores, DEFAULT_POWER, DEFAULT_SIGNIFICANCE_LEVEL,
};
pub use diagnostics::{
    Diagnostics, Warning, WarningCategory, INVALID_RESULT, MISSING_DAILY_TRAFFIC,
    ZERO_TOTAL_USERS,
};
pub use formula::{
    exposure_needed, mde_from_sample_size, mde_from_sample_size_with, sample_size_from_mde,
    sample_size_from_mde_with, variance_for_binary, MAX_SAMPLE_SIZE,
};
pub use model::{
    CalculationMode, CalculationRequest, CalculationResult, MetricObservation, MetricType, Target,
};
pub use resolver::{resolve, resolve_inputs, DataSource, ResolvedInputs, Resolution};
pub use sweep::{compute_duration_sweep, DurationSweepRow, RowOutcome};

#[cfg(test)]
mod tests;
