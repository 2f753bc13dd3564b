// Configuration for sample-size planning
//
// Holds the thresholds the diagnostics policy applies on top of the formula
// engine. Loaded from TOML; every field has a default so a partial file works.

use crate::planner::critical_values::CriticalValueMode;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration for sample-size and MDE planning
///
/// # Example
/// ```
/// use abplan::planner::PlannerConfig;
///
/// let config = PlannerConfig::default();
/// assert_eq!(config.max_duration_days, 28);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Feasibility ceiling in days
    ///
    /// When the estimated time to collect the total sample exceeds this, a
    /// feasibility warning is attached. Four weeks covers weekly seasonality
    /// twice and is the usual upper bound for product experiments.
    ///
    /// Default: 28
    pub max_duration_days: u32,

    /// How z-scores are obtained from significance level and power
    ///
    /// - `table` (default): fixed lookup of the common levels, falling back to
    ///   0.05 / 0.80 with a warning for anything else
    /// - `exact`: inverse normal CDF for any level in (0, 1)
    pub critical_values: CriticalValueMode,

    /// Relative tolerance for a caller-supplied binary variance
    ///
    /// A binary metric's variance is `mean * (1 - mean)`. A supplied value
    /// deviating from that by more than this fraction gets a data-quality
    /// warning (the supplied value is still used).
    ///
    /// Default: 0.05 (5%)
    pub binary_variance_tolerance: f64,

    /// Coefficient of variation ceiling for continuous metrics
    ///
    /// CV = sqrt(variance) / mean. Above this the variance is considered
    /// implausible for the mean and a data-quality warning is attached.
    ///
    /// Default: 10.0
    pub max_coefficient_of_variation: f64,

    /// Compute duration sweep rows on the rayon thread pool
    ///
    /// Rows are independent, so this only affects throughput.
    ///
    /// Default: true
    pub parallel_sweep: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_duration_days: 28,
            critical_values: CriticalValueMode::Table,
            binary_variance_tolerance: 0.05,
            max_coefficient_of_variation: 10.0,
            parallel_sweep: true,
        }
    }
}

impl PlannerConfig {
    /// Create a strict configuration
    ///
    /// Three-week ceiling, exact critical values and tighter data-quality
    /// tolerances.
    pub fn strict() -> Self {
        Self {
            max_duration_days: 21,
            critical_values: CriticalValueMode::Exact,
            binary_variance_tolerance: 0.01,
            max_coefficient_of_variation: 5.0,
            parallel_sweep: true,
        }
    }

    /// Create a permissive configuration
    ///
    /// Eight-week ceiling and looser data-quality tolerances.
    pub fn permissive() -> Self {
        Self {
            max_duration_days: 56,
            critical_values: CriticalValueMode::Table,
            binary_variance_tolerance: 0.20,
            max_coefficient_of_variation: 50.0,
            parallel_sweep: true,
        }
    }

    /// Load and validate a configuration from a TOML file
    ///
    /// # Example TOML
    /// ```toml
    /// max_duration_days = 21
    /// critical_values = "exact"
    /// parallel_sweep = false
    /// ```
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read config file: {}", path.as_ref().display())
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).context("Failed to parse TOML planner configuration")?;
        config.validate().map_err(|e| anyhow::anyhow!(e))?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_duration_days == 0 {
            return Err("max_duration_days must be positive, got 0".to_string());
        }

        if !self.binary_variance_tolerance.is_finite() || self.binary_variance_tolerance < 0.0 {
            return Err(format!(
                "binary_variance_tolerance must be a non-negative number, got {}",
                self.binary_variance_tolerance
            ));
        }

        let max_cv = self.max_coefficient_of_variation;
        if !max_cv.is_finite() || max_cv <= 0.0 {
            return Err(format!(
                "max_coefficient_of_variation must be positive, got {}",
                max_cv
            ));
        }

        Ok(())
    }
}
