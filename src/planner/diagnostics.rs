// Warning aggregation policy
//
// Every component threads a `Diagnostics` list explicitly and hands it back to
// its caller; nothing accumulates in module-level state. Warnings are
// non-fatal, additive and keep insertion order. Duplicates are allowed.

use serde::{Deserialize, Serialize};

/// Attached when the formula engine returns no result or a non-finite value
pub const INVALID_RESULT: &str = "could not calculate a valid result";

/// Attached when exposure is requested against a zero user count
pub const ZERO_TOTAL_USERS: &str = "cannot calculate exposure with zero total users";

/// Attached to baseline projections when no daily traffic was supplied
pub const MISSING_DAILY_TRAFFIC: &str = "baseline daily traffic not provided";

/// Informal warning categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningCategory {
    /// Zero or negative inputs; the unresolved side of the result stays absent
    DegenerateInput,
    /// Division by zero, overflow or NaN caught before reaching the caller
    Numeric,
    /// Variance inconsistent with the mean
    DataQuality,
    /// Required duration or exposure beyond what is practical
    Feasibility,
    /// Historical match found or baseline projection used
    Resolution,
    /// Advisory text from the enrichment collaborator
    Enrichment,
}

/// A single categorized warning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub category: WarningCategory,
    pub message: String,
}

/// Ordered list of warnings produced while computing one result or row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Warning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a warning
    pub fn push(&mut self, category: WarningCategory, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(?category, "{}", message);
        self.entries.push(Warning { category, message });
    }

    pub fn degenerate(&mut self, message: impl Into<String>) {
        self.push(WarningCategory::DegenerateInput, message);
    }

    pub fn numeric(&mut self, message: impl Into<String>) {
        self.push(WarningCategory::Numeric, message);
    }

    pub fn data_quality(&mut self, message: impl Into<String>) {
        self.push(WarningCategory::DataQuality, message);
    }

    pub fn feasibility(&mut self, message: impl Into<String>) {
        self.push(WarningCategory::Feasibility, message);
    }

    pub fn resolution(&mut self, message: impl Into<String>) {
        self.push(WarningCategory::Resolution, message);
    }

    /// Append all warnings from `other`, keeping their order
    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn entries(&self) -> &[Warning] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any warning of the given category was recorded
    pub fn has(&self, category: WarningCategory) -> bool {
        self.entries.iter().any(|w| w.category == category)
    }

    /// First message recorded under `category`
    pub fn first(&self, category: WarningCategory) -> Option<&str> {
        self.entries
            .iter()
            .find(|w| w.category == category)
            .map(|w| w.message.as_str())
    }

    /// Plain messages in insertion order
    pub fn messages(&self) -> Vec<String> {
        self.entries.iter().map(|w| w.message.clone()).collect()
    }

    pub fn into_messages(self) -> Vec<String> {
        self.entries.into_iter().map(|w| w.message).collect()
    }
}

/// Flag a caller-supplied binary variance that disagrees with `mean * (1 - mean)`
///
/// The relative deviation is measured against the derived value. When the
/// derived value is zero (mean of 0 or 1) any non-zero variance is flagged.
pub fn check_binary_variance(
    mean: f64,
    variance: f64,
    tolerance: f64,
    diagnostics: &mut Diagnostics,
) {
    let expected = mean * (1.0 - mean);
    let deviation = if expected > 0.0 {
        (variance - expected).abs() / expected
    } else if variance == 0.0 {
        0.0
    } else {
        f64::INFINITY
    };

    if deviation > tolerance {
        diagnostics.data_quality(format!(
            "supplied variance {:.6} differs from binary variance mean*(1-mean) = {:.6}",
            variance, expected
        ));
    }
}

/// Flag a continuous metric whose variance is implausibly large for its mean
///
/// Uses the coefficient of variation, sqrt(variance) / mean.
pub fn check_coefficient_of_variation(
    mean: f64,
    variance: f64,
    max_cv: f64,
    diagnostics: &mut Diagnostics,
) {
    if mean <= 0.0 {
        return;
    }

    let cv = variance.sqrt() / mean;
    if cv > max_cv {
        diagnostics.data_quality(format!(
            "variance is unusually large relative to the mean \
             (coefficient of variation {:.2} exceeds {:.2})",
            cv, max_cv
        ));
    }
}

/// Estimate the days needed to collect `total_sample` users and flag it
/// against the ceiling
///
/// Returns `None` when the daily rate is unknown or not positive.
pub fn check_required_duration(
    total_sample: u64,
    daily_users: Option<f64>,
    max_duration_days: u32,
    diagnostics: &mut Diagnostics,
) -> Option<u32> {
    let daily = daily_users.filter(|d| d.is_finite() && *d > 0.0)?;
    let days = (total_sample as f64 / daily).ceil();
    if !days.is_finite() || days > u32::MAX as f64 {
        diagnostics.numeric("could not estimate the required duration");
        return None;
    }

    let days = days as u32;
    if days > max_duration_days {
        diagnostics.feasibility(format!(
            "estimated required duration of {} days exceeds the {}-day ceiling",
            days, max_duration_days
        ));
    }
    Some(days)
}

/// Flag an exposure above 100% of the available users
pub fn check_exposure(exposure: f64, diagnostics: &mut Diagnostics) {
    if exposure > 1.0 {
        diagnostics.feasibility(format!(
            "required sample exceeds the available users (exposure {:.1}%)",
            exposure * 100.0
        ));
    }
}
