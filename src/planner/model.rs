//! Request, result and observation types shared by the planner components

use serde::{Deserialize, Serialize};

/// Kind of metric being tested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
#[serde(rename_all = "lowercase")]
pub enum MetricType {
    /// Proportion metric (conversion rate, click-through); mean in [0, 1]
    #[serde(alias = "Binary")]
    Binary,
    /// Unbounded metric (revenue, session length)
    #[serde(alias = "Continuous")]
    Continuous,
}

impl std::fmt::Display for MetricType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricType::Binary => write!(f, "binary"),
            MetricType::Continuous => write!(f, "continuous"),
        }
    }
}

/// A historical measurement of one metric on one surface over a lookback window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricObservation {
    /// Metric name (e.g., "CR", "AOV")
    pub metric: String,
    /// Surface or page the metric was measured on
    pub real_estate: String,
    pub metric_type: MetricType,
    /// Window the observation covers, in days
    pub lookback_days: u32,
    pub mean: f64,
    pub variance: f64,
    /// Unique users observed within the lookback window
    pub total_users: u64,
}

/// Which side of the MDE / sample-size relation is the input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
#[serde(rename_all = "camelCase")]
pub enum Target {
    /// Relative minimum detectable effect as a fraction (0.02 = 2%)
    ByMde(f64),
    /// Users per variant
    BySampleSize(u64),
}

impl Target {
    pub fn mode(&self) -> CalculationMode {
        match self {
            Target::ByMde(_) => CalculationMode::MdeToSampleSize,
            Target::BySampleSize(_) => CalculationMode::SampleSizeToMde,
        }
    }
}

/// Direction of a calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CalculationMode {
    MdeToSampleSize,
    SampleSizeToMde,
}

/// Everything needed for one calculation
///
/// `mean` and `variance` are optional so a request can be built before the
/// historical inputs are resolved. A binary metric without a variance uses
/// `mean * (1 - mean)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
#[serde(rename_all = "camelCase")]
pub struct CalculationRequest {
    pub metric: String,
    pub real_estate: String,
    pub metric_type: MetricType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variance: Option<f64>,
    pub statistical_power: f64,
    pub significance_level: f64,
    pub number_of_variants: u32,
    pub target_duration_days: u32,
    pub target: Target,
    /// Unique users expected over `target_duration_days`, for exposure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_users_in_selected_duration: Option<u64>,
    /// Average unique users per day, used for baseline projections
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_traffic: Option<u64>,
}

impl CalculationRequest {
    /// Request with the conventional defaults: power 0.8, significance 0.05,
    /// two variants, 14 days
    pub fn new(
        metric: impl Into<String>,
        real_estate: impl Into<String>,
        metric_type: MetricType,
        target: Target,
    ) -> Self {
        Self {
            metric: metric.into(),
            real_estate: real_estate.into(),
            metric_type,
            mean: None,
            variance: None,
            statistical_power: 0.8,
            significance_level: 0.05,
            number_of_variants: 2,
            target_duration_days: 14,
            target,
            total_users_in_selected_duration: None,
            daily_traffic: None,
        }
    }

    pub fn with_mean(mut self, mean: f64) -> Self {
        self.mean = Some(mean);
        self
    }

    pub fn with_variance(mut self, variance: f64) -> Self {
        self.variance = Some(variance);
        self
    }

    pub fn with_power(mut self, statistical_power: f64) -> Self {
        self.statistical_power = statistical_power;
        self
    }

    pub fn with_significance(mut self, significance_level: f64) -> Self {
        self.significance_level = significance_level;
        self
    }

    pub fn with_variants(mut self, number_of_variants: u32) -> Self {
        self.number_of_variants = number_of_variants;
        self
    }

    pub fn with_duration(mut self, target_duration_days: u32) -> Self {
        self.target_duration_days = target_duration_days;
        self
    }

    pub fn with_total_users(mut self, total_users: u64) -> Self {
        self.total_users_in_selected_duration = Some(total_users);
        self
    }

    pub fn with_daily_traffic(mut self, daily_traffic: u64) -> Self {
        self.daily_traffic = Some(daily_traffic);
        self
    }
}

/// Outcome of one calculation
///
/// Numeric fields are `None` when the inputs were degenerate or the
/// arithmetic failed; `warnings` explains why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    pub mode: CalculationMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_size_per_variant: Option<u64>,
    /// Relative MDE as a fraction of the mean
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_detectable_effect: Option<f64>,
    /// `sample_size_per_variant * number_of_variants`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_sample_size_for_experiment: Option<u64>,
    /// Fraction (not percent) of the available users the total sample needs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exposure_needed_percentage: Option<f64>,
    /// Days needed to accrue the total sample at the known daily rate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_duration_days: Option<u32>,
    /// `1 - significance_level`
    pub confidence_level: f64,
    pub power_level: f64,
    pub warnings: Vec<String>,
}

impl CalculationResult {
    /// Result with no numeric fields
    pub fn empty(request: &CalculationRequest) -> Self {
        Self {
            mode: request.target.mode(),
            sample_size_per_variant: None,
            minimum_detectable_effect: None,
            total_sample_size_for_experiment: None,
            exposure_needed_percentage: None,
            estimated_duration_days: None,
            confidence_level: 1.0 - request.significance_level,
            power_level: request.statistical_power,
            warnings: Vec::new(),
        }
    }

    /// Both sides of the relation are present
    pub fn is_computed(&self) -> bool {
        self.sample_size_per_variant.is_some() && self.minimum_detectable_effect.is_some()
    }

    /// MDE in percent (2.0 for a 2% relative effect)
    pub fn mde_percent(&self) -> Option<f64> {
        self.minimum_detectable_effect.map(|m| m * 100.0)
    }

    /// Exposure in percent
    pub fn exposure_percent(&self) -> Option<f64> {
        self.exposure_needed_percentage.map(|e| e * 100.0)
    }
}
