// Duration sweep orchestrator
//
// One independent calculation per candidate duration. Rows share no numeric
// state, so they may be computed on the rayon pool; the gathered rows are
// sorted by duration afterwards regardless of completion order. A row that
// cannot be computed is kept with an error marker.

use crate::catalog::Catalog;
use crate::planner::calculator::compute_with_diagnostics;
use crate::planner::config::PlannerConfig;
use crate::planner::diagnostics::{Diagnostics, WarningCategory, INVALID_RESULT};
use crate::planner::formula::variance_for_binary;
use crate::planner::model::{CalculationRequest, CalculationResult, MetricType};
use crate::planner::resolver::{resolve_inputs, DataSource};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Numeric payload of a sweep row, or the reason it is missing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RowOutcome {
    Computed(CalculationResult),
    Error { reason: String },
}

/// One candidate duration of a sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationSweepRow {
    pub duration_days: u32,
    pub source: DataSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_used: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variance_used: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_users_available: Option<u64>,
    pub outcome: RowOutcome,
    /// Resolution warnings followed by calculation warnings
    pub warnings: Vec<String>,
}

impl DurationSweepRow {
    pub fn result(&self) -> Option<&CalculationResult> {
        match &self.outcome {
            RowOutcome::Computed(result) => Some(result),
            RowOutcome::Error { .. } => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, RowOutcome::Error { .. })
    }
}

/// Run `baseline` once per candidate duration
///
/// Durations are treated as a set: duplicates collapse into one row. Every
/// remaining duration yields exactly one row, sorted ascending.
///
/// # Example
/// ```
/// use abplan::catalog::Catalog;
/// use abplan::planner::{
///     compute_duration_sweep, CalculationRequest, MetricType, PlannerConfig, Target,
/// };
///
/// let catalog = Catalog::builtin()?;
/// let baseline = CalculationRequest::new("CR", "home", MetricType::Binary, Target::ByMde(0.05))
///     .with_mean(0.05)
///     .with_daily_traffic(10_000);
///
/// let config = PlannerConfig::default();
/// let rows = compute_duration_sweep(Some(&catalog), &baseline, &[28, 7, 15], &config);
/// let days: Vec<u32> = rows.iter().map(|r| r.duration_days).collect();
/// assert_eq!(days, vec![7, 15, 28]);
/// # Ok::<(), abplan::error::CatalogError>(())
/// ```
pub fn compute_duration_sweep(
    catalog: Option<&Catalog>,
    baseline: &CalculationRequest,
    durations: &[u32],
    config: &PlannerConfig,
) -> Vec<DurationSweepRow> {
    let mut candidates = durations.to_vec();
    candidates.sort_unstable();
    candidates.dedup();

    let mut rows: Vec<DurationSweepRow> = if config.parallel_sweep {
        candidates
            .par_iter()
            .map(|&days| sweep_row(catalog, baseline, days, config))
            .collect()
    } else {
        candidates
            .iter()
            .map(|&days| sweep_row(catalog, baseline, days, config))
            .collect()
    };

    rows.sort_by_key(|row| row.duration_days);

    let failed = rows.iter().filter(|r| r.is_error()).count();
    tracing::debug!(
        "Sweep of {}/{} over {} durations ({} failed)",
        baseline.metric,
        baseline.real_estate,
        rows.len(),
        failed
    );
    rows
}

/// Compute a single row from its own copy of the baseline
fn sweep_row(
    catalog: Option<&Catalog>,
    baseline: &CalculationRequest,
    duration_days: u32,
    config: &PlannerConfig,
) -> DurationSweepRow {
    let mut diagnostics = Diagnostics::new();
    let inputs = resolve_inputs(catalog, baseline, duration_days, &mut diagnostics);

    let request = inputs.apply(baseline, duration_days);

    let (result, computed) = compute_with_diagnostics(&request, config);
    diagnostics.extend(computed);

    let outcome = if result.is_computed() {
        RowOutcome::Computed(CalculationResult {
            warnings: diagnostics.messages(),
            ..result
        })
    } else {
        let reason = diagnostics
            .first(WarningCategory::DegenerateInput)
            .or_else(|| diagnostics.first(WarningCategory::Numeric))
            .unwrap_or(INVALID_RESULT)
            .to_string();
        tracing::warn!(
            "Sweep row for {} days has no result: {}",
            duration_days,
            reason
        );
        RowOutcome::Error { reason }
    };

    DurationSweepRow {
        duration_days,
        source: inputs.source,
        mean_used: inputs.mean,
        variance_used: request
            .variance
            .or_else(|| derived_binary_variance(&request)),
        total_users_available: inputs.total_users,
        outcome,
        warnings: diagnostics.into_messages(),
    }
}

/// Variance the calculator derives for a binary request without one
fn derived_binary_variance(request: &CalculationRequest) -> Option<f64> {
    match request.metric_type {
        MetricType::Binary => request
            .mean
            .filter(|m| (0.0..=1.0).contains(m))
            .map(variance_for_binary),
        MetricType::Continuous => None,
    }
}
