// Single-request entry point
//
// Validates the request, picks the variance, runs the formula engine in the
// request's direction and derives the totals, exposure and feasibility. Every
// problem becomes a warning; the only visible effect of a bad input is an
// absent numeric field.

use crate::planner::config::PlannerConfig;
use crate::planner::critical_values::ZScores;
use crate::planner::diagnostics::{
    check_binary_variance, check_coefficient_of_variation, check_exposure,
    check_required_duration, Diagnostics, INVALID_RESULT, ZERO_TOTAL_USERS,
};
use crate::planner::formula::{
    exposure_needed, mde_from_sample_size_with, sample_size_from_mde_with, variance_for_binary,
};
use crate::planner::model::{CalculationRequest, CalculationResult, MetricType, Target};

/// Compute the missing side of the MDE / sample-size pair for one request
///
/// # Example
/// ```
/// use abplan::planner::{
///     compute_mde_or_sample_size, CalculationRequest, MetricType, PlannerConfig, Target,
/// };
///
/// let request = CalculationRequest::new("CR", "home", MetricType::Binary, Target::ByMde(0.10))
///     .with_mean(0.05)
///     .with_variance(0.0475);
///
/// let result = compute_mde_or_sample_size(&request, &PlannerConfig::default());
/// assert_eq!(result.sample_size_per_variant, Some(29_792));
/// assert_eq!(result.total_sample_size_for_experiment, Some(59_584));
/// ```
pub fn compute_mde_or_sample_size(
    request: &CalculationRequest,
    config: &PlannerConfig,
) -> CalculationResult {
    let (result, diagnostics) = compute_with_diagnostics(request, config);
    CalculationResult {
        warnings: diagnostics.into_messages(),
        ..result
    }
}

/// Same as [`compute_mde_or_sample_size`], keeping the categorized warnings
///
/// The returned result's `warnings` field is left empty.
pub fn compute_with_diagnostics(
    request: &CalculationRequest,
    config: &PlannerConfig,
) -> (CalculationResult, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let mut result = CalculationResult::empty(request);

    let inputs = match validate(request) {
        Ok(inputs) => inputs,
        Err(problems) => {
            for problem in problems {
                diagnostics.degenerate(problem);
            }
            return (result, diagnostics);
        }
    };

    match (request.metric_type, request.variance) {
        (MetricType::Binary, Some(variance)) => check_binary_variance(
            inputs.mean,
            variance,
            config.binary_variance_tolerance,
            &mut diagnostics,
        ),
        (MetricType::Binary, None) => {}
        (MetricType::Continuous, _) => check_coefficient_of_variation(
            inputs.mean,
            inputs.variance,
            config.max_coefficient_of_variation,
            &mut diagnostics,
        ),
    }

    let z = ZScores::resolve(
        request.significance_level,
        request.statistical_power,
        config.critical_values,
        &mut diagnostics,
    );

    let pair = match request.target {
        Target::ByMde(mde) => sample_size_from_mde_with(inputs.mean, inputs.variance, mde, z)
            .filter(|n| *n > 0)
            .map(|n| (n, mde)),
        Target::BySampleSize(n) => {
            mde_from_sample_size_with(inputs.mean, inputs.variance, n, z).map(|mde| (n, mde))
        }
    };
    let Some((per_variant, mde)) = pair else {
        diagnostics.numeric(INVALID_RESULT);
        return (result, diagnostics);
    };

    let Some(total) = per_variant.checked_mul(u64::from(request.number_of_variants)) else {
        diagnostics.numeric(INVALID_RESULT);
        return (result, diagnostics);
    };

    result.sample_size_per_variant = Some(per_variant);
    result.minimum_detectable_effect = Some(mde);
    result.total_sample_size_for_experiment = Some(total);

    match request.total_users_in_selected_duration {
        Some(0) => diagnostics.degenerate(ZERO_TOTAL_USERS),
        users => {
            result.exposure_needed_percentage = exposure_needed(total, users);
            if let Some(exposure) = result.exposure_needed_percentage {
                check_exposure(exposure, &mut diagnostics);
            }
        }
    }

    result.estimated_duration_days = check_required_duration(
        total,
        daily_rate(request, &mut diagnostics),
        config.max_duration_days,
        &mut diagnostics,
    );

    (result, diagnostics)
}

/// Mean and variance that passed validation
struct ValidInputs {
    mean: f64,
    variance: f64,
}

/// Check every input, collecting all degenerate conditions before giving up
fn validate(request: &CalculationRequest) -> Result<ValidInputs, Vec<String>> {
    let mut problems = Vec::new();

    if !in_unit_interval(request.statistical_power) {
        problems.push(format!(
            "statistical power must be between 0 and 1, got {}",
            request.statistical_power
        ));
    }
    if !in_unit_interval(request.significance_level) {
        problems.push(format!(
            "significance level must be between 0 and 1, got {}",
            request.significance_level
        ));
    }
    if request.number_of_variants < 2 {
        problems.push(format!(
            "number of variants must be at least 2, got {}",
            request.number_of_variants
        ));
    }
    if request.target_duration_days == 0 {
        problems.push("target duration must be positive".to_string());
    }

    match request.target {
        Target::ByMde(mde) if !(mde.is_finite() && mde > 0.0) => problems.push(format!(
            "minimum detectable effect must be positive, got {}",
            mde
        )),
        Target::BySampleSize(0) => {
            problems.push("sample size per variant must be positive".to_string())
        }
        _ => {}
    }

    let mean = match request.mean {
        None => {
            problems.push("baseline mean not provided".to_string());
            None
        }
        Some(m) if !m.is_finite() || m <= 0.0 => {
            problems.push(format!("mean must be positive, got {}", m));
            None
        }
        Some(m) if request.metric_type == MetricType::Binary && m > 1.0 => {
            problems.push(format!(
                "binary metric mean must be within [0, 1], got {}",
                m
            ));
            None
        }
        Some(m) => Some(m),
    };

    let variance = match (request.variance, request.metric_type, mean) {
        (Some(v), _, _) if !v.is_finite() || v < 0.0 => {
            problems.push(format!("variance must be non-negative, got {}", v));
            None
        }
        (Some(v), _, _) => Some(v),
        (None, MetricType::Binary, m) => m.map(variance_for_binary),
        (None, MetricType::Continuous, _) => {
            problems.push("variance not provided".to_string());
            None
        }
    };
    if variance == Some(0.0) {
        problems.push("variance is zero; the metric cannot show a detectable effect".to_string());
    }

    match (mean, variance) {
        (Some(mean), Some(variance)) if problems.is_empty() => Ok(ValidInputs { mean, variance }),
        _ => Err(problems),
    }
}

/// Users per day: explicit daily traffic, else total users over the duration
fn daily_rate(request: &CalculationRequest, diagnostics: &mut Diagnostics) -> Option<f64> {
    match request.daily_traffic {
        Some(0) => {
            diagnostics.degenerate("daily traffic is zero; cannot estimate the required duration");
            None
        }
        Some(traffic) => Some(traffic as f64),
        None => match (
            request.total_users_in_selected_duration,
            request.target_duration_days,
        ) {
            (Some(users), days) if users > 0 && days > 0 => Some(users as f64 / days as f64),
            _ => None,
        },
    }
}

fn in_unit_interval(value: f64) -> bool {
    value.is_finite() && value > 0.0 && value < 1.0
}
