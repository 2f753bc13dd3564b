// End-to-end planning scenarios
//
// Each test walks a request through resolution, critical values, the formula
// engine and the warning policy, the way a planning session would.

use super::*;
use crate::catalog::Catalog;

fn cr_home(target: Target) -> CalculationRequest {
    CalculationRequest::new("CR", "home", MetricType::Binary, target)
}

/// Scenario: binary metric, 5% conversion, 10% relative lift
///
/// 2 · 0.0475 · ((1.96 + 0.84) / (0.10 · 0.05))² = 29,792 per variant
#[test]
fn test_conversion_rate_sample_size() {
    let request = cr_home(Target::ByMde(0.10))
        .with_mean(0.05)
        .with_variance(0.0475);
    let result = compute_mde_or_sample_size(&request, &PlannerConfig::default());

    assert_eq!(result.mode, CalculationMode::MdeToSampleSize);
    assert_eq!(result.sample_size_per_variant, Some(29_792));
    assert_eq!(result.total_sample_size_for_experiment, Some(59_584));
    assert!(result.warnings.is_empty());
}

/// Scenario: the same inputs in reverse recover the 10% lift
#[test]
fn test_conversion_rate_round_trip() {
    let config = PlannerConfig::default();
    let forward = compute_mde_or_sample_size(
        &cr_home(Target::ByMde(0.10)).with_mean(0.05),
        &config,
    );
    let n = forward.sample_size_per_variant.unwrap();

    let reverse = compute_mde_or_sample_size(
        &cr_home(Target::BySampleSize(n)).with_mean(0.05),
        &config,
    );
    let mde = reverse.minimum_detectable_effect.unwrap();
    assert!(mde <= 0.10 + 1e-12);
    assert!((mde - 0.10).abs() < 1e-6);
}

/// Scenario: zero mean is degenerate; both numeric sides stay empty
#[test]
fn test_zero_mean_has_no_numbers() {
    let request = CalculationRequest::new(
        "AOV",
        "checkout",
        MetricType::Continuous,
        Target::BySampleSize(10_000),
    )
    .with_mean(0.0)
    .with_variance(100.0);
    let result = compute_mde_or_sample_size(&request, &PlannerConfig::default());

    assert!(result.minimum_detectable_effect.is_none());
    assert!(result.total_sample_size_for_experiment.is_none());
    assert!(!result.warnings.is_empty());
}

/// Scenario: zero users in the selected duration
#[test]
fn test_zero_users_no_exposure() {
    let request = cr_home(Target::ByMde(0.10))
        .with_mean(0.05)
        .with_total_users(0);
    let result = compute_mde_or_sample_size(&request, &PlannerConfig::default());

    assert!(result.exposure_needed_percentage.is_none());
    assert!(result.warnings.contains(&ZERO_TOTAL_USERS.to_string()));
}

/// Scenario: unordered sweep without catalog, traffic or baseline numbers
#[test]
fn test_sweep_without_any_inputs() {
    let rows = compute_duration_sweep(
        None,
        &cr_home(Target::ByMde(0.05)),
        &[21, 7, 14],
        &PlannerConfig::default(),
    );

    let days: Vec<u32> = rows.iter().map(|r| r.duration_days).collect();
    assert_eq!(days, vec![7, 14, 21]);
    for row in &rows {
        assert!(row.warnings.contains(&MISSING_DAILY_TRAFFIC.to_string()));
        assert!(row.result().is_none());
    }
}

/// Scenario: built-in catalog supplies some durations, baseline the rest
#[test]
fn test_sweep_over_builtin_catalog() {
    let catalog = Catalog::builtin().unwrap();
    let baseline = cr_home(Target::ByMde(0.05))
        .with_mean(0.05)
        .with_daily_traffic(12_000);

    let rows = compute_duration_sweep(
        Some(&catalog),
        &baseline,
        &[35, 28, 21, 14, 7],
        &PlannerConfig::default(),
    );
    assert_eq!(rows.len(), 5);

    let sources: Vec<DataSource> = rows.iter().map(|r| r.source).collect();
    assert_eq!(
        sources,
        vec![
            DataSource::Historical,
            DataSource::Historical,
            DataSource::Historical,
            DataSource::Historical,
            DataSource::BaselineProjection,
        ]
    );
    assert_eq!(rows[4].total_users_available, Some(420_000));
    assert!(rows.iter().all(|r| !r.is_error()));
}

/// More users per variant always means a smaller detectable effect
#[test]
fn test_mde_decreases_with_sample_size() {
    let config = PlannerConfig::default();
    let mde = |n: u64| {
        compute_mde_or_sample_size(&cr_home(Target::BySampleSize(n)).with_mean(0.05), &config)
            .minimum_detectable_effect
            .unwrap()
    };

    let sizes = [1_000, 5_000, 20_000, 100_000, 1_000_000];
    for pair in sizes.windows(2) {
        assert!(mde(pair[0]) > mde(pair[1]));
    }
}

/// Higher power or stricter significance always needs more users
#[test]
fn test_sample_size_grows_with_power_and_confidence() {
    let config = PlannerConfig::default();
    let n = |power: f64, alpha: f64| {
        compute_mde_or_sample_size(
            &cr_home(Target::ByMde(0.05))
                .with_mean(0.05)
                .with_power(power)
                .with_significance(alpha),
            &config,
        )
        .sample_size_per_variant
        .unwrap()
    };

    assert!(n(0.80, 0.05) < n(0.90, 0.05));
    assert!(n(0.90, 0.05) < n(0.95, 0.05));
    assert!(n(0.80, 0.10) < n(0.80, 0.05));
    assert!(n(0.80, 0.05) < n(0.80, 0.01));
}

/// A long experiment crosses the configured ceiling
#[test]
fn test_feasibility_depends_on_ceiling() {
    let request = cr_home(Target::ByMde(0.05))
        .with_mean(0.05)
        .with_daily_traffic(10_000);

    // 238,336 users at 10k per day: 24 days
    let default = compute_mde_or_sample_size(&request, &PlannerConfig::default());
    assert_eq!(default.estimated_duration_days, Some(24));
    assert!(default.warnings.is_empty());

    let strict = compute_mde_or_sample_size(&request, &PlannerConfig::strict());
    assert!(strict
        .warnings
        .iter()
        .any(|w| w.contains("exceeds the 21-day ceiling")));
}

/// Warnings from the resolver come before warnings from the calculation
#[test]
fn test_sweep_warning_order() {
    let baseline = CalculationRequest::new(
        "AOV",
        "checkout",
        MetricType::Continuous,
        Target::ByMde(0.02),
    )
    .with_mean(50.0);

    let rows = compute_duration_sweep(None, &baseline, &[10], &PlannerConfig::default());
    assert_eq!(
        rows[0].warnings,
        vec![
            "used baseline projection for duration 10 days".to_string(),
            MISSING_DAILY_TRAFFIC.to_string(),
            "cannot estimate exposure for duration 10 days".to_string(),
            "variance not provided".to_string(),
        ]
    );
    assert_eq!(
        rows[0].outcome,
        RowOutcome::Error {
            reason: "variance not provided".to_string()
        }
    );
}
