// Two-sample z-test sample-size relation
//
//   MDE_abs = (z_{α/2} + z_β) · sqrt(2 · variance / n)
//   MDE_rel = MDE_abs / mean
//
// Both directions are pure. Invalid operands yield `None`, never NaN or ∞;
// the caller decides which warning to attach.

use crate::planner::critical_values::ZScores;

/// Largest per-variant sample size handed back (exactly representable in f64)
pub const MAX_SAMPLE_SIZE: u64 = 1 << 53;

/// Relative distance from an integer below which a float is treated as that
/// integer before rounding up
const CEIL_TOLERANCE: f64 = 1e-9;

/// Absolute cap on the snap window; large counts must still round up
const CEIL_TOLERANCE_ABS: f64 = 1e-6;

/// Variance of a Bernoulli metric with success rate `mean`
///
/// ```
/// use abplan::planner::variance_for_binary;
///
/// assert!((variance_for_binary(0.05) - 0.0475).abs() < 1e-12);
/// assert_eq!(variance_for_binary(0.0), 0.0);
/// assert_eq!(variance_for_binary(1.0), 0.0);
/// ```
pub fn variance_for_binary(mean: f64) -> f64 {
    mean * (1.0 - mean)
}

/// Per-variant sample size needed to detect a relative effect, table z-scores
///
/// # Arguments
/// * `mean` - Baseline mean (must be positive)
/// * `variance` - Per-user variance of the metric
/// * `mde_relative` - Target effect as a fraction of the mean (0.02 = 2%)
/// * `power` - Statistical power, e.g. 0.8
/// * `alpha` - Significance level, e.g. 0.05
///
/// # Example
/// ```
/// use abplan::planner::sample_size_from_mde;
///
/// let n = sample_size_from_mde(0.05, 0.0475, 0.10, 0.8, 0.05);
/// assert_eq!(n, Some(29_792));
/// ```
pub fn sample_size_from_mde(
    mean: f64,
    variance: f64,
    mde_relative: f64,
    power: f64,
    alpha: f64,
) -> Option<u64> {
    sample_size_from_mde_with(mean, variance, mde_relative, ZScores::from_table(alpha, power))
}

/// Per-variant sample size for explicit z-scores
///
/// `n = 2 · variance · ((z_{α/2} + z_β) / (mde_relative · mean))²`, rounded up.
/// Rounding is a ceiling: a sample one user short no longer carries the
/// requested power.
pub fn sample_size_from_mde_with(
    mean: f64,
    variance: f64,
    mde_relative: f64,
    z: ZScores,
) -> Option<u64> {
    let z_sum = z.sum();
    if !all_finite(&[mean, variance, mde_relative, z_sum]) {
        return None;
    }
    if mean <= 0.0 || variance < 0.0 || mde_relative <= 0.0 {
        return None;
    }

    let effect = mde_relative * mean;
    let n = 2.0 * variance * (z_sum / effect).powi(2);
    ceil_count(n)
}

/// Relative MDE detectable with `n_per_group` users per variant, table z-scores
///
/// # Example
/// ```
/// use abplan::planner::mde_from_sample_size;
///
/// let mde = mde_from_sample_size(0.05, 0.0475, 29_792, 0.8, 0.05).unwrap();
/// assert!((mde - 0.10).abs() < 1e-9);
/// ```
pub fn mde_from_sample_size(
    mean: f64,
    variance: f64,
    n_per_group: u64,
    power: f64,
    alpha: f64,
) -> Option<f64> {
    mde_from_sample_size_with(mean, variance, n_per_group, ZScores::from_table(alpha, power))
}

/// Relative MDE for explicit z-scores
pub fn mde_from_sample_size_with(
    mean: f64,
    variance: f64,
    n_per_group: u64,
    z: ZScores,
) -> Option<f64> {
    let z_sum = z.sum();
    if !all_finite(&[mean, variance, z_sum]) {
        return None;
    }
    if mean <= 0.0 || variance < 0.0 || n_per_group == 0 {
        return None;
    }

    let mde_absolute = z_sum * (2.0 * variance / n_per_group as f64).sqrt();
    let mde_relative = mde_absolute / mean;
    mde_relative.is_finite().then_some(mde_relative)
}

/// Fraction of the available users the total sample would consume
///
/// `None` when the user count is unknown or zero.
pub fn exposure_needed(total_sample_size: u64, total_users_available: Option<u64>) -> Option<f64> {
    let users = total_users_available.filter(|u| *u > 0)?;
    Some(total_sample_size as f64 / users as f64)
}

fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

/// Round a non-negative count up to the next integer
///
/// Values within `CEIL_TOLERANCE` (relative, capped at `CEIL_TOLERANCE_ABS`)
/// of an integer snap to it, so 29792.00000000001 from floating-point noise
/// stays 29792 instead of becoming 29793. The cap keeps 2000000000.4 at
/// 2000000001.
fn ceil_count(n: f64) -> Option<u64> {
    if !n.is_finite() || n < 0.0 {
        return None;
    }

    let nearest = n.round();
    let window = (nearest.max(1.0) * CEIL_TOLERANCE).min(CEIL_TOLERANCE_ABS);
    let rounded = if (n - nearest).abs() <= window {
        nearest
    } else {
        n.ceil()
    };

    if rounded > MAX_SAMPLE_SIZE as f64 {
        return None;
    }
    Some(rounded as u64)
}
