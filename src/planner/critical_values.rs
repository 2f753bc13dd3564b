// Critical values of the standard normal distribution
//
// The common significance and power levels are looked up in a fixed table
// keyed by the level rounded to two decimals. Anything else falls back to the
// 0.05 / 0.80 entries, and the caller is told about it through a warning.
// `CriticalValueMode::Exact` replaces the table with an inverse normal CDF.

use crate::planner::diagnostics::Diagnostics;
use serde::{Deserialize, Serialize};

/// Significance level used when a requested level is not in the table
pub const DEFAULT_SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Statistical power used when a requested level is not in the table
pub const DEFAULT_POWER: f64 = 0.80;

/// Two-sided z-scores keyed by significance level in hundredths
const SIGNIFICANCE_TABLE: [(i64, f64); 3] = [(1, 2.576), (5, 1.96), (10, 1.645)];

/// One-sided z-scores keyed by power in hundredths
const POWER_TABLE: [(i64, f64); 3] = [(80, 0.84), (90, 1.28), (95, 1.645)];

/// Source of z-scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CriticalValueMode {
    /// Fixed table with fallback
    #[default]
    Table,
    /// Inverse normal CDF
    Exact,
}

/// A table lookup result
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CriticalValue {
    pub z: f64,
    /// False when the level was not in the table and the default was used
    pub recognized: bool,
}

/// The pair of z-scores the formula engine needs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZScores {
    pub z_alpha_over_2: f64,
    pub z_beta: f64,
}

impl ZScores {
    /// Table lookup, silently falling back for unknown levels
    pub fn from_table(significance_level: f64, statistical_power: f64) -> Self {
        Self {
            z_alpha_over_2: z_alpha_over_2(significance_level),
            z_beta: z_beta(statistical_power),
        }
    }

    /// Obtain z-scores in the configured mode, recording any fallback
    pub fn resolve(
        significance_level: f64,
        statistical_power: f64,
        mode: CriticalValueMode,
        diagnostics: &mut Diagnostics,
    ) -> Self {
        match mode {
            CriticalValueMode::Table => {
                let alpha = lookup_z_alpha_over_2(significance_level);
                if !alpha.recognized {
                    diagnostics.degenerate(format!(
                        "significance level {} is not in the critical-value table; using {}",
                        significance_level, DEFAULT_SIGNIFICANCE_LEVEL
                    ));
                }

                let beta = lookup_z_beta(statistical_power);
                if !beta.recognized {
                    diagnostics.degenerate(format!(
                        "statistical power {} is not in the critical-value table; using {}",
                        statistical_power, DEFAULT_POWER
                    ));
                }

                Self {
                    z_alpha_over_2: alpha.z,
                    z_beta: beta.z,
                }
            }
            CriticalValueMode::Exact => {
                let exact = Self {
                    z_alpha_over_2: probit(1.0 - significance_level / 2.0),
                    z_beta: probit(statistical_power),
                };
                if exact.sum().is_finite() {
                    exact
                } else {
                    diagnostics.numeric(format!(
                        "no exact critical values for significance {} and power {}; \
                         using table values",
                        significance_level, statistical_power
                    ));
                    Self::resolve(
                        significance_level,
                        statistical_power,
                        CriticalValueMode::Table,
                        diagnostics,
                    )
                }
            }
        }
    }

    /// `z_{α/2} + z_β`
    pub fn sum(&self) -> f64 {
        self.z_alpha_over_2 + self.z_beta
    }
}

/// Round a level to hundredths; `None` for non-finite input
fn hundredths(level: f64) -> Option<i64> {
    if level.is_finite() {
        Some((level * 100.0).round() as i64)
    } else {
        None
    }
}

fn lookup(table: &[(i64, f64)], level: f64, default_key: i64) -> CriticalValue {
    let key = hundredths(level);
    if let Some(&(_, z)) = table.iter().find(|(k, _)| Some(*k) == key) {
        return CriticalValue { z, recognized: true };
    }

    let z = table
        .iter()
        .find(|(k, _)| *k == default_key)
        .map(|(_, z)| *z)
        .unwrap_or(f64::NAN);
    CriticalValue {
        z,
        recognized: false,
    }
}

/// Table lookup for the two-sided significance z-score
pub fn lookup_z_alpha_over_2(significance_level: f64) -> CriticalValue {
    lookup(&SIGNIFICANCE_TABLE, significance_level, 5)
}

/// Table lookup for the power z-score
pub fn lookup_z_beta(statistical_power: f64) -> CriticalValue {
    lookup(&POWER_TABLE, statistical_power, 80)
}

/// `z_{α/2}` for a significance level; unknown levels use 0.05 (1.96)
pub fn z_alpha_over_2(significance_level: f64) -> f64 {
    lookup_z_alpha_over_2(significance_level).z
}

/// `z_β` for a statistical power; unknown levels use 0.80 (0.84)
pub fn z_beta(statistical_power: f64) -> f64 {
    lookup_z_beta(statistical_power).z
}

/// Inverse normal CDF
///
/// Abramowitz & Stegun 26.2.23 rational approximation, absolute error below
/// 4.5e-4 on (0, 1). Returns ±∞ outside that interval and NaN for NaN.
pub fn probit(p: f64) -> f64 {
    if p.is_nan() {
        return f64::NAN;
    }
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }

    // Symmetry: for p < 0.5, compute -probit(1-p)
    let (sign, q) = if p < 0.5 { (-1.0, 1.0 - p) } else { (1.0, p) };

    const C0: f64 = 2.515517;
    const C1: f64 = 0.802853;
    const C2: f64 = 0.010328;
    const D1: f64 = 1.432788;
    const D2: f64 = 0.189269;
    const D3: f64 = 0.001308;

    let t = (-2.0 * (1.0 - q).ln()).sqrt();
    let z = t - (C0 + C1 * t + C2 * t * t) / (1.0 + D1 * t + D2 * t * t + D3 * t * t * t);

    sign * z
}
