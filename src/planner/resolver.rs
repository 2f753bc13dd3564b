// Historical observation resolver
//
// A pure lookup the caller invokes explicitly whenever the key inputs change.
// It returns an explicit "found" / "not found" tag; the fallback to baseline
// inputs is a separate, equally pure step (`resolve_inputs`). Matching is exact
// on metric, real estate and lookback window. There is no nearest-duration or
// interpolated fallback.

use crate::catalog::Catalog;
use crate::planner::diagnostics::{Diagnostics, MISSING_DAILY_TRAFFIC};
use crate::planner::model::{CalculationRequest, MetricObservation, MetricType};
use serde::{Deserialize, Serialize};

/// Outcome of a catalog lookup
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution<'a> {
    /// Observation whose key matches exactly
    Found(&'a MetricObservation),
    /// No exact match; use baseline projection
    NotFound,
}

impl<'a> Resolution<'a> {
    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found(_))
    }

    pub fn observation(&self) -> Option<&'a MetricObservation> {
        match self {
            Resolution::Found(obs) => Some(obs),
            Resolution::NotFound => None,
        }
    }
}

/// Where the inputs of a calculation came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataSource {
    Historical,
    BaselineProjection,
}

/// Inputs for one calculation after resolution
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedInputs {
    pub source: DataSource,
    pub metric_type: MetricType,
    pub mean: Option<f64>,
    pub variance: Option<f64>,
    pub total_users: Option<u64>,
}

impl ResolvedInputs {
    /// Request to compute for `duration_days` with these inputs in place
    ///
    /// Target, power, significance and variant count come from `request`.
    /// Historical inputs drop the request's daily traffic, so the daily rate
    /// is derived from the observed users over the lookback window.
    pub fn apply(&self, request: &CalculationRequest, duration_days: u32) -> CalculationRequest {
        CalculationRequest {
            metric_type: self.metric_type,
            mean: self.mean,
            variance: self.variance,
            target_duration_days: duration_days,
            total_users_in_selected_duration: self.total_users,
            daily_traffic: match self.source {
                DataSource::Historical => None,
                DataSource::BaselineProjection => request.daily_traffic,
            },
            ..request.clone()
        }
    }
}

/// Find the observation for an exact (metric, real estate, duration) key
///
/// Never mutates the catalog; calling it twice with the same arguments gives
/// the same answer.
///
/// # Example
/// ```
/// use abplan::catalog::Catalog;
/// use abplan::planner::resolve;
///
/// let catalog = Catalog::builtin()?;
/// assert!(resolve(&catalog, "CR", "home", 14).is_found());
/// assert!(!resolve(&catalog, "CR", "home", 15).is_found());
/// # Ok::<(), abplan::error::CatalogError>(())
/// ```
pub fn resolve<'a>(
    catalog: &'a Catalog,
    metric: &str,
    real_estate: &str,
    target_duration_days: u32,
) -> Resolution<'a> {
    match catalog.find(metric, real_estate, target_duration_days) {
        Some(obs) => {
            tracing::debug!(
                "Historical match for {}/{} over {} days",
                metric,
                real_estate,
                target_duration_days
            );
            Resolution::Found(obs)
        }
        None => {
            tracing::debug!(
                "No historical match for {}/{} over {} days",
                metric,
                real_estate,
                target_duration_days
            );
            Resolution::NotFound
        }
    }
}

/// Resolve the inputs for `request` over `duration_days`
///
/// A historical match supplies mean, variance, total users and metric type
/// verbatim. Otherwise the request's baseline mean and variance are used. The
/// request's own user count wins when it was given for this very duration;
/// other durations project `daily_traffic * duration_days`. A resolution
/// warning is recorded either way.
pub fn resolve_inputs(
    catalog: Option<&Catalog>,
    request: &CalculationRequest,
    duration_days: u32,
    diagnostics: &mut Diagnostics,
) -> ResolvedInputs {
    let resolution = catalog
        .map(|c| resolve(c, &request.metric, &request.real_estate, duration_days))
        .unwrap_or(Resolution::NotFound);

    if let Resolution::Found(obs) = resolution {
        diagnostics.resolution(format!(
            "used specific historical data for duration {} days",
            duration_days
        ));
        return ResolvedInputs {
            source: DataSource::Historical,
            metric_type: obs.metric_type,
            mean: Some(obs.mean),
            variance: Some(obs.variance),
            total_users: Some(obs.total_users),
        };
    }

    diagnostics.resolution(format!(
        "used baseline projection for duration {} days",
        duration_days
    ));

    let explicit_users = request
        .total_users_in_selected_duration
        .filter(|_| duration_days == request.target_duration_days);

    let total_users = match (explicit_users, request.daily_traffic) {
        (Some(users), _) => Some(users),
        (None, Some(traffic)) => {
            let projected = traffic.checked_mul(u64::from(duration_days));
            if projected.is_none() {
                diagnostics.numeric(format!(
                    "projected user count overflows for duration {} days",
                    duration_days
                ));
            }
            projected
        }
        (None, None) => {
            diagnostics.resolution(MISSING_DAILY_TRAFFIC);
            diagnostics.resolution(format!(
                "cannot estimate exposure for duration {} days",
                duration_days
            ));
            None
        }
    };

    ResolvedInputs {
        source: DataSource::BaselineProjection,
        metric_type: request.metric_type,
        mean: request.mean,
        variance: request.variance,
        total_users,
    }
}
