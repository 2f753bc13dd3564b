//! Advisory warning enrichment
//!
//! An optional collaborator (a rule engine, a language model behind an HTTP
//! endpoint, ...) may look at a finished calculation and suggest extra
//! human-readable warnings. Its output is appended to `warnings` and nothing
//! else; a missing or failing enricher never changes the result.

use crate::error::EnrichmentError;
use crate::planner::{CalculationRequest, CalculationResult};

/// Source of additional warnings for a computed result
pub trait WarningEnricher: Send + Sync {
    /// Short name used in log output
    fn name(&self) -> &str;

    /// Suggest warnings for `result`
    fn enrich(
        &self,
        request: &CalculationRequest,
        result: &CalculationResult,
    ) -> Result<Vec<String>, EnrichmentError>;
}

/// Append the enricher's suggestions to `result.warnings`
///
/// Failures are logged and otherwise ignored. Numeric fields are never
/// touched.
pub fn enrich_warnings(
    mut result: CalculationResult,
    request: &CalculationRequest,
    enricher: Option<&dyn WarningEnricher>,
) -> CalculationResult {
    let Some(enricher) = enricher else {
        return result;
    };

    match enricher.enrich(request, &result) {
        Ok(extra) => {
            tracing::debug!(
                "Enricher '{}' added {} warning(s)",
                enricher.name(),
                extra.len()
            );
            result.warnings.extend(extra);
        }
        Err(e) => {
            tracing::warn!("Enricher '{}' failed: {}", enricher.name(), e);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::{compute_mde_or_sample_size, MetricType, PlannerConfig, Target};

    struct LowTrafficAdvisor;

    impl WarningEnricher for LowTrafficAdvisor {
        fn name(&self) -> &str {
            "low-traffic"
        }

        fn enrich(
            &self,
            request: &CalculationRequest,
            result: &CalculationResult,
        ) -> Result<Vec<String>, EnrichmentError> {
            match (result.exposure_needed_percentage, &request.real_estate) {
                (Some(e), re) if e > 0.3 => Ok(vec![format!(
                    "experiment needs {:.0}% of {} traffic; consider a longer run",
                    e * 100.0,
                    re
                )]),
                _ => Ok(Vec::new()),
            }
        }
    }

    struct Offline;

    impl WarningEnricher for Offline {
        fn name(&self) -> &str {
            "offline"
        }

        fn enrich(
            &self,
            _request: &CalculationRequest,
            _result: &CalculationResult,
        ) -> Result<Vec<String>, EnrichmentError> {
            Err(EnrichmentError::Unavailable("connection refused".to_string()))
        }
    }

    fn computed() -> (CalculationRequest, CalculationResult) {
        let request = CalculationRequest::new("CR", "home", MetricType::Binary, Target::ByMde(0.10))
            .with_mean(0.05)
            .with_total_users(145_000)
            .with_variance(0.06);
        let result = compute_mde_or_sample_size(&request, &PlannerConfig::default());
        (request, result)
    }

    #[test]
    fn test_no_enricher_is_identity() {
        let (request, result) = computed();
        assert_eq!(enrich_warnings(result.clone(), &request, None), result);
    }

    #[test]
    fn test_enricher_appends_only() {
        let (request, result) = computed();
        let enriched = enrich_warnings(result.clone(), &request, Some(&LowTrafficAdvisor));

        assert_eq!(enriched.warnings.len(), result.warnings.len() + 1);
        assert_eq!(&enriched.warnings[..result.warnings.len()], &result.warnings[..]);
        assert!(enriched.warnings.last().unwrap().contains("home traffic"));
        assert_eq!(enriched.sample_size_per_variant, result.sample_size_per_variant);
        assert_eq!(
            enriched.exposure_needed_percentage,
            result.exposure_needed_percentage
        );
    }

    #[test]
    fn test_failing_enricher_is_swallowed() {
        let (request, result) = computed();
        let enriched = enrich_warnings(result.clone(), &request, Some(&Offline));
        assert_eq!(enriched, result);
    }
}
