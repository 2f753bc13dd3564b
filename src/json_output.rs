//! JSON output format for planning results
//!
//! `--format json` wraps a single result, a sweep, or a catalog listing in a
//! versioned envelope.

use crate::catalog::Catalog;
use crate::planner::{CalculationRequest, CalculationResult, DurationSweepRow, MetricType};
use serde::{Deserialize, Serialize};

/// Key of one catalog observation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonCatalogEntry {
    pub metric: String,
    pub real_estate: String,
    pub metric_type: MetricType,
    pub lookback_days: u32,
    pub total_users: u64,
}

/// Counts for a sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonSweepSummary {
    pub rows: usize,
    /// Rows with an error marker instead of numbers
    pub failed_rows: usize,
    /// Smallest duration whose row carries no feasibility problem
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortest_feasible_duration: Option<u32>,
}

/// Root JSON output structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonOutput {
    /// Crate version that produced the document
    pub version: String,
    /// Format name
    pub format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<CalculationRequest>,
    /// Single calculation (`abplan compute`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<CalculationResult>,
    /// Sweep rows, ascending by duration (`abplan sweep`)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sweep: Vec<DurationSweepRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sweep_summary: Option<JsonSweepSummary>,
    /// Catalog listing (`abplan catalog`)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub catalog: Vec<JsonCatalogEntry>,
}

impl JsonOutput {
    /// Create an empty envelope
    pub fn new() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: "abplan-json-v1".to_string(),
            request: None,
            result: None,
            sweep: Vec::new(),
            sweep_summary: None,
            catalog: Vec::new(),
        }
    }

    pub fn for_result(request: &CalculationRequest, result: &CalculationResult) -> Self {
        Self {
            request: Some(request.clone()),
            result: Some(result.clone()),
            ..Self::new()
        }
    }

    pub fn for_sweep(
        request: &CalculationRequest,
        rows: &[DurationSweepRow],
        max_duration_days: u32,
    ) -> Self {
        let shortest_feasible_duration = rows
            .iter()
            .filter(|row| row.duration_days <= max_duration_days)
            .find(|row| {
                row.result()
                    .and_then(|r| r.exposure_needed_percentage)
                    .is_some_and(|e| e <= 1.0)
            })
            .map(|row| row.duration_days);

        Self {
            request: Some(request.clone()),
            sweep: rows.to_vec(),
            sweep_summary: Some(JsonSweepSummary {
                rows: rows.len(),
                failed_rows: rows.iter().filter(|r| r.is_error()).count(),
                shortest_feasible_duration,
            }),
            ..Self::new()
        }
    }

    pub fn for_catalog(catalog: &Catalog) -> Self {
        let catalog = catalog
            .observations()
            .iter()
            .map(|obs| JsonCatalogEntry {
                metric: obs.metric.clone(),
                real_estate: obs.real_estate.clone(),
                metric_type: obs.metric_type,
                lookback_days: obs.lookback_days,
                total_users: obs.total_users,
            })
            .collect();

        Self {
            catalog,
            ..Self::new()
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}
