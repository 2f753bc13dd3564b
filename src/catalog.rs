//! Catalog of historical metric observations
//!
//! The catalog is the read-only input of a calculation session. It is built
//! once (from a TOML or JSON file, or the embedded default dataset) and then
//! only queried.

use crate::error::CatalogError;
use crate::planner::{variance_for_binary, MetricObservation, MetricType};
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;

/// Default dataset compiled into the binary
const DEFAULT_CATALOG_TOML: &str = include_str!("../catalog-default.toml");

/// Lookup key: (metric, real estate, lookback days)
type ObservationKey = (String, String, u32);

/// One observation as written in a catalog file
///
/// `variance` may be omitted for binary metrics.
#[derive(Debug, Deserialize)]
struct ObservationRecord {
    #[serde(alias = "metric_name")]
    metric: String,
    real_estate: String,
    metric_type: MetricType,
    lookback_days: u32,
    mean: f64,
    #[serde(default)]
    variance: Option<f64>,
    total_users: u64,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    observation: Vec<ObservationRecord>,
}

/// Read-only set of historical observations with a key index
///
/// # Example
/// ```
/// use abplan::catalog::Catalog;
///
/// let catalog = Catalog::builtin()?;
/// let obs = catalog.find("CR", "home", 14).expect("built-in CR/home/14");
/// assert_eq!(obs.total_users, 145_000);
/// # Ok::<(), abplan::error::CatalogError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    observations: Vec<MetricObservation>,

    /// Fast lookup: key → position in `observations`
    index: HashMap<ObservationKey, usize>,
}

impl Catalog {
    /// Build a catalog from already-validated observations
    ///
    /// When two observations share a key the first one wins.
    pub fn new(observations: Vec<MetricObservation>) -> Self {
        let mut index = HashMap::with_capacity(observations.len());
        for (position, obs) in observations.iter().enumerate() {
            let key = (obs.metric.clone(), obs.real_estate.clone(), obs.lookback_days);
            if index.contains_key(&key) {
                tracing::warn!(
                    "Duplicate observation for {}/{} over {} days; keeping the first",
                    obs.metric,
                    obs.real_estate,
                    obs.lookback_days
                );
                continue;
            }
            index.insert(key, position);
        }

        Self {
            observations,
            index,
        }
    }

    /// Load the embedded default catalog
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_toml_str(DEFAULT_CATALOG_TOML)
    }

    /// Load a catalog file; the extension selects TOML or JSON
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        let catalog = match extension.as_str() {
            "toml" => Self::from_toml_str(&content)?,
            "json" => Self::from_json_str(&content)?,
            other => return Err(CatalogError::UnsupportedFormat(other.to_string())),
        };

        tracing::debug!(
            "Loaded {} observations from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Parse `[[observation]]` tables
    ///
    /// # Example TOML
    /// ```toml
    /// [[observation]]
    /// metric = "CR"
    /// real_estate = "home"
    /// metric_type = "binary"
    /// lookback_days = 14
    /// mean = 0.05
    /// total_users = 145000
    /// ```
    pub fn from_toml_str(content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(content)?;
        Self::from_records(file.observation)
    }

    /// Parse a JSON array of observations, or `{ "observation": [...] }`
    pub fn from_json_str(content: &str) -> Result<Self, CatalogError> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum JsonCatalog {
            List(Vec<ObservationRecord>),
            Table(CatalogFile),
        }

        let records = match serde_json::from_str::<JsonCatalog>(content)? {
            JsonCatalog::List(records) => records,
            JsonCatalog::Table(file) => file.observation,
        };
        Self::from_records(records)
    }

    fn from_records(records: Vec<ObservationRecord>) -> Result<Self, CatalogError> {
        let observations = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| validate_record(index, record))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(observations))
    }

    /// Exact-key lookup
    pub fn find(
        &self,
        metric: &str,
        real_estate: &str,
        lookback_days: u32,
    ) -> Option<&MetricObservation> {
        let key = (metric.to_string(), real_estate.to_string(), lookback_days);
        self.index.get(&key).map(|&i| &self.observations[i])
    }

    /// All observations in load order
    pub fn observations(&self) -> &[MetricObservation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Distinct metric names, sorted
    pub fn metrics(&self) -> Vec<&str> {
        self.observations
            .iter()
            .map(|o| o.metric.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct real estates measured for `metric`, sorted
    pub fn real_estates(&self, metric: &str) -> Vec<&str> {
        self.observations
            .iter()
            .filter(|o| o.metric == metric)
            .map(|o| o.real_estate.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Lookback windows available for a metric on a real estate, ascending
    pub fn lookback_days(&self, metric: &str, real_estate: &str) -> Vec<u32> {
        self.observations
            .iter()
            .filter(|o| o.metric == metric && o.real_estate == real_estate)
            .map(|o| o.lookback_days)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Check one record and fill in a binary variance when it is missing
fn validate_record(
    index: usize,
    record: ObservationRecord,
) -> Result<MetricObservation, CatalogError> {
    let invalid = |reason: String| CatalogError::InvalidObservation {
        index,
        metric: record.metric.clone(),
        real_estate: record.real_estate.clone(),
        reason,
    };

    if record.lookback_days == 0 {
        return Err(invalid("lookback_days must be positive".to_string()));
    }
    if !record.mean.is_finite() {
        return Err(invalid(format!("mean must be finite, got {}", record.mean)));
    }
    if record.metric_type == MetricType::Binary && !(0.0..=1.0).contains(&record.mean) {
        return Err(invalid(format!(
            "binary mean must be within [0, 1], got {}",
            record.mean
        )));
    }

    let variance = match (record.variance, record.metric_type) {
        (Some(v), _) => v,
        (None, MetricType::Binary) => variance_for_binary(record.mean),
        (None, MetricType::Continuous) => {
            return Err(invalid(
                "variance is required for continuous metrics".to_string(),
            ))
        }
    };
    if !variance.is_finite() || variance < 0.0 {
        return Err(invalid(format!(
            "variance must be a non-negative number, got {}",
            variance
        )));
    }

    Ok(MetricObservation {
        metric: record.metric,
        real_estate: record.real_estate,
        metric_type: record.metric_type,
        lookback_days: record.lookback_days,
        mean: record.mean,
        variance,
        total_users: record.total_users,
    })
}
