//! CLI argument parsing for abplan

use crate::planner::{CalculationRequest, MetricType, Target};
use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
}

/// Metric kind as spelled on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MetricKind {
    /// Proportion metric such as a conversion rate
    Binary,
    /// Unbounded metric such as revenue per user
    Continuous,
}

impl From<MetricKind> for MetricType {
    fn from(kind: MetricKind) -> Self {
        match kind {
            MetricKind::Binary => MetricType::Binary,
            MetricKind::Continuous => MetricType::Continuous,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "abplan")]
#[command(version)]
#[command(
    about = "Sample size and minimum detectable effect planner for A/B tests",
    long_about = None
)]
pub struct Cli {
    /// Output format (text or json)
    #[arg(long = "format", value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Planner configuration file (TOML)
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug tracing output to stderr
    #[arg(long = "debug", global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compute the sample size for an MDE, or the MDE for a sample size
    Compute {
        #[command(flatten)]
        request: RequestArgs,

        #[command(flatten)]
        catalog: CatalogArgs,
    },
    /// Repeat a calculation over several candidate durations
    Sweep {
        #[command(flatten)]
        request: RequestArgs,

        #[command(flatten)]
        catalog: CatalogArgs,

        /// Candidate durations in days (e.g., --durations 7,14,21,28)
        #[arg(
            long = "durations",
            value_name = "DAYS",
            value_delimiter = ',',
            default_value = "7,14,21,28"
        )]
        durations: Vec<u32>,
    },
    /// List the historical observations in a catalog
    Catalog {
        #[command(flatten)]
        catalog: CatalogArgs,
    },
}

/// Fields of a calculation request
#[derive(Args, Debug, Clone)]
#[command(group(ArgGroup::new("target").required(true).args(["mde", "sample_size"])))]
pub struct RequestArgs {
    /// Metric name (e.g., CR, AOV)
    #[arg(long = "metric", value_name = "NAME")]
    pub metric: String,

    /// Surface the metric is measured on (e.g., home, checkout)
    #[arg(long = "real-estate", value_name = "NAME")]
    pub real_estate: String,

    /// Metric type
    #[arg(long = "metric-type", value_enum, default_value = "binary")]
    pub metric_type: MetricKind,

    /// Baseline mean (a rate in [0, 1] for binary metrics)
    #[arg(long = "mean", value_name = "VALUE")]
    pub mean: Option<f64>,

    /// Baseline per-user variance (derived from the mean for binary metrics)
    #[arg(long = "variance", value_name = "VALUE")]
    pub variance: Option<f64>,

    /// Statistical power (default: 0.8)
    #[arg(long = "power", value_name = "P", default_value = "0.8")]
    pub power: f64,

    /// Significance level (default: 0.05)
    #[arg(long = "significance", value_name = "ALPHA", default_value = "0.05")]
    pub significance: f64,

    /// Number of variants including control (default: 2)
    #[arg(long = "variants", value_name = "N", default_value = "2")]
    pub variants: u32,

    /// Planned experiment duration in days (default: 14)
    #[arg(long = "duration", value_name = "DAYS", default_value = "14")]
    pub duration: u32,

    /// Relative minimum detectable effect as a fraction (0.02 = 2%)
    #[arg(long = "mde", value_name = "FRACTION")]
    pub mde: Option<f64>,

    /// Users per variant
    #[arg(long = "sample-size", value_name = "N")]
    pub sample_size: Option<u64>,

    /// Unique users expected over the planned duration
    #[arg(long = "total-users", value_name = "N")]
    pub total_users: Option<u64>,

    /// Average unique users per day
    #[arg(long = "daily-traffic", value_name = "N")]
    pub daily_traffic: Option<u64>,
}

impl RequestArgs {
    /// Build the calculation request these flags describe
    pub fn to_request(&self) -> anyhow::Result<CalculationRequest> {
        let target = match (self.mde, self.sample_size) {
            (Some(mde), None) => Target::ByMde(mde),
            (None, Some(n)) => Target::BySampleSize(n),
            _ => anyhow::bail!("exactly one of --mde or --sample-size is required"),
        };

        Ok(CalculationRequest {
            metric: self.metric.clone(),
            real_estate: self.real_estate.clone(),
            metric_type: self.metric_type.into(),
            mean: self.mean,
            variance: self.variance,
            statistical_power: self.power,
            significance_level: self.significance,
            number_of_variants: self.variants,
            target_duration_days: self.duration,
            target,
            total_users_in_selected_duration: self.total_users,
            daily_traffic: self.daily_traffic,
        })
    }
}

/// Where historical observations come from
#[derive(Args, Debug, Clone, Default)]
pub struct CatalogArgs {
    /// Catalog file (TOML or JSON)
    #[arg(long = "catalog", value_name = "PATH", conflicts_with = "builtin_catalog")]
    pub catalog: Option<PathBuf>,

    /// Use the catalog compiled into the binary
    #[arg(long = "builtin-catalog")]
    pub builtin_catalog: bool,
}
