use abplan::catalog::Catalog;
use abplan::cli::{CatalogArgs, Cli, Command, OutputFormat, RequestArgs};
use abplan::json_output::JsonOutput;
use abplan::planner::{
    compute_duration_sweep, compute_mde_or_sample_size, resolve_inputs, CalculationRequest,
    CalculationResult, DataSource, Diagnostics, DurationSweepRow, PlannerConfig, RowOutcome,
};
use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn load_config(args: &Cli) -> Result<PlannerConfig> {
    match &args.config {
        Some(path) => PlannerConfig::from_toml_file(path),
        None => Ok(PlannerConfig::default()),
    }
}

fn load_catalog(args: &CatalogArgs) -> Result<Option<Catalog>> {
    if let Some(path) = &args.catalog {
        let catalog = Catalog::from_path(path)
            .with_context(|| format!("Failed to load catalog: {}", path.display()))?;
        return Ok(Some(catalog));
    }
    if args.builtin_catalog {
        return Ok(Some(
            Catalog::builtin().context("Failed to load built-in catalog")?,
        ));
    }
    Ok(None)
}

/// Single calculation, filling inputs from the catalog when one is given
fn run_compute(
    request: &CalculationRequest,
    catalog: Option<&Catalog>,
    config: &PlannerConfig,
) -> CalculationResult {
    let Some(catalog) = catalog else {
        return compute_mde_or_sample_size(request, config);
    };

    let mut diagnostics = Diagnostics::new();
    let inputs = resolve_inputs(
        Some(catalog),
        request,
        request.target_duration_days,
        &mut diagnostics,
    );
    let resolved = inputs.apply(request, request.target_duration_days);

    let mut result = compute_mde_or_sample_size(&resolved, config);
    let mut warnings = diagnostics.into_messages();
    warnings.append(&mut result.warnings);
    result.warnings = warnings;
    result
}

fn format_count(value: Option<u64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn format_percent(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.2}%", v))
}

fn print_result(request: &CalculationRequest, result: &CalculationResult) {
    println!(
        "{} on {} ({}), {} variants, {} days",
        request.metric,
        request.real_estate,
        request.metric_type,
        request.number_of_variants,
        request.target_duration_days
    );
    println!(
        "  confidence {:.0}%, power {:.0}%",
        result.confidence_level * 100.0,
        result.power_level * 100.0
    );
    println!(
        "  sample size per variant: {}",
        format_count(result.sample_size_per_variant)
    );
    println!(
        "  total sample size:       {}",
        format_count(result.total_sample_size_for_experiment)
    );
    println!(
        "  minimum detectable effect: {}",
        format_percent(result.mde_percent())
    );
    println!(
        "  exposure needed:         {}",
        format_percent(result.exposure_percent())
    );
    if let Some(days) = result.estimated_duration_days {
        println!("  estimated duration:      {} days", days);
    }
    print_warnings(&result.warnings);
}

fn print_warnings(warnings: &[String]) {
    if warnings.is_empty() {
        return;
    }
    println!("Warnings:");
    for warning in warnings {
        println!("  - {}", warning);
    }
}

fn print_sweep(rows: &[DurationSweepRow]) {
    println!(
        "{:>6}  {:<10}  {:>12}  {:>10}  {:>10}  {:>9}",
        "days", "source", "per variant", "mde", "users", "exposure"
    );
    for row in rows {
        let source = match row.source {
            DataSource::Historical => "historical",
            DataSource::BaselineProjection => "baseline",
        };
        match &row.outcome {
            RowOutcome::Computed(result) => println!(
                "{:>6}  {:<10}  {:>12}  {:>10}  {:>10}  {:>9}",
                row.duration_days,
                source,
                format_count(result.sample_size_per_variant),
                format_percent(result.mde_percent()),
                format_count(row.total_users_available),
                format_percent(result.exposure_percent()),
            ),
            RowOutcome::Error { reason } => println!(
                "{:>6}  {:<10}  error: {}",
                row.duration_days, source, reason
            ),
        }
    }

    for row in rows.iter().filter(|r| !r.warnings.is_empty()) {
        println!();
        println!("{} days:", row.duration_days);
        for warning in &row.warnings {
            println!("  - {}", warning);
        }
    }
}

fn print_catalog(catalog: &Catalog) {
    for metric in catalog.metrics() {
        println!("{}", metric);
        for real_estate in catalog.real_estates(metric) {
            let days: Vec<String> = catalog
                .lookback_days(metric, real_estate)
                .iter()
                .map(|d| d.to_string())
                .collect();
            println!("  {:<12} {} days", real_estate, days.join(", "));
        }
    }
}

fn request_from(args: &RequestArgs) -> Result<CalculationRequest> {
    args.to_request().context("Invalid request arguments")
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    let config = load_config(&args)?;

    match &args.command {
        Command::Compute { request, catalog } => {
            let request = request_from(request)?;
            let catalog = load_catalog(catalog)?;

            let result = run_compute(&request, catalog.as_ref(), &config);

            match args.format {
                OutputFormat::Json => {
                    println!("{}", JsonOutput::for_result(&request, &result).to_json()?)
                }
                OutputFormat::Text => print_result(&request, &result),
            }
        }
        Command::Sweep {
            request,
            catalog,
            durations,
        } => {
            let request = request_from(request)?;
            let catalog = load_catalog(catalog)?;

            let rows = compute_duration_sweep(catalog.as_ref(), &request, durations, &config);

            match args.format {
                OutputFormat::Json => println!(
                    "{}",
                    JsonOutput::for_sweep(&request, &rows, config.max_duration_days).to_json()?
                ),
                OutputFormat::Text => print_sweep(&rows),
            }
        }
        Command::Catalog { catalog } => {
            let catalog = match load_catalog(catalog)? {
                Some(catalog) => catalog,
                None => Catalog::builtin().context("Failed to load built-in catalog")?,
            };

            match args.format {
                OutputFormat::Json => println!("{}", JsonOutput::for_catalog(&catalog).to_json()?),
                OutputFormat::Text => print_catalog(&catalog),
            }
        }
    }

    Ok(())
}
