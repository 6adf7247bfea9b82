use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Parser;
use conjcore::catalog::parse_epoch;
use conjcore::math::MinimizerKind;
use conjcore::prelude::ScreeningConfig;
use conjcore::screening::CancelToken;
use generator::ScenarioConfig;
use log::{info, warn};
use std::path::PathBuf;
use std::time::Duration;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::{CatalogSource, WorkflowConfig};
use workflow::runner::{Runner, WorkflowResult};

mod ephemeris;
mod generator;
mod report;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Close-approach screening for one target against a catalog")]
struct Args {
    /// Element catalog (YAML, or JSON by extension)
    #[arg(long, conflicts_with = "generate")]
    catalog: Option<PathBuf>,
    /// Screen a synthetic scenario instead of a catalog file
    #[arg(long, default_value_t = false)]
    generate: bool,
    /// Seed for --generate
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Save the catalog that was screened
    #[arg(long)]
    write_catalog: Option<PathBuf>,
    /// Catalog number of the target
    #[arg(long, short = 'T')]
    target: Option<u32>,
    /// Case-insensitive name match, used when --target is absent
    #[arg(long)]
    target_name: Option<String>,
    /// Reporting threshold (km)
    #[arg(long, short = 't', default_value_t = 50.0)]
    threshold: f64,
    /// Scan window length (hours)
    #[arg(long, short = 'H', default_value_t = 72.0)]
    hours: f64,
    /// Segment minima below this distance are refined (km)
    #[arg(long, short = 'S', default_value_t = 100.0)]
    screening_threshold: f64,
    /// Maximum epoch age (days)
    #[arg(long, short = 'e', default_value_t = 1.0)]
    max_epoch_age: f64,
    /// Closer approaches are treated as docked (km)
    #[arg(long, short = 'm', default_value_t = 0.1)]
    min_distance: f64,
    #[arg(long, default_value_t = 4.0)]
    segment_hours: f64,
    #[arg(long, default_value_t = MinimizerKind::Brent)]
    minimizer: MinimizerKind,
    /// Scan start (RFC 3339), defaults to now
    #[arg(long)]
    start: Option<String>,
    #[arg(long, short = 'o', default_value = workflow::config::DEFAULT_OUTPUT)]
    output: PathBuf,
    #[arg(long)]
    json_output: Option<PathBuf>,
    /// Stop screening new pairs after this many seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Load the whole run from a YAML workflow file
    #[arg(long)]
    workflow: Option<PathBuf>,
}

impl Args {
    fn to_workflow(&self) -> WorkflowConfig {
        let catalog = match &self.catalog {
            Some(path) => CatalogSource::File(path.clone()),
            None => {
                if !self.generate {
                    info!("no --catalog given, screening a generated scenario");
                }
                CatalogSource::Generated(ScenarioConfig {
                    seed: self.seed,
                    ..Default::default()
                })
            }
        };
        let screening = ScreeningConfig {
            threshold_km: self.threshold,
            hours: self.hours,
            screening_threshold_km: self.screening_threshold,
            max_epoch_age_days: self.max_epoch_age,
            min_distance_km: self.min_distance,
            segment_hours: self.segment_hours,
            ..Default::default()
        };

        let mut config = WorkflowConfig::from_args(
            catalog,
            self.target,
            self.target_name.clone(),
            screening,
        );
        config.minimizer = self.minimizer;
        config.output = self.output.clone();
        config.json_output = self.json_output.clone();
        config.timeout_secs = self.timeout_secs;
        config
    }
}

fn print_configuration(config: &WorkflowConfig) {
    let screening = &config.screening;
    println!("{}", "=".repeat(70));
    println!("CONFIGURATION");
    println!("{}", "=".repeat(70));
    println!("  Distance threshold:      {} km", screening.threshold_km);
    println!("  Min distance (docked):   {} km", screening.min_distance_km);
    println!("  Screening threshold:     {} km", screening.screening_threshold_km);
    println!("  Search duration:         {} hours", screening.hours);
    println!(
        "  Optimization method:     {} (segmented {}-hour windows)",
        config.minimizer, screening.segment_hours
    );
    println!("  Max epoch age:           {} day(s)", screening.max_epoch_age_days);
    println!("  Output file:             {}", config.output.display());
    println!("{}", "=".repeat(70));
}

/// Runs the scan on a blocking thread so Ctrl+C can trip the token meanwhile.
fn run_with_interrupt(
    runner: Runner,
    file: ephemeris::CatalogFile,
    start: DateTime<Utc>,
    cancel: CancelToken,
) -> anyhow::Result<WorkflowResult> {
    let runtime = TokioBuilder::new_multi_thread()
        .enable_all()
        .build()
        .context("creating runtime for signal handling")?;

    runtime.block_on(async move {
        let scan_token = cancel.clone();
        let mut scan =
            tokio::task::spawn_blocking(move || runner.execute(&file, start, &scan_token));

        let result: anyhow::Result<WorkflowResult> = tokio::select! {
            joined = &mut scan => joined.context("joining scan task")?,
            interrupted = signal::ctrl_c() => {
                interrupted.context("awaiting Ctrl+C")?;
                warn!("interrupted, finishing pairs already in progress");
                cancel.cancel();
                scan.await.context("joining scan task")?
            }
        };
        result
    })
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let workflow_config = if let Some(path) = &args.workflow {
        WorkflowConfig::load(path)?
    } else {
        args.to_workflow()
    };
    workflow_config
        .screening
        .validate()
        .context("validating screening parameters")?;

    let start = match &args.start {
        Some(raw) => parse_epoch(raw).context("parsing --start")?,
        None => Utc::now(),
    };

    print_configuration(&workflow_config);

    let runner = Runner::new(workflow_config.clone());
    let file = runner.load_catalog(start)?;
    if let Some(path) = &args.write_catalog {
        file.save(path)?;
        println!("Catalog written to {}", path.display());
    }

    let cancel = match workflow_config.timeout_secs {
        Some(seconds) => CancelToken::with_timeout(Duration::from_secs(seconds)),
        None => CancelToken::new(),
    };
    let result = run_with_interrupt(runner, file, start, cancel)?;
    let scan = &result.report;

    print!(
        "{}",
        report::Summary::new(
            scan,
            workflow_config.screening.threshold_km,
            &workflow_config.screening.alert_thresholds
        )
    );

    report::save_csv(&workflow_config.output, &scan.approaches)?;
    println!(
        "Saved {} close approaches to {}",
        scan.approaches.len(),
        workflow_config.output.display()
    );
    if let Some(path) = &workflow_config.json_output {
        report::save_json(path, &scan.approaches)?;
        println!("Saved nested JSON to {}", path.display());
    }

    println!("{}", "=".repeat(70));
    println!("COMPLETE{}", if scan.statistics.cancelled { " (partial)" } else { "" });
    println!("{}", "=".repeat(70));
    println!("  Target: #{}", result.target_id);
    println!("  Total close approaches: {}", scan.approaches.len());
    println!("  Unique objects at risk: {}", scan.unique_objects_at_risk());
    println!("{}", "=".repeat(70));

    Ok(())
}
