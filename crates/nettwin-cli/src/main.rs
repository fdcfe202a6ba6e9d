use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use nettwin_algo::{ContingencyEngine, ContingencyResult, DcLoadFlow};
use nettwin_core::{validate::validate, Network, SolverKind};
use nettwin_scenarios::{build_network, load_spec_from_path, ScenarioSpec};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tabwriter::TabWriter;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "nettwin",
    version,
    about = "Transmission-grid digital twin with automated N-1 contingency analysis"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the N-1 contingency analysis for one scenario and print the report
    Analyze {
        #[command(flatten)]
        scenario: ScenarioArgs,
        /// Linear-system backend for the DC load flow
        #[arg(long, default_value = "gauss")]
        solver: String,
        /// Evaluate the line trials in parallel
        #[arg(long)]
        parallel: bool,
        #[arg(long, value_enum, default_value = "plain")]
        format: ReportFormat,
    },
    /// Build the scenario network and run the integrity checks only
    Validate {
        #[command(flatten)]
        scenario: ScenarioArgs,
    },
}

/// Scenario inputs: an optional spec file, overridden by individual dials.
#[derive(Args, Clone)]
struct ScenarioArgs {
    /// Scenario spec file (YAML or JSON)
    #[arg(long)]
    scenario: Option<PathBuf>,
    /// Wind park injection at the north bus (MW)
    #[arg(long)]
    wind_mw: Option<f64>,
    /// Industrial load at the south bus (MW)
    #[arg(long)]
    load_mw: Option<f64>,
    /// Whether the HVDC link is in operation
    #[arg(long)]
    hvdc: Option<bool>,
    /// Reactive load as a fraction of active load
    #[arg(long)]
    reactive_ratio: Option<f64>,
}

impl ScenarioArgs {
    fn resolve(&self) -> Result<ScenarioSpec> {
        let mut spec = match &self.scenario {
            Some(path) => load_spec_from_path(path)?,
            None => ScenarioSpec::default(),
        };
        if let Some(wind) = self.wind_mw {
            spec.wind_mw = wind;
        }
        if let Some(load) = self.load_mw {
            spec.load_mw = load;
        }
        if let Some(hvdc) = self.hvdc {
            spec.hvdc_enabled = hvdc;
        }
        if let Some(ratio) = self.reactive_ratio {
            spec.reactive_ratio = ratio;
        }
        spec.validate()?;
        Ok(spec)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Plain,
    Json,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze {
            scenario,
            solver,
            parallel,
            format,
        } => analyze(&scenario, &solver, parallel, format),
        Commands::Validate { scenario } => validate_only(&scenario),
    }
}

/// Build, gate on the integrity checks, run the engine, print the report.
fn analyze(
    scenario: &ScenarioArgs,
    solver: &str,
    parallel: bool,
    format: ReportFormat,
) -> Result<()> {
    let spec = scenario.resolve()?;
    let network = build_network(&spec);
    info!(stats = %network.stats(), "scenario network built");

    gate_on_validation(&network)?;

    // Resolving the backend is the capability check: an unknown name fails
    // here, before any solve is attempted.
    let kind = SolverKind::from_name(solver)?;
    let port = DcLoadFlow::new(kind.build_backend());
    let engine = ContingencyEngine::new(Arc::new(port));

    let analysis = if parallel {
        engine.run_parallel(&network)
    } else {
        engine.run(&network)
    };
    let summary = analysis.summarize();

    match format {
        ReportFormat::Json => {
            let document = serde_json::json!({
                "scenario": spec,
                "results": analysis.results,
                "summary": summary,
            });
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        ReportFormat::Plain => {
            print_result_table(&analysis.results)?;
            println!();
            match summary.base_case_loading_percent {
                Some(pct) => println!("Base case loading: {pct:.2} %"),
                None => println!("Base case loading: - (diverged)"),
            }
            println!("Violations: {}", summary.violation_count);
            println!("Warnings: {}", summary.warning_count);
            println!("Recommendation: {}", summary.recommendation);
        }
    }
    Ok(())
}

fn validate_only(scenario: &ScenarioArgs) -> Result<()> {
    let spec = scenario.resolve()?;
    let network = build_network(&spec);
    let diag = validate(&network);
    for issue in &diag.issues {
        println!("{issue}");
    }
    println!("Integrity check: {}", diag.summary());
    if diag.has_errors() {
        bail!("model failed integrity validation");
    }
    Ok(())
}

fn gate_on_validation(network: &Network) -> Result<()> {
    let diag = validate(network);
    for issue in diag.warnings() {
        warn!(%issue, "integrity warning");
    }
    if diag.has_errors() {
        for issue in diag.errors() {
            eprintln!("{issue}");
        }
        bail!(
            "model failed integrity validation ({}); not running contingency analysis",
            diag.summary()
        );
    }
    Ok(())
}

fn print_result_table(results: &[ContingencyResult]) -> Result<()> {
    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "EVENT\tSTATUS\tMAX LOADING %")?;
    for result in results {
        // A diverged trial has no loading value; render a marker that cannot
        // be misread as a magnitude.
        let loading = result
            .max_loading_percent
            .map_or_else(|| "-".to_string(), |pct| format!("{pct:.2}"));
        writeln!(writer, "{}\t{}\t{}", result.label, result.state, loading)?;
    }
    writer.flush()?;
    Ok(())
}
