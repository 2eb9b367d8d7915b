//! Cyclus Regression Runner
//!
//! Drives the Cyclus simulator through the registered regression scenarios and
//! reports each scenario's checks.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use regress_core::{scenarios, HarnessConfig, ResultDataset, Scenario, ScenarioReport};

/// Cyclus Regression Runner
#[derive(Parser)]
#[command(name = "cyclus-regress")]
#[command(about = "Regression scenarios for the Cyclus fuel-cycle simulator")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file (defaults to ./cyclus-regress.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Simulator executable
    #[arg(long, global = true)]
    cyclus: Option<String>,

    /// Directory the simulator runs in; scenario inputs are relative to it
    #[arg(long, global = true)]
    working_dir: Option<PathBuf>,

    /// Simulator timeout per scenario (seconds)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Print reports as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List available scenarios
    List,
    /// Run a specific scenario
    Scenario {
        /// Name of the scenario to run
        name: String,
    },
    /// Run every scenario
    All,
    /// Load an existing artifact and print its table sizes
    Inspect {
        /// Path to a simulator output database
        artifact: PathBuf,
    },
    /// Print a configuration file with the default values
    ExampleConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "cyclus_regress={},regress_core={}",
            log_level, log_level
        ))
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command.as_ref().unwrap_or(&Commands::List) {
        Commands::List => list_scenarios(cli.json)?,
        Commands::ExampleConfig => print!("{}", HarnessConfig::example_config()),
        Commands::Inspect { artifact } => inspect(artifact, cli.json)?,
        Commands::Scenario { name } => {
            let config = load_config(&cli)?;
            let scenario = scenarios::find(name)
                .with_context(|| format!("Unknown scenario: {} (try `list`)", name))?;
            run_selected(&config, &[scenario], cli.json).await?;
        }
        Commands::All => {
            let config = load_config(&cli)?;
            run_selected(&config, &scenarios::all(), cli.json).await?;
        }
    }

    Ok(())
}

/// Configuration file and environment, then command-line overrides
fn load_config(cli: &Cli) -> Result<HarnessConfig> {
    let mut config =
        HarnessConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    if let Some(cyclus) = &cli.cyclus {
        config.simulator.executable = cyclus.clone();
    }
    if let Some(dir) = &cli.working_dir {
        config.simulator.working_dir = dir.clone();
    }
    if let Some(secs) = cli.timeout {
        config.simulator.timeout_secs = secs;
    }

    config.validate().context("Invalid configuration")?;
    info!(
        "Simulator: {} (in {}, timeout {}s)",
        config.simulator.executable,
        config.simulator.working_dir.display(),
        config.simulator.timeout_secs
    );
    Ok(config)
}

/// Run scenarios one after another and fail if any check failed
async fn run_selected(
    config: &HarnessConfig,
    selected: &[Box<dyn Scenario>],
    json: bool,
) -> Result<()> {
    let mut reports: Vec<ScenarioReport> = Vec::with_capacity(selected.len());
    let mut errored = 0;

    for scenario in selected {
        match regress_core::run_scenario(config, scenario.as_ref()).await {
            Ok(report) => {
                if !json {
                    println!("{}", report);
                }
                reports.push(report);
            }
            Err(e) => {
                warn!("Scenario {} could not run: {}", scenario.name(), e);
                if !json {
                    println!("scenario {}\n  ERROR: {}", scenario.name(), e);
                }
                errored += 1;
            }
        }
    }

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&reports).context("Failed to serialise reports")?
        );
    }

    let failed = reports.iter().filter(|r| !r.passed()).count();
    let passed = reports.len() - failed;
    info!(
        "Summary: {} passed, {} failed, {} errored",
        passed, failed, errored
    );

    if failed + errored > 0 {
        anyhow::bail!("{} of {} scenarios did not pass", failed + errored, selected.len());
    }
    Ok(())
}

fn list_scenarios(json: bool) -> Result<()> {
    let registry = scenarios::all();

    if json {
        let entries: Vec<_> = registry
            .iter()
            .map(|s| {
                serde_json::json!({
                    "name": s.name(),
                    "description": s.description(),
                    "input": s.input_path(),
                    "checks": s.check_names(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("Available scenarios:");
    for scenario in &registry {
        println!("  {:<20} - {}", scenario.name(), scenario.description());
        println!("  {:<20}   checks: {}", "", scenario.check_names().join(", "));
    }
    println!();
    println!("Usage:");
    println!("  cyclus-regress scenario <name>     - Run specific scenario");
    println!("  cyclus-regress all                 - Run all scenarios");
    println!("  cyclus-regress inspect <artifact>  - Summarise an existing output");
    Ok(())
}

/// Summarise an artifact the harness did not produce; the file is left in place
fn inspect(artifact: &Path, json: bool) -> Result<()> {
    let dataset = ResultDataset::load(artifact)
        .with_context(|| format!("Failed to load {}", artifact.display()))?;
    let summary = dataset.summary();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", artifact.display());
        println!("{}", summary);
    }
    Ok(())
}
