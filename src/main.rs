use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use pestsim::{scenario::ScenarioLoader, snapshot::SnapshotWriter, SimulationConfig};

#[derive(Debug, Parser)]
#[command(author, version, about = "Pest population simulation runner")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/greenhouse.yaml")]
    scenario: PathBuf,

    /// Simulation config YAML replacing the scenario's `config` block
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override tick count (uses scenario default when omitted)
    #[arg(long)]
    ticks: Option<u64>,

    /// Override the time delta per tick
    #[arg(long)]
    dt: Option<f64>,

    /// Write a report every N ticks (0 disables)
    #[arg(long)]
    report_interval: Option<u64>,

    /// Directory for report files
    #[arg(long, default_value = "reports")]
    report_dir: PathBuf,

    /// Log filter, e.g. `info` or `pestsim=debug`; RUST_LOG wins when set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let loader = ScenarioLoader::new(".");
    let mut scenario = loader.load(&cli.scenario)?;
    if let Some(path) = &cli.config {
        scenario.config = SimulationConfig::from_yaml(path)?;
    }
    if let Some(seed) = cli.seed {
        scenario.config = scenario.config.with_seed(seed);
    }
    let mut simulation = scenario.build_simulation()?;
    let ticks = scenario.ticks(cli.ticks);
    let dt = cli.dt.unwrap_or(scenario.dt);
    let writer = SnapshotWriter::new(
        &cli.report_dir,
        cli.report_interval.unwrap_or(scenario.report_interval_ticks),
    );

    info!(scenario = %scenario.name, ticks, dt, "starting run");
    for tick in 1..=ticks {
        for scheduled in scenario.treatments_due(tick) {
            simulation.apply_environmental_treatment(&scheduled.zone, &scheduled.treatment)?;
        }
        simulation.tick(dt);
        let report = simulation.simulation_report();
        if let Some(path) = writer.maybe_write(&scenario.name, &report)? {
            info!(tick, path = %path.display(), "report written");
        }
    }

    let report = simulation.simulation_report();
    println!("{}", serde_json::to_string_pretty(&report)?);
    info!(
        scenario = %scenario.name,
        ticks,
        total = report.total_population,
        species = report.active_species,
        "run complete"
    );
    Ok(())
}
