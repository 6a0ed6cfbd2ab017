//! Portnum simulator CLI
//!
//! Runs a reference algorithm on a scenario file or on a random 2-colored
//! graph and prints every round.

use clap::{Parser, Subcommand};
use portnum_simulation::SimulationConfig;
use portnum_simulator::{run, AlgorithmKind, Labels, ScenarioConfig, SimulatorError};
use portnum_types::generate::{seeded_bipartite, BipartiteConfig};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "portnum-sim")]
#[command(about = "Synchronous port-numbering model simulator")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the algorithm named in a TOML scenario
    Run {
        /// Scenario file
        #[arg(short, long)]
        scenario: PathBuf,

        /// Override the scenario's algorithm
        #[arg(short, long, value_enum)]
        algorithm: Option<AlgorithmKind>,

        /// Override the scenario's round limit
        #[arg(long)]
        max_rounds: Option<u64>,
    },

    /// Run on a random 2-colored graph
    Random {
        /// Number of white nodes
        #[arg(long, default_value = "4")]
        white: usize,

        /// Number of black nodes
        #[arg(long, default_value = "4")]
        black: usize,

        /// Probability of each white-black edge (0.0 to 1.0)
        #[arg(long, default_value = "0.5")]
        edge_probability: f64,

        /// Random seed
        #[arg(long, default_value = "12345")]
        seed: u64,

        /// Algorithm to run
        #[arg(short, long, value_enum, default_value_t = AlgorithmKind::Matching)]
        algorithm: AlgorithmKind,

        /// Round limit
        #[arg(long, default_value = "1024")]
        max_rounds: u64,
    },
}

fn execute(command: Commands) -> Result<(), SimulatorError> {
    let report = match command {
        Commands::Run {
            scenario,
            algorithm,
            max_rounds,
        } => {
            let config = ScenarioConfig::from_file(&scenario)?;
            let (graph, labels) = config.build_graph()?;
            let mut sim_config = config.simulation_config();
            if let Some(limit) = max_rounds {
                sim_config.max_rounds = limit;
            }
            let mut report = run(
                algorithm.unwrap_or(config.algorithm),
                &graph,
                &labels,
                &sim_config,
            )?;
            if let Some(name) = &config.name {
                report.title = format!("{name}: {}", report.title);
            }
            report
        }

        Commands::Random {
            white,
            black,
            edge_probability,
            seed,
            algorithm,
            max_rounds,
        } => {
            let config = BipartiteConfig::new(white, black).with_edge_probability(edge_probability);
            let graph = seeded_bipartite(&config, seed);
            let labels = Labels::from_topology(&graph);
            let mut report = run(
                algorithm,
                &graph,
                &labels,
                &SimulationConfig::with_max_rounds(max_rounds),
            )?;
            report.title = format!("random (seed {seed}): {}", report.title);
            report
        }
    };

    print!("{}", report.render());
    Ok(())
}

fn main() -> std::process::ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match execute(cli.command) {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Simulation failed");
            eprintln!("error: {e}");
            std::process::ExitCode::FAILURE
        }
    }
}
