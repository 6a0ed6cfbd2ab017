//! Portnum simulator
//!
//! A command-line driver on top of `portnum-simulation`. It loads a graph
//! from a TOML scenario or generates a random 2-colored one, runs one of the
//! reference algorithms to completion, and prints the before/after states of
//! every node for every round.
//!
//! # Example
//!
//! ```ignore
//! use portnum_simulator::{run, AlgorithmKind, ScenarioConfig};
//!
//! let scenario = ScenarioConfig::from_file("scenarios/four_cycle.toml".as_ref())?;
//! let (graph, labels) = scenario.build_graph()?;
//! let report = run(scenario.algorithm, &graph, &labels, &scenario.simulation_config())?;
//! print!("{}", report.render());
//! ```

pub mod config;
mod error;
pub mod report;
mod runner;

pub use config::{AlgorithmKind, NodeSpec, ScenarioConfig};
pub use error::SimulatorError;
pub use report::{Labels, Report};
pub use runner::run;
