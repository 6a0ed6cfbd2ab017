//! Scenario files.

use crate::error::SimulatorError;
use crate::report::Labels;
use portnum_simulation::SimulationConfig;
use portnum_types::{Color, NodeId, PortGraph};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Which reference algorithm to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AlgorithmKind {
    /// Bipartite maximal matching.
    #[default]
    Matching,
    /// Vertex cover 3-approximation.
    VertexCover,
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlgorithmKind::Matching => write!(f, "matching"),
            AlgorithmKind::VertexCover => write!(f, "vertex-cover"),
        }
    }
}

/// One node of a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    /// Unique name used by `edges` and in the output.
    pub name: String,

    /// Local input. Uncolored nodes get 0.
    #[serde(default)]
    pub color: u32,
}

/// A graph and algorithm loaded from TOML.
///
/// ```toml
/// name = "path"
/// algorithm = "matching"
/// nodes = [{ name = "A", color = 1 }, { name = "B", color = 2 }]
/// edges = [["A", "B"]]
/// ```
///
/// Edges are added in file order, so each node numbers its ports in the
/// order its edges are listed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Scenario name, for the report header.
    #[serde(default)]
    pub name: Option<String>,

    /// Algorithm to run.
    #[serde(default)]
    pub algorithm: AlgorithmKind,

    /// Round limit; the engine default applies when absent.
    #[serde(default)]
    pub max_rounds: Option<u64>,

    pub nodes: Vec<NodeSpec>,

    #[serde(default)]
    pub edges: Vec<[String; 2]>,
}

impl ScenarioConfig {
    /// Load a scenario from a file.
    pub fn from_file(path: &Path) -> Result<Self, SimulatorError> {
        let text = std::fs::read_to_string(path).map_err(|source| SimulatorError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parse a scenario from TOML text.
    pub fn parse(text: &str) -> Result<Self, SimulatorError> {
        Ok(toml::from_str(text)?)
    }

    /// Round limit as an engine configuration.
    pub fn simulation_config(&self) -> SimulationConfig {
        match self.max_rounds {
            Some(limit) => SimulationConfig::with_max_rounds(limit),
            None => SimulationConfig::default(),
        }
    }

    /// Build the port graph and the node labels.
    pub fn build_graph(&self) -> Result<(PortGraph, Labels), SimulatorError> {
        let mut graph = PortGraph::new();
        let mut labels = Labels::new();

        for node in &self.nodes {
            if labels.lookup(&node.name).is_some() {
                return Err(SimulatorError::DuplicateNode(node.name.clone()));
            }
            let id = graph.add_node(Color(node.color), None);
            labels.insert(id, node.name.clone());
        }

        for [a, b] in &self.edges {
            let a = Self::resolve(&labels, a)?;
            let b = Self::resolve(&labels, b)?;
            graph.add_edge(a, b)?;
        }

        Ok((graph, labels))
    }

    fn resolve(labels: &Labels, name: &str) -> Result<NodeId, SimulatorError> {
        labels
            .lookup(name)
            .ok_or_else(|| SimulatorError::UnknownNode(name.to_string()))
    }
}
