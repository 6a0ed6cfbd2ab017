//! Simulator errors.

use portnum_core::RoundError;
use portnum_types::GraphError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the command-line driver.
#[derive(Debug, Error)]
pub enum SimulatorError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid scenario: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("edge refers to unknown node {0:?}")]
    UnknownNode(String),

    #[error("node {0:?} is declared twice")]
    DuplicateNode(String),

    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Round(#[from] RoundError),
}
