//! Error types for algorithm runs.

use portnum_types::{Color, GraphError, NodeId, Port};
use thiserror::Error;

/// The topology does not satisfy an algorithm's input requirements.
///
/// Recoverable: the caller may edit the graph and start the run again.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidTopology {
    /// The graph has no nodes.
    #[error("the graph has no nodes")]
    Empty,

    /// Wrong number of distinct local inputs.
    #[error("expected {expected} colors, found {found}")]
    ColorCount { expected: usize, found: usize },

    /// An edge joins two nodes with the same local input.
    #[error("edge {a}-{b} joins two nodes of color {color}")]
    MonochromaticEdge { a: NodeId, b: NodeId, color: Color },
}

/// Errors from running a round.
///
/// [`InvalidTopology`](Self::InvalidTopology) and
/// [`AlreadyTerminated`](Self::AlreadyTerminated) are expected conditions
/// reported to the caller. The remaining variants are invariant violations:
/// the round is aborted and the run context keeps its previous state for
/// diagnosis.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoundError {
    /// Input validation failed before the first round.
    #[error("invalid topology: {0}")]
    InvalidTopology(#[from] InvalidTopology),

    /// Every node is already in a stopping state.
    #[error("all nodes are already in stopping states")]
    AlreadyTerminated,

    /// A physical node has no virtual counterpart.
    #[error("no virtual counterpart for node {node}; the virtual graph is stale")]
    MissingVirtualStructure { node: NodeId },

    /// Two messages were routed to the same port of the same node.
    #[error("two messages routed to port {port} of node {node} in one round")]
    DuplicateRouting { node: NodeId, port: Port },

    /// A node addressed a port it does not have.
    #[error("node {node} sent on port {port}, which does not exist")]
    UnknownPort { node: NodeId, port: Port },

    /// The port numbering of the topology is not a bijection onto `1..=degree`.
    #[error("port numbering violated: {0}")]
    PortNumbering(#[from] GraphError),

    /// The run did not terminate within the configured number of rounds.
    #[error("no termination within {limit} rounds")]
    RoundLimitExceeded { limit: u64 },
}

impl RoundError {
    /// Whether the caller can fix the condition and retry.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            RoundError::InvalidTopology(_)
                | RoundError::AlreadyTerminated
                | RoundError::RoundLimitExceeded { .. }
        )
    }
}
