//! Reference algorithms for the port-numbering model.
//!
//! - [`BipartiteMaximalMatching`]: maximal matching on a properly 2-colored
//!   graph, run directly by a `RoundEngine`
//! - [`VertexCoverApproximation`]: vertex cover built from two coupled
//!   matching runs on the virtual graph, run by a `VirtualNetworkAdapter`

mod matching;
mod vertex_cover;

pub use matching::{BipartiteMaximalMatching, MatchingKind, MatchingMessage, MatchingState};
pub use vertex_cover::{CoverKind, CoverState, VertexCoverApproximation};
