//! Graph fixtures for tests.
//!
//! Every fixture adds nodes and edges in a fixed order, so port numbers are
//! predictable. Node `i` of a fixture is displayed as the `i`-th letter.

use portnum_types::generate::{seeded_bipartite, BipartiteConfig, BLACK, WHITE};
use portnum_types::{Color, NodeId, PortGraph, Topology};

/// Build a graph from node colors and edges given as indices into `colors`.
///
/// Edges are added in order; each endpoint gets its next free port.
///
/// # Panics
///
/// Panics if an edge refers to a missing node or is a self loop.
pub fn colored_graph(colors: &[u32], edges: &[(usize, usize)]) -> (PortGraph, Vec<NodeId>) {
    let mut graph = PortGraph::new();
    let nodes: Vec<NodeId> = colors
        .iter()
        .map(|&c| graph.add_node(Color(c), None))
        .collect();
    for &(a, b) in edges {
        graph
            .add_edge(nodes[a], nodes[b])
            .expect("fixture edges join distinct existing nodes");
    }
    (graph, nodes)
}

/// The 4-cycle A–B–C–D–A colored `1, 2, 1, 2`.
///
/// Edges are added AB, BC, CD, DA, giving ports:
///
/// | node | port 1 | port 2 |
/// |------|--------|--------|
/// | A    | B      | D      |
/// | B    | A      | C      |
/// | C    | B      | D      |
/// | D    | C      | A      |
pub fn four_cycle() -> (PortGraph, [NodeId; 4]) {
    let (graph, nodes) = colored_graph(&[1, 2, 1, 2], &[(0, 1), (1, 2), (2, 3), (3, 0)]);
    (graph, [nodes[0], nodes[1], nodes[2], nodes[3]])
}

/// A path of `len` nodes with alternating colors, starting white.
pub fn path(len: usize) -> PortGraph {
    let colors: Vec<u32> = (0..len).map(|i| if i % 2 == 0 { 1 } else { 2 }).collect();
    let edges: Vec<(usize, usize)> = (1..len).map(|i| (i - 1, i)).collect();
    colored_graph(&colors, &edges).0
}

/// A white center joined to `leaves` black leaves.
pub fn star(leaves: usize) -> PortGraph {
    let colors: Vec<u32> = std::iter::once(1)
        .chain(std::iter::repeat(2).take(leaves))
        .collect();
    let edges: Vec<(usize, usize)> = (1..=leaves).map(|i| (0, i)).collect();
    colored_graph(&colors, &edges).0
}

/// Every white node joined to every black node.
pub fn complete_bipartite(white: usize, black: usize) -> PortGraph {
    seeded_bipartite(&BipartiteConfig::new(white, black).with_edge_probability(1.0), 0)
}

/// A random 2-colored graph from a seed.
pub fn random(seed: u64, white: usize, black: usize, edge_probability: f64) -> PortGraph {
    let config = BipartiteConfig::new(white, black).with_edge_probability(edge_probability);
    seeded_bipartite(&config, seed)
}

/// Check that a graph is a proper 2-coloring with the generator's colors.
pub fn is_two_colored(graph: &PortGraph) -> bool {
    graph.colors_present().iter().all(|c| *c == WHITE || *c == BLACK)
        && graph.monochromatic_edge().is_none()
}
