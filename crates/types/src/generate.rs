//! Seeded random graph generation.
//!
//! Generation is deterministic: the same configuration and seed always yield
//! the same graph, including the port assignment.

use crate::{Color, NodeId, PortGraph};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Color given to the first side of a generated bipartite graph.
pub const WHITE: Color = Color(1);

/// Color given to the second side of a generated bipartite graph.
pub const BLACK: Color = Color(2);

/// Shape of a random two-colored graph.
#[derive(Clone, Debug)]
pub struct BipartiteConfig {
    /// Number of nodes colored [`WHITE`].
    pub white: usize,

    /// Number of nodes colored [`BLACK`].
    pub black: usize,

    /// Probability that a given white-black pair is joined by an edge.
    pub edge_probability: f64,
}

impl Default for BipartiteConfig {
    fn default() -> Self {
        Self {
            white: 4,
            black: 4,
            edge_probability: 0.5,
        }
    }
}

impl BipartiteConfig {
    /// Create a config with the given side sizes.
    pub fn new(white: usize, black: usize) -> Self {
        Self {
            white,
            black,
            ..Default::default()
        }
    }

    /// Set the edge probability.
    pub fn with_edge_probability(mut self, probability: f64) -> Self {
        self.edge_probability = probability.clamp(0.0, 1.0);
        self
    }
}

/// Generate a random properly two-colored graph.
///
/// Candidate edges are inserted in shuffled order, so port numbers are not
/// correlated with node identities.
pub fn random_bipartite(config: &BipartiteConfig, rng: &mut impl Rng) -> PortGraph {
    let mut graph = PortGraph::new();
    let whites: Vec<NodeId> = (0..config.white)
        .map(|_| graph.add_node(WHITE, None))
        .collect();
    let blacks: Vec<NodeId> = (0..config.black)
        .map(|_| graph.add_node(BLACK, None))
        .collect();

    let probability = if config.edge_probability.is_nan() {
        0.0
    } else {
        config.edge_probability.clamp(0.0, 1.0)
    };
    let mut pairs: Vec<(NodeId, NodeId)> = whites
        .iter()
        .flat_map(|&w| blacks.iter().map(move |&b| (w, b)))
        .filter(|_| rng.gen_bool(probability))
        .collect();
    pairs.shuffle(rng);

    for (white, black) in pairs {
        // Orientation decides nothing but who is listed first.
        let result = if rng.gen_bool(0.5) {
            graph.add_edge(white, black)
        } else {
            graph.add_edge(black, white)
        };
        debug_assert!(result.is_ok(), "generated endpoints always exist");
    }

    graph
}

/// Generate a random two-colored graph from a seed.
pub fn seeded_bipartite(config: &BipartiteConfig, seed: u64) -> PortGraph {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    random_bipartite(config, &mut rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Topology;

    #[test]
    fn test_seeded_generation_is_deterministic() {
        let config = BipartiteConfig::new(5, 6).with_edge_probability(0.4);
        let first = seeded_bipartite(&config, 7);
        let second = seeded_bipartite(&config, 7);

        assert_eq!(first.edges(), second.edges());
        assert_eq!(first.node_count(), 11);
    }

    #[test]
    fn test_generated_graph_is_properly_colored() {
        for seed in 0..20 {
            let graph = seeded_bipartite(&BipartiteConfig::new(4, 3), seed);
            assert_eq!(graph.monochromatic_edge(), None);
            assert_eq!(graph.check_port_numbering(), Ok(()));
        }
    }

    #[test]
    fn test_probability_bounds() {
        let empty = seeded_bipartite(&BipartiteConfig::new(3, 3).with_edge_probability(0.0), 1);
        assert_eq!(empty.edge_count(), 0);

        let full = seeded_bipartite(&BipartiteConfig::new(3, 3).with_edge_probability(1.0), 1);
        assert_eq!(full.edge_count(), 9);
    }
}
