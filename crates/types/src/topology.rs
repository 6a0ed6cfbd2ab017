//! Topology trait consumed by the round engine.

use crate::{Color, GraphError, NodeId, Port};
use std::collections::BTreeSet;

/// One incident edge seen from a node: our port, the neighbour, and the
/// neighbour's port back towards us.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Link {
    pub port: Port,
    pub neighbor: NodeId,
    pub neighbor_port: Port,
}

/// Read-only view of a port-numbered graph.
///
/// This is everything the round engine needs from the topology. Both the
/// editable [`PortGraph`](crate::PortGraph) and derived virtual graphs
/// implement it.
///
/// The engine does not lock the topology. Mutating the graph while a run is
/// in progress is undefined; callers must reset the run after editing.
pub trait Topology {
    /// All node identities, in a stable order.
    fn node_ids(&self) -> Vec<NodeId>;

    /// The local input of a node, or `None` if the node does not exist.
    fn color(&self, id: NodeId) -> Option<Color>;

    /// Number of incident edges.
    fn degree(&self, id: NodeId) -> usize;

    /// Ports currently assigned on a node, ascending.
    fn ports(&self, id: NodeId) -> Vec<Port>;

    /// Follow the edge on `port`: the neighbour and its port towards us.
    fn neighbor_by_port(&self, id: NodeId, port: Port) -> Option<(NodeId, Port)>;

    /// Set of local inputs present in the graph.
    fn colors_present(&self) -> BTreeSet<Color>;

    /// Mutation counter of the underlying graph. Immutable views return 0.
    fn generation(&self) -> u64 {
        0
    }

    // Derived methods

    /// Check if the node exists.
    fn contains(&self, id: NodeId) -> bool {
        self.color(id).is_some()
    }

    /// Incident edges of a node ordered by local port.
    fn links(&self, id: NodeId) -> Vec<Link> {
        self.ports(id)
            .into_iter()
            .filter_map(|port| {
                self.neighbor_by_port(id, port)
                    .map(|(neighbor, neighbor_port)| Link {
                        port,
                        neighbor,
                        neighbor_port,
                    })
            })
            .collect()
    }

    /// Maximum degree over all nodes (0 for an empty graph).
    fn max_degree(&self) -> usize {
        self.node_ids()
            .into_iter()
            .map(|id| self.degree(id))
            .max()
            .unwrap_or(0)
    }

    /// Check that the ports of one node are exactly `1..=degree`.
    fn check_node_ports(&self, id: NodeId) -> Result<(), GraphError> {
        if !self.contains(id) {
            return Err(GraphError::UnknownNode(id));
        }
        let degree = self.degree(id);
        let ports = self.ports(id);
        if ports.len() == degree && ports.iter().copied().eq(Port::range(degree)) {
            Ok(())
        } else {
            Err(GraphError::PortNumbering {
                node: id,
                degree,
                ports,
            })
        }
    }

    /// Check the port bijection on every node.
    fn check_port_numbering(&self) -> Result<(), GraphError> {
        self.node_ids()
            .into_iter()
            .try_for_each(|id| self.check_node_ports(id))
    }

    /// Find an edge whose endpoints carry the same color.
    fn monochromatic_edge(&self) -> Option<(NodeId, NodeId, Color)> {
        self.node_ids().into_iter().find_map(|id| {
            let color = self.color(id)?;
            self.links(id)
                .into_iter()
                .find(|link| self.color(link.neighbor) == Some(color))
                .map(|link| (id, link.neighbor, color))
        })
    }
}
