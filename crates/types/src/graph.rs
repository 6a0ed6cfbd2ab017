//! Undirected port-numbered graph.

use crate::{Color, NodeId, Port, Position, Topology};
use indexmap::IndexMap;
use std::collections::BTreeSet;

/// A node of the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Unique identity.
    pub id: NodeId,
    /// Local input label.
    pub color: Color,
    /// Canvas placement, if the node was placed by an editor.
    pub position: Option<Position>,
}

/// One end of an edge: the node and the port it uses for the edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub node: NodeId,
    pub port: Port,
}

impl Endpoint {
    pub fn new(node: NodeId, port: Port) -> Self {
        Self { node, port }
    }
}

/// An undirected edge. Each endpoint carries its own port number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub a: Endpoint,
    pub b: Endpoint,
}

impl Edge {
    /// Check if the edge is incident to `node`.
    pub fn touches(&self, node: NodeId) -> bool {
        self.a.node == node || self.b.node == node
    }

    /// The endpoint belonging to `node`.
    pub fn endpoint(&self, node: NodeId) -> Option<Endpoint> {
        if self.a.node == node {
            Some(self.a)
        } else if self.b.node == node {
            Some(self.b)
        } else {
            None
        }
    }

    /// The endpoint opposite to `node`.
    pub fn opposite(&self, node: NodeId) -> Option<Endpoint> {
        if self.a.node == node {
            Some(self.b)
        } else if self.b.node == node {
            Some(self.a)
        } else {
            None
        }
    }

    /// Check if the edge joins `x` and `y`, in either direction.
    pub fn joins(&self, x: NodeId, y: NodeId) -> bool {
        (self.a.node == x && self.b.node == y) || (self.a.node == y && self.b.node == x)
    }
}

/// Errors from graph construction and validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// The node is not part of the graph.
    #[error("node {0} is not in the graph")]
    UnknownNode(NodeId),

    /// Edges must join two distinct nodes.
    #[error("self loop on node {0} is not allowed")]
    SelfLoop(NodeId),

    /// A port is already used by another edge of the same node.
    #[error("port {port} of node {node} is already in use")]
    PortInUse { node: NodeId, port: Port },

    /// The ports of a node are not exactly `1..=degree`.
    #[error("ports of node {node} are {ports:?}, expected 1..={degree}")]
    PortNumbering {
        node: NodeId,
        degree: usize,
        ports: Vec<Port>,
    },
}

/// Undirected graph of colored nodes whose edges carry port numbers.
///
/// Nodes keep insertion order, which is also the order the round engine
/// visits them in. Every mutation bumps [`generation`](Self::generation) so
/// that derived structures can tell when they are stale.
#[derive(Debug, Clone, Default)]
pub struct PortGraph {
    nodes: IndexMap<NodeId, Node>,
    edges: Vec<Edge>,
    generation: u64,
}

impl PortGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node and return its identity.
    ///
    /// The smallest identity not currently in use is assigned, so the
    /// identity of a deleted node is handed out again.
    pub fn add_node(&mut self, color: Color, position: Option<Position>) -> NodeId {
        let id = (0u32..)
            .map(NodeId)
            .find(|id| !self.nodes.contains_key(id))
            .unwrap_or(NodeId(u32::MAX));
        self.nodes.insert(
            id,
            Node {
                id,
                color,
                position,
            },
        );
        self.generation += 1;
        id
    }

    /// Delete a node and its incident edges.
    ///
    /// Every former neighbour loses one port. The neighbour's highest port is
    /// moved into the gap so that its ports remain `1..=degree`.
    pub fn delete_node(&mut self, id: NodeId) -> Result<Node, GraphError> {
        let node = self
            .nodes
            .shift_remove(&id)
            .ok_or(GraphError::UnknownNode(id))?;

        let mut freed = Vec::new();
        self.edges.retain(|edge| match edge.opposite(id) {
            Some(far) => {
                freed.push(far);
                false
            }
            None => true,
        });

        for gap in freed {
            self.fill_port_gap(gap);
        }

        self.generation += 1;
        Ok(node)
    }

    /// Reassign the highest port of `gap.node` to `gap.port`.
    fn fill_port_gap(&mut self, gap: Endpoint) {
        let highest = self
            .edges
            .iter()
            .filter_map(|edge| edge.endpoint(gap.node))
            .map(|endpoint| endpoint.port)
            .max();

        let Some(highest) = highest else {
            return;
        };
        if highest <= gap.port {
            return;
        }

        for edge in &mut self.edges {
            if edge.a.node == gap.node && edge.a.port == highest {
                edge.a.port = gap.port;
            } else if edge.b.node == gap.node && edge.b.port == highest {
                edge.b.port = gap.port;
            }
        }
    }

    /// Add an edge between two existing nodes.
    ///
    /// Each endpoint gets the port `degree + 1`. Adding an edge between nodes
    /// that are already adjacent changes nothing and returns `Ok(None)`.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId) -> Result<Option<Edge>, GraphError> {
        self.require_node(a)?;
        self.require_node(b)?;
        if a == b {
            return Err(GraphError::SelfLoop(a));
        }
        if self.are_adjacent(a, b) {
            return Ok(None);
        }

        let edge = Edge {
            a: Endpoint::new(a, Port::after_degree(self.node_degree(a))),
            b: Endpoint::new(b, Port::after_degree(self.node_degree(b))),
        };
        self.edges.push(edge);
        self.generation += 1;
        Ok(Some(edge))
    }

    /// Add an edge with explicitly chosen ports.
    ///
    /// Used to assemble derived graphs. The ports do not have to form
    /// `1..=degree` while the graph is being built; run
    /// [`check_port_numbering`](Topology::check_port_numbering) afterwards.
    /// A port already used on the same node is rejected.
    pub fn connect_with_ports(
        &mut self,
        a: NodeId,
        a_port: Port,
        b: NodeId,
        b_port: Port,
    ) -> Result<Edge, GraphError> {
        self.require_node(a)?;
        self.require_node(b)?;
        if a == b {
            return Err(GraphError::SelfLoop(a));
        }
        for endpoint in [Endpoint::new(a, a_port), Endpoint::new(b, b_port)] {
            if self.node_neighbor_by_port(endpoint.node, endpoint.port).is_some() {
                return Err(GraphError::PortInUse {
                    node: endpoint.node,
                    port: endpoint.port,
                });
            }
        }

        let edge = Edge {
            a: Endpoint::new(a, a_port),
            b: Endpoint::new(b, b_port),
        };
        self.edges.push(edge);
        self.generation += 1;
        Ok(edge)
    }

    /// Change the local input of a node.
    pub fn set_color(&mut self, id: NodeId, color: Color) -> Result<(), GraphError> {
        let node = self.nodes.get_mut(&id).ok_or(GraphError::UnknownNode(id))?;
        node.color = color;
        self.generation += 1;
        Ok(())
    }

    /// Check if an edge joins `a` and `b`.
    pub fn are_adjacent(&self, a: NodeId, b: NodeId) -> bool {
        self.edges.iter().any(|edge| edge.joins(a, b))
    }

    /// Get a node by identity.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Iterate nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// All edges in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Mutation counter, bumped by every structural or color change.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn require_node(&self, id: NodeId) -> Result<(), GraphError> {
        if self.nodes.contains_key(&id) {
            Ok(())
        } else {
            Err(GraphError::UnknownNode(id))
        }
    }

    fn node_degree(&self, id: NodeId) -> usize {
        self.edges.iter().filter(|edge| edge.touches(id)).count()
    }

    fn node_neighbor_by_port(&self, id: NodeId, port: Port) -> Option<(NodeId, Port)> {
        self.edges.iter().find_map(|edge| match edge.endpoint(id) {
            Some(own) if own.port == port => edge.opposite(id).map(|far| (far.node, far.port)),
            _ => None,
        })
    }
}

impl Topology for PortGraph {
    fn node_ids(&self) -> Vec<NodeId> {
        self.nodes.keys().copied().collect()
    }

    fn color(&self, id: NodeId) -> Option<Color> {
        self.nodes.get(&id).map(|node| node.color)
    }

    fn degree(&self, id: NodeId) -> usize {
        self.node_degree(id)
    }

    fn ports(&self, id: NodeId) -> Vec<Port> {
        self.edges
            .iter()
            .filter_map(|edge| edge.endpoint(id))
            .map(|endpoint| endpoint.port)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn neighbor_by_port(&self, id: NodeId, port: Port) -> Option<(NodeId, Port)> {
        self.node_neighbor_by_port(id, port)
    }

    fn colors_present(&self) -> BTreeSet<Color> {
        self.nodes.values().map(|node| node.color).collect()
    }

    fn generation(&self) -> u64 {
        self.generation
    }
}
