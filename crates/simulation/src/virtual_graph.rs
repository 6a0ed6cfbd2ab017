//! Doubled graph that composite algorithms run their sub-algorithm on.

use indexmap::IndexMap;
use portnum_core::RoundError;
use portnum_types::{Color, GraphError, NodeId, Port, PortGraph, Topology};
use std::collections::{BTreeSet, HashMap};

/// Which of the two virtual counterparts of a physical node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    /// `n₁`, colored [`VirtualGraph::FIRST_COLOR`].
    First,
    /// `n₂`, colored [`VirtualGraph::SECOND_COLOR`].
    Second,
}

impl Slot {
    /// The slot whose messages this slot receives.
    ///
    /// Virtual edges always join a first counterpart to a second one.
    pub fn opposite(self) -> Self {
        match self {
            Slot::First => Slot::Second,
            Slot::Second => Slot::First,
        }
    }
}

/// The virtual graph derived from a physical topology.
///
/// For each physical node `n` there are two virtual nodes `n₁` and `n₂`. For
/// each physical edge `n–m` with ports `(i, j)` there are two virtual edges,
/// `n₁–m₂` and `n₂–m₁`, both with ports `(i, j)`. Every virtual node
/// therefore has the degree and port layout of its physical node.
///
/// The mapping is fixed at build time. Editing the physical graph afterwards
/// makes it stale; [`is_stale`](Self::is_stale) detects this.
#[derive(Debug, Clone)]
pub struct VirtualGraph {
    graph: PortGraph,
    counterparts: IndexMap<NodeId, (NodeId, NodeId)>,
    owners: HashMap<NodeId, (NodeId, Slot)>,
    source_generation: u64,
}

impl VirtualGraph {
    pub const FIRST_COLOR: Color = Color(1);
    pub const SECOND_COLOR: Color = Color(2);

    /// Derive the virtual graph of `physical`.
    pub fn build(physical: &dyn Topology) -> Result<Self, GraphError> {
        let mut graph = PortGraph::new();
        let mut counterparts = IndexMap::new();
        let mut owners = HashMap::new();

        for node in physical.node_ids() {
            let first = graph.add_node(Self::FIRST_COLOR, None);
            let second = graph.add_node(Self::SECOND_COLOR, None);
            counterparts.insert(node, (first, second));
            owners.insert(first, (node, Slot::First));
            owners.insert(second, (node, Slot::Second));
        }

        for (&node, &(node_first, node_second)) in &counterparts {
            for link in physical.links(node) {
                // Each physical edge is seen from both ends; build it once
                if link.neighbor < node {
                    continue;
                }
                let (far_first, far_second) = counterparts
                    .get(&link.neighbor)
                    .copied()
                    .ok_or(GraphError::UnknownNode(link.neighbor))?;
                graph.connect_with_ports(node_first, link.port, far_second, link.neighbor_port)?;
                graph.connect_with_ports(node_second, link.port, far_first, link.neighbor_port)?;
            }
        }

        Ok(Self {
            graph,
            counterparts,
            owners,
            source_generation: physical.generation(),
        })
    }

    /// Both counterparts `(n₁, n₂)` of a physical node.
    pub fn counterparts(&self, physical: NodeId) -> Option<(NodeId, NodeId)> {
        self.counterparts.get(&physical).copied()
    }

    /// Like [`counterparts`](Self::counterparts), failing with
    /// [`RoundError::MissingVirtualStructure`].
    pub fn require_counterparts(&self, physical: NodeId) -> Result<(NodeId, NodeId), RoundError> {
        self.counterparts(physical)
            .ok_or(RoundError::MissingVirtualStructure { node: physical })
    }

    /// One counterpart of a physical node.
    pub fn counterpart(&self, physical: NodeId, slot: Slot) -> Option<NodeId> {
        self.counterparts(physical).map(|(first, second)| match slot {
            Slot::First => first,
            Slot::Second => second,
        })
    }

    /// The physical node and slot a virtual node stands for.
    pub fn owner(&self, virtual_node: NodeId) -> Option<(NodeId, Slot)> {
        self.owners.get(&virtual_node).copied()
    }

    /// Display label of a virtual node: physical label plus `1` or `2`.
    pub fn label(&self, virtual_node: NodeId) -> Option<String> {
        self.owner(virtual_node).map(|(physical, slot)| match slot {
            Slot::First => format!("{physical}1"),
            Slot::Second => format!("{physical}2"),
        })
    }

    /// Physical nodes in build order.
    pub fn physical_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.counterparts.keys().copied()
    }

    pub fn graph(&self) -> &PortGraph {
        &self.graph
    }

    /// Generation of the physical graph this was built from.
    pub fn source_generation(&self) -> u64 {
        self.source_generation
    }

    /// Check if `physical` changed since this graph was built.
    pub fn is_stale(&self, physical: &dyn Topology) -> bool {
        physical.generation() != self.source_generation
    }
}

impl Topology for VirtualGraph {
    fn node_ids(&self) -> Vec<NodeId> {
        self.graph.node_ids()
    }

    fn color(&self, id: NodeId) -> Option<Color> {
        self.graph.color(id)
    }

    fn degree(&self, id: NodeId) -> usize {
        self.graph.degree(id)
    }

    fn ports(&self, id: NodeId) -> Vec<Port> {
        self.graph.ports(id)
    }

    fn neighbor_by_port(&self, id: NodeId, port: Port) -> Option<(NodeId, Port)> {
        self.graph.neighbor_by_port(id, port)
    }

    fn colors_present(&self) -> BTreeSet<Color> {
        self.graph.colors_present()
    }
}
