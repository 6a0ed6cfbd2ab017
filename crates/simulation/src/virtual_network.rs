//! Runs a composite algorithm by simulating its sub-algorithm on the
//! virtual graph while routing over the physical one.

use crate::context::{all_stopping, RunContext};
use crate::network::{self, Routed};
use crate::runner::{RoundDriver, RoundEngine, RoundOutcome};
use crate::virtual_graph::VirtualGraph;
use indexmap::IndexMap;
use portnum_core::{CompositeAlgorithm, DirectAlgorithm, Destination, Outgoing, RoundError};
use portnum_types::{NodeId, Port, Topology};
use tracing::{debug, error, info, warn};

type SubState<C> = <<C as CompositeAlgorithm>::Sub as DirectAlgorithm>::State;
type SubMessage<C> = <<C as CompositeAlgorithm>::Sub as DirectAlgorithm>::Message;

/// What one physical port carries in one round: the message from the first
/// counterpart, the one from the second, or both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paired<M> {
    pub first: Option<M>,
    pub second: Option<M>,
}

impl<M> Paired<M> {
    pub fn is_empty(&self) -> bool {
        self.first.is_none() && self.second.is_none()
    }
}

/// Combine the messages of both counterparts of `node` per physical port.
///
/// A port carries a counterpart's payload if that counterpart broadcasts or
/// targets exactly this port. Ports that carry nothing are omitted. This
/// covers every combination: two messages on one port are combined, two
/// different ports get one component each, a broadcast reaches every port
/// alongside any concrete message.
///
/// # Errors
///
/// [`RoundError::UnknownPort`] if a counterpart targets a port not in `ports`.
pub fn multiplex<M: Clone>(
    node: NodeId,
    ports: &[Port],
    first: Option<&Outgoing<M>>,
    second: Option<&Outgoing<M>>,
) -> Result<Vec<(Port, Paired<M>)>, RoundError> {
    for message in [first, second].into_iter().flatten() {
        if let Destination::Port(port) = message.destination {
            if !ports.contains(&port) {
                return Err(RoundError::UnknownPort { node, port });
            }
        }
    }

    let component = |message: Option<&Outgoing<M>>, port: Port| {
        message.and_then(|m| match m.destination {
            Destination::Broadcast => Some(m.payload.clone()),
            Destination::Port(target) if target == port => Some(m.payload.clone()),
            Destination::Port(_) => None,
        })
    };

    Ok(ports
        .iter()
        .map(|&port| {
            (
                port,
                Paired {
                    first: component(first, port),
                    second: component(second, port),
                },
            )
        })
        .filter(|(_, paired)| !paired.is_empty())
        .collect())
}

/// Drives a [`CompositeAlgorithm`] over a physical topology.
///
/// The adapter owns a [`RoundEngine`] for the sub-algorithm, the
/// [`VirtualGraph`] it runs on, and the sub-algorithm's [`RunContext`]. The
/// caller owns the composite context. Every round both contexts advance
/// together:
///
/// 1. both counterparts of every physical node send from the virtual snapshot
/// 2. their messages are multiplexed into [`Paired`] messages per physical port
/// 3. paired messages are routed over the physical topology
/// 4. a first component arriving at `m` on port `q` is delivered to `m₂` on
///    `q`, a second component to `m₁` on `q`
/// 5. every virtual node receives, then composite states are derived
///
/// The virtual graph is built on the first round and dropped by
/// [`reset`](RoundDriver::reset). A round on a physical graph edited since
/// then fails with [`RoundError::MissingVirtualStructure`].
pub struct VirtualNetworkAdapter<C: CompositeAlgorithm> {
    composite: C,
    virtual_problem: RoundEngine<C::Sub>,
    virtual_graph: Option<VirtualGraph>,
    virtual_ctx: RunContext<SubState<C>>,
}

impl<C: CompositeAlgorithm> VirtualNetworkAdapter<C> {
    pub fn new(composite: C) -> Self {
        let sub = composite.virtual_problem();
        Self {
            composite,
            virtual_problem: RoundEngine::new(sub),
            virtual_graph: None,
            virtual_ctx: RunContext::new(),
        }
    }

    pub fn composite(&self) -> &C {
        &self.composite
    }

    /// The sub-algorithm run on the virtual graph.
    pub fn virtual_problem(&self) -> &C::Sub {
        self.virtual_problem.algorithm()
    }

    /// The virtual graph, once the run has started.
    pub fn virtual_graph(&self) -> Option<&VirtualGraph> {
        self.virtual_graph.as_ref()
    }

    /// Round states of the virtual nodes.
    pub fn virtual_context(&self) -> &RunContext<SubState<C>> {
        &self.virtual_ctx
    }

    /// Validate, build the virtual graph, and initialise the virtual nodes.
    fn start(
        &mut self,
        physical: &dyn Topology,
    ) -> Result<(VirtualGraph, IndexMap<NodeId, SubState<C>>), RoundError> {
        if let Err(e) = self.composite.validate_input(physical) {
            warn!(algorithm = self.composite.name(), error = %e, "Invalid input topology");
            return Err(e.into());
        }
        physical.check_port_numbering()?;

        let virtual_graph = VirtualGraph::build(physical)?;
        debug!(
            physical_nodes = physical.node_ids().len(),
            virtual_nodes = virtual_graph.graph().node_count(),
            virtual_edges = virtual_graph.graph().edge_count(),
            "Built virtual graph"
        );

        let before = self
            .virtual_problem
            .snapshot(&virtual_graph, &RunContext::new())?;
        Ok((virtual_graph, before))
    }

    /// Composite state of every physical node, derived from `states`.
    fn derive_all(
        &self,
        virtual_graph: &VirtualGraph,
        physical_nodes: &[NodeId],
        states: &IndexMap<NodeId, SubState<C>>,
    ) -> Result<IndexMap<NodeId, C::State>, RoundError> {
        let sub = self.virtual_problem.algorithm();
        physical_nodes
            .iter()
            .map(|&node| {
                let missing = RoundError::MissingVirtualStructure { node };
                let (first, second) = virtual_graph.require_counterparts(node)?;
                let first = states.get(&first).ok_or(missing.clone())?;
                let second = states.get(&second).ok_or(missing)?;
                Ok((node, self.composite.derive(first, second, sub)))
            })
            .collect()
    }
}

impl<C: CompositeAlgorithm> RoundDriver for VirtualNetworkAdapter<C> {
    type State = C::State;

    fn name(&self) -> &'static str {
        self.composite.name()
    }

    fn run_one_round(
        &mut self,
        physical: &dyn Topology,
        ctx: &mut RunContext<C::State>,
    ) -> Result<RoundOutcome, RoundError> {
        if self.is_terminated(ctx) {
            warn!(
                algorithm = self.composite.name(),
                round = ctx.round_counter(),
                "Refusing to run: all nodes already stopped"
            );
            return Err(RoundError::AlreadyTerminated);
        }

        let physical_nodes = physical.node_ids();
        let missing_graph = || RoundError::MissingVirtualStructure {
            node: physical_nodes.first().copied().unwrap_or(NodeId(0)),
        };

        let (pending, virtual_before) = if ctx.has_started() {
            let virtual_graph = self.virtual_graph.as_ref().ok_or_else(missing_graph)?;
            if virtual_graph.is_stale(physical) {
                // Report a node the virtual graph lacks, if any
                let node = physical_nodes
                    .iter()
                    .copied()
                    .find(|&n| virtual_graph.counterparts(n).is_none())
                    .or_else(|| physical_nodes.first().copied())
                    .unwrap_or(NodeId(0));
                error!(
                    built_from = virtual_graph.source_generation(),
                    current = physical.generation(),
                    %node,
                    "Physical graph changed during a run, round aborted"
                );
                return Err(RoundError::MissingVirtualStructure { node });
            }
            let before = self
                .virtual_problem
                .snapshot(virtual_graph, &self.virtual_ctx)?;
            (None, before)
        } else {
            info!(algorithm = self.composite.name(), "Starting composite run");
            let (virtual_graph, before) = self.start(physical)?;
            (Some(virtual_graph), before)
        };
        let virtual_graph = match pending.as_ref() {
            Some(fresh) => fresh,
            None => self.virtual_graph.as_ref().ok_or_else(missing_graph)?,
        };
        let round = ctx.round_counter() + 1;

        // Send and multiplex
        let virtual_outgoing = self
            .virtual_problem
            .collect_outgoing(virtual_graph, &virtual_before);
        let mut physical_outgoing = Vec::new();
        for &node in &physical_nodes {
            let (first, second) = virtual_graph.require_counterparts(node)?;
            let combined = multiplex(
                node,
                &physical.ports(node),
                virtual_outgoing.get(&first),
                virtual_outgoing.get(&second),
            )?;
            physical_outgoing.extend(
                combined
                    .into_iter()
                    .map(|(port, paired)| (node, Outgoing::to_port(paired, port))),
            );
        }

        // Route on the physical graph
        let routed = network::route(physical, physical_outgoing)
            .inspect_err(|e| error!(round, error = %e, "Routing failed, round aborted"))?;
        let deliveries = routed.deliveries;

        // Demultiplex onto the virtual nodes
        let mut virtual_routed: Routed<SubMessage<C>> = Routed {
            inboxes: IndexMap::new(),
            deliveries: 0,
        };
        for (node, inbox) in routed.inboxes {
            let (first, second) = virtual_graph.require_counterparts(node)?;
            for (port, paired) in inbox.iter() {
                let targets = [(second, &paired.first), (first, &paired.second)];
                for (target, component) in targets {
                    let Some(payload) = component else {
                        continue;
                    };
                    virtual_routed
                        .inboxes
                        .entry(target)
                        .or_default()
                        .deliver(port, payload.clone())
                        .map_err(|_| RoundError::DuplicateRouting { node: target, port })?;
                    virtual_routed.deliveries += 1;
                }
            }
        }

        // Transition and derive
        let virtual_after =
            self.virtual_problem
                .transition(virtual_graph, &virtual_before, &mut virtual_routed);
        let before = self.derive_all(virtual_graph, &physical_nodes, &virtual_before)?;
        let after = self.derive_all(virtual_graph, &physical_nodes, &virtual_after)?;
        let virtual_stopped = self.virtual_problem.all_stopping(&virtual_after);
        let stopped = all_stopping(&after, |s| self.composite.is_stopping(s));

        // Commit both contexts together
        if let Some(fresh) = pending {
            self.virtual_ctx.reset();
            self.virtual_graph = Some(fresh);
        }
        self.virtual_ctx
            .commit(virtual_before, virtual_after, virtual_stopped);
        ctx.commit(before, after, stopped);

        debug!(
            round,
            deliveries,
            virtual_deliveries = virtual_routed.deliveries,
            stopped,
            "Composite round complete"
        );
        if stopped {
            info!(algorithm = self.composite.name(), rounds = round, "All nodes stopped");
        }

        Ok(RoundOutcome {
            round,
            deliveries,
            stopped,
        })
    }

    fn reset(&mut self, ctx: &mut RunContext<C::State>) {
        debug!(algorithm = self.composite.name(), "Resetting composite run");
        ctx.reset();
        self.virtual_ctx.reset();
        self.virtual_graph = None;
        self.virtual_problem = RoundEngine::new(self.composite.virtual_problem());
    }

    fn is_stopping(&self, state: &C::State) -> bool {
        self.composite.is_stopping(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PORTS: [Port; 3] = [Port(1), Port(2), Port(3)];

    fn pair(first: Option<char>, second: Option<char>) -> Paired<char> {
        Paired { first, second }
    }

    #[test]
    fn test_same_port_is_combined() {
        let first = Outgoing::to_port('a', Port(2));
        let second = Outgoing::to_port('b', Port(2));
        let out = multiplex(NodeId(0), &PORTS, Some(&first), Some(&second)).unwrap();
        assert_eq!(out, vec![(Port(2), pair(Some('a'), Some('b')))]);
    }

    #[test]
    fn test_different_ports_get_one_component_each() {
        let first = Outgoing::to_port('a', Port(1));
        let second = Outgoing::to_port('b', Port(3));
        let out = multiplex(NodeId(0), &PORTS, Some(&first), Some(&second)).unwrap();
        assert_eq!(
            out,
            vec![
                (Port(1), pair(Some('a'), None)),
                (Port(3), pair(None, Some('b'))),
            ]
        );
    }

    #[test]
    fn test_broadcast_with_concrete_port() {
        let first = Outgoing::to_port('a', Port(2));
        let second = Outgoing::broadcast('b');
        let out = multiplex(NodeId(0), &PORTS, Some(&first), Some(&second)).unwrap();
        assert_eq!(
            out,
            vec![
                (Port(1), pair(None, Some('b'))),
                (Port(2), pair(Some('a'), Some('b'))),
                (Port(3), pair(None, Some('b'))),
            ]
        );
    }

    #[test]
    fn test_both_broadcast() {
        let first = Outgoing::broadcast('a');
        let second = Outgoing::broadcast('b');
        let out = multiplex(NodeId(0), &PORTS[..2], Some(&first), Some(&second)).unwrap();
        assert_eq!(
            out,
            vec![
                (Port(1), pair(Some('a'), Some('b'))),
                (Port(2), pair(Some('a'), Some('b'))),
            ]
        );
    }

    #[test]
    fn test_single_sender_and_silence() {
        let second = Outgoing::to_port('b', Port(1));
        let out = multiplex(NodeId(0), &PORTS, None, Some(&second)).unwrap();
        assert_eq!(out, vec![(Port(1), pair(None, Some('b')))]);

        let none = multiplex::<char>(NodeId(0), &PORTS, None, None).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_unknown_port() {
        let first = Outgoing::to_port('a', Port(4));
        let result = multiplex(NodeId(2), &PORTS, Some(&first), None);
        assert_eq!(
            result.unwrap_err(),
            RoundError::UnknownPort {
                node: NodeId(2),
                port: Port(4)
            }
        );
    }
}
