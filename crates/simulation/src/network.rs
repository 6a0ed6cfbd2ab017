//! Message routing over port numbers.

use indexmap::IndexMap;
use portnum_core::{Destination, Inbox, Outgoing, RoundError};
use portnum_types::{NodeId, Topology};
use tracing::trace;

/// Messages of one round, grouped by receiver.
#[derive(Debug, Clone)]
pub struct Routed<M> {
    /// Inbox of every node that received at least one message.
    pub inboxes: IndexMap<NodeId, Inbox<M>>,

    /// Number of messages delivered.
    pub deliveries: usize,
}

impl<M> Routed<M> {
    /// Take a node's inbox, or an empty one if nothing arrived.
    pub fn take(&mut self, node: NodeId) -> Inbox<M> {
        self.inboxes.shift_remove(&node).unwrap_or_default()
    }
}

/// Route outgoing messages through the topology.
///
/// A message sent on port `p` follows the edge on `p` and arrives on the
/// far endpoint's port, which need not equal `p`. A broadcast becomes one
/// copy per incident edge, each arriving on that edge's far port. Receivers
/// see messages in the order senders are listed in `outgoing`.
///
/// # Errors
///
/// - [`RoundError::UnknownPort`] if a sender addresses a port it does not have
/// - [`RoundError::DuplicateRouting`] if two messages reach the same port of
///   the same node
pub fn route<M: Clone>(
    topology: &dyn Topology,
    outgoing: Vec<(NodeId, Outgoing<M>)>,
) -> Result<Routed<M>, RoundError> {
    let mut routed = Routed {
        inboxes: IndexMap::new(),
        deliveries: 0,
    };

    for (sender, message) in outgoing {
        match message.destination {
            Destination::Port(port) => {
                let (target, target_port) = topology
                    .neighbor_by_port(sender, port)
                    .ok_or(RoundError::UnknownPort { node: sender, port })?;
                deliver(&mut routed, target, target_port, message.payload)?;
            }
            Destination::Broadcast => {
                for link in topology.links(sender) {
                    deliver(
                        &mut routed,
                        link.neighbor,
                        link.neighbor_port,
                        message.payload.clone(),
                    )?;
                }
            }
        }
    }

    Ok(routed)
}

fn deliver<M>(
    routed: &mut Routed<M>,
    node: NodeId,
    port: portnum_types::Port,
    payload: M,
) -> Result<(), RoundError> {
    routed
        .inboxes
        .entry(node)
        .or_default()
        .deliver(port, payload)
        .map_err(|_| RoundError::DuplicateRouting { node, port })?;
    routed.deliveries += 1;
    trace!(to = %node, port = port.get(), "Delivered message");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use portnum_types::{Color, Port, PortGraph};

    /// A -- B -- C with B's ports: 1 -> C, 2 -> A.
    fn path() -> (PortGraph, NodeId, NodeId, NodeId) {
        let mut graph = PortGraph::new();
        let a = graph.add_node(Color(1), None);
        let b = graph.add_node(Color(2), None);
        let c = graph.add_node(Color(1), None);
        graph.add_edge(b, c).unwrap();
        graph.add_edge(a, b).unwrap();
        (graph, a, b, c)
    }

    #[test]
    fn test_port_message_arrives_on_far_port() {
        let (graph, a, b, _) = path();
        let mut routed = route(&graph, vec![(a, Outgoing::to_port("hi", Port(1)))]).unwrap();

        assert_eq!(routed.deliveries, 1);
        let inbox = routed.take(b);
        // A's port 1 lands on B's port 2
        assert_eq!(inbox.get(Port(2)), Some(&"hi"));
        assert_eq!(inbox.get(Port(1)), None);
        assert!(routed.take(a).is_empty());
    }

    #[test]
    fn test_broadcast_fans_out_with_each_far_port() {
        let (graph, a, b, c) = path();
        let mut routed = route(&graph, vec![(b, Outgoing::broadcast(7u8))]).unwrap();

        assert_eq!(routed.deliveries, 2);
        assert_eq!(routed.take(a).get(Port(1)), Some(&7));
        assert_eq!(routed.take(c).get(Port(1)), Some(&7));
    }

    #[test]
    fn test_broadcast_from_isolated_node_delivers_nothing() {
        let mut graph = PortGraph::new();
        let lonely = graph.add_node(Color(1), None);
        let routed = route(&graph, vec![(lonely, Outgoing::broadcast(()))]).unwrap();
        assert_eq!(routed.deliveries, 0);
        assert!(routed.inboxes.is_empty());
    }

    #[test]
    fn test_unknown_port_is_rejected() {
        let (graph, a, _, _) = path();
        let result = route(&graph, vec![(a, Outgoing::to_port(1, Port(2)))]);
        assert_eq!(
            result.unwrap_err(),
            RoundError::UnknownPort {
                node: a,
                port: Port(2)
            }
        );
    }

    #[test]
    fn test_duplicate_routing_aborts() {
        let (graph, a, b, _) = path();
        // Two messages from A on the same port both land on B's port 2
        let result = route(
            &graph,
            vec![
                (a, Outgoing::to_port(1, Port(1))),
                (a, Outgoing::to_port(2, Port(1))),
            ],
        );
        assert_eq!(
            result.unwrap_err(),
            RoundError::DuplicateRouting {
                node: b,
                port: Port(2)
            }
        );
    }
}
