//! Maximal matching in 2-colored graphs.
//!
//! White nodes (the smaller color) propose to their neighbours one port at
//! a time; black nodes collect proposals and accept the lowest port. A
//! round pair `(2k - 1, 2k)` handles port `k`:
//!
//! | round | white                          | black                              |
//! |-------|--------------------------------|------------------------------------|
//! | odd   | propose on port `k`            | record proposals and `Matched`     |
//! | even  | become matched on `Accept`     | accept min proposal, or give up    |
//!
//! A white node that becomes matched broadcasts `Matched` in the next odd
//! round so black neighbours stop waiting for it. Every node stops within
//! `2 * max_degree + 1` rounds.

use portnum_core::{
    DirectAlgorithm, Inbox, InvalidTopology, Outgoing, Param, StateKind, StateValue,
};
use portnum_types::{Color, NodeId, Port, Topology};
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, trace};

/// Messages exchanged by the matching algorithm.
///
/// None carries data: the receiving port identifies the sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchingMessage {
    /// White asks a black neighbour to match.
    Proposal,
    /// Black accepts a proposal.
    Accept,
    /// A white node is now matched.
    Matched,
}

/// Kind tags of [`MatchingState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchingKind {
    WhiteUnmatchedRunning,
    BlackUnmatchedRunning,
    MatchedRunning,
    UnmatchedStopped,
    MatchedStopped,
}

impl MatchingKind {
    pub const ALL: [MatchingKind; 5] = [
        MatchingKind::WhiteUnmatchedRunning,
        MatchingKind::BlackUnmatchedRunning,
        MatchingKind::MatchedRunning,
        MatchingKind::UnmatchedStopped,
        MatchingKind::MatchedStopped,
    ];

    pub const STOPPING: [MatchingKind; 2] =
        [MatchingKind::UnmatchedStopped, MatchingKind::MatchedStopped];
}

impl StateKind for MatchingKind {
    fn name(self) -> &'static str {
        match self {
            MatchingKind::WhiteUnmatchedRunning => "WUR",
            MatchingKind::BlackUnmatchedRunning => "BUR",
            MatchingKind::MatchedRunning => "MR",
            MatchingKind::UnmatchedStopped => "US",
            MatchingKind::MatchedStopped => "MS",
        }
    }

    fn description(self) -> &'static str {
        match self {
            MatchingKind::WhiteUnmatchedRunning => "White unmatched running",
            MatchingKind::BlackUnmatchedRunning => "Black unmatched running",
            MatchingKind::MatchedRunning => "Matched running",
            MatchingKind::UnmatchedStopped => "Unmatched stopped",
            MatchingKind::MatchedStopped => "Matched stopped",
        }
    }
}

/// Local state of a node running the matching algorithm.
///
/// `round` is the node's 1-based round counter. Equality is structural;
/// use [`StateValue::same_kind`] to compare kinds only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchingState {
    WhiteUnmatchedRunning {
        round: u64,
    },
    BlackUnmatchedRunning {
        round: u64,
        /// Ports that sent a proposal.
        proposals: BTreeSet<Port>,
        /// Ports whose white neighbour may still propose.
        free: BTreeSet<Port>,
    },
    MatchedRunning {
        round: u64,
        port: Port,
    },
    UnmatchedStopped,
    MatchedStopped {
        port: Port,
    },
}

impl MatchingState {
    /// The port of the matched edge, once matched.
    pub fn matched_port(&self) -> Option<Port> {
        match self {
            MatchingState::MatchedRunning { port, .. } | MatchingState::MatchedStopped { port } => {
                Some(*port)
            }
            _ => None,
        }
    }
}

/// Display parameters of a matching state.
fn render_params(state: &MatchingState) -> Vec<Param> {
    match state {
        MatchingState::WhiteUnmatchedRunning { round } => vec![Param::Count(*round)],
        MatchingState::BlackUnmatchedRunning {
            round,
            proposals,
            free,
        } => vec![
            Param::Count(*round),
            Param::Ports(proposals.iter().copied().collect()),
            Param::Ports(free.iter().copied().collect()),
        ],
        MatchingState::MatchedRunning { round, port } => {
            vec![Param::Count(*round), Param::Port(*port)]
        }
        MatchingState::UnmatchedStopped => Vec::new(),
        MatchingState::MatchedStopped { port } => vec![Param::Port(*port)],
    }
}

impl StateValue for MatchingState {
    type Kind = MatchingKind;

    fn kind(&self) -> MatchingKind {
        match self {
            MatchingState::WhiteUnmatchedRunning { .. } => MatchingKind::WhiteUnmatchedRunning,
            MatchingState::BlackUnmatchedRunning { .. } => MatchingKind::BlackUnmatchedRunning,
            MatchingState::MatchedRunning { .. } => MatchingKind::MatchedRunning,
            MatchingState::UnmatchedStopped => MatchingKind::UnmatchedStopped,
            MatchingState::MatchedStopped { .. } => MatchingKind::MatchedStopped,
        }
    }

    fn params(&self) -> Vec<Param> {
        render_params(self)
    }
}

impl fmt::Display for MatchingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// The port a white node proposes on in `round`: `ceil(round / 2)`.
fn proposal_port(round: u64) -> u64 {
    round.div_ceil(2)
}

fn is_odd(round: u64) -> bool {
    round % 2 == 1
}

/// Maximal matching on a properly 2-colored graph.
#[derive(Debug, Clone, Default)]
pub struct BipartiteMaximalMatching {
    /// The two colors present, ascending. Set by `validate_input`.
    input_domain: Vec<Color>,
}

impl BipartiteMaximalMatching {
    pub fn new() -> Self {
        Self::default()
    }

    /// The white color, once validated.
    pub fn white(&self) -> Option<Color> {
        self.input_domain.first().copied()
    }

    fn receive_white(
        &self,
        round: u64,
        inbox: &Inbox<MatchingMessage>,
        degree: usize,
    ) -> MatchingState {
        if is_odd(round) && proposal_port(round) > degree as u64 {
            return MatchingState::UnmatchedStopped;
        }
        match inbox.ports_where(|m| *m == MatchingMessage::Accept).min() {
            Some(port) => MatchingState::MatchedRunning {
                round: round + 1,
                port,
            },
            None => MatchingState::WhiteUnmatchedRunning { round: round + 1 },
        }
    }

    fn receive_black(
        &self,
        round: u64,
        proposals: &BTreeSet<Port>,
        free: &BTreeSet<Port>,
        inbox: &Inbox<MatchingMessage>,
    ) -> MatchingState {
        if is_odd(round) {
            let mut proposals = proposals.clone();
            proposals.extend(inbox.ports_where(|m| *m == MatchingMessage::Proposal));
            let mut free = free.clone();
            for port in inbox.ports_where(|m| *m == MatchingMessage::Matched) {
                free.remove(&port);
            }
            if proposals.is_empty() && free.is_empty() {
                // No neighbour can propose any more
                return MatchingState::UnmatchedStopped;
            }
            return MatchingState::BlackUnmatchedRunning {
                round: round + 1,
                proposals,
                free,
            };
        }

        if let Some(&port) = proposals.first() {
            MatchingState::MatchedStopped { port }
        } else if free.is_empty() {
            MatchingState::UnmatchedStopped
        } else {
            MatchingState::BlackUnmatchedRunning {
                round: round + 1,
                proposals: proposals.clone(),
                free: free.clone(),
            }
        }
    }
}

impl DirectAlgorithm for BipartiteMaximalMatching {
    type State = MatchingState;
    type Message = MatchingMessage;

    fn name(&self) -> &'static str {
        "Bipartite Maximal Matching"
    }

    fn local_input_domain(&self) -> &[Color] {
        &self.input_domain
    }

    fn state_set(&self) -> &'static [MatchingKind] {
        &MatchingKind::ALL
    }

    fn stopping_states(&self) -> &'static [MatchingKind] {
        &MatchingKind::STOPPING
    }

    fn message_alphabet(&self) -> &'static [MatchingMessage] {
        &[
            MatchingMessage::Proposal,
            MatchingMessage::Accept,
            MatchingMessage::Matched,
        ]
    }

    /// Requires exactly two colors and no edge between equal colors.
    fn validate_input(&mut self, topology: &dyn Topology) -> Result<(), InvalidTopology> {
        let colors = topology.colors_present();
        if topology.node_ids().is_empty() {
            return Err(InvalidTopology::Empty);
        }
        if colors.len() != 2 {
            return Err(InvalidTopology::ColorCount {
                expected: 2,
                found: colors.len(),
            });
        }
        if let Some((a, b, color)) = topology.monochromatic_edge() {
            return Err(InvalidTopology::MonochromaticEdge { a, b, color });
        }
        self.input_domain = colors.into_iter().collect();
        debug!(white = %self.input_domain[0], black = %self.input_domain[1], "Validated 2-coloring");
        Ok(())
    }

    fn init(&self, _node: NodeId, input: Color, degree: usize) -> MatchingState {
        let is_white = match self.white() {
            Some(white) => input == white,
            None => true,
        };
        if is_white {
            MatchingState::WhiteUnmatchedRunning { round: 1 }
        } else {
            MatchingState::BlackUnmatchedRunning {
                round: 1,
                proposals: BTreeSet::new(),
                free: Port::range(degree).collect(),
            }
        }
    }

    fn send(
        &self,
        node: NodeId,
        state: &MatchingState,
        degree: usize,
    ) -> Option<Outgoing<MatchingMessage>> {
        let outgoing = match state {
            MatchingState::WhiteUnmatchedRunning { round } => {
                let k = proposal_port(*round);
                (is_odd(*round) && k <= degree as u64)
                    .then(|| Outgoing::to_port(MatchingMessage::Proposal, Port(k as u32)))
            }
            MatchingState::BlackUnmatchedRunning {
                round, proposals, ..
            } => {
                if is_odd(*round) {
                    None
                } else {
                    proposals
                        .first()
                        .map(|&port| Outgoing::to_port(MatchingMessage::Accept, port))
                }
            }
            MatchingState::MatchedRunning { round, .. } => {
                is_odd(*round).then(|| Outgoing::broadcast(MatchingMessage::Matched))
            }
            MatchingState::UnmatchedStopped | MatchingState::MatchedStopped { .. } => None,
        };
        if let Some(message) = &outgoing {
            trace!(%node, payload = ?message.payload, destination = ?message.destination, "Send");
        }
        outgoing
    }

    fn receive(
        &self,
        _node: NodeId,
        state: &MatchingState,
        inbox: &Inbox<MatchingMessage>,
        degree: usize,
    ) -> MatchingState {
        match state {
            MatchingState::WhiteUnmatchedRunning { round } => {
                self.receive_white(*round, inbox, degree)
            }
            MatchingState::BlackUnmatchedRunning {
                round,
                proposals,
                free,
            } => self.receive_black(*round, proposals, free, inbox),
            MatchingState::MatchedRunning { round, port } => {
                if is_odd(*round) {
                    MatchingState::MatchedStopped { port: *port }
                } else {
                    MatchingState::MatchedRunning {
                        round: round + 1,
                        port: *port,
                    }
                }
            }
            MatchingState::UnmatchedStopped | MatchingState::MatchedStopped { .. } => {
                state.clone()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ports(list: &[u32]) -> BTreeSet<Port> {
        list.iter().map(|&p| Port(p)).collect()
    }

    fn inbox(entries: &[(u32, MatchingMessage)]) -> Inbox<MatchingMessage> {
        entries.iter().map(|&(p, m)| (Port(p), m)).collect()
    }

    #[test]
    fn test_render() {
        let black = MatchingState::BlackUnmatchedRunning {
            round: 1,
            proposals: ports(&[1, 2]),
            free: ports(&[1, 2]),
        };
        assert_eq!(black.render(), "BUR(1,{1,2},{1,2})");
        assert_eq!(
            MatchingState::BlackUnmatchedRunning {
                round: 3,
                proposals: BTreeSet::new(),
                free: ports(&[2]),
            }
            .to_string(),
            "BUR(3,{},{2})"
        );
        assert_eq!(MatchingState::UnmatchedStopped.render(), "US");
        assert_eq!(MatchingState::MatchedStopped { port: Port(2) }.render(), "MS(2)");
        assert_eq!(
            MatchingState::MatchedRunning {
                round: 3,
                port: Port(1)
            }
            .render(),
            "MR(3,1)"
        );
    }

    #[test]
    fn test_same_kind_ignores_parameters() {
        let a = MatchingState::WhiteUnmatchedRunning { round: 1 };
        let b = MatchingState::WhiteUnmatchedRunning { round: 5 };
        assert!(a.same_kind(&b));
        assert_ne!(a, b);
        assert!(!a.same_kind(&MatchingState::UnmatchedStopped));
    }

    #[test]
    fn test_metadata() {
        let matching = BipartiteMaximalMatching::new();
        assert_eq!(matching.state_set().len(), 5);
        assert!(matching
            .stopping_states()
            .iter()
            .all(|kind| matching.state_set().contains(kind)));
        assert_eq!(matching.message_alphabet().len(), 3);
        assert!(matching.local_input_domain().is_empty());
        assert_eq!(
            MatchingKind::WhiteUnmatchedRunning.description(),
            "White unmatched running"
        );
    }

    #[test]
    fn test_white_proposes_on_odd_rounds() {
        let matching = BipartiteMaximalMatching::new();
        let node = NodeId(0);
        let send = |round| matching.send(node, &MatchingState::WhiteUnmatchedRunning { round }, 2);

        assert_eq!(
            send(1),
            Some(Outgoing::to_port(MatchingMessage::Proposal, Port(1)))
        );
        assert_eq!(send(2), None);
        assert_eq!(
            send(3),
            Some(Outgoing::to_port(MatchingMessage::Proposal, Port(2)))
        );
        assert_eq!(send(5), None);
    }

    #[test]
    fn test_white_gives_up_after_last_port() {
        let matching = BipartiteMaximalMatching::new();
        let state = MatchingState::WhiteUnmatchedRunning { round: 5 };
        let next = matching.receive(NodeId(0), &state, &Inbox::new(), 2);
        assert_eq!(next, MatchingState::UnmatchedStopped);
    }

    #[test]
    fn test_white_matches_on_accept() {
        let matching = BipartiteMaximalMatching::new();
        let state = MatchingState::WhiteUnmatchedRunning { round: 4 };
        let next = matching.receive(
            NodeId(0),
            &state,
            &inbox(&[(2, MatchingMessage::Accept)]),
            3,
        );
        assert_eq!(
            next,
            MatchingState::MatchedRunning {
                round: 5,
                port: Port(2)
            }
        );
    }

    #[test]
    fn test_black_collects_then_accepts_min() {
        let matching = BipartiteMaximalMatching::new();
        let node = NodeId(1);
        let start = MatchingState::BlackUnmatchedRunning {
            round: 1,
            proposals: BTreeSet::new(),
            free: ports(&[1, 2, 3]),
        };
        let collected = matching.receive(
            node,
            &start,
            &inbox(&[
                (3, MatchingMessage::Proposal),
                (2, MatchingMessage::Proposal),
                (1, MatchingMessage::Matched),
            ]),
            3,
        );
        assert_eq!(
            collected,
            MatchingState::BlackUnmatchedRunning {
                round: 2,
                proposals: ports(&[2, 3]),
                free: ports(&[2, 3]),
            }
        );

        assert_eq!(
            matching.send(node, &collected, 3),
            Some(Outgoing::to_port(MatchingMessage::Accept, Port(2)))
        );
        assert_eq!(
            matching.receive(node, &collected, &Inbox::new(), 3),
            MatchingState::MatchedStopped { port: Port(2) }
        );
    }

    #[test]
    fn test_black_stops_when_no_neighbour_is_free() {
        let matching = BipartiteMaximalMatching::new();
        let waiting = MatchingState::BlackUnmatchedRunning {
            round: 3,
            proposals: BTreeSet::new(),
            free: ports(&[1]),
        };
        let next = matching.receive(
            NodeId(1),
            &waiting,
            &inbox(&[(1, MatchingMessage::Matched)]),
            1,
        );
        assert_eq!(next, MatchingState::UnmatchedStopped);

        let isolated = MatchingState::BlackUnmatchedRunning {
            round: 1,
            proposals: BTreeSet::new(),
            free: BTreeSet::new(),
        };
        assert_eq!(
            matching.receive(NodeId(1), &isolated, &Inbox::new(), 0),
            MatchingState::UnmatchedStopped
        );
    }

    #[test]
    fn test_matched_running_broadcasts_once() {
        let matching = BipartiteMaximalMatching::new();
        let state = MatchingState::MatchedRunning {
            round: 3,
            port: Port(1),
        };
        assert_eq!(
            matching.send(NodeId(0), &state, 2),
            Some(Outgoing::broadcast(MatchingMessage::Matched))
        );
        let next = matching.receive(NodeId(0), &state, &Inbox::new(), 2);
        assert_eq!(next, MatchingState::MatchedStopped { port: Port(1) });
        assert_eq!(matching.send(NodeId(0), &next, 2), None);
        assert_eq!(matching.receive(NodeId(0), &next, &Inbox::new(), 2), next);
    }

    #[test]
    fn test_init_uses_smaller_color_as_white() {
        let mut matching = BipartiteMaximalMatching::new();
        let mut graph = portnum_types::PortGraph::new();
        let a = graph.add_node(Color(5), None);
        let b = graph.add_node(Color(3), None);
        graph.add_edge(a, b).unwrap();
        matching.validate_input(&graph).unwrap();

        assert_eq!(matching.white(), Some(Color(3)));
        assert_eq!(matching.local_input_domain(), &[Color(3), Color(5)]);
        assert_eq!(
            matching.init(b, Color(3), 1),
            MatchingState::WhiteUnmatchedRunning { round: 1 }
        );
        assert_eq!(
            matching.init(a, Color(5), 1),
            MatchingState::BlackUnmatchedRunning {
                round: 1,
                proposals: BTreeSet::new(),
                free: ports(&[1]),
            }
        );
    }
}
