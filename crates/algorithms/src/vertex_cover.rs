//! Vertex cover 3-approximation by virtual-network composition.
//!
//! Each physical node `n` is split into `n₁` (white) and `n₂` (black), and
//! every edge `n–m` becomes `n₁–m₂` and `n₂–m₁`. The doubled graph is
//! bipartite, so [`BipartiteMaximalMatching`] runs on it unchanged. A
//! physical node joins the cover if either counterpart ends up matched.
//!
//! Every physical edge `n–m` yields the virtual edge `n₁–m₂`; by maximality
//! one of its endpoints is matched, so `n` or `m` is in the cover.

use crate::matching::{BipartiteMaximalMatching, MatchingKind, MatchingState};
use portnum_core::{CompositeAlgorithm, DirectAlgorithm, Param, StateKind, StateValue};
use std::fmt;

/// Kind tags of [`CoverState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoverKind {
    BothRunning,
    OnlyFirstRunning,
    OnlySecondRunning,
    BothStopped,
}

impl CoverKind {
    pub const ALL: [CoverKind; 4] = [
        CoverKind::BothRunning,
        CoverKind::OnlyFirstRunning,
        CoverKind::OnlySecondRunning,
        CoverKind::BothStopped,
    ];
}

impl StateKind for CoverKind {
    fn name(self) -> &'static str {
        match self {
            CoverKind::BothRunning => "BR",
            CoverKind::OnlyFirstRunning => "FR",
            CoverKind::OnlySecondRunning => "SR",
            CoverKind::BothStopped => "BS",
        }
    }

    fn description(self) -> &'static str {
        match self {
            CoverKind::BothRunning => "Both counterparts running",
            CoverKind::OnlyFirstRunning => "Only first counterpart running",
            CoverKind::OnlySecondRunning => "Only second counterpart running",
            CoverKind::BothStopped => "Both counterparts stopped",
        }
    }
}

/// State of a physical node: the states of its two counterparts, plus the
/// output once both have stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverState {
    BothRunning {
        first: MatchingState,
        second: MatchingState,
    },
    OnlyFirstRunning {
        first: MatchingState,
        second: MatchingState,
    },
    OnlySecondRunning {
        first: MatchingState,
        second: MatchingState,
    },
    BothStopped {
        first: MatchingState,
        second: MatchingState,
        in_cover: bool,
    },
}

impl CoverState {
    /// States of the two counterparts.
    pub fn counterparts(&self) -> (&MatchingState, &MatchingState) {
        match self {
            CoverState::BothRunning { first, second }
            | CoverState::OnlyFirstRunning { first, second }
            | CoverState::OnlySecondRunning { first, second }
            | CoverState::BothStopped { first, second, .. } => (first, second),
        }
    }

    /// The output, once both counterparts have stopped.
    pub fn in_cover(&self) -> Option<bool> {
        match self {
            CoverState::BothStopped { in_cover, .. } => Some(*in_cover),
            _ => None,
        }
    }
}

fn render_params(state: &CoverState) -> Vec<Param> {
    let (first, second) = state.counterparts();
    let mut params = vec![
        Param::State(first.render()),
        Param::State(second.render()),
    ];
    if let Some(in_cover) = state.in_cover() {
        params.push(Param::Flag(in_cover));
    }
    params
}

impl StateValue for CoverState {
    type Kind = CoverKind;

    fn kind(&self) -> CoverKind {
        match self {
            CoverState::BothRunning { .. } => CoverKind::BothRunning,
            CoverState::OnlyFirstRunning { .. } => CoverKind::OnlyFirstRunning,
            CoverState::OnlySecondRunning { .. } => CoverKind::OnlySecondRunning,
            CoverState::BothStopped { .. } => CoverKind::BothStopped,
        }
    }

    fn params(&self) -> Vec<Param> {
        render_params(self)
    }
}

impl fmt::Display for CoverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Vertex cover of any graph, within a factor 3 of the minimum.
#[derive(Debug, Clone, Copy, Default)]
pub struct VertexCoverApproximation;

impl VertexCoverApproximation {
    pub fn new() -> Self {
        Self
    }
}

impl CompositeAlgorithm for VertexCoverApproximation {
    type Sub = BipartiteMaximalMatching;
    type State = CoverState;

    fn name(&self) -> &'static str {
        "Vertex Cover 3-Approximation"
    }

    fn state_set(&self) -> &'static [CoverKind] {
        &CoverKind::ALL
    }

    fn stopping_states(&self) -> &'static [CoverKind] {
        &[CoverKind::BothStopped]
    }

    fn virtual_problem(&self) -> BipartiteMaximalMatching {
        BipartiteMaximalMatching::new()
    }

    fn derive(
        &self,
        first: &MatchingState,
        second: &MatchingState,
        sub: &BipartiteMaximalMatching,
    ) -> CoverState {
        let first = first.clone();
        let second = second.clone();
        match (sub.is_stopping(&first), sub.is_stopping(&second)) {
            (false, false) => CoverState::BothRunning { first, second },
            (false, true) => CoverState::OnlyFirstRunning { first, second },
            (true, false) => CoverState::OnlySecondRunning { first, second },
            (true, true) => {
                let in_cover = first.kind() == MatchingKind::MatchedStopped
                    || second.kind() == MatchingKind::MatchedStopped;
                CoverState::BothStopped {
                    first,
                    second,
                    in_cover,
                }
            }
        }
    }
}
