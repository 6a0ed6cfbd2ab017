//! Core traits for port-numbering algorithms.

use crate::{Inbox, InvalidTopology, Outgoing, StateValue};
use portnum_types::{Color, NodeId, Topology};

/// Kind tag of an algorithm's states.
pub type KindOf<S> = <S as StateValue>::Kind;

/// An algorithm that runs directly on a topology.
///
/// Every node runs the same state machine:
///
/// - **Synchronous**: one `send` and one `receive` per node per round
/// - **Deterministic**: same state and inbox = same result
/// - **Local**: a node sees only its own state, degree, and inbox
///
/// # Example
///
/// ```ignore
/// let mut engine = RoundEngine::new(BipartiteMaximalMatching::new());
/// let mut ctx = RunContext::new();
/// while !ctx.is_stopped() {
///     engine.run_one_round(&graph, &mut ctx)?;
/// }
/// ```
pub trait DirectAlgorithm {
    /// Local state of a node.
    type State: StateValue;

    /// Message payload.
    type Message: Clone + std::fmt::Debug + PartialEq + 'static;

    /// Human-readable name of the algorithm.
    fn name(&self) -> &'static str;

    /// Local inputs accepted by the last successful
    /// [`validate_input`](Self::validate_input). Empty before validation.
    fn local_input_domain(&self) -> &[Color];

    /// All state kinds.
    fn state_set(&self) -> &'static [KindOf<Self::State>];

    /// Stopping (output) state kinds, a subset of [`state_set`](Self::state_set).
    fn stopping_states(&self) -> &'static [KindOf<Self::State>];

    /// All message payloads the algorithm may send.
    fn message_alphabet(&self) -> &'static [Self::Message];

    /// Check the topology before the first round.
    ///
    /// On success the algorithm fixes its input domain from the topology;
    /// [`init`](Self::init) relies on it.
    fn validate_input(&mut self, topology: &dyn Topology) -> Result<(), InvalidTopology>;

    /// Initial state of a node.
    fn init(&self, node: NodeId, input: Color, degree: usize) -> Self::State;

    /// Message to send this round, if any.
    fn send(
        &self,
        node: NodeId,
        state: &Self::State,
        degree: usize,
    ) -> Option<Outgoing<Self::Message>>;

    /// Next state, given this round's inbox.
    ///
    /// Must not depend on the order of entries in `inbox`.
    fn receive(
        &self,
        node: NodeId,
        state: &Self::State,
        inbox: &Inbox<Self::Message>,
        degree: usize,
    ) -> Self::State;

    /// Check if a state is one of the stopping states.
    fn is_stopping(&self, state: &Self::State) -> bool {
        self.stopping_states().contains(&state.kind())
    }
}

/// An algorithm defined as two coupled instances of a [`DirectAlgorithm`]
/// running on a virtual graph.
///
/// Each physical node hosts two virtual counterparts. The composite never
/// sends or receives on its own; its state is derived every round from the
/// states of its two counterparts.
pub trait CompositeAlgorithm {
    /// The algorithm both virtual instances run.
    type Sub: DirectAlgorithm;

    /// State of a physical node.
    type State: StateValue;

    /// Human-readable name of the algorithm.
    fn name(&self) -> &'static str;

    /// All state kinds.
    fn state_set(&self) -> &'static [KindOf<Self::State>];

    /// Stopping (output) state kinds.
    fn stopping_states(&self) -> &'static [KindOf<Self::State>];

    /// Check the physical topology before the first round.
    fn validate_input(&self, topology: &dyn Topology) -> Result<(), InvalidTopology> {
        if topology.node_ids().is_empty() {
            return Err(InvalidTopology::Empty);
        }
        Ok(())
    }

    /// A fresh instance of the algorithm to run on the virtual graph.
    fn virtual_problem(&self) -> Self::Sub;

    /// Derive a physical node's state from its two counterparts.
    fn derive(
        &self,
        first: &<Self::Sub as DirectAlgorithm>::State,
        second: &<Self::Sub as DirectAlgorithm>::State,
        sub: &Self::Sub,
    ) -> Self::State;

    /// Check if a state is one of the stopping states.
    fn is_stopping(&self, state: &Self::State) -> bool {
        self.stopping_states().contains(&state.kind())
    }
}
