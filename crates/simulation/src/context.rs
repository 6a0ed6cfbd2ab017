//! Per-run state owned by the caller.

use indexmap::IndexMap;
use portnum_types::NodeId;

/// Lifecycle of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunState {
    /// No round has run since creation or the last reset.
    #[default]
    NotStarted,
    /// At least one round has run and some node is not stopping.
    Running,
    /// Every node is in a stopping state.
    Stopped,
}

/// Everything that changes while an algorithm runs.
///
/// The context is a plain value owned by the caller and handed to every
/// engine operation. The engine only replaces it as a whole at the end of a
/// successful round, so after a failed round it still shows the last good
/// state.
///
/// Invariant: once started, `before` of round `n + 1` equals `after` of
/// round `n`, and both maps hold every node.
#[derive(Debug, Clone)]
pub struct RunContext<S> {
    run_state: RunState,
    round: u64,
    before: IndexMap<NodeId, S>,
    after: IndexMap<NodeId, S>,
}

impl<S> Default for RunContext<S> {
    fn default() -> Self {
        Self {
            run_state: RunState::NotStarted,
            round: 0,
            before: IndexMap::new(),
            after: IndexMap::new(),
        }
    }
}

impl<S> RunContext<S> {
    /// Create a context for a fresh run.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Number of completed rounds.
    pub fn round_counter(&self) -> u64 {
        self.round
    }

    /// Check if the run has started and not yet terminated.
    pub fn is_running(&self) -> bool {
        self.run_state == RunState::Running
    }

    /// Check if every node reached a stopping state.
    pub fn is_stopped(&self) -> bool {
        self.run_state == RunState::Stopped
    }

    /// Check if at least one round has run.
    pub fn has_started(&self) -> bool {
        self.run_state != RunState::NotStarted
    }

    /// States at the start of the last round. Empty before the first round.
    pub fn before_round_states(&self) -> &IndexMap<NodeId, S> {
        &self.before
    }

    /// States at the end of the last round. Empty before the first round.
    pub fn after_round_states(&self) -> &IndexMap<NodeId, S> {
        &self.after
    }

    /// Current state of a node.
    pub fn state_of(&self, node: NodeId) -> Option<&S> {
        self.after.get(&node)
    }

    /// Discard all round state and return to [`RunState::NotStarted`].
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Record a completed round.
    pub(crate) fn commit(
        &mut self,
        before: IndexMap<NodeId, S>,
        after: IndexMap<NodeId, S>,
        stopped: bool,
    ) {
        self.before = before;
        self.after = after;
        self.round += 1;
        self.run_state = if stopped {
            RunState::Stopped
        } else {
            RunState::Running
        };
    }
}

/// Global termination predicate: every node is stopping.
///
/// Evaluated fresh on every call; an empty map never counts as terminated.
pub(crate) fn all_stopping<S>(
    states: &IndexMap<NodeId, S>,
    is_stopping: impl Fn(&S) -> bool,
) -> bool {
    !states.is_empty() && states.values().all(is_stopping)
}
