//! Synchronous round engine.

use crate::context::{all_stopping, RunContext};
use crate::network::{self, Routed};
use indexmap::IndexMap;
use portnum_core::{DirectAlgorithm, Outgoing, RoundError, StateValue};
use portnum_types::{NodeId, Topology};
use tracing::{debug, error, info, warn};

/// Summary of one completed round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundOutcome {
    /// Round number just completed (1-based).
    pub round: u64,

    /// Messages delivered during the round.
    pub deliveries: usize,

    /// Whether every node is now stopping.
    pub stopped: bool,
}

/// Anything that advances a run one synchronous round at a time.
///
/// Implemented by [`RoundEngine`] for direct algorithms and by
/// [`VirtualNetworkAdapter`](crate::VirtualNetworkAdapter) for composites.
pub trait RoundDriver {
    /// Per-node state kept in the [`RunContext`].
    type State: StateValue;

    /// Name of the algorithm being driven.
    fn name(&self) -> &'static str;

    /// Run one round on `topology`, committing into `ctx` on success.
    ///
    /// On error `ctx` is left exactly as it was.
    fn run_one_round(
        &mut self,
        topology: &dyn Topology,
        ctx: &mut RunContext<Self::State>,
    ) -> Result<RoundOutcome, RoundError>;

    /// Return the run to its initial state.
    fn reset(&mut self, ctx: &mut RunContext<Self::State>);

    /// Check if a state is stopping.
    fn is_stopping(&self, state: &Self::State) -> bool;

    /// Check if every node of a started run is stopping.
    fn is_terminated(&self, ctx: &RunContext<Self::State>) -> bool {
        ctx.has_started() && all_stopping(ctx.after_round_states(), |s| self.is_stopping(s))
    }

    /// Run rounds until every node stops.
    ///
    /// Returns the round counter at termination.
    ///
    /// # Errors
    ///
    /// [`RoundError::RoundLimitExceeded`] if `max_rounds` rounds have run in
    /// total without termination, or whatever a round fails with.
    fn run_until_stopped(
        &mut self,
        topology: &dyn Topology,
        ctx: &mut RunContext<Self::State>,
        max_rounds: u64,
    ) -> Result<u64, RoundError>
    where
        Self: Sized,
    {
        self.run_observed(topology, ctx, max_rounds, |_, _| {})
    }

    /// Like [`run_until_stopped`](Self::run_until_stopped), calling `observe`
    /// after every committed round.
    fn run_observed<F>(
        &mut self,
        topology: &dyn Topology,
        ctx: &mut RunContext<Self::State>,
        max_rounds: u64,
        mut observe: F,
    ) -> Result<u64, RoundError>
    where
        Self: Sized,
        F: FnMut(&RoundOutcome, &RunContext<Self::State>),
    {
        while !self.is_terminated(ctx) {
            if ctx.round_counter() >= max_rounds {
                warn!(
                    algorithm = self.name(),
                    limit = max_rounds,
                    "Run did not terminate within round limit"
                );
                return Err(RoundError::RoundLimitExceeded { limit: max_rounds });
            }
            let outcome = self.run_one_round(topology, ctx)?;
            observe(&outcome, ctx);
        }
        Ok(ctx.round_counter())
    }
}

/// Drives a [`DirectAlgorithm`] over a topology.
///
/// The engine holds the algorithm only; all per-run state lives in the
/// caller's [`RunContext`]. Each round:
///
/// 1. every node sends from the frozen snapshot of the previous round
/// 2. messages are routed by port
/// 3. every node receives its inbox and transitions
///
/// Rounds are committed atomically.
pub struct RoundEngine<A: DirectAlgorithm> {
    algorithm: A,
}

impl<A: DirectAlgorithm> RoundEngine<A> {
    pub fn new(algorithm: A) -> Self {
        Self { algorithm }
    }

    pub fn algorithm(&self) -> &A {
        &self.algorithm
    }

    /// Produce the frozen snapshot the next round sends from.
    ///
    /// On the first round this validates the topology and initialises every
    /// node; afterwards it is a copy of the previous `after` map.
    pub(crate) fn snapshot(
        &mut self,
        topology: &dyn Topology,
        ctx: &RunContext<A::State>,
    ) -> Result<IndexMap<NodeId, A::State>, RoundError> {
        if self.is_terminated(ctx) {
            warn!(
                algorithm = self.algorithm.name(),
                round = ctx.round_counter(),
                "Refusing to run: all nodes already stopped"
            );
            return Err(RoundError::AlreadyTerminated);
        }

        if ctx.has_started() {
            return Ok(ctx.after_round_states().clone());
        }

        if let Err(e) = self.algorithm.validate_input(topology) {
            warn!(algorithm = self.algorithm.name(), error = %e, "Invalid input topology");
            return Err(e.into());
        }
        if let Err(e) = topology.check_port_numbering() {
            error!(error = %e, "Port numbering violated at run start");
            return Err(e.into());
        }

        let snapshot: IndexMap<NodeId, A::State> = topology
            .node_ids()
            .into_iter()
            .filter_map(|node| {
                let input = topology.color(node)?;
                let degree = topology.degree(node);
                Some((node, self.algorithm.init(node, input, degree)))
            })
            .collect();

        info!(
            algorithm = self.algorithm.name(),
            nodes = snapshot.len(),
            max_degree = topology.max_degree(),
            "Starting run"
        );
        Ok(snapshot)
    }

    /// Call `send` for every node of the snapshot.
    pub(crate) fn collect_outgoing(
        &self,
        topology: &dyn Topology,
        before: &IndexMap<NodeId, A::State>,
    ) -> IndexMap<NodeId, Outgoing<A::Message>> {
        before
            .iter()
            .filter_map(|(node, state)| {
                self.algorithm
                    .send(*node, state, topology.degree(*node))
                    .map(|message| (*node, message))
            })
            .collect()
    }

    /// Call `receive` for every node with its (possibly empty) inbox.
    pub(crate) fn transition(
        &self,
        topology: &dyn Topology,
        before: &IndexMap<NodeId, A::State>,
        routed: &mut Routed<A::Message>,
    ) -> IndexMap<NodeId, A::State> {
        before
            .iter()
            .map(|(node, state)| {
                let inbox = routed.take(*node);
                let next = self
                    .algorithm
                    .receive(*node, state, &inbox, topology.degree(*node));
                (*node, next)
            })
            .collect()
    }

    /// Check if every node of `states` is stopping.
    pub(crate) fn all_stopping(&self, states: &IndexMap<NodeId, A::State>) -> bool {
        all_stopping(states, |s| self.algorithm.is_stopping(s))
    }
}

impl<A: DirectAlgorithm> RoundDriver for RoundEngine<A> {
    type State = A::State;

    fn name(&self) -> &'static str {
        self.algorithm.name()
    }

    fn run_one_round(
        &mut self,
        topology: &dyn Topology,
        ctx: &mut RunContext<A::State>,
    ) -> Result<RoundOutcome, RoundError> {
        let before = self.snapshot(topology, ctx)?;
        let round = ctx.round_counter() + 1;

        let outgoing = self.collect_outgoing(topology, &before);
        let mut routed = network::route(topology, outgoing.into_iter().collect())
            .inspect_err(|e| error!(round, error = %e, "Routing failed, round aborted"))?;
        let deliveries = routed.deliveries;

        let after = self.transition(topology, &before, &mut routed);
        let stopped = self.all_stopping(&after);
        ctx.commit(before, after, stopped);

        debug!(round, deliveries, stopped, "Round complete");
        if stopped {
            info!(algorithm = self.algorithm.name(), rounds = round, "All nodes stopped");
        }

        Ok(RoundOutcome {
            round,
            deliveries,
            stopped,
        })
    }

    fn reset(&mut self, ctx: &mut RunContext<A::State>) {
        debug!(algorithm = self.algorithm.name(), "Resetting run");
        ctx.reset();
    }

    fn is_stopping(&self, state: &A::State) -> bool {
        self.algorithm.is_stopping(state)
    }
}
