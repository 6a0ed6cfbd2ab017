//! Convenience wrapper owning a driver, its run context, and counters.

use crate::config::SimulationConfig;
use crate::context::RunContext;
use crate::runner::{RoundDriver, RoundOutcome};
use portnum_core::RoundError;
use portnum_types::Topology;
use tracing::info;

/// Counters accumulated over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulationStats {
    /// Rounds completed.
    pub rounds: u64,

    /// Messages delivered on the physical topology.
    pub messages_delivered: u64,
}

impl SimulationStats {
    fn record(&mut self, outcome: &RoundOutcome) {
        self.rounds = outcome.round;
        self.messages_delivered += outcome.deliveries as u64;
    }
}

/// A driver together with the context it runs in.
///
/// ```ignore
/// let mut sim = Simulation::new(RoundEngine::new(BipartiteMaximalMatching::new()));
/// sim.run(&graph)?;
/// for (node, state) in sim.context().after_round_states() {
///     println!("{node}: {}", state.render());
/// }
/// ```
pub struct Simulation<D: RoundDriver> {
    driver: D,
    ctx: RunContext<D::State>,
    config: SimulationConfig,
    stats: SimulationStats,
}

impl<D: RoundDriver> Simulation<D> {
    pub fn new(driver: D) -> Self {
        Self::with_config(driver, SimulationConfig::default())
    }

    pub fn with_config(driver: D, config: SimulationConfig) -> Self {
        Self {
            driver,
            ctx: RunContext::new(),
            config,
            stats: SimulationStats::default(),
        }
    }

    /// Run a single round.
    pub fn step(&mut self, topology: &dyn Topology) -> Result<RoundOutcome, RoundError> {
        let outcome = self.driver.run_one_round(topology, &mut self.ctx)?;
        self.stats.record(&outcome);
        Ok(outcome)
    }

    /// Run until every node stops or the configured round limit is hit.
    ///
    /// Returns the number of rounds run in total.
    pub fn run(&mut self, topology: &dyn Topology) -> Result<u64, RoundError> {
        self.run_with(topology, |_, _| {})
    }

    /// Like [`run`](Self::run), calling `observe` after every round.
    pub fn run_with<F>(
        &mut self,
        topology: &dyn Topology,
        mut observe: F,
    ) -> Result<u64, RoundError>
    where
        F: FnMut(&RoundOutcome, &RunContext<D::State>),
    {
        let stats = &mut self.stats;
        let rounds = self.driver.run_observed(
            topology,
            &mut self.ctx,
            self.config.max_rounds,
            |outcome, ctx| {
                stats.record(outcome);
                observe(outcome, ctx);
            },
        )?;
        info!(
            algorithm = self.driver.name(),
            rounds = self.stats.rounds,
            messages = self.stats.messages_delivered,
            "Simulation complete"
        );
        Ok(rounds)
    }

    /// Discard the run and the counters.
    pub fn reset(&mut self) {
        self.driver.reset(&mut self.ctx);
        self.stats = SimulationStats::default();
    }

    pub fn context(&self) -> &RunContext<D::State> {
        &self.ctx
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn stats(&self) -> SimulationStats {
        self.stats
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }
}
