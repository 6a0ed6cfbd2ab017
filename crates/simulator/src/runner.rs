//! Running a reference algorithm and collecting its report.

use crate::config::AlgorithmKind;
use crate::error::SimulatorError;
use crate::report::{Labels, Report, RoundTable};
use portnum_algorithms::{
    BipartiteMaximalMatching, CoverState, MatchingState, VertexCoverApproximation,
};
use portnum_simulation::{
    RoundDriver, RoundEngine, RunContext, Simulation, SimulationConfig, VirtualNetworkAdapter,
};
use portnum_types::{PortGraph, Topology};
use tracing::info;

/// Run `algorithm` on `graph` to completion.
///
/// # Errors
///
/// Any [`RoundError`](portnum_core::RoundError), including an invalid input
/// topology or hitting the configured round limit.
pub fn run(
    algorithm: AlgorithmKind,
    graph: &PortGraph,
    labels: &Labels,
    config: &SimulationConfig,
) -> Result<Report, SimulatorError> {
    info!(
        %algorithm,
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        max_rounds = config.max_rounds,
        "Running simulation"
    );
    match algorithm {
        AlgorithmKind::Matching => {
            let mut sim = Simulation::with_config(
                RoundEngine::new(BipartiteMaximalMatching::new()),
                config.clone(),
            );
            let mut report = record(&mut sim, graph, labels)?;
            report
                .summary
                .extend(matching_summary(graph, sim.context(), labels));
            Ok(report)
        }
        AlgorithmKind::VertexCover => {
            let mut sim = Simulation::with_config(
                VirtualNetworkAdapter::new(VertexCoverApproximation::new()),
                config.clone(),
            );
            let mut report = record(&mut sim, graph, labels)?;
            report.summary.extend(cover_summary(sim.context(), labels));
            Ok(report)
        }
    }
}

/// Step until termination, capturing every round.
fn record<D: RoundDriver>(
    sim: &mut Simulation<D>,
    graph: &PortGraph,
    labels: &Labels,
) -> Result<Report, SimulatorError> {
    let mut report = Report {
        title: sim.driver().name().to_string(),
        ..Default::default()
    };
    sim.run_with(graph, |outcome, ctx| {
        report
            .rounds
            .push(RoundTable::capture(outcome, ctx, labels));
    })?;
    let stats = sim.stats();
    report.summary.push(format!(
        "{} rounds, {} messages",
        stats.rounds, stats.messages_delivered
    ));
    Ok(report)
}

fn matching_summary(
    graph: &PortGraph,
    ctx: &RunContext<MatchingState>,
    labels: &Labels,
) -> Vec<String> {
    let mut pairs = Vec::new();
    for (node, state) in ctx.after_round_states() {
        let Some(port) = state.matched_port() else {
            continue;
        };
        if let Some((mate, _)) = graph.neighbor_by_port(*node, port) {
            // Each pair is listed once, from its lower endpoint
            if *node < mate {
                pairs.push(format!("{}-{}", labels.label(*node), labels.label(mate)));
            }
        }
    }
    vec![format!("matching: {}", pairs.join(" "))]
}

fn cover_summary(ctx: &RunContext<CoverState>, labels: &Labels) -> Vec<String> {
    let cover: Vec<String> = ctx
        .after_round_states()
        .iter()
        .filter(|(_, state)| state.in_cover() == Some(true))
        .map(|(node, _)| labels.label(*node))
        .collect();
    vec![format!("cover: {}", cover.join(" "))]
}
