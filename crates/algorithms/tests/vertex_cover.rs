//! End-to-end runs of the vertex cover composite.

use portnum_algorithms::{
    BipartiteMaximalMatching, CoverKind, CoverState, MatchingKind, VertexCoverApproximation,
};
use portnum_core::{InvalidTopology, RoundError, StateValue};
use portnum_simulation::{
    RoundDriver, RoundEngine, RunContext, RunState, Simulation, VirtualGraph,
    VirtualNetworkAdapter,
};
use portnum_test_helpers::{colored_graph, complete_bipartite, four_cycle, path, random};
use portnum_types::{Color, PortGraph, Topology};
use tracing_test::traced_test;

fn assert_covers_every_edge(graph: &PortGraph, ctx: &RunContext<CoverState>) {
    for edge in graph.edges() {
        let covered = [edge.a.node, edge.b.node].into_iter().any(|node| {
            ctx.state_of(node)
                .and_then(CoverState::in_cover)
                .expect("every node stopped")
        });
        assert!(covered, "edge {}-{} is not covered", edge.a.node, edge.b.node);
    }
}

/// A triangle with a pendant node: not bipartite, all nodes uncolored.
fn triangle_with_tail() -> PortGraph {
    colored_graph(&[0, 0, 0, 0], &[(0, 1), (1, 2), (2, 0), (2, 3)]).0
}

#[traced_test]
#[test]
fn test_cover_of_four_cycle() {
    let (graph, _) = four_cycle();
    let mut adapter = VirtualNetworkAdapter::new(VertexCoverApproximation::new());
    let mut ctx = RunContext::new();

    let rounds = adapter.run_until_stopped(&graph, &mut ctx, 100).unwrap();
    assert!(rounds <= 2 * graph.max_degree() as u64 + 1);
    assert!(ctx.is_stopped());
    assert!(adapter.virtual_context().is_stopped());
    assert_eq!(adapter.virtual_context().round_counter(), rounds);
    assert_covers_every_edge(&graph, &ctx);
}

#[traced_test]
#[test]
fn test_in_cover_iff_a_counterpart_is_matched() {
    let graph = triangle_with_tail();
    let mut sim = Simulation::new(VirtualNetworkAdapter::new(VertexCoverApproximation::new()));
    sim.run(&graph).unwrap();

    for state in sim.context().after_round_states().values() {
        let (first, second) = state.counterparts();
        let matched = first.kind() == MatchingKind::MatchedStopped
            || second.kind() == MatchingKind::MatchedStopped;
        assert_eq!(state.kind(), CoverKind::BothStopped);
        assert_eq!(state.in_cover(), Some(matched));
    }
    assert_covers_every_edge(&graph, sim.context());
}

#[traced_test]
#[test]
fn test_virtual_states_match_direct_run_on_virtual_graph() {
    for seed in 0..15 {
        let graph = random(seed, 4, 5, 0.5);

        let mut adapter = VirtualNetworkAdapter::new(VertexCoverApproximation::new());
        let mut ctx = RunContext::new();

        let virtual_graph = VirtualGraph::build(&graph).unwrap();
        let mut direct = RoundEngine::new(BipartiteMaximalMatching::new());
        let mut direct_ctx = RunContext::new();

        while !adapter.is_terminated(&ctx) {
            adapter.run_one_round(&graph, &mut ctx).unwrap();
            direct.run_one_round(&virtual_graph, &mut direct_ctx).unwrap();

            let composite_view = adapter.virtual_context();
            assert_eq!(
                composite_view.round_counter(),
                direct_ctx.round_counter()
            );
            assert_eq!(
                composite_view.before_round_states(),
                direct_ctx.before_round_states(),
                "seed {seed}, round {}",
                ctx.round_counter()
            );
            assert_eq!(
                composite_view.after_round_states(),
                direct_ctx.after_round_states(),
                "seed {seed}, round {}",
                ctx.round_counter()
            );
        }
        assert!(direct.is_terminated(&direct_ctx));
        assert_covers_every_edge(&graph, &ctx);
    }
}

#[traced_test]
#[test]
fn test_random_graphs_are_covered_within_bound() {
    for seed in 100..130 {
        let graph = random(seed, 3 + (seed % 4) as usize, 2 + (seed % 5) as usize, 0.4);
        let bound = 2 * graph.max_degree() as u64 + 1;
        let mut adapter = VirtualNetworkAdapter::new(VertexCoverApproximation::new());
        let mut ctx = RunContext::new();

        let rounds = adapter
            .run_until_stopped(&graph, &mut ctx, bound)
            .unwrap_or_else(|e| panic!("seed {seed}: {e}"));
        assert!(rounds <= bound);
        assert_covers_every_edge(&graph, &ctx);
    }
}

#[traced_test]
#[test]
fn test_isolated_node_stops_outside_cover() {
    let (graph, nodes) = colored_graph(&[0], &[]);
    let mut adapter = VirtualNetworkAdapter::new(VertexCoverApproximation::new());
    let mut ctx = RunContext::new();

    let outcome = adapter.run_one_round(&graph, &mut ctx).unwrap();
    assert!(outcome.stopped);
    assert_eq!(outcome.deliveries, 0);
    assert_eq!(ctx.state_of(nodes[0]).unwrap().render(), "BS(US,US,false)");
}

#[traced_test]
#[test]
fn test_reset_drops_virtual_graph() {
    let graph = triangle_with_tail();
    let mut adapter = VirtualNetworkAdapter::new(VertexCoverApproximation::new());
    let mut ctx = RunContext::new();
    assert!(adapter.virtual_graph().is_none());

    adapter.run_one_round(&graph, &mut ctx).unwrap();
    assert_eq!(adapter.virtual_graph().unwrap().graph().node_count(), 8);

    adapter.reset(&mut ctx);
    assert!(adapter.virtual_graph().is_none());
    assert_eq!(ctx.run_state(), RunState::NotStarted);
    assert_eq!(adapter.virtual_context().run_state(), RunState::NotStarted);
}

#[traced_test]
#[test]
fn test_reset_reproduces_every_round() {
    let graph = random(7, 5, 4, 0.5);
    let mut adapter = VirtualNetworkAdapter::new(VertexCoverApproximation::new());
    let mut ctx = RunContext::new();

    let record = |adapter: &mut VirtualNetworkAdapter<VertexCoverApproximation>,
                  ctx: &mut RunContext<CoverState>| {
        let mut rounds = Vec::new();
        while !adapter.is_terminated(ctx) {
            adapter.run_one_round(&graph, ctx).unwrap();
            rounds.push((
                ctx.before_round_states().clone(),
                ctx.after_round_states().clone(),
                adapter.virtual_context().after_round_states().clone(),
            ));
        }
        rounds
    };

    let first = record(&mut adapter, &mut ctx);
    adapter.reset(&mut ctx);
    let second = record(&mut adapter, &mut ctx);

    assert!(first.len() > 1);
    assert_eq!(first, second);
}

#[traced_test]
#[test]
fn test_stale_virtual_graph_aborts_round() {
    let mut graph = triangle_with_tail();
    let mut adapter = VirtualNetworkAdapter::new(VertexCoverApproximation::new());
    let mut ctx = RunContext::new();
    adapter.run_one_round(&graph, &mut ctx).unwrap();
    let snapshot = ctx.clone();

    let added = graph.add_node(Color(0), None);
    let err = adapter.run_one_round(&graph, &mut ctx).unwrap_err();
    assert_eq!(err, RoundError::MissingVirtualStructure { node: added });
    assert!(!err.is_recoverable());

    assert_eq!(ctx.round_counter(), snapshot.round_counter());
    assert_eq!(ctx.after_round_states(), snapshot.after_round_states());
    assert_eq!(adapter.virtual_context().round_counter(), 1);
}

#[traced_test]
#[test]
fn test_deleted_node_aborts_round() {
    let (mut graph, [a, b, _, _]) = four_cycle();
    let mut adapter = VirtualNetworkAdapter::new(VertexCoverApproximation::new());
    let mut ctx = RunContext::new();
    adapter.run_one_round(&graph, &mut ctx).unwrap();
    let snapshot = ctx.clone();

    graph.delete_node(b).unwrap();
    let err = adapter.run_one_round(&graph, &mut ctx).unwrap_err();
    assert_eq!(err, RoundError::MissingVirtualStructure { node: a });

    assert_eq!(ctx.round_counter(), 1);
    assert_eq!(ctx.after_round_states(), snapshot.after_round_states());
    assert_eq!(adapter.virtual_context().round_counter(), 1);
}

#[traced_test]
#[test]
fn test_added_edge_aborts_round() {
    let mut graph = path(4);
    let nodes = graph.node_ids();
    let mut adapter = VirtualNetworkAdapter::new(VertexCoverApproximation::new());
    let mut ctx = RunContext::new();
    adapter.run_one_round(&graph, &mut ctx).unwrap();
    assert!(!adapter.is_terminated(&ctx));

    graph.add_edge(nodes[0], nodes[3]).unwrap();
    let err = adapter.run_until_stopped(&graph, &mut ctx, 100).unwrap_err();
    assert_eq!(err, RoundError::MissingVirtualStructure { node: nodes[0] });
    assert_eq!(ctx.round_counter(), 1);

    // A fresh run picks up the edited graph
    adapter.reset(&mut ctx);
    adapter.run_until_stopped(&graph, &mut ctx, 100).unwrap();
    assert_covers_every_edge(&graph, &ctx);
}

#[traced_test]
#[test]
fn test_paths_and_complete_bipartite_graphs_are_covered() {
    let graphs = (2..7)
        .map(path)
        .chain([(1, 1), (2, 3), (3, 3)].map(|(w, b)| complete_bipartite(w, b)));
    for graph in graphs {
        let bound = 2 * graph.max_degree() as u64 + 1;
        let mut adapter = VirtualNetworkAdapter::new(VertexCoverApproximation::new());
        let mut ctx = RunContext::new();

        let rounds = adapter.run_until_stopped(&graph, &mut ctx, bound).unwrap();
        assert!(rounds <= bound);
        assert_covers_every_edge(&graph, &ctx);
    }
}

#[traced_test]
#[test]
fn test_empty_graph_and_terminated_runs_are_refused() {
    let mut adapter = VirtualNetworkAdapter::new(VertexCoverApproximation::new());
    let mut ctx = RunContext::new();

    let empty = PortGraph::new();
    assert_eq!(
        adapter.run_one_round(&empty, &mut ctx).unwrap_err(),
        RoundError::InvalidTopology(InvalidTopology::Empty)
    );
    assert!(adapter.virtual_graph().is_none());

    let (graph, _) = four_cycle();
    adapter.run_until_stopped(&graph, &mut ctx, 100).unwrap();
    assert_eq!(
        adapter.run_one_round(&graph, &mut ctx).unwrap_err(),
        RoundError::AlreadyTerminated
    );
}
