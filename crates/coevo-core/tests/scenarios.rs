//! Engine scenario tests
//!
//! Small hand-built graphs with known outcomes, plus invariants checked over
//! longer randomized runs.

use std::collections::HashSet;

use coevo_core::setup::{populate, ring_lattice};
use coevo_core::{
    graph_from_snapshot, GraphState, NodeId, Opinion, SimError, SimulationConfig,
    SimulationEngine, StepOutcome, WeightInit,
};
use coevo_snapshot::fixtures;
use rand::rngs::SmallRng;
use rand::SeedableRng;

const EPS: f64 = 1e-9;

fn two_nodes(o_i: f64, o_j: f64, w: f64) -> GraphState {
    let mut graph = GraphState::with_opinions([o_i, o_j]);
    graph.add_edge(NodeId(0), NodeId(1), w).unwrap();
    graph
}

fn scalar(graph: &GraphState, id: usize) -> f64 {
    match graph.opinion(NodeId(id)).unwrap() {
        Opinion::Scalar(v) => *v,
        other => panic!("expected scalar opinion, got {:?}", other),
    }
}

fn complete(n: usize, opinion: Opinion) -> GraphState {
    let mut graph = GraphState::with_opinions(vec![opinion; n]);
    for a in 0..n {
        for b in (a + 1)..n {
            graph.add_edge(NodeId(a), NodeId(b), 0.5).unwrap();
        }
    }
    graph
}

#[test]
fn test_reference_two_node_step() {
    let config = SimulationConfig::new(0.03, 0.3, 4.0).with_p_new(0.0);
    let mut engine = SimulationEngine::seeded(two_nodes(0.3, 0.0, 0.25), config, 1).unwrap();

    let StepOutcome::Interaction(outcome) = engine.step().unwrap() else {
        panic!("p_new = 0 must always interact");
    };

    // delta_o = 0.03 * 0.25 * (0.0 - 0.3)
    assert!((scalar(engine.graph(), 0) - (0.3 - 0.00225)).abs() < EPS);
    assert!((scalar(engine.graph(), 1) - 0.00225).abs() < EPS);

    // delta_w = 0.3 * 0.25 * 0.75 * (1 - 4 * 0.3)
    let delta_w = outcome.weight_after - outcome.weight_before;
    assert!((delta_w - -0.01125).abs() < EPS);
    assert!((engine.graph().weight(NodeId(0), NodeId(1)).unwrap() - 0.23875).abs() < EPS);
    assert!(!outcome.pruned);
    assert_eq!(engine.step_count(), 1);
}

#[test]
fn test_weight_at_threshold_is_kept() {
    // |0.75 - 0.25| * gamma = 1 zeroes the weight change
    let config = SimulationConfig::new(0.03, 0.3, 2.0).with_p_new(0.0);
    let mut engine = SimulationEngine::seeded(two_nodes(0.25, 0.75, 0.05), config, 1).unwrap();

    let StepOutcome::Interaction(outcome) = engine.step().unwrap() else {
        panic!("expected an interaction");
    };
    assert_eq!(outcome.weight_after, 0.05);
    assert!(!outcome.pruned);
    assert!(engine.graph().has_edge(NodeId(0), NodeId(1)));
}

#[test]
fn test_weight_below_threshold_is_pruned_immediately() {
    let config = SimulationConfig::new(0.03, 0.5, 4.0).with_p_new(0.0);
    let mut engine = SimulationEngine::seeded(two_nodes(0.0, 1.0, 0.06), config, 1).unwrap();

    let StepOutcome::Interaction(outcome) = engine.step().unwrap() else {
        panic!("expected an interaction");
    };
    assert!(outcome.weight_after < 0.05);
    assert!(outcome.pruned);
    assert!(!engine.graph().has_edge(NodeId(0), NodeId(1)));
    assert_eq!(engine.graph().edge_count(), 0);
    assert_eq!(engine.totals().edges_pruned, 1);

    // nothing left to interact on
    assert!(matches!(engine.step(), Err(SimError::EmptyGraph)));
    assert_eq!(engine.step_count(), 1);
}

#[test]
fn test_flexible_variant_prunes_clamped_weight() {
    let mut graph = GraphState::with_opinions([vec![0.0], vec![1.0]]);
    graph.add_edge(NodeId(0), NodeId(1), 0.2).unwrap();
    let config = SimulationConfig::new(0.3, 0.9, 10.0)
        .with_delta(1.0)
        .with_p_new(0.0);
    let mut engine = SimulationEngine::seeded(graph, config, 1).unwrap();

    let StepOutcome::Interaction(outcome) = engine.step().unwrap() else {
        panic!("expected an interaction");
    };
    assert_eq!(outcome.weight_after, 0.0);
    assert!(outcome.pruned);

    // extremes move at the floor rate: 0.3 * 0.2 * 1.0 * 0.05
    let Opinion::Topics(low) = engine.graph().opinion(NodeId(0)).unwrap() else {
        panic!("expected topic opinion");
    };
    assert!((low[0] - 0.003).abs() < EPS);
}

#[test]
fn test_linear_topic_variant_prunes_negative_weight() {
    let mut graph = GraphState::with_opinions([vec![0.0, 1.0], vec![1.0, 0.0]]);
    graph.add_edge(NodeId(0), NodeId(1), 0.5).unwrap();
    let config = SimulationConfig::new(0.5, 0.5, 10.0)
        .with_topics(2)
        .with_p_new(0.0);
    let mut engine = SimulationEngine::seeded(graph, config, 1).unwrap();

    let StepOutcome::Interaction(outcome) = engine.step().unwrap() else {
        panic!("expected an interaction");
    };
    // no clamping without delta: the weight goes negative before pruning
    assert!((outcome.weight_after - -0.625).abs() < EPS);
    assert!(outcome.pruned);
    assert_eq!(engine.graph().edge_count(), 0);
}

#[test]
fn test_out_of_range_snapshot_is_rejected_at_construction() {
    let mut snapshot = fixtures::sample_snapshot();
    snapshot.edges[0].weight = 3.0;

    // loading is permissive, the engine is the gate
    let graph = graph_from_snapshot(&snapshot).unwrap();
    let config = SimulationConfig::new(0.5, 0.3, 4.0);
    let err = SimulationEngine::seeded(graph, config, 1).unwrap_err();
    assert!(matches!(
        err,
        SimError::WeightOutOfRange { u: NodeId(0), v: NodeId(1), .. }
    ));
}

#[test]
fn test_bounded_creation_on_complete_graph_changes_nothing() {
    let config = SimulationConfig::new(0.03, 0.3, 4.0)
        .with_topics(2)
        .with_p_new(1.0);
    let graph = complete(5, Opinion::Topics(vec![0.5, 0.5]));
    let mut engine = SimulationEngine::seeded(graph.clone(), config, 9).unwrap();

    let outcome = engine.step().unwrap();
    assert_eq!(outcome, StepOutcome::EdgeCreationSkipped { attempts: 50 });
    assert_eq!(engine.graph().edge_count(), graph.edge_count());
    assert_eq!(engine.step_count(), 1);
}

#[test]
fn test_creation_never_makes_loops_or_duplicates() {
    let mut rng = SmallRng::seed_from_u64(5);
    let model = SimulationConfig::default().with_p_new(0.3);
    let edges = ring_lattice(25, 2).unwrap();
    let graph = populate(25, &edges, &model, &WeightInit::default(), &mut rng).unwrap();
    let mut engine = SimulationEngine::new(graph, model, rng).unwrap();

    for _ in 0..3000 {
        match engine.step() {
            Ok(StepOutcome::EdgeCreated { a, b, .. }) => {
                assert!(a < b);
                assert!(engine.graph().has_edge(a, b));
            }
            Ok(_) => {}
            Err(SimError::EmptyGraph) => continue,
            Err(e) => panic!("unexpected error: {e}"),
        }

        let keys: HashSet<_> = engine.graph().edges().map(|e| e.key()).collect();
        assert_eq!(keys.len(), engine.graph().edge_count());
        assert!(engine.graph().edges().all(|e| e.a != e.b));
    }
}

#[test]
fn test_low_gamma_weights_never_decrease() {
    let mut rng = SmallRng::seed_from_u64(12);
    let model = SimulationConfig::new(0.3, 0.5, 1.0).with_p_new(0.02);
    let edges = ring_lattice(30, 4).unwrap();
    let graph = populate(30, &edges, &model, &WeightInit::Uniform { low: 0.1, high: 0.9 }, &mut rng)
        .unwrap();
    let mut engine = SimulationEngine::new(graph, model, rng).unwrap();

    for _ in 0..5000 {
        if let StepOutcome::Interaction(outcome) = engine.step().unwrap() {
            assert!(outcome.weight_after >= outcome.weight_before);
            assert!(!outcome.pruned);
        }
    }
}

#[test]
fn test_scalar_run_conserves_total_opinion() {
    let mut rng = SmallRng::seed_from_u64(77);
    let model = SimulationConfig::new(0.2, 0.3, 0.8).with_p_new(0.05);
    let edges = ring_lattice(20, 4).unwrap();
    let graph = populate(20, &edges, &model, &WeightInit::default(), &mut rng).unwrap();

    let total = |g: &GraphState| g.nodes().map(|n| n.opinion.values()[0]).sum::<f64>();
    let before = total(&graph);

    let mut engine = SimulationEngine::new(graph, model, rng).unwrap();
    engine.run(5000).unwrap();

    assert!((total(engine.graph()) - before).abs() < 1e-6);
}

#[test]
fn test_flexible_run_stays_in_unit_interval() {
    let mut rng = SmallRng::seed_from_u64(31);
    let model = SimulationConfig::new(0.5, 0.9, 3.0)
        .with_topics(3)
        .with_delta(4.0)
        .with_p_new(0.1);
    let edges = ring_lattice(30, 6).unwrap();
    let graph = populate(30, &edges, &model, &WeightInit::default(), &mut rng).unwrap();
    let mut engine = SimulationEngine::new(graph, model, rng).unwrap();

    for _ in 0..4000 {
        match engine.step() {
            Ok(_) | Err(SimError::EmptyGraph) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    for node in engine.graph().nodes() {
        assert!(node.opinion.values().iter().all(|v| (0.0..=1.0).contains(v)));
    }
    for edge in engine.graph().edges() {
        assert!((0.05..=1.0).contains(&edge.weight));
    }
}

#[test]
fn test_engine_runs_from_fixture_snapshot() {
    let snapshot = fixtures::sample_snapshot();
    let graph = graph_from_snapshot(&snapshot).unwrap();
    let config = SimulationConfig::default().with_p_new(0.0);
    let mut engine = SimulationEngine::seeded(graph, config, 3).unwrap();

    engine.run(50).unwrap();
    let after = engine.snapshot();
    assert_eq!(after.node_count(), snapshot.node_count());
    assert_eq!(after.step, engine.step_count());
    // the weak, high-disagreement tie between 1 and 2 cannot survive
    assert_eq!(after.weight_between(1, 2), None);
}
