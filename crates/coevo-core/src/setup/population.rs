//! Graph Population
//!
//! Assigns initial opinions and weights to a topology.

use rand::Rng;

use crate::components::{EdgeKey, GraphState, Opinion};
use crate::config::{Config, SimulationConfig, WeightInit};
use crate::error::Result;
use crate::setup::topology::watts_strogatz;

/// Uniform random opinion shaped for the model's update rule
pub fn random_opinion<R: Rng + ?Sized>(model: &SimulationConfig, rng: &mut R) -> Opinion {
    if model.uses_topic_rule() {
        Opinion::Topics((0..model.n_topics).map(|_| rng.gen::<f64>()).collect())
    } else {
        Opinion::Scalar(rng.gen())
    }
}

/// Build a graph of `nodes` nodes with random opinions and the given edges.
///
/// Edges referencing unknown nodes, self-loops and duplicates are rejected.
pub fn populate<R: Rng + ?Sized>(
    nodes: usize,
    edges: &[EdgeKey],
    model: &SimulationConfig,
    initial_weight: &WeightInit,
    rng: &mut R,
) -> Result<GraphState> {
    let mut graph = GraphState::new();
    for _ in 0..nodes {
        graph.add_node(random_opinion(model, rng));
    }
    for &(u, v) in edges {
        graph.add_edge(u, v, initial_weight.sample(rng))?;
    }
    Ok(graph)
}

/// Small-world starting graph described by `config.topology`
pub fn build_initial_graph<R: Rng + ?Sized>(config: &Config, rng: &mut R) -> Result<GraphState> {
    let topology = &config.topology;
    let edges = watts_strogatz(
        topology.nodes,
        topology.neighbors,
        topology.rewire_probability,
        rng,
    )?;
    let graph = populate(
        topology.nodes,
        &edges,
        &config.model,
        &topology.initial_weight,
        rng,
    )?;

    tracing::info!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "initial graph built"
    );
    Ok(graph)
}
