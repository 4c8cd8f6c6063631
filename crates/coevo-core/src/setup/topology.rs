//! Initial Topology
//!
//! Edge lists for starting graphs. The engine accepts any simple graph; these
//! builders exist so the batch driver and tests have realistic inputs.

use petgraph::graph::{NodeIndex, UnGraph};
use rand::Rng;

use crate::components::{edge_key, EdgeKey};
use crate::config::ConfigError;
use crate::error::Result;

/// Reject lattice parameters no ring can satisfy
pub fn check_lattice(n: usize, k: usize) -> std::result::Result<(), ConfigError> {
    if k % 2 != 0 {
        return Err(ConfigError::Invalid(format!("lattice degree must be even, got {k}")));
    }
    if k > 0 && k >= n {
        return Err(ConfigError::Invalid(format!(
            "lattice degree {k} must be smaller than node count {n}"
        )));
    }
    Ok(())
}

fn build_ring(n: usize, k: usize) -> UnGraph<(), ()> {
    let mut graph = UnGraph::with_capacity(n, n * k / 2);
    let nodes: Vec<NodeIndex> = (0..n).map(|_| graph.add_node(())).collect();

    for j in 1..=k / 2 {
        for i in 0..n {
            graph.add_edge(nodes[i], nodes[(i + j) % n], ());
        }
    }
    graph
}

/// Sorted, normalized endpoint pairs of every edge
fn edge_keys(graph: &UnGraph<(), ()>) -> Vec<EdgeKey> {
    let mut keys: Vec<EdgeKey> = graph
        .edge_indices()
        .filter_map(|e| graph.edge_endpoints(e))
        .map(|(s, t)| edge_key(s.into(), t.into()))
        .collect();
    keys.sort_unstable();
    keys
}

/// Ring of `n` nodes, each linked to its `k / 2` nearest neighbours on
/// either side. `k` must be even and smaller than `n`.
pub fn ring_lattice(n: usize, k: usize) -> Result<Vec<EdgeKey>> {
    check_lattice(n, k)?;
    Ok(edge_keys(&build_ring(n, k)))
}

/// Small-world graph: a ring lattice where each edge `(u, u + j)` is rewired
/// with probability `p` to `(u, w)` for a uniformly chosen `w` not already
/// adjacent to `u`. The edge count is preserved.
pub fn watts_strogatz<R: Rng + ?Sized>(
    n: usize,
    k: usize,
    p: f64,
    rng: &mut R,
) -> Result<Vec<EdgeKey>> {
    check_lattice(n, k)?;
    if !(0.0..=1.0).contains(&p) {
        return Err(ConfigError::Invalid(format!("rewire probability must be in [0, 1], got {p}")).into());
    }

    let mut graph = build_ring(n, k);
    for j in 1..=k / 2 {
        for i in 0..n {
            let u = NodeIndex::new(i);
            let v = NodeIndex::new((i + j) % n);
            // may already have been rewired away from the other endpoint
            let Some(edge) = graph.find_edge(u, v) else {
                continue;
            };
            if rng.gen::<f64>() >= p || graph.neighbors(u).count() >= n - 1 {
                continue;
            }
            let w = loop {
                let candidate = NodeIndex::new(rng.gen_range(0..n));
                if candidate != u && !graph.contains_edge(u, candidate) {
                    break candidate;
                }
            };
            graph.remove_edge(edge);
            graph.add_edge(u, w, ());
        }
    }

    Ok(edge_keys(&graph))
}
