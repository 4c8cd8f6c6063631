//! Edge Creation and Pruning
//!
//! New ties form between random unconnected pairs by rejection sampling;
//! ties whose weight decays below the removal threshold are dropped.

use rand::Rng;

use crate::components::{GraphState, NodeId};
use crate::config::WeightInit;
use crate::error::Result;

/// What a new-edge attempt did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EdgeCreation {
    Created {
        a: NodeId,
        b: NodeId,
        weight: f64,
        attempts: u32,
    },
    /// No free pair found within the retry limit, or none exists
    Skipped { attempts: u32 },
}

/// Pruning is strictly below the threshold; a weight equal to it survives.
pub fn should_prune(weight: f64, threshold: f64) -> bool {
    weight < threshold
}

/// Sample distinct node pairs until one is unconnected, then link it.
///
/// `limit` bounds the number of sampled pairs; `None` keeps sampling until a
/// free pair turns up. An unbounded search on a graph with no free pair
/// would never finish, so it is skipped up front.
pub fn try_create_edge<R: Rng + ?Sized>(
    graph: &mut GraphState,
    rng: &mut R,
    limit: Option<u32>,
    weight_init: &WeightInit,
) -> Result<EdgeCreation> {
    if limit.is_none() && (graph.node_count() < 2 || graph.is_complete()) {
        tracing::warn!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "no unconnected pair left, skipping edge creation"
        );
        return Ok(EdgeCreation::Skipped { attempts: 0 });
    }

    let mut attempts = 0u32;
    while limit.map_or(true, |max| attempts < max) {
        attempts += 1;
        let Some((u, v)) = graph.random_pair(rng) else {
            break;
        };
        if graph.has_edge(u, v) {
            continue;
        }

        let weight = weight_init.sample(rng);
        graph.add_edge(u, v, weight)?;
        let (a, b) = if u < v { (u, v) } else { (v, u) };
        tracing::debug!(%a, %b, weight, attempts, "edge created");
        return Ok(EdgeCreation::Created {
            a,
            b,
            weight,
            attempts,
        });
    }

    tracing::debug!(attempts, "edge creation exhausted its attempts");
    Ok(EdgeCreation::Skipped { attempts })
}

/// Remove the edge if its current weight is below `threshold`.
/// Returns whether it was removed.
pub fn prune_if_weak(graph: &mut GraphState, u: NodeId, v: NodeId, threshold: f64) -> Result<bool> {
    let weight = graph.weight(u, v)?;
    if !should_prune(weight, threshold) {
        return Ok(false);
    }
    graph.remove_edge(u, v)?;
    tracing::debug!(%u, %v, weight, "edge pruned");
    Ok(true)
}
