//! Error types for graph mutation and stepping.

use thiserror::Error;

use crate::components::graph::NodeId;
use crate::config::ConfigError;

/// Result type for simulation operations.
pub type Result<T> = std::result::Result<T, SimError>;

/// Errors raised by the graph state and the engine.
///
/// All of these are local, synchronous failures. A failed operation leaves
/// the graph untouched.
#[derive(Debug, Error)]
pub enum SimError {
    /// Self-loop or duplicate edge on an explicit add
    #[error("invalid edge ({u}, {v}): {reason}")]
    InvalidEdge {
        u: NodeId,
        v: NodeId,
        reason: &'static str,
    },

    /// Remove or lookup on an absent edge
    #[error("edge ({u}, {v}) not found")]
    EdgeNotFound { u: NodeId, v: NodeId },

    /// Reference to a node outside the graph
    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    /// An interaction step was selected but the graph has no edges
    #[error("cannot run an interaction step on a graph with no edges")]
    EmptyGraph,

    /// A node's opinion does not fit the configured update rule
    #[error("node {node} has opinion of shape {found}, expected {expected}")]
    OpinionShape {
        node: NodeId,
        expected: String,
        found: String,
    },

    /// A starting opinion value outside [0, 1]
    #[error("node {node} has opinion value {value} outside [0, 1]")]
    OpinionOutOfRange { node: NodeId, value: f64 },

    /// A starting edge weight outside [0, 1]
    #[error("edge ({u}, {v}) has weight {weight} outside [0, 1]")]
    WeightOutOfRange { u: NodeId, v: NodeId, weight: f64 },

    /// Snapshot nodes must be listed with ids `0..n` in order
    #[error("snapshot node at position {position} has id {id}")]
    SnapshotOrder { position: usize, id: usize },

    #[error(transparent)]
    Config(#[from] ConfigError),
}
