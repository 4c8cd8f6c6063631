//! Sample data fixtures for testing.
//!
//! Enable the `test-fixtures` feature to access these helpers from other
//! crates.
//!
//! # Example
//!
//! ```ignore
//! // In your Cargo.toml:
//! // [dev-dependencies]
//! // coevo-snapshot = { path = "../coevo-snapshot", features = ["test-fixtures"] }
//!
//! use coevo_snapshot::fixtures;
//!
//! let snapshot = fixtures::sample_snapshot();
//! ```

use crate::{EdgeSnapshot, GraphSnapshot, NodeSnapshot, OpinionSnapshot};

/// Returns a four-node scalar-opinion snapshot.
///
/// Contains a path 0-1-2 plus an isolated node 3:
/// - 0 and 1 agree closely and share a mid-strength tie
/// - 2 sits at the opposite extreme with a weak tie to 1
pub fn sample_snapshot() -> GraphSnapshot {
    let opinions = [0.2, 0.25, 0.9, 0.5];
    let nodes = opinions
        .iter()
        .enumerate()
        .map(|(id, &o)| NodeSnapshot {
            id,
            opinion: OpinionSnapshot::Scalar(o),
        })
        .collect();

    let edges = vec![
        EdgeSnapshot { source: 0, target: 1, weight: 0.5 },
        EdgeSnapshot { source: 1, target: 2, weight: 0.1 },
    ];

    GraphSnapshot::new(2000, nodes, edges)
}

/// Returns a three-node snapshot with two topics per node.
pub fn sample_topic_snapshot() -> GraphSnapshot {
    let nodes = vec![
        NodeSnapshot { id: 0, opinion: OpinionSnapshot::Topics(vec![0.1, 0.8]) },
        NodeSnapshot { id: 1, opinion: OpinionSnapshot::Topics(vec![0.15, 0.7]) },
        NodeSnapshot { id: 2, opinion: OpinionSnapshot::Topics(vec![0.95, 0.05]) },
    ];

    let edges = vec![
        EdgeSnapshot { source: 0, target: 1, weight: 0.75 },
        EdgeSnapshot { source: 0, target: 2, weight: 0.3 },
    ];

    GraphSnapshot::new(0, nodes, edges)
}
