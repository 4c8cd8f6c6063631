//! Snapshot Types
//!
//! Serialization structs for graph snapshots.
//!
//! A snapshot captures node opinions and edge weights at a point in the run,
//! plus the step counter used to label it. Renderers only ever see this view.

use serde::{Deserialize, Serialize};

/// Generates a snapshot ID for the given step.
pub fn generate_snapshot_id(step: u64) -> String {
    format!("snap_{:08}", step)
}

/// A node's opinion: a single stance or one stance per topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OpinionSnapshot {
    Scalar(f64),
    Topics(Vec<f64>),
}

impl OpinionSnapshot {
    /// Opinion values as a slice (a scalar is a one-element slice)
    pub fn values(&self) -> &[f64] {
        match self {
            OpinionSnapshot::Scalar(v) => std::slice::from_ref(v),
            OpinionSnapshot::Topics(v) => v,
        }
    }

    /// Mean over topics, useful for coloring a node by a single value
    pub fn mean(&self) -> f64 {
        let values = self.values();
        if values.is_empty() {
            return 0.0;
        }
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Node snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub id: usize,
    pub opinion: OpinionSnapshot,
}

/// Edge snapshot. `source < target` always holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeSnapshot {
    pub source: usize,
    pub target: usize,
    pub weight: f64,
}

/// Complete graph snapshot at one step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub snapshot_id: String,
    pub step: u64,
    pub nodes: Vec<NodeSnapshot>,
    #[serde(default)]
    pub edges: Vec<EdgeSnapshot>,
}

impl GraphSnapshot {
    pub fn new(step: u64, nodes: Vec<NodeSnapshot>, edges: Vec<EdgeSnapshot>) -> Self {
        Self {
            snapshot_id: generate_snapshot_id(step),
            step,
            nodes,
            edges,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Look up a node's opinion by id
    pub fn opinion_of(&self, id: usize) -> Option<&OpinionSnapshot> {
        self.nodes.iter().find(|n| n.id == id).map(|n| &n.opinion)
    }

    /// Weight of the edge between `a` and `b`, in either order
    pub fn weight_between(&self, a: usize, b: usize) -> Option<f64> {
        let (source, target) = if a <= b { (a, b) } else { (b, a) };
        self.edges
            .iter()
            .find(|e| e.source == source && e.target == target)
            .map(|e| e.weight)
    }

    /// Serialize to a single JSON line
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse from a single JSON line
    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}
