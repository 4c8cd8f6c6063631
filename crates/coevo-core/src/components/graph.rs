//! Graph Components
//!
//! Nodes carrying opinions, undirected weighted edges, and the mutable
//! graph that owns both.
//!
//! Storage is a petgraph `UnGraph`. Its edge indices stay dense under
//! removal (the last edge takes the freed slot), so a uniformly random edge
//! is one index draw. A hash index keyed by the normalized endpoint pair
//! gives O(1) membership tests and is fixed up after each removal.
//!
//! # Input assumptions
//!
//! The update rules are only meaningful for opinion values and edge weights
//! in `[0, 1]`; the scalar rule relies on `alpha * w <= 1` to keep an
//! interaction a contraction. [`GraphState`] itself stores any finite value
//! (the unclamped rules legitimately push weights below zero before
//! pruning), and [`GraphState::check_unit_interval`] is the gate applied to
//! a starting graph. The graph is expected to be "connected-ish": isolated
//! nodes never interact until edge creation reaches them.

use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::opinion::Opinion;
use crate::error::{Result, SimError};

/// Stable node identity, an index in `0..node_count`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl NodeId {
    fn index(self) -> NodeIndex {
        NodeIndex::new(self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for NodeId {
    fn from(index: usize) -> Self {
        NodeId(index)
    }
}

impl From<NodeIndex> for NodeId {
    fn from(index: NodeIndex) -> Self {
        NodeId(index.index())
    }
}

/// Unordered endpoint pair with the smaller id first
pub type EdgeKey = (NodeId, NodeId);

pub fn edge_key(u: NodeId, v: NodeId) -> EdgeKey {
    if u <= v {
        (u, v)
    } else {
        (v, u)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub opinion: Opinion,
}

/// An undirected tie. `a < b` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub a: NodeId,
    pub b: NodeId,
    pub weight: f64,
}

impl Edge {
    pub fn key(&self) -> EdgeKey {
        (self.a, self.b)
    }
}

/// Mutable graph: a fixed node set and a changing edge set
#[derive(Debug, Clone, Default)]
pub struct GraphState {
    graph: UnGraph<Node, f64>,
    edge_index: HashMap<EdgeKey, EdgeIndex>,
}

impl GraphState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a graph with one node per opinion and no edges
    pub fn with_opinions<I, O>(opinions: I) -> Self
    where
        I: IntoIterator<Item = O>,
        O: Into<Opinion>,
    {
        let mut graph = Self::new();
        for opinion in opinions {
            graph.add_node(opinion);
        }
        graph
    }

    pub fn add_node(&mut self, opinion: impl Into<Opinion>) -> NodeId {
        let id = NodeId(self.graph.node_count());
        self.graph.add_node(Node {
            id,
            opinion: opinion.into(),
        });
        id
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of edges in the complete graph on the current node set
    pub fn max_edge_count(&self) -> usize {
        let n = self.node_count();
        n * n.saturating_sub(1) / 2
    }

    /// True when no new edge can be added
    pub fn is_complete(&self) -> bool {
        self.edge_count() >= self.max_edge_count()
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        id.0 < self.node_count()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_weights()
    }

    /// Edges in storage order
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.graph.edge_references().map(|e| {
            let (a, b) = edge_key(e.source().into(), e.target().into());
            Edge {
                a,
                b,
                weight: *e.weight(),
            }
        })
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.graph
            .node_weight(id.index())
            .ok_or(SimError::NodeNotFound(id))
    }

    pub fn opinion(&self, id: NodeId) -> Result<&Opinion> {
        self.node(id).map(|n| &n.opinion)
    }

    /// Replace a node's opinion. The new opinion must have the same shape.
    pub fn set_opinion(&mut self, id: NodeId, opinion: Opinion) -> Result<()> {
        let node = self
            .graph
            .node_weight_mut(id.index())
            .ok_or(SimError::NodeNotFound(id))?;

        if node.opinion.is_scalar() != opinion.is_scalar()
            || node.opinion.topic_count() != opinion.topic_count()
        {
            return Err(SimError::OpinionShape {
                node: id,
                expected: node.opinion.shape(),
                found: opinion.shape(),
            });
        }

        node.opinion = opinion;
        Ok(())
    }

    fn edge_at(&self, index: EdgeIndex) -> Option<Edge> {
        let (s, t) = self.graph.edge_endpoints(index)?;
        let (a, b) = edge_key(s.into(), t.into());
        Some(Edge {
            a,
            b,
            weight: *self.graph.edge_weight(index)?,
        })
    }

    pub fn has_edge(&self, u: NodeId, v: NodeId) -> bool {
        self.edge_index.contains_key(&edge_key(u, v))
    }

    pub fn edge(&self, u: NodeId, v: NodeId) -> Result<Edge> {
        self.edge_index
            .get(&edge_key(u, v))
            .and_then(|&i| self.edge_at(i))
            .ok_or(SimError::EdgeNotFound { u, v })
    }

    pub fn weight(&self, u: NodeId, v: NodeId) -> Result<f64> {
        self.edge(u, v).map(|e| e.weight)
    }

    pub fn set_weight(&mut self, u: NodeId, v: NodeId, weight: f64) -> Result<()> {
        let slot = self
            .edge_index
            .get(&edge_key(u, v))
            .and_then(|&i| self.graph.edge_weight_mut(i))
            .ok_or(SimError::EdgeNotFound { u, v })?;
        *slot = weight;
        Ok(())
    }

    /// Add an undirected edge. Fails on self-loops, duplicates and unknown nodes.
    pub fn add_edge(&mut self, u: NodeId, v: NodeId, weight: f64) -> Result<()> {
        if u == v {
            return Err(SimError::InvalidEdge {
                u,
                v,
                reason: "self-loops are not allowed",
            });
        }
        for id in [u, v] {
            if !self.contains_node(id) {
                return Err(SimError::NodeNotFound(id));
            }
        }

        let key = edge_key(u, v);
        if self.edge_index.contains_key(&key) {
            return Err(SimError::InvalidEdge {
                u,
                v,
                reason: "edge already exists",
            });
        }

        let index = self.graph.add_edge(key.0.index(), key.1.index(), weight);
        self.edge_index.insert(key, index);
        Ok(())
    }

    /// Remove an edge, returning it
    pub fn remove_edge(&mut self, u: NodeId, v: NodeId) -> Result<Edge> {
        let key = edge_key(u, v);
        let index = self
            .edge_index
            .remove(&key)
            .ok_or(SimError::EdgeNotFound { u, v })?;
        let weight = self
            .graph
            .remove_edge(index)
            .ok_or(SimError::EdgeNotFound { u, v })?;

        // petgraph moved the last edge into `index`
        if let Some(moved) = self.edge_at(index) {
            self.edge_index.insert(moved.key(), index);
        }
        Ok(Edge {
            a: key.0,
            b: key.1,
            weight,
        })
    }

    pub fn neighbors(&self, id: NodeId) -> Result<Vec<NodeId>> {
        self.node(id)?;
        let mut out: Vec<NodeId> = self.graph.neighbors(id.index()).map(NodeId::from).collect();
        out.sort_unstable();
        Ok(out)
    }

    pub fn degree(&self, id: NodeId) -> Result<usize> {
        self.node(id)?;
        Ok(self.graph.edges(id.index()).count())
    }

    /// Reject a starting graph whose opinions or weights fall outside `[0, 1]`
    /// (NaN and infinities included).
    pub fn check_unit_interval(&self) -> Result<()> {
        for node in self.nodes() {
            let values = node.opinion.values();
            if let Some(&value) = values.iter().find(|v| !(0.0..=1.0).contains(*v)) {
                return Err(SimError::OpinionOutOfRange {
                    node: node.id,
                    value,
                });
            }
        }
        if let Some(edge) = self.edges().find(|e| !(0.0..=1.0).contains(&e.weight)) {
            return Err(SimError::WeightOutOfRange {
                u: edge.a,
                v: edge.b,
                weight: edge.weight,
            });
        }
        Ok(())
    }

    /// Uniformly random existing edge
    pub fn random_edge<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Edge> {
        if self.edge_count() == 0 {
            return None;
        }
        self.edge_at(EdgeIndex::new(rng.gen_range(0..self.edge_count())))
    }

    /// Two distinct nodes drawn uniformly without replacement
    pub fn random_pair<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<(NodeId, NodeId)> {
        if self.node_count() < 2 {
            return None;
        }
        let picked = rand::seq::index::sample(rng, self.node_count(), 2);
        Some((NodeId(picked.index(0)), NodeId(picked.index(1))))
    }
}
