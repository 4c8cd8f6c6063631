//! Statistics Output
//!
//! Summary measures of the graph for batch reports and analysis.

use serde::Serialize;

use crate::components::GraphState;

/// Number of equal-width bins in the weight histogram
pub const WEIGHT_HISTOGRAM_BINS: usize = 10;

/// Mean and population standard deviation
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Moments {
    pub mean: f64,
    pub std_dev: f64,
}

impl Moments {
    pub fn of(values: impl IntoIterator<Item = f64>) -> Self {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut sum_sq = 0.0;
        for v in values {
            count += 1;
            sum += v;
            sum_sq += v * v;
        }
        if count == 0 {
            return Self::default();
        }
        let mean = sum / count as f64;
        let variance = (sum_sq / count as f64 - mean * mean).max(0.0);
        Self {
            mean,
            std_dev: variance.sqrt(),
        }
    }
}

/// Graph statistics at one step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphStats {
    pub step: u64,
    pub node_count: usize,
    pub edge_count: usize,
    /// Edge count over the complete-graph edge count
    pub density: f64,
    pub mean_degree: f64,
    pub isolated_nodes: usize,
    pub weight: Moments,
    /// One entry per topic
    pub opinion: Vec<Moments>,
    /// Counts of weights in [0, 0.1), [0.1, 0.2), ... [0.9, 1.0]; values
    /// outside [0, 1] fall into the end bins
    pub weight_histogram: [usize; WEIGHT_HISTOGRAM_BINS],
}

impl GraphStats {
    pub fn collect(graph: &GraphState, step: u64) -> Self {
        let node_count = graph.node_count();
        let edge_count = graph.edge_count();

        let mut degrees = vec![0usize; node_count];
        let mut weight_histogram = [0usize; WEIGHT_HISTOGRAM_BINS];
        for edge in graph.edges() {
            degrees[edge.a.0] += 1;
            degrees[edge.b.0] += 1;
            weight_histogram[histogram_bin(edge.weight)] += 1;
        }

        let topics = graph
            .nodes()
            .next()
            .map(|n| n.opinion.topic_count())
            .unwrap_or(0);
        let opinion = (0..topics)
            .map(|t| {
                Moments::of(
                    graph
                        .nodes()
                        .filter_map(|n| n.opinion.values().get(t).copied()),
                )
            })
            .collect();

        let max_edges = graph.max_edge_count();

        Self {
            step,
            node_count,
            edge_count,
            density: if max_edges == 0 {
                0.0
            } else {
                edge_count as f64 / max_edges as f64
            },
            mean_degree: if node_count == 0 {
                0.0
            } else {
                2.0 * edge_count as f64 / node_count as f64
            },
            isolated_nodes: degrees.iter().filter(|&&d| d == 0).count(),
            weight: Moments::of(graph.edges().map(|e| e.weight)),
            opinion,
            weight_histogram,
        }
    }
}

fn histogram_bin(weight: f64) -> usize {
    let bin = (weight * WEIGHT_HISTOGRAM_BINS as f64).floor();
    if bin.is_nan() || bin < 0.0 {
        0
    } else {
        (bin as usize).min(WEIGHT_HISTOGRAM_BINS - 1)
    }
}
