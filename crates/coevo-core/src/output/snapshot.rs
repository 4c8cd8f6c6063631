//! Snapshot Generation
//!
//! Converts the live graph into the renderer-facing snapshot types.

use coevo_snapshot::{EdgeSnapshot, GraphSnapshot, NodeSnapshot, OpinionSnapshot};
use std::io::Write;

use crate::components::{GraphState, NodeId, Opinion};
use crate::error::{Result, SimError};

/// Capture the graph at `step`. Edges are sorted by endpoint pair so the
/// output does not depend on internal edge order.
pub fn snapshot_graph(graph: &GraphState, step: u64) -> GraphSnapshot {
    let nodes = graph
        .nodes()
        .map(|n| NodeSnapshot {
            id: n.id.0,
            opinion: n.opinion.to_snapshot(),
        })
        .collect();

    let mut edges: Vec<EdgeSnapshot> = graph
        .edges()
        .map(|e| EdgeSnapshot {
            source: e.a.0,
            target: e.b.0,
            weight: e.weight,
        })
        .collect();
    edges.sort_by_key(|e| (e.source, e.target));

    GraphSnapshot::new(step, nodes, edges)
}

/// Rebuild a graph from a snapshot, e.g. one produced by an external
/// topology generator.
///
/// Node ids must be exactly `0..n` in order and edges must form a simple
/// graph. Values are loaded as-is; the engine rejects opinions or weights
/// outside `[0, 1]` when it takes ownership of the graph.
pub fn graph_from_snapshot(snapshot: &GraphSnapshot) -> Result<GraphState> {
    let mut graph = GraphState::new();
    for (position, node) in snapshot.nodes.iter().enumerate() {
        if node.id != position {
            return Err(SimError::SnapshotOrder {
                position,
                id: node.id,
            });
        }
        graph.add_node(match &node.opinion {
            OpinionSnapshot::Scalar(v) => Opinion::Scalar(*v),
            OpinionSnapshot::Topics(v) => Opinion::Topics(v.clone()),
        });
    }
    for edge in &snapshot.edges {
        graph.add_edge(NodeId(edge.source), NodeId(edge.target), edge.weight)?;
    }
    Ok(graph)
}

/// Write one snapshot as a JSON line
pub fn write_snapshot_line(out: &mut impl Write, snapshot: &GraphSnapshot) -> std::io::Result<()> {
    let json = snapshot.to_jsonl()?;
    writeln!(out, "{}", json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use coevo_snapshot::fixtures;

    #[test]
    fn test_snapshot_reflects_graph() {
        let mut graph = GraphState::with_opinions([0.1, 0.5, 0.9]);
        graph.add_edge(NodeId(2), NodeId(1), 0.3).unwrap();
        graph.add_edge(NodeId(0), NodeId(1), 0.6).unwrap();

        let snapshot = snapshot_graph(&graph, 42);
        assert_eq!(snapshot.step, 42);
        assert_eq!(snapshot.snapshot_id, "snap_00000042");
        assert_eq!(snapshot.node_count(), 3);
        assert_eq!(snapshot.opinion_of(2), Some(&OpinionSnapshot::Scalar(0.9)));
        assert_eq!(
            snapshot.edges.iter().map(|e| (e.source, e.target)).collect::<Vec<_>>(),
            vec![(0, 1), (1, 2)]
        );
        assert_eq!(snapshot.weight_between(2, 1), Some(0.3));
    }

    #[test]
    fn test_graph_from_snapshot_round_trips() {
        let snapshot = fixtures::sample_snapshot();
        let graph = graph_from_snapshot(&snapshot).unwrap();
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.weight(NodeId(2), NodeId(1)).unwrap(), 0.1);
        assert_eq!(graph.degree(NodeId(3)).unwrap(), 0);

        let again = snapshot_graph(&graph, snapshot.step);
        assert_eq!(again, snapshot);
    }

    #[test]
    fn test_graph_from_snapshot_rejects_bad_input() {
        let mut snapshot = fixtures::sample_snapshot();
        snapshot.edges.push(EdgeSnapshot { source: 2, target: 2, weight: 0.5 });
        assert!(matches!(
            graph_from_snapshot(&snapshot),
            Err(SimError::InvalidEdge { .. })
        ));

        let mut snapshot = fixtures::sample_topic_snapshot();
        snapshot.nodes.swap(0, 1);
        assert!(matches!(
            graph_from_snapshot(&snapshot),
            Err(SimError::SnapshotOrder { position: 0, id: 1 })
        ));
    }

    #[test]
    fn test_write_snapshot_line() {
        let graph = GraphState::with_opinions([vec![0.25, 0.75]]);
        let mut buf = Vec::new();
        write_snapshot_line(&mut buf, &snapshot_graph(&graph, 0)).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert!(text.ends_with('\n'));
        assert!(text.contains("[0.25,0.75]"));
    }
}
