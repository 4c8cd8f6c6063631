//! Output
//!
//! Snapshots for renderers and statistics for batch reports.

pub mod snapshot;
pub mod stats;

pub use snapshot::{graph_from_snapshot, snapshot_graph, write_snapshot_line};
pub use stats::{GraphStats, Moments, WEIGHT_HISTOGRAM_BINS};
