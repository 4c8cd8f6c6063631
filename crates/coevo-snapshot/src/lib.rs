//! Shared snapshot types for the opinion co-evolution simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! Renderers and analysis tools depend on it to read graph state without
//! pulling in the engine.

pub mod snapshot;

#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;

pub use snapshot::{
    generate_snapshot_id, EdgeSnapshot, GraphSnapshot, NodeSnapshot, OpinionSnapshot,
};
