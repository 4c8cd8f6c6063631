//! Graph Components
//!
//! Node opinions, weighted edges, and the graph that owns them.

pub mod graph;
pub mod opinion;

pub use graph::*;
pub use opinion::*;
