//! Opinion / Tie-Strength Co-evolution Engine
//!
//! Nodes hold opinions, weighted edges hold relationship strength, and each
//! step either grows a new tie or lets the two ends of a random tie interact:
//! opinions converge in proportion to the weight, and the weight grows or
//! decays with how much the two agree. Ties that decay below a threshold are
//! pruned.
//!
//! ```text
//! engine.step() ─┬─ r < p_new ──▶ try_create_edge ──▶ GraphState::add_edge
//!                └─ otherwise ──▶ random edge ──▶ UpdateRule ──▶ write back ──▶ prune
//! ```
//!
//! # Input assumptions
//!
//! A starting graph is simple (no self-loops, no parallel edges), ideally
//! connected-ish, with every opinion value and edge weight in `[0, 1]`.
//! [`SimulationEngine::new`] rejects out-of-range values; see
//! [`GraphState::check_unit_interval`].
//!
//! # Modules
//!
//! - [`components`]: nodes, opinions, edges and the mutable graph
//! - [`systems`]: update rules and the edge creation/pruning policy
//! - [`engine`]: the stepping engine
//! - [`setup`]: starting topologies and population
//! - [`output`]: renderer snapshots and statistics
//! - [`config`]: model coefficients and TOML loading

pub mod components;
pub mod config;
pub mod engine;
pub mod error;
pub mod output;
pub mod setup;
pub mod systems;

pub use components::{Edge, GraphState, Node, NodeId, Opinion};
pub use config::{
    Config, ConfigError, EdgeAttempts, RunConfig, SimulationConfig, TopologyConfig,
    WeightInit,
};
pub use engine::{InteractionOutcome, RunSummary, SimulationEngine, StepOutcome};
pub use error::{Result, SimError};
pub use output::{graph_from_snapshot, snapshot_graph, GraphStats};
pub use systems::UpdateRule;
