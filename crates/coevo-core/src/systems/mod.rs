//! Simulation Systems
//!
//! The interaction rule and the topology policy (edge creation, pruning).

pub mod edges;
pub mod update;

pub use edges::{prune_if_weak, should_prune, try_create_edge, EdgeCreation};
pub use update::{
    flexibility, Interaction, ScalarInteraction, ScalarUpdate, TopicInteraction, TopicUpdate,
    UpdateRule,
};
