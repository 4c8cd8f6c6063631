//! Simulation Engine
//!
//! Owns the graph, the model coefficients and the random source, and
//! advances the co-evolution one step at a time.
//!
//! Each step either tries to add a tie (with probability `p_new`) or runs one
//! interaction on a uniformly sampled edge, pruning it if the weight decays
//! below the removal threshold. A step applies exactly one of these.

use coevo_snapshot::GraphSnapshot;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::components::{Edge, GraphState, NodeId};
use crate::config::SimulationConfig;
use crate::error::{Result, SimError};
use crate::output::{snapshot_graph, GraphStats};
use crate::systems::{prune_if_weak, try_create_edge, EdgeCreation, UpdateRule};

/// What a single interaction did to its edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InteractionOutcome {
    pub a: NodeId,
    pub b: NodeId,
    pub weight_before: f64,
    pub weight_after: f64,
    pub pruned: bool,
}

/// Result of one call to [`SimulationEngine::step`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepOutcome {
    EdgeCreated { a: NodeId, b: NodeId, weight: f64 },
    EdgeCreationSkipped { attempts: u32 },
    Interaction(InteractionOutcome),
}

/// Counts of step outcomes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub steps: u64,
    pub interactions: u64,
    pub edges_created: u64,
    pub creations_skipped: u64,
    pub edges_pruned: u64,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &StepOutcome) {
        self.steps += 1;
        match outcome {
            StepOutcome::EdgeCreated { .. } => self.edges_created += 1,
            StepOutcome::EdgeCreationSkipped { .. } => self.creations_skipped += 1,
            StepOutcome::Interaction(interaction) => {
                self.interactions += 1;
                if interaction.pruned {
                    self.edges_pruned += 1;
                }
            }
        }
    }
}

#[derive(Debug)]
pub struct SimulationEngine<R = SmallRng> {
    graph: GraphState,
    config: SimulationConfig,
    rule: UpdateRule,
    rng: R,
    step_count: u64,
    totals: RunSummary,
}

impl SimulationEngine<SmallRng> {
    /// Engine driven by a `SmallRng` seeded from `seed`
    pub fn seeded(graph: GraphState, config: SimulationConfig, seed: u64) -> Result<Self> {
        Self::new(graph, config, SmallRng::seed_from_u64(seed))
    }
}

impl<R: Rng> SimulationEngine<R> {
    /// Validate the configuration and the starting graph.
    ///
    /// Every node's opinion must fit the selected update rule, and every
    /// opinion value and edge weight must lie in `[0, 1]`. The graph should be
    /// connected-ish: isolated nodes only join in once edge creation reaches
    /// them. Nothing is re-checked while stepping, since the unclamped rules
    /// may legitimately leave the unit interval.
    pub fn new(graph: GraphState, config: SimulationConfig, rng: R) -> Result<Self> {
        config.validate()?;
        let rule = UpdateRule::from_config(&config);

        if let Some(node) = graph.nodes().find(|n| !rule.accepts(&n.opinion)) {
            return Err(SimError::OpinionShape {
                node: node.id,
                expected: rule.expected_shape(),
                found: node.opinion.shape(),
            });
        }
        graph.check_unit_interval()?;

        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            rule = %rule.expected_shape(),
            "engine initialized"
        );

        Ok(Self {
            graph,
            config,
            rule,
            rng,
            step_count: 0,
            totals: RunSummary::default(),
        })
    }

    pub fn graph(&self) -> &GraphState {
        &self.graph
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn rule(&self) -> &UpdateRule {
        &self.rule
    }

    /// Number of completed steps
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Outcome counts since the engine was created
    pub fn totals(&self) -> &RunSummary {
        &self.totals
    }

    pub fn into_graph(self) -> GraphState {
        self.graph
    }

    /// Advance the simulation by one step.
    ///
    /// Fails with [`SimError::EmptyGraph`] if an interaction is drawn while the
    /// graph has no edges; the engine is unchanged in that case.
    pub fn step(&mut self) -> Result<StepOutcome> {
        let r: f64 = self.rng.gen();

        let outcome = if r < self.config.p_new {
            match try_create_edge(
                &mut self.graph,
                &mut self.rng,
                self.config.edge_attempt_limit(),
                &self.config.new_edge_weight,
            )? {
                EdgeCreation::Created { a, b, weight, .. } => {
                    StepOutcome::EdgeCreated { a, b, weight }
                }
                EdgeCreation::Skipped { attempts } => {
                    StepOutcome::EdgeCreationSkipped { attempts }
                }
            }
        } else {
            let edge = self
                .graph
                .random_edge(&mut self.rng)
                .ok_or(SimError::EmptyGraph)?;
            StepOutcome::Interaction(self.apply_interaction(edge)?)
        };

        self.step_count += 1;
        self.totals.record(&outcome);
        Ok(outcome)
    }

    /// Run `steps` steps, stopping at the first error
    pub fn run(&mut self, steps: u64) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        for _ in 0..steps {
            let outcome = self.step()?;
            summary.record(&outcome);
        }
        tracing::debug!(
            step = self.step_count,
            interactions = summary.interactions,
            created = summary.edges_created,
            pruned = summary.edges_pruned,
            "batch finished"
        );
        Ok(summary)
    }

    /// Apply the update rule to the existing edge `(u, v)` without drawing
    /// randomness or advancing the step counter.
    pub fn interact(&mut self, u: NodeId, v: NodeId) -> Result<InteractionOutcome> {
        let edge = self.graph.edge(u, v)?;
        self.apply_interaction(edge)
    }

    fn apply_interaction(&mut self, edge: Edge) -> Result<InteractionOutcome> {
        let o_i = self.graph.opinion(edge.a)?;
        let o_j = self.graph.opinion(edge.b)?;

        let Some(next) = self.rule.interact(o_i, o_j, edge.weight) else {
            let (node, found) = if self.rule.accepts(o_i) {
                (edge.b, o_j.shape())
            } else {
                (edge.a, o_i.shape())
            };
            return Err(SimError::OpinionShape {
                node,
                expected: self.rule.expected_shape(),
                found,
            });
        };

        self.graph.set_opinion(edge.a, next.opinion_i)?;
        self.graph.set_opinion(edge.b, next.opinion_j)?;
        self.graph.set_weight(edge.a, edge.b, next.weight)?;
        let pruned = prune_if_weak(
            &mut self.graph,
            edge.a,
            edge.b,
            self.config.removal_threshold,
        )?;

        Ok(InteractionOutcome {
            a: edge.a,
            b: edge.b,
            weight_before: edge.weight,
            weight_after: next.weight,
            pruned,
        })
    }

    /// Read-only view for a renderer
    pub fn snapshot(&self) -> GraphSnapshot {
        snapshot_graph(&self.graph, self.step_count)
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats::collect(&self.graph, self.step_count)
    }
}
