//! Update Rules
//!
//! Pure opinion-exchange and weight-adjustment equations for one interaction
//! between the two endpoints of an edge.
//!
//! Both variants read a single pre-update snapshot of `(o_i, o_j, w)`; the
//! order in which the two nodes are written back cannot change the result.

use crate::components::Opinion;
use crate::config::SimulationConfig;

/// Constants for the flexibility scaling
pub mod update_constants {
    /// Lowest flexibility factor (before `delta`) for opinions near 0 or 1
    pub const FLEXIBILITY_FLOOR: f64 = 0.05;
}

/// Flexibility factor for one topic: opinions near 0.5 move most, opinions at
/// the extremes still move at `FLEXIBILITY_FLOOR * delta`.
pub fn flexibility(opinion: f64, delta: f64) -> f64 {
    delta
        * opinion
            .min((opinion - 1.0).abs())
            .max(update_constants::FLEXIBILITY_FLOOR)
}

/// Scalar opinion rule. Never clamps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarUpdate {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

/// Result of a scalar interaction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarInteraction {
    pub opinion_i: f64,
    pub opinion_j: f64,
    pub weight: f64,
    pub delta_opinion: f64,
    pub delta_weight: f64,
}

impl ScalarUpdate {
    pub fn apply(&self, o_i: f64, o_j: f64, w: f64) -> ScalarInteraction {
        let diff = o_j - o_i;
        let delta_opinion = self.alpha * w * diff;
        let delta_weight = self.beta * w * (1.0 - w) * (1.0 - self.gamma * diff.abs());

        ScalarInteraction {
            opinion_i: o_i + delta_opinion,
            opinion_j: o_j - delta_opinion,
            weight: w + delta_weight,
            delta_opinion,
            delta_weight,
        }
    }
}

/// Per-topic rule with optional flexibility. Clamps into [0, 1] only when
/// `delta` is set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopicUpdate {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    pub delta: Option<f64>,
    pub n_topics: usize,
}

/// Result of a per-topic interaction
#[derive(Debug, Clone, PartialEq)]
pub struct TopicInteraction {
    pub opinion_i: Vec<f64>,
    pub opinion_j: Vec<f64>,
    pub weight: f64,
    pub delta_weight: f64,
}

impl TopicUpdate {
    /// Apply the rule. Both slices must hold `n_topics` values.
    pub fn apply(&self, o_i: &[f64], o_j: &[f64], w: f64) -> TopicInteraction {
        debug_assert_eq!(o_i.len(), o_j.len());

        let topics = o_i.len().max(1) as f64;
        let mean_disagreement =
            o_i.iter().zip(o_j).map(|(a, b)| (a - b).abs()).sum::<f64>() / topics;
        let delta_weight = self.beta * w * (1.0 - w) * (1.0 - self.gamma * mean_disagreement);

        let mut opinion_i = Vec::with_capacity(o_i.len());
        let mut opinion_j = Vec::with_capacity(o_j.len());
        for (&a, &b) in o_i.iter().zip(o_j) {
            let shift = self.alpha * w * (b - a);
            match self.delta {
                Some(delta) => {
                    let next_a = a + shift * flexibility(a, delta);
                    let next_b = b - shift * flexibility(b, delta);
                    opinion_i.push(next_a.clamp(0.0, 1.0));
                    opinion_j.push(next_b.clamp(0.0, 1.0));
                }
                None => {
                    opinion_i.push(a + shift);
                    opinion_j.push(b - shift);
                }
            }
        }

        let mut weight = w + delta_weight;
        if self.delta.is_some() {
            weight = weight.clamp(0.0, 1.0);
        }

        TopicInteraction {
            opinion_i,
            opinion_j,
            weight,
            delta_weight,
        }
    }
}

/// Post-interaction state for both endpoints and the edge
#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
    pub opinion_i: Opinion,
    pub opinion_j: Opinion,
    pub weight: f64,
}

/// The interaction rule an engine runs, chosen from its configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UpdateRule {
    Scalar(ScalarUpdate),
    Topics(TopicUpdate),
}

impl UpdateRule {
    /// Scalar rule for a single topic without flexibility, topic rule otherwise
    pub fn from_config(config: &SimulationConfig) -> Self {
        if config.uses_topic_rule() {
            UpdateRule::Topics(TopicUpdate {
                alpha: config.alpha,
                beta: config.beta,
                gamma: config.gamma,
                delta: config.delta,
                n_topics: config.n_topics,
            })
        } else {
            UpdateRule::Scalar(ScalarUpdate {
                alpha: config.alpha,
                beta: config.beta,
                gamma: config.gamma,
            })
        }
    }

    /// Whether an opinion has the shape this rule operates on
    pub fn accepts(&self, opinion: &Opinion) -> bool {
        match (self, opinion) {
            (UpdateRule::Scalar(_), Opinion::Scalar(_)) => true,
            (UpdateRule::Topics(rule), Opinion::Topics(values)) => values.len() == rule.n_topics,
            _ => false,
        }
    }

    pub fn expected_shape(&self) -> String {
        match self {
            UpdateRule::Scalar(_) => "scalar".to_string(),
            UpdateRule::Topics(rule) => format!("{} topics", rule.n_topics),
        }
    }

    /// Run one interaction. `None` if either opinion has the wrong shape.
    pub fn interact(&self, o_i: &Opinion, o_j: &Opinion, w: f64) -> Option<Interaction> {
        if !self.accepts(o_i) || !self.accepts(o_j) {
            return None;
        }

        match (self, o_i, o_j) {
            (UpdateRule::Scalar(rule), Opinion::Scalar(a), Opinion::Scalar(b)) => {
                let out = rule.apply(*a, *b, w);
                Some(Interaction {
                    opinion_i: Opinion::Scalar(out.opinion_i),
                    opinion_j: Opinion::Scalar(out.opinion_j),
                    weight: out.weight,
                })
            }
            (UpdateRule::Topics(rule), Opinion::Topics(a), Opinion::Topics(b)) => {
                let out = rule.apply(a, b, w);
                Some(Interaction {
                    opinion_i: Opinion::Topics(out.opinion_i),
                    opinion_j: Opinion::Topics(out.opinion_j),
                    weight: out.weight,
                })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    const EPS: f64 = 1e-9;

    fn scalar(alpha: f64, beta: f64, gamma: f64) -> ScalarUpdate {
        ScalarUpdate { alpha, beta, gamma }
    }

    #[test]
    fn test_reference_interaction() {
        let out = scalar(0.03, 0.3, 4.0).apply(0.3, 0.0, 0.25);
        assert!((out.delta_opinion - -0.00225).abs() < EPS);
        assert!((out.delta_weight - -0.01125).abs() < EPS);
        assert!((out.opinion_i - 0.29775).abs() < EPS);
        assert!((out.opinion_j - 0.00225).abs() < EPS);
        assert!((out.weight - 0.23875).abs() < EPS);
    }

    #[test]
    fn test_scalar_update_conserves_opinion_sum() {
        let rule = scalar(0.3, 0.5, 2.0);
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..1000 {
            let (a, b, w) = (rng.gen::<f64>(), rng.gen::<f64>(), rng.gen::<f64>());
            let out = rule.apply(a, b, w);
            assert!((out.opinion_i + out.opinion_j - (a + b)).abs() < EPS);
        }
    }

    #[test]
    fn test_agreement_gives_maximal_weight_gain() {
        let rule = scalar(0.1, 0.4, 3.0);
        let out = rule.apply(0.6, 0.6, 0.3);
        assert_eq!(out.delta_opinion, 0.0);
        assert!((out.delta_weight - 0.4 * 0.3 * 0.7).abs() < EPS);
    }

    #[test]
    fn test_weight_never_decreases_when_gamma_at_most_one() {
        let mut rng = SmallRng::seed_from_u64(2);
        for _ in 0..2000 {
            let rule = scalar(
                rng.gen_range(0.01..=0.5),
                rng.gen_range(0.01..0.99),
                rng.gen_range(0.01..=1.0),
            );
            let (a, b, w) = (rng.gen::<f64>(), rng.gen::<f64>(), rng.gen::<f64>());
            assert!(rule.apply(a, b, w).delta_weight >= 0.0);
        }
    }

    #[test]
    fn test_scalar_rule_does_not_clamp() {
        // strong disagreement sensitivity drives the weight below zero
        let out = scalar(0.5, 0.5, 10.0).apply(0.0, 1.0, 0.5);
        assert!((out.weight - -0.625).abs() < EPS);
    }

    #[test]
    fn test_topic_rule_clamps_only_with_delta() {
        let linear = TopicUpdate {
            alpha: 0.5,
            beta: 0.5,
            gamma: 10.0,
            delta: None,
            n_topics: 2,
        };
        let out = linear.apply(&[0.0, 1.0], &[1.0, 0.0], 0.5);
        assert!((out.delta_weight - -1.125).abs() < EPS);
        assert!((out.weight - -0.625).abs() < EPS);
        assert!((out.opinion_i[0] - 0.25).abs() < EPS);
        assert!((out.opinion_j[1] - 0.25).abs() < EPS);

        let flexible = TopicUpdate {
            delta: Some(1.0),
            ..linear
        };
        assert_eq!(flexible.apply(&[0.0, 1.0], &[1.0, 0.0], 0.5).weight, 0.0);
    }

    #[test]
    fn test_flexibility_factor() {
        assert!((flexibility(0.5, 2.0) - 1.0).abs() < EPS);
        assert!((flexibility(0.2, 1.0) - 0.2).abs() < EPS);
        assert!((flexibility(0.8, 1.0) - 0.2).abs() < EPS);
        assert!((flexibility(0.0, 3.0) - 0.15).abs() < EPS);
        assert!((flexibility(1.0, 3.0) - 0.15).abs() < EPS);
    }

    #[test]
    fn test_topic_rule_without_delta_matches_scalar_per_topic() {
        let topics = TopicUpdate {
            alpha: 0.03,
            beta: 0.3,
            gamma: 4.0,
            delta: None,
            n_topics: 2,
        };
        let out = topics.apply(&[0.3, 0.5], &[0.0, 0.5], 0.25);

        assert!((out.opinion_i[0] - 0.29775).abs() < EPS);
        assert!((out.opinion_j[0] - 0.00225).abs() < EPS);
        assert_eq!(out.opinion_i[1], 0.5);

        // mean disagreement is 0.15
        let expected_dw = 0.3 * 0.25 * 0.75 * (1.0 - 4.0 * 0.15);
        assert!((out.delta_weight - expected_dw).abs() < EPS);
        assert!((out.weight - (0.25 + expected_dw)).abs() < EPS);
    }

    #[test]
    fn test_topic_rule_with_delta_scales_and_clamps() {
        let rule = TopicUpdate {
            alpha: 0.5,
            beta: 0.9,
            gamma: 10.0,
            delta: Some(2.0),
            n_topics: 1,
        };
        let out = rule.apply(&[0.5], &[0.9], 0.4);

        // shift = 0.5 * 0.4 * 0.4 = 0.08
        // node i: flexibility(0.5, 2) = 1.0; node j: flexibility(0.9, 2) = 0.2
        assert!((out.opinion_i[0] - 0.58).abs() < EPS);
        assert!((out.opinion_j[0] - (0.9 - 0.08 * 0.2)).abs() < EPS);

        // disagreement 0.4 with gamma 10 drives the raw weight negative
        assert!(out.delta_weight < -0.4);
        assert_eq!(out.weight, 0.0);
    }

    #[test]
    fn test_topic_rule_with_delta_keeps_values_in_unit_interval() {
        let rule = TopicUpdate {
            alpha: 0.5,
            beta: 0.9,
            gamma: 0.1,
            delta: Some(25.0),
            n_topics: 3,
        };
        let mut rng = SmallRng::seed_from_u64(9);
        for _ in 0..500 {
            let a: Vec<f64> = (0..3).map(|_| rng.gen()).collect();
            let b: Vec<f64> = (0..3).map(|_| rng.gen()).collect();
            let out = rule.apply(&a, &b, rng.gen());
            for v in out.opinion_i.iter().chain(&out.opinion_j) {
                assert!((0.0..=1.0).contains(v));
            }
            assert!((0.0..=1.0).contains(&out.weight));
        }
    }

    #[test]
    fn test_rule_selection_and_shape_checks() {
        let scalar_rule = UpdateRule::from_config(&SimulationConfig::default());
        assert!(matches!(scalar_rule, UpdateRule::Scalar(_)));
        assert!(scalar_rule.accepts(&Opinion::Scalar(0.2)));
        assert!(!scalar_rule.accepts(&Opinion::Topics(vec![0.2])));

        let topic_rule = UpdateRule::from_config(&SimulationConfig::default().with_topics(3));
        assert!(matches!(topic_rule, UpdateRule::Topics(TopicUpdate { delta: None, .. })));
        assert!(topic_rule.accepts(&Opinion::Topics(vec![0.1, 0.2, 0.3])));
        assert!(!topic_rule.accepts(&Opinion::Topics(vec![0.1, 0.2])));
        assert_eq!(topic_rule.expected_shape(), "3 topics");

        let flexible = UpdateRule::from_config(&SimulationConfig::default().with_delta(1.0));
        assert!(matches!(flexible, UpdateRule::Topics(TopicUpdate { n_topics: 1, .. })));

        assert!(scalar_rule
            .interact(&Opinion::Scalar(0.1), &Opinion::Topics(vec![0.1]), 0.5)
            .is_none());
    }
}
