//! Configuration System
//!
//! Model coefficients and driver settings, loadable from a TOML file so runs
//! can be tuned without recompiling.
//!
//! ```toml
//! [model]
//! alpha = 0.03
//! beta = 0.3
//! gamma = 4.0
//! n_topics = 3
//! delta = 2.0
//!
//! [topology]
//! nodes = 100
//! neighbors = 4
//! rewire_probability = 0.1
//!
//! [run]
//! seed = 42
//! steps = 20000
//! batch = 2000
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::setup::check_lattice;

/// Default config file path
pub const DEFAULT_CONFIG_PATH: &str = "coevo.toml";

/// Retry limit for new-edge search in the topic variant
pub const DEFAULT_TOPIC_EDGE_ATTEMPTS: u32 = 50;

/// Top-level configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: SimulationConfig,
    #[serde(default)]
    pub topology: TopologyConfig,
    #[serde(default)]
    pub run: RunConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string and validate it
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default path, or use defaults if not found
    pub fn load_or_default() -> Self {
        Self::load(DEFAULT_CONFIG_PATH).unwrap_or_else(|e| {
            tracing::warn!("Could not load {}: {}. Using defaults.", DEFAULT_CONFIG_PATH, e);
            Self::default()
        })
    }

    /// Render as pretty TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.model.validate()?;
        self.topology.validate()
    }
}

/// How a fresh edge weight is drawn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WeightInit {
    /// Always the same value
    Fixed { value: f64 },
    /// Uniform in `[low, high]`
    Uniform { low: f64, high: f64 },
}

impl Default for WeightInit {
    fn default() -> Self {
        WeightInit::Fixed { value: 0.5 }
    }
}

impl WeightInit {
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            WeightInit::Fixed { value } => value,
            WeightInit::Uniform { low, high } if low == high => low,
            WeightInit::Uniform { low, high } => rng.gen_range(low..=high),
        }
    }

    fn validate(&self, field: &str) -> Result<(), ConfigError> {
        match *self {
            WeightInit::Fixed { value } => check_unit(field, value),
            WeightInit::Uniform { low, high } => {
                check_unit(field, low)?;
                check_unit(field, high)?;
                if low > high {
                    return Err(ConfigError::Invalid(format!(
                        "{field}: low ({low}) must not exceed high ({high})"
                    )));
                }
                Ok(())
            }
        }
    }
}

/// Retry policy for the new-edge search.
///
/// In TOML: `max_edge_attempts = "unbounded"` or
/// `max_edge_attempts = { limit = 20 }`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeAttempts {
    /// 50 attempts for the topic rule, unbounded for the scalar rule
    #[default]
    VariantDefault,
    /// Keep drawing until a free pair turns up
    Unbounded,
    /// Give up after this many draws (must be positive)
    Limit(u32),
}

/// Model coefficients. Immutable once an engine owns them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Opinion adjustment rate, in (0, 0.5]
    pub alpha: f64,
    /// Weight adjustment rate, in (0, 1)
    pub beta: f64,
    /// Disagreement sensitivity, > 0
    pub gamma: f64,
    /// Flexibility scaling; absent means a linear opinion update
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<f64>,
    /// Number of opinion topics per node, >= 1
    pub n_topics: usize,
    /// Probability that a step tries to create an edge instead of interacting
    pub p_new: f64,
    /// Edges whose weight drops strictly below this are pruned
    pub removal_threshold: f64,
    /// How many candidate pairs a creation step may draw before giving up
    pub max_edge_attempts: EdgeAttempts,
    /// Weight given to edges created during the run
    pub new_edge_weight: WeightInit,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            alpha: 0.03,
            beta: 0.3,
            gamma: 4.0,
            delta: None,
            n_topics: 1,
            p_new: 0.01,
            removal_threshold: 0.05,
            max_edge_attempts: EdgeAttempts::VariantDefault,
            new_edge_weight: WeightInit::default(),
        }
    }
}

impl SimulationConfig {
    /// Scalar-opinion model with the given rates and default topology policy
    pub fn new(alpha: f64, beta: f64, gamma: f64) -> Self {
        Self {
            alpha,
            beta,
            gamma,
            ..Self::default()
        }
    }

    pub fn with_topics(mut self, n_topics: usize) -> Self {
        self.n_topics = n_topics;
        self
    }

    pub fn with_delta(mut self, delta: f64) -> Self {
        self.delta = Some(delta);
        self
    }

    pub fn with_p_new(mut self, p_new: f64) -> Self {
        self.p_new = p_new;
        self
    }

    pub fn with_removal_threshold(mut self, threshold: f64) -> Self {
        self.removal_threshold = threshold;
        self
    }

    pub fn with_max_edge_attempts(mut self, attempts: EdgeAttempts) -> Self {
        self.max_edge_attempts = attempts;
        self
    }

    pub fn with_new_edge_weight(mut self, init: WeightInit) -> Self {
        self.new_edge_weight = init;
        self
    }

    /// Whether the per-topic rule applies (more than one topic, or flexibility set)
    pub fn uses_topic_rule(&self) -> bool {
        self.n_topics > 1 || self.delta.is_some()
    }

    /// Effective retry limit for new-edge search; `None` means unbounded
    pub fn edge_attempt_limit(&self) -> Option<u32> {
        match self.max_edge_attempts {
            EdgeAttempts::Limit(n) => Some(n),
            EdgeAttempts::Unbounded => None,
            EdgeAttempts::VariantDefault if self.uses_topic_rule() => {
                Some(DEFAULT_TOPIC_EDGE_ATTEMPTS)
            }
            EdgeAttempts::VariantDefault => None,
        }
    }

    /// Range-check every coefficient
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.alpha > 0.0 && self.alpha <= 0.5) {
            return Err(ConfigError::Invalid(format!(
                "alpha must be in (0, 0.5], got {}",
                self.alpha
            )));
        }
        if !(self.beta > 0.0 && self.beta < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "beta must be in (0, 1), got {}",
                self.beta
            )));
        }
        if !(self.gamma > 0.0 && self.gamma.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "gamma must be positive, got {}",
                self.gamma
            )));
        }
        if let Some(delta) = self.delta {
            if !(delta > 0.0 && delta.is_finite()) {
                return Err(ConfigError::Invalid(format!(
                    "delta must be positive, got {}",
                    delta
                )));
            }
        }
        if self.n_topics < 1 {
            return Err(ConfigError::Invalid("n_topics must be at least 1".into()));
        }
        check_unit("p_new", self.p_new)?;
        if self.max_edge_attempts == EdgeAttempts::Limit(0) {
            return Err(ConfigError::Invalid(
                "max_edge_attempts limit must be positive; use \"unbounded\" for no limit".into(),
            ));
        }
        if !(self.removal_threshold >= 0.0 && self.removal_threshold < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "removal_threshold must be in [0, 1), got {}",
                self.removal_threshold
            )));
        }
        self.new_edge_weight.validate("new_edge_weight")
    }
}

/// Parameters for the driver-side initial graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopologyConfig {
    pub nodes: usize,
    /// Ring-lattice degree before rewiring (even)
    pub neighbors: usize,
    pub rewire_probability: f64,
    pub initial_weight: WeightInit,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            nodes: 100,
            neighbors: 4,
            rewire_probability: 0.1,
            initial_weight: WeightInit::default(),
        }
    }
}

impl TopologyConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_lattice(self.nodes, self.neighbors)?;
        check_unit("topology.rewire_probability", self.rewire_probability)?;
        self.initial_weight.validate("topology.initial_weight")
    }
}

/// Batch driver cadence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub seed: u64,
    pub steps: u64,
    /// Steps between snapshots
    pub batch: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            steps: 20_000,
            batch: 2_000,
        }
    }
}

fn check_unit(field: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{field} must be in [0, 1], got {value}"
        )))
    }
}

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
