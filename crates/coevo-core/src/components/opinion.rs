//! Opinion Component
//!
//! A node's stance: a single value in [0, 1], or one value per topic.

use coevo_snapshot::OpinionSnapshot;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Opinion {
    Scalar(f64),
    Topics(Vec<f64>),
}

impl Opinion {
    /// Opinion values as a slice (a scalar is a one-element slice)
    pub fn values(&self) -> &[f64] {
        match self {
            Opinion::Scalar(v) => std::slice::from_ref(v),
            Opinion::Topics(v) => v,
        }
    }

    pub fn topic_count(&self) -> usize {
        self.values().len()
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Opinion::Scalar(_))
    }

    /// Short description of the shape, used in error messages
    pub fn shape(&self) -> String {
        match self {
            Opinion::Scalar(_) => "scalar".to_string(),
            Opinion::Topics(v) => format!("{} topics", v.len()),
        }
    }

    pub fn to_snapshot(&self) -> OpinionSnapshot {
        match self {
            Opinion::Scalar(v) => OpinionSnapshot::Scalar(*v),
            Opinion::Topics(v) => OpinionSnapshot::Topics(v.clone()),
        }
    }
}

impl From<f64> for Opinion {
    fn from(value: f64) -> Self {
        Opinion::Scalar(value)
    }
}

impl From<Vec<f64>> for Opinion {
    fn from(values: Vec<f64>) -> Self {
        Opinion::Topics(values)
    }
}
