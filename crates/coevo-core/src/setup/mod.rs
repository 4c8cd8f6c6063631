//! Graph Setup
//!
//! Starting topologies and initial opinion/weight assignment.

pub mod population;
pub mod topology;

pub use population::*;
pub use topology::*;
