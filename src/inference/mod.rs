//! Inference module
//!
//! The interface the visualization uses to talk to a Bayesian inference
//! engine, plus a linear conditional Gaussian implementation of it.

pub mod lcg;

use thiserror::Error;

pub use lcg::{LcgNode, LinearGaussianNetwork};

/// Posterior summary of a single variable.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Posterior {
    /// Posterior mean.
    pub avg: f64,
    /// Posterior standard deviation.
    pub stdev: f64,
}

/// One variable of an inference graph, as needed to seed a visualization.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeSnapshot {
    /// Engine identifier.
    pub id: String,
    /// Display label.
    pub name: String,
    /// Current posterior mean.
    pub avg: f64,
    /// Current posterior standard deviation.
    pub stdev: f64,
    /// Identifiers of the parent variables.
    pub parents: Vec<String>,
}

/// Errors reported by an inference engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    /// No variable has this id.
    #[error("unknown variable `{0}`")]
    UnknownNode(String),
    /// A variable with this id already exists.
    #[error("variable `{0}` already exists")]
    DuplicateNode(String),
    /// Adding the parent link would make the graph cyclic.
    #[error("linking `{parent}` -> `{child}` would create a cycle")]
    Cycle { parent: String, child: String },
    /// Sampling was requested with no samples.
    #[error("sample count must be positive")]
    InvalidSampleCount,
    /// Every sample received zero weight given the evidence.
    #[error("all samples were rejected by the evidence")]
    DegenerateWeights,
}

/// A Bayesian inference engine over continuous variables.
///
/// Observations take effect on the next call to [`InferenceEngine::sample`];
/// posteriors reported before then are the ones from the previous run.
pub trait InferenceEngine {
    /// All variables, in the engine's order.
    fn nodes(&self) -> Vec<NodeSnapshot>;

    /// Current posterior of a variable.
    fn posterior(&self, id: &str) -> Option<Posterior>;

    /// Pin a variable to a value.
    fn observe(&mut self, id: &str, value: f64) -> Result<(), InferenceError>;

    /// Remove the observation on a variable.
    fn unobserve(&mut self, id: &str) -> Result<(), InferenceError>;

    /// Run inference with `samples` samples, updating every posterior.
    fn sample(&mut self, samples: usize) -> Result<(), InferenceError>;
}
