//! LCG Viz Library
//!
//! Interactive visualization of Gaussian Bayesian networks: a graph model
//! with density curves, edge geometry, layout, rendering and the
//! observe/unobserve interaction protocol, plus a linear conditional
//! Gaussian inference engine and an egui front end.

pub mod app;
pub mod graph;
pub mod inference;
pub mod layout;
pub mod persistence;
pub mod render;
pub mod viz;
pub mod widgets;

pub use graph::{GraphModel, Node, NodeUid};
pub use inference::{InferenceEngine, LinearGaussianNetwork};
pub use viz::{draw, DrawConfig, InteractionController, VisualizationGraph};
