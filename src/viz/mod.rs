//! Visualization module
//!
//! Public entry points: build a [`VisualizationGraph`] from an inference
//! engine, then [`draw`] it to get an [`InteractionController`] that the
//! front end feeds user gestures into.

pub mod config;
pub mod controller;

use crate::graph::{GraphError, GraphModel, NodeUid};
use crate::inference::InferenceEngine;
use crate::layout::{apply_layout, LayoutEngine};
use crate::render::RenderTarget;

pub use config::{DrawConfig, DEFAULT_SAMPLES};
pub use controller::{ControllerError, InteractionController, ObservationState};

/// A graph model seeded from an inference engine, plus the engine itself.
pub struct VisualizationGraph<E> {
    model: GraphModel,
    engine: E,
}

impl<E: InferenceEngine> VisualizationGraph<E> {
    /// One node per engine variable at the origin, one edge per parent link.
    pub fn from_graph(engine: E) -> Result<Self, GraphError> {
        let snapshot = engine.nodes();
        let mut model = GraphModel::new();

        for node in &snapshot {
            model.add_node(node.avg, node.stdev, 0.0, 0.0, node.id.as_str(), node.name.as_str())?;
        }
        for node in &snapshot {
            let child = NodeUid::from_id(&node.id);
            for parent in &node.parents {
                model.add_edge(&NodeUid::from_id(parent), &child)?;
            }
        }

        tracing::debug!(
            nodes = model.node_count(),
            edges = model.edge_count(),
            "built visualization graph"
        );
        Ok(Self { model, engine })
    }

    pub fn model(&self) -> &GraphModel {
        &self.model
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
}

/// Lays out `graph`, draws its edges then its nodes onto `target`, and
/// hands everything to a controller.
pub fn draw<E, L, R>(
    config: &DrawConfig,
    graph: VisualizationGraph<E>,
    layout: &mut L,
    target: R,
) -> InteractionController<E, R>
where
    E: InferenceEngine,
    L: LayoutEngine,
    R: RenderTarget,
{
    let VisualizationGraph { mut model, engine } = graph;
    let report = apply_layout(&mut model, layout);
    tracing::info!(
        container = %config.container,
        nodes = report.positioned,
        edges = report.routed,
        "drawing graph"
    );

    let mut controller = InteractionController::new(model, engine, target, config.samples);
    controller.draw_all();
    controller
}
