//! Interaction controller.
//!
//! Owns the graph model, the inference engine and the render target, and
//! exposes one handler per user gesture. Observing or unobserving a node
//! re-runs inference and refreshes every node before anything is redrawn,
//! so a redraw never sees a half-updated graph.

use thiserror::Error;

use crate::graph::{GraphModel, Node, NodeUid};
use crate::inference::{InferenceEngine, InferenceError};
use crate::render::{NodeFrame, RenderTarget};

/// Whether a node is pinned to an observed value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ObservationState {
    #[default]
    Unobserved,
    Observed,
}

/// Errors from controller handlers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControllerError {
    /// Another observe/unobserve is still resampling.
    #[error("a resample is already in progress")]
    Busy,
    /// No node has this uid.
    #[error("unknown node `{0}`")]
    UnknownNode(NodeUid),
    /// The inference engine rejected a call.
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

/// Routes user gestures to the model, the inference engine and the renderer.
pub struct InteractionController<E, R> {
    model: GraphModel,
    engine: E,
    target: R,
    samples: usize,
    resampling: bool,
}

impl<E: InferenceEngine, R: RenderTarget> InteractionController<E, R> {
    pub(crate) fn new(model: GraphModel, engine: E, target: R, samples: usize) -> Self {
        Self {
            model,
            engine,
            target,
            samples,
            resampling: false,
        }
    }

    pub fn model(&self) -> &GraphModel {
        &self.model
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn target(&self) -> &R {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut R {
        &mut self.target
    }

    /// Samples drawn per resample.
    pub fn samples(&self) -> usize {
        self.samples
    }

    pub fn set_samples(&mut self, samples: usize) {
        self.samples = samples;
    }

    pub fn is_resampling(&self) -> bool {
        self.resampling
    }

    pub fn state_of(&self, uid: &NodeUid) -> Option<ObservationState> {
        self.model.node_by_uid(uid).map(|node| {
            if node.observed() {
                ObservationState::Observed
            } else {
                ObservationState::Unobserved
            }
        })
    }

    /// Take the pieces back out.
    pub fn into_parts(self) -> (GraphModel, E, R) {
        (self.model, self.engine, self.target)
    }

    // ========================================================================
    // Drawing
    // ========================================================================

    /// Draw every edge, then every node in model order.
    pub fn draw_all(&mut self) {
        for (index, edge) in self.model.edges().iter().enumerate() {
            if let Some(segment) = self.model.drawable_segment(edge) {
                self.target.draw_edge(index, edge, &segment);
            }
        }
        for node in self.model.nodes() {
            self.target.draw_node(node);
        }
    }

    fn node(&self, uid: &NodeUid) -> Result<&Node, ControllerError> {
        self.model
            .node_by_uid(uid)
            .ok_or_else(|| ControllerError::UnknownNode(uid.clone()))
    }

    // ========================================================================
    // Handlers
    // ========================================================================

    /// Pins a node to the value under pixel `px` of its x-axis and resamples.
    ///
    /// Returns the observed value. Observing an observed node re-pins it.
    pub fn observe_at(&mut self, uid: &NodeUid, px: f64) -> Result<f64, ControllerError> {
        if self.resampling {
            return Err(ControllerError::Busy);
        }
        let node = self.node(uid)?;
        let value = NodeFrame::for_node(node).x_scale(node.data()).invert(px);
        let id = node.id().to_string();

        self.transition(uid, true, |engine| engine.observe(&id, value))?;
        tracing::info!(node = %id, value, "observed");
        Ok(value)
    }

    /// Releases an observed node and resamples. No-op if it is not observed.
    pub fn unobserve(&mut self, uid: &NodeUid) -> Result<(), ControllerError> {
        if self.resampling {
            return Err(ControllerError::Busy);
        }
        let node = self.node(uid)?;
        if !node.observed() {
            return Ok(());
        }
        let id = node.id().to_string();

        self.transition(uid, false, |engine| engine.unobserve(&id))?;
        tracing::info!(node = %id, "unobserved");
        Ok(())
    }

    /// Moves a node's top-left corner and redraws it with its edges.
    pub fn drag_to(&mut self, uid: &NodeUid, x: f64, y: f64) -> Result<(), ControllerError> {
        self.model
            .node_by_uid_mut(uid)
            .ok_or_else(|| ControllerError::UnknownNode(uid.clone()))?
            .set_position(x, y);

        for (index, edge) in self.model.incident_edges(uid) {
            if let Some(segment) = self.model.drawable_segment(edge) {
                self.target.draw_edge(index, edge, &segment);
            }
        }
        if let Some(node) = self.model.node_by_uid(uid) {
            self.target.draw_node(node);
        }
        Ok(())
    }

    /// Brings a node to the front.
    pub fn raise(&mut self, uid: &NodeUid) -> Result<(), ControllerError> {
        self.node(uid)?;
        self.target.raise_node(uid);
        Ok(())
    }

    // ========================================================================
    // Resampling
    // ========================================================================

    fn transition(
        &mut self,
        uid: &NodeUid,
        observed: bool,
        call: impl FnOnce(&mut E) -> Result<(), InferenceError>,
    ) -> Result<(), ControllerError> {
        let previous = self.set_observed(uid, observed)?;

        self.resampling = true;
        let result = self.resample(uid, previous, call);
        self.resampling = false;
        result
    }

    fn resample(
        &mut self,
        uid: &NodeUid,
        previous: bool,
        call: impl FnOnce(&mut E) -> Result<(), InferenceError>,
    ) -> Result<(), ControllerError> {
        if let Err(err) = call(&mut self.engine) {
            tracing::warn!(node = %uid, "inference engine rejected evidence change: {}", err);
            self.set_observed(uid, previous)?;
            return Err(err.into());
        }

        if let Err(err) = self.engine.sample(self.samples) {
            tracing::warn!(samples = self.samples, "resampling failed: {}", err);
            if let Some(node) = self.model.node_by_uid(uid) {
                self.target.draw_node(node);
            }
            return Err(err.into());
        }

        self.refresh_means();
        for node in self.model.nodes() {
            self.target.draw_node(node);
        }
        Ok(())
    }

    /// Sets a node's observed flag, returning the old one.
    fn set_observed(&mut self, uid: &NodeUid, observed: bool) -> Result<bool, ControllerError> {
        let node = self
            .model
            .node_by_uid_mut(uid)
            .ok_or_else(|| ControllerError::UnknownNode(uid.clone()))?;
        let previous = node.observed();
        node.set_observed(observed);
        Ok(previous)
    }

    /// Copies every posterior mean into the model.
    fn refresh_means(&mut self) {
        for node in self.model.nodes_mut() {
            match self.engine.posterior(node.id()) {
                Some(posterior) => node.set_mean(posterior.avg),
                None => tracing::warn!(node = node.id(), "no posterior reported, keeping mean"),
            }
        }
    }
}
