//! Structural validation for the visualization graph.
//!
//! Edges are checked when they are added so that every edge endpoint
//! resolves to a node for the lifetime of the model.

use thiserror::Error;

use super::geometry::ClipError;
use super::model::{GraphModel, NodeUid};

/// Errors raised while building or querying the graph model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// A node with this inference id already exists.
    #[error("duplicate node id `{0}`")]
    DuplicateNode(String),
    /// No node has this uid.
    #[error("unknown node `{0}`")]
    UnknownNode(NodeUid),
    /// An edge from a node to itself.
    #[error("cannot connect node `{0}` to itself")]
    SelfConnection(NodeUid),
    /// The same parent/child pair was added twice.
    #[error("edge `{parent}` -> `{child}` already exists")]
    DuplicateEdge { parent: NodeUid, child: NodeUid },
    /// The edge segment between two nodes could not be clipped.
    #[error(transparent)]
    Clip(#[from] ClipError),
}

/// Checks that an edge `parent -> child` may be added to `model`.
///
/// # Rules
///
/// | Check            | Error                        |
/// |------------------|------------------------------|
/// | parent exists    | [`GraphError::UnknownNode`]  |
/// | child exists     | [`GraphError::UnknownNode`]  |
/// | parent != child  | [`GraphError::SelfConnection`] |
/// | not a duplicate  | [`GraphError::DuplicateEdge`] |
pub fn validate_edge(model: &GraphModel, parent: &NodeUid, child: &NodeUid) -> Result<(), GraphError> {
    for uid in [parent, child] {
        if model.node_by_uid(uid).is_none() {
            return Err(GraphError::UnknownNode(uid.clone()));
        }
    }

    if parent == child {
        return Err(GraphError::SelfConnection(parent.clone()));
    }

    let duplicate = model
        .edges()
        .iter()
        .any(|edge| &edge.parent_uid == parent && &edge.child_uid == child);
    if duplicate {
        return Err(GraphError::DuplicateEdge {
            parent: parent.clone(),
            child: child.clone(),
        });
    }

    Ok(())
}
