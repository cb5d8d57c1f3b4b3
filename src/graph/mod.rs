//! Graph module
//!
//! The visualization's graph model: node boxes with their density curves,
//! the edges between them, edge clipping geometry and structural validation.

pub mod density;
pub mod geometry;
pub mod model;
pub mod validation;

pub use density::{curve_domain, density_curve, effective_sigma, gaussian, DensityPoint};
pub use geometry::{clip_segment, ClipError, NodeBox, Outcode, Point, Segment};
pub use model::{Edge, GraphModel, Node, NodeUid, NODE_HEIGHT, NODE_WIDTH};
pub use validation::{validate_edge, GraphError};
