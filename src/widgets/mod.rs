//! Widgets module
//!
//! Custom painting for the network canvas: node boxes with their density
//! plots, and the edges between them.

pub mod density_display;

pub use density_display::{paint_edge, paint_node, DensityStyle};
