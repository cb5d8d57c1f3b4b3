//! Application module
//!
//! Contains the main egui application and theme definitions.

pub mod theme;
pub mod viz_app;

pub use viz_app::{open_network, AppController, VizApp};
