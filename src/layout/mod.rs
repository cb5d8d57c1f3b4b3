//! Layout module
//!
//! Translates the graph model into the request format of a layout engine,
//! runs the engine once, and merges the resulting positions and edge routes
//! back into the model. Entries the engine leaves out are skipped.

pub mod layered;

use std::collections::HashMap;

use crate::graph::{GraphModel, Point};

pub use layered::LayeredLayout;

/// A node as seen by the layout engine.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutNode {
    pub id: String,
    pub width: f64,
    pub height: f64,
}

/// Key of a directed edge: `(parent id, child id)`.
pub type EdgeKey = (String, String);

/// Everything a layout engine needs to place the graph.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayoutRequest {
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<EdgeKey>,
}

/// Placement computed by a layout engine.
///
/// Positions are top-left corners in layout units.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayoutResponse {
    pub positions: HashMap<String, Point>,
    pub routes: HashMap<EdgeKey, Vec<Point>>,
}

/// A graph layout algorithm.
pub trait LayoutEngine {
    fn layout(&mut self, request: &LayoutRequest) -> LayoutResponse;
}

/// Counts of what a layout pass applied and skipped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayoutReport {
    pub positioned: usize,
    pub routed: usize,
    pub skipped_nodes: usize,
    pub skipped_edges: usize,
}

/// Builds the layout request for a model.
pub fn layout_request(model: &GraphModel) -> LayoutRequest {
    let nodes = model
        .nodes()
        .iter()
        .map(|node| LayoutNode {
            id: node.id().to_string(),
            width: node.width(),
            height: node.height(),
        })
        .collect();

    let edges = edge_keys(model).into_iter().flatten().collect();

    LayoutRequest { nodes, edges }
}

/// Id keys of every edge, aligned with `model.edges()`.
fn edge_keys(model: &GraphModel) -> Vec<Option<EdgeKey>> {
    model
        .edges()
        .iter()
        .map(|edge| {
            let parent = model.node_by_uid(&edge.parent_uid)?;
            let child = model.node_by_uid(&edge.child_uid)?;
            Some((parent.id().to_string(), child.id().to_string()))
        })
        .collect()
}

/// Lays out `model` with `engine` and copies the result back.
pub fn apply_layout(model: &mut GraphModel, engine: &mut impl LayoutEngine) -> LayoutReport {
    let request = layout_request(model);
    let keys = edge_keys(model);
    let response = engine.layout(&request);
    let mut report = LayoutReport::default();

    for node in model.nodes_mut() {
        match response.positions.get(node.id()) {
            Some(position) => {
                node.set_position(position.x, position.y);
                report.positioned += 1;
            }
            None => report.skipped_nodes += 1,
        }
    }

    for (edge, key) in model.edges_mut().zip(&keys) {
        match key.as_ref().and_then(|key| response.routes.get(key)) {
            Some(points) => {
                edge.points = Some(points.clone());
                report.routed += 1;
            }
            None => report.skipped_edges += 1,
        }
    }

    if report.skipped_nodes > 0 || report.skipped_edges > 0 {
        tracing::debug!(
            skipped_nodes = report.skipped_nodes,
            skipped_edges = report.skipped_edges,
            "layout engine left entries unplaced"
        );
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeUid;

    /// Places only the nodes and edges it was told to.
    struct FixedLayout {
        response: LayoutResponse,
        requests: Vec<LayoutRequest>,
    }

    impl LayoutEngine for FixedLayout {
        fn layout(&mut self, request: &LayoutRequest) -> LayoutResponse {
            self.requests.push(request.clone());
            self.response.clone()
        }
    }

    fn model() -> GraphModel {
        let mut model = GraphModel::new();
        model.add_node(0.0, 1.0, 5.0, 5.0, "a", "A").unwrap();
        model.add_node(0.0, 1.0, 5.0, 5.0, "b", "B").unwrap();
        model
            .add_edge(&NodeUid::from_id("a"), &NodeUid::from_id("b"))
            .unwrap();
        model
    }

    #[test]
    fn test_request_keys_by_id() {
        let request = layout_request(&model());
        assert_eq!(request.nodes.len(), 2);
        assert_eq!(request.nodes[0].id, "a");
        assert_eq!(request.nodes[0].width, crate::graph::NODE_WIDTH);
        assert_eq!(request.edges, vec![("a".to_string(), "b".to_string())]);
    }

    #[test]
    fn test_apply_copies_positions_and_routes() {
        let mut model = model();
        let mut response = LayoutResponse::default();
        response.positions.insert("a".to_string(), Point::new(10.0, 20.0));
        response.positions.insert("b".to_string(), Point::new(30.0, 40.0));
        response.routes.insert(
            ("a".to_string(), "b".to_string()),
            vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0)],
        );
        let mut engine = FixedLayout {
            response,
            requests: Vec::new(),
        };

        let report = apply_layout(&mut model, &mut engine);

        assert_eq!(engine.requests.len(), 1);
        assert_eq!(report.positioned, 2);
        assert_eq!(report.routed, 1);
        let b = model.node_by_id("b").unwrap();
        assert_eq!((b.x(), b.y()), (30.0, 40.0));
        assert_eq!(model.edges()[0].points.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn test_missing_entries_are_skipped() {
        let mut model = model();
        let mut response = LayoutResponse::default();
        response.positions.insert("a".to_string(), Point::new(10.0, 20.0));
        let mut engine = FixedLayout {
            response,
            requests: Vec::new(),
        };

        let report = apply_layout(&mut model, &mut engine);

        assert_eq!(report.skipped_nodes, 1);
        assert_eq!(report.skipped_edges, 1);
        let b = model.node_by_id("b").unwrap();
        assert_eq!((b.x(), b.y()), (5.0, 5.0));
        assert!(model.edges()[0].points.is_none());
    }
}
