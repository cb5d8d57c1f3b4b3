//! Render module
//!
//! The drawing interface the controller redraws through, the plot-area
//! geometry shared by drawing and hit-testing, and [`Scene`], a retained
//! display list that the egui front end paints every frame.

pub mod scale;

use std::collections::HashMap;

use crate::graph::{curve_domain, DensityPoint, Edge, Node, NodeBox, NodeUid, Point, Segment};

pub use scale::LinearScale;

/// A surface that nodes and edges are drawn onto.
///
/// Each call replaces whatever was previously drawn for that node or edge.
pub trait RenderTarget {
    /// Draw (or redraw) a node box with its density curve.
    fn draw_node(&mut self, node: &Node);

    /// Draw (or redraw) the edge at `index` along `segment`.
    fn draw_edge(&mut self, index: usize, edge: &Edge, segment: &Segment);

    /// Move a node to the top of the stacking order.
    fn raise_node(&mut self, uid: &NodeUid);
}

// ============================================================================
// Node frame
// ============================================================================

/// Space above the plot for the node label.
pub const LABEL_HEIGHT: f64 = 25.0;
/// Space below the plot for the x-axis ticks.
pub const AXIS_HEIGHT: f64 = 25.0;
/// Space left of the plot for the y-axis.
pub const AXIS_WIDTH: f64 = 35.0;
/// Space right of the plot.
pub const RIGHT_MARGIN: f64 = 10.0;

/// Ticks requested along the x-axis.
const X_TICKS: usize = 5;

/// Plot-area geometry inside a node box.
///
/// Axis coordinates are relative to the plot's top-left corner; the x-axis
/// runs over `[0, plot_width]` and the y-axis grows downwards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeFrame {
    width: f64,
    height: f64,
}

impl NodeFrame {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn for_node(node: &Node) -> Self {
        Self::new(node.width(), node.height())
    }

    pub fn plot_width(&self) -> f64 {
        (self.width - AXIS_WIDTH - RIGHT_MARGIN).max(0.0)
    }

    pub fn plot_height(&self) -> f64 {
        (self.height - LABEL_HEIGHT - AXIS_HEIGHT).max(0.0)
    }

    /// Pixel extent of the x-axis.
    pub fn x_axis_range(&self) -> (f64, f64) {
        (0.0, self.plot_width())
    }

    /// Offset of the plot origin from the box's top-left corner.
    pub fn plot_offset(&self) -> Point {
        Point::new(AXIS_WIDTH, LABEL_HEIGHT)
    }

    /// Scale from variable values to axis pixels for a curve.
    pub fn x_scale(&self, data: &[DensityPoint]) -> LinearScale {
        let domain = curve_domain(data).unwrap_or((0.0, 1.0));
        LinearScale::new(domain, self.x_axis_range())
    }

    /// Scale from densities to axis pixels, zero at the bottom.
    pub fn y_scale(&self, data: &[DensityPoint]) -> LinearScale {
        let peak = data.iter().map(|d| d.p).fold(0.0, f64::max);
        let top = if peak > 0.0 && peak.is_finite() { peak } else { 1.0 };
        LinearScale::new((0.0, top), (self.plot_height(), 0.0))
    }

    /// Converts a point relative to the box into x-axis pixels, if it falls
    /// inside the plot horizontally.
    pub fn axis_x(&self, local: Point) -> Option<f64> {
        let px = local.x - AXIS_WIDTH;
        let (lo, hi) = self.x_axis_range();
        (px >= lo && px <= hi).then_some(px)
    }
}

// ============================================================================
// Scene
// ============================================================================

/// Retained drawing of a node.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeView {
    pub uid: NodeUid,
    pub id: String,
    pub name: String,
    pub bounds: NodeBox,
    pub observed: bool,
    pub mean: f64,
    pub curve: Vec<DensityPoint>,
    pub frame: NodeFrame,
    pub x_scale: LinearScale,
    pub y_scale: LinearScale,
    pub x_ticks: Vec<f64>,
}

impl NodeView {
    fn from_node(node: &Node) -> Self {
        let frame = NodeFrame::for_node(node);
        let x_scale = frame.x_scale(node.data());
        Self {
            uid: node.uid().clone(),
            id: node.id().to_string(),
            name: node.name().to_string(),
            bounds: node.bounds(),
            observed: node.observed(),
            mean: node.mean(),
            curve: node.data().to_vec(),
            frame,
            x_scale,
            y_scale: frame.y_scale(node.data()),
            x_ticks: x_scale.ticks(X_TICKS),
        }
    }

    /// Top-left corner of the box.
    pub fn origin(&self) -> Point {
        Point::new(self.bounds.left(), self.bounds.top())
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.bounds.left()
            && point.x <= self.bounds.right()
            && point.y >= self.bounds.top()
            && point.y <= self.bounds.bottom()
    }

    /// Curve samples in pixels relative to the plot origin.
    pub fn curve_pixels(&self) -> impl Iterator<Item = Point> + '_ {
        self.curve
            .iter()
            .map(|d| Point::new(self.x_scale.map(d.q), self.y_scale.map(d.p)))
    }
}

/// Retained drawing of an edge.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeView {
    pub parent_uid: NodeUid,
    pub child_uid: NodeUid,
    pub segment: Segment,
}

/// A retained display list.
///
/// Holds the latest drawing of every node and edge plus the stacking order,
/// and counts redraws so callers can tell what changed.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    nodes: HashMap<NodeUid, NodeView>,
    edges: Vec<Option<EdgeView>>,
    z_order: Vec<NodeUid>,
    revision: u64,
    node_draws: usize,
    edge_draws: usize,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, uid: &NodeUid) -> Option<&NodeView> {
        self.nodes.get(uid)
    }

    /// Nodes from bottom to top.
    pub fn nodes_in_z_order(&self) -> impl Iterator<Item = &NodeView> {
        self.z_order.iter().filter_map(|uid| self.nodes.get(uid))
    }

    pub fn edges(&self) -> impl Iterator<Item = &EdgeView> {
        self.edges.iter().flatten()
    }

    pub fn z_order(&self) -> &[NodeUid] {
        &self.z_order
    }

    /// Topmost node whose box contains `point`.
    pub fn node_at(&self, point: Point) -> Option<&NodeView> {
        self.z_order
            .iter()
            .rev()
            .filter_map(|uid| self.nodes.get(uid))
            .find(|view| view.contains(point))
    }

    /// Bumped on every change.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn node_draws(&self) -> usize {
        self.node_draws
    }

    pub fn edge_draws(&self) -> usize {
        self.edge_draws
    }

    /// Smallest rectangle containing every node, as `(min, max)`.
    pub fn extent(&self) -> Option<(Point, Point)> {
        self.nodes.values().fold(None, |acc, view| {
            let b = &view.bounds;
            Some(match acc {
                None => (Point::new(b.left(), b.top()), Point::new(b.right(), b.bottom())),
                Some((min, max)) => (
                    Point::new(min.x.min(b.left()), min.y.min(b.top())),
                    Point::new(max.x.max(b.right()), max.y.max(b.bottom())),
                ),
            })
        })
    }
}

impl RenderTarget for Scene {
    fn draw_node(&mut self, node: &Node) {
        let view = NodeView::from_node(node);
        if self.nodes.insert(view.uid.clone(), view).is_none() {
            self.z_order.push(node.uid().clone());
        }
        self.node_draws += 1;
        self.revision += 1;
    }

    fn draw_edge(&mut self, index: usize, edge: &Edge, segment: &Segment) {
        if self.edges.len() <= index {
            self.edges.resize(index + 1, None);
        }
        self.edges[index] = Some(EdgeView {
            parent_uid: edge.parent_uid.clone(),
            child_uid: edge.child_uid.clone(),
            segment: *segment,
        });
        self.edge_draws += 1;
        self.revision += 1;
    }

    fn raise_node(&mut self, uid: &NodeUid) {
        if let Some(position) = self.z_order.iter().position(|u| u == uid) {
            let raised = self.z_order.remove(position);
            self.z_order.push(raised);
            self.revision += 1;
        }
    }
}
