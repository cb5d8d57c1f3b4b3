//! In-memory graph model for the visualization.
//!
//! The model owns the node boxes and the edges between them. Nodes are kept
//! in insertion order, which doubles as the default drawing order. Lookups by
//! inference id, display name and uid go through an index that is built on
//! first use and dropped whenever a node is added.

use std::cell::{Cell, OnceCell};
use std::collections::HashMap;
use std::fmt;

use super::density::{density_curve, effective_sigma, DensityPoint};
use super::geometry::{clip_segment, NodeBox, Point, Segment};
use super::validation::{validate_edge, GraphError};

/// Width of every node box, in layout units.
pub const NODE_WIDTH: f64 = 180.0;

/// Height of every node box, in layout units.
pub const NODE_HEIGHT: f64 = 130.0;

/// Visualization-local identifier of a node.
///
/// Derived from the inference id by hex-encoding its bytes behind an `n`
/// prefix, so distinct ids always map to distinct uids and every uid is a
/// safe identifier for the render layer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeUid(String);

impl NodeUid {
    /// Derive the uid for an inference id.
    pub fn from_id(id: &str) -> Self {
        let mut uid = String::with_capacity(1 + id.len() * 2);
        uid.push('n');
        for byte in id.bytes() {
            uid.push_str(&format!("{:02x}", byte));
        }
        Self(uid)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A random variable drawn as a box with its density curve.
#[derive(Clone, Debug)]
pub struct Node {
    id: String,
    uid: NodeUid,
    name: String,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    mean: f64,
    sigma: f64,
    observed: bool,
    data: Vec<DensityPoint>,
}

impl Node {
    fn new(mean: f64, sigma: f64, x: f64, y: f64, id: String, name: String) -> Self {
        let uid = NodeUid::from_id(&id);
        let mut node = Self {
            id,
            uid,
            name,
            x,
            y,
            width: NODE_WIDTH,
            height: NODE_HEIGHT,
            mean,
            sigma,
            observed: false,
            data: Vec::new(),
        };
        node.regenerate_curve();
        node
    }

    /// Inference engine identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn uid(&self) -> &NodeUid {
        &self.uid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Top-left corner x.
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Top-left corner y.
    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    pub fn observed(&self) -> bool {
        self.observed
    }

    /// Density samples, ascending by `q`.
    pub fn data(&self) -> &[DensityPoint] {
        &self.data
    }

    /// The box outline, for edge clipping.
    pub fn bounds(&self) -> NodeBox {
        NodeBox::from_top_left(self.x, self.y, self.width, self.height)
    }

    pub fn center(&self) -> Point {
        self.bounds().center
    }

    pub(crate) fn set_position(&mut self, x: f64, y: f64) {
        self.x = x;
        self.y = y;
    }

    pub(crate) fn set_mean(&mut self, mean: f64) {
        self.mean = mean;
        self.regenerate_curve();
    }

    pub(crate) fn set_observed(&mut self, observed: bool) {
        self.observed = observed;
        self.regenerate_curve();
    }

    fn regenerate_curve(&mut self) {
        self.data = density_curve(self.mean, effective_sigma(self.sigma, self.observed));
    }
}

/// A directed dependency between two nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    pub parent_uid: NodeUid,
    pub child_uid: NodeUid,
    /// Routing polyline assigned by the layout engine, if any.
    pub points: Option<Vec<Point>>,
}

/// Lookup tables over the node list, holding positions into it.
#[derive(Debug, Default)]
struct NodeIndex {
    by_id: HashMap<String, usize>,
    by_name: HashMap<String, usize>,
    by_uid: HashMap<NodeUid, usize>,
}

impl NodeIndex {
    fn build(nodes: &[Node]) -> Self {
        let mut index = Self::default();
        for (position, node) in nodes.iter().enumerate() {
            index.by_id.insert(node.id.clone(), position);
            index.by_uid.insert(node.uid.clone(), position);
            // First node with a given name wins
            index.by_name.entry(node.name.clone()).or_insert(position);
        }
        index
    }
}

/// The nodes and edges of a visualization.
#[derive(Debug, Default)]
pub struct GraphModel {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    index: OnceCell<NodeIndex>,
    index_builds: Cell<usize>,
}

impl GraphModel {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// How many times the lookup index has been built.
    pub fn index_builds(&self) -> usize {
        self.index_builds.get()
    }

    // ========================================================================
    // Construction
    // ========================================================================

    /// Adds a node with the fixed box size and its initial density curve.
    ///
    /// Fails if a node with the same inference id already exists.
    pub fn add_node(
        &mut self,
        mean: f64,
        sigma: f64,
        x: f64,
        y: f64,
        id: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<&Node, GraphError> {
        let id = id.into();
        if self.node_by_id(&id).is_some() {
            return Err(GraphError::DuplicateNode(id));
        }

        self.nodes.push(Node::new(mean, sigma, x, y, id, name.into()));
        self.index.take();

        let position = self.nodes.len() - 1;
        Ok(&self.nodes[position])
    }

    /// Adds a directed edge between two existing nodes.
    pub fn add_edge(&mut self, parent: &NodeUid, child: &NodeUid) -> Result<&Edge, GraphError> {
        validate_edge(self, parent, child)?;

        self.edges.push(Edge {
            parent_uid: parent.clone(),
            child_uid: child.clone(),
            points: None,
        });

        let position = self.edges.len() - 1;
        Ok(&self.edges[position])
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    fn index(&self) -> &NodeIndex {
        self.index.get_or_init(|| {
            self.index_builds.set(self.index_builds.get() + 1);
            NodeIndex::build(&self.nodes)
        })
    }

    pub fn node_by_id(&self, id: &str) -> Option<&Node> {
        let position = *self.index().by_id.get(id)?;
        self.nodes.get(position)
    }

    /// First node inserted with this display name.
    pub fn node_by_name(&self, name: &str) -> Option<&Node> {
        let position = *self.index().by_name.get(name)?;
        self.nodes.get(position)
    }

    pub fn node_by_uid(&self, uid: &NodeUid) -> Option<&Node> {
        let position = self.position_of(uid)?;
        self.nodes.get(position)
    }

    fn position_of(&self, uid: &NodeUid) -> Option<usize> {
        self.index().by_uid.get(uid).copied()
    }

    pub(crate) fn node_by_uid_mut(&mut self, uid: &NodeUid) -> Option<&mut Node> {
        let position = self.position_of(uid)?;
        self.nodes.get_mut(position)
    }

    pub(crate) fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.iter_mut()
    }

    pub(crate) fn edges_mut(&mut self) -> impl Iterator<Item = &mut Edge> {
        self.edges.iter_mut()
    }

    /// Edges with `uid` as either endpoint, with their positions.
    pub fn incident_edges<'a>(&'a self, uid: &'a NodeUid) -> impl Iterator<Item = (usize, &'a Edge)> + 'a {
        self.edges
            .iter()
            .enumerate()
            .filter(move |(_, edge)| &edge.parent_uid == uid || &edge.child_uid == uid)
    }

    // ========================================================================
    // Geometry
    // ========================================================================

    /// Clipped segment between two nodes at their current positions.
    pub fn edge_segment(&self, from: &NodeUid, to: &NodeUid) -> Result<Segment, GraphError> {
        let a = self
            .node_by_uid(from)
            .ok_or_else(|| GraphError::UnknownNode(from.clone()))?;
        let b = self
            .node_by_uid(to)
            .ok_or_else(|| GraphError::UnknownNode(to.clone()))?;
        Ok(clip_segment(&a.bounds(), &b.bounds())?)
    }

    /// Segment to draw for an edge, falling back to a zero-length segment
    /// at the parent's center when clipping fails.
    pub fn drawable_segment(&self, edge: &Edge) -> Option<Segment> {
        match self.edge_segment(&edge.parent_uid, &edge.child_uid) {
            Ok(segment) => Some(segment),
            Err(GraphError::Clip(err)) => {
                tracing::debug!(
                    parent = %edge.parent_uid,
                    child = %edge.child_uid,
                    "edge clipping failed, drawing degenerate segment: {}",
                    err
                );
                let center = self.node_by_uid(&edge.parent_uid)?.center();
                Some(Segment::degenerate_at(center))
            }
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::density::{OBSERVED_SIGMA, SAMPLE_COUNT};

    fn chain() -> GraphModel {
        let mut model = GraphModel::new();
        model.add_node(0.0, 1.0, 0.0, 0.0, "a", "A").unwrap();
        model.add_node(1.0, 2.0, 0.0, 300.0, "b", "B").unwrap();
        let a = NodeUid::from_id("a");
        let b = NodeUid::from_id("b");
        model.add_edge(&a, &b).unwrap();
        model
    }

    #[test]
    fn test_uid_is_deterministic_and_injective() {
        assert_eq!(NodeUid::from_id("ab"), NodeUid::from_id("ab"));
        assert_eq!(NodeUid::from_id("ab").as_str(), "n6162");
        assert_ne!(NodeUid::from_id("a b"), NodeUid::from_id("a_b"));
        assert_eq!(NodeUid::from_id("").as_str(), "n");
    }

    #[test]
    fn test_add_node_sets_box_and_curve() {
        let mut model = GraphModel::new();
        let node = model.add_node(5.0, 2.0, 10.0, 20.0, "x", "X").unwrap();

        assert_eq!(node.width(), NODE_WIDTH);
        assert_eq!(node.height(), NODE_HEIGHT);
        assert_eq!(node.x(), 10.0);
        assert_eq!(node.y(), 20.0);
        assert!(!node.observed());
        assert_eq!(node.data().len(), SAMPLE_COUNT);
        assert!((node.data()[0].q - (5.0 - 7.0)).abs() < 1e-9);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut model = GraphModel::new();
        model.add_node(0.0, 1.0, 0.0, 0.0, "x", "X").unwrap();
        let err = model.add_node(0.0, 1.0, 0.0, 0.0, "x", "Other").unwrap_err();
        assert_eq!(err, GraphError::DuplicateNode("x".to_string()));
        assert_eq!(model.node_count(), 1);
    }

    #[test]
    fn test_lookups() {
        let model = chain();
        assert_eq!(model.node_by_id("a").map(Node::name), Some("A"));
        assert_eq!(model.node_by_name("B").map(Node::id), Some("b"));
        assert_eq!(
            model.node_by_uid(&NodeUid::from_id("b")).map(Node::id),
            Some("b")
        );
    }

    #[test]
    fn test_lookup_miss_returns_none() {
        let model = chain();
        assert!(model.node_by_id("does-not-exist").is_none());
        assert!(model.node_by_name("nobody").is_none());
        assert!(model.node_by_uid(&NodeUid::from_id("zzz")).is_none());
    }

    #[test]
    fn test_name_collision_returns_first() {
        let mut model = GraphModel::new();
        model.add_node(0.0, 1.0, 0.0, 0.0, "first", "Same").unwrap();
        model.add_node(0.0, 1.0, 0.0, 0.0, "second", "Same").unwrap();
        assert_eq!(model.node_by_name("Same").map(Node::id), Some("first"));
    }

    #[test]
    fn test_index_built_once_and_reused() {
        let model = chain();
        let uid = NodeUid::from_id("a");
        let builds = model.index_builds();

        let first = model.node_by_uid(&uid).unwrap();
        let second = model.node_by_uid(&uid).unwrap();

        assert!(std::ptr::eq(first, second));
        assert!(model.index_builds() <= builds + 1);
        let after_two = model.index_builds();
        model.node_by_uid(&uid);
        assert_eq!(model.index_builds(), after_two);
    }

    #[test]
    fn test_index_invalidated_by_add_node() {
        let mut model = chain();
        assert!(model.node_by_id("c").is_none());

        model.add_node(0.0, 1.0, 0.0, 0.0, "c", "C").unwrap();

        assert_eq!(model.node_by_id("c").map(Node::name), Some("C"));
        assert_eq!(model.node_by_name("C").map(Node::id), Some("c"));
    }

    #[test]
    fn test_add_edge_unknown_node() {
        let mut model = chain();
        let a = NodeUid::from_id("a");
        let ghost = NodeUid::from_id("ghost");
        assert!(matches!(
            model.add_edge(&a, &ghost),
            Err(GraphError::UnknownNode(_))
        ));
        assert_eq!(model.edge_count(), 1);
    }

    #[test]
    fn test_incident_edges() {
        let mut model = chain();
        model.add_node(0.0, 1.0, 0.0, 0.0, "c", "C").unwrap();
        let b = NodeUid::from_id("b");
        let c = NodeUid::from_id("c");
        model.add_edge(&b, &c).unwrap();

        let a = NodeUid::from_id("a");
        assert_eq!(model.incident_edges(&a).count(), 1);
        assert_eq!(model.incident_edges(&b).count(), 2);
        let positions: Vec<usize> = model.incident_edges(&c).map(|(i, _)| i).collect();
        assert_eq!(positions, vec![1]);
    }

    #[test]
    fn test_edge_segment_uses_current_positions() {
        let model = chain();
        let a = NodeUid::from_id("a");
        let b = NodeUid::from_id("b");

        let seg = model.edge_segment(&a, &b).unwrap();
        assert!((seg.x1 - NODE_WIDTH / 2.0).abs() < 1e-9);
        assert!((seg.y1 - NODE_HEIGHT).abs() < 1e-9);
        assert!((seg.y2 - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_drawable_segment_falls_back_on_clip_failure() {
        let mut model = chain();
        model.nodes[0].width = 0.0;
        let a = NodeUid::from_id("a");
        let b = NodeUid::from_id("b");
        assert!(matches!(
            model.edge_segment(&a, &b),
            Err(GraphError::Clip(_))
        ));

        let edge = model.edges()[0].clone();
        let seg = model.drawable_segment(&edge).unwrap();
        assert!(seg.is_degenerate());
        assert_eq!(seg.start(), model.node_by_uid(&a).unwrap().center());
    }

    #[test]
    fn test_set_mean_regenerates_curve() {
        let mut model = chain();
        let uid = NodeUid::from_id("a");
        let node = model.node_by_uid_mut(&uid).unwrap();

        node.set_mean(2.0);
        assert!((node.data()[50].q - 2.0).abs() < 1e-9);

        node.set_observed(true);
        let (lo, hi) = (node.data()[0].q, node.data()[SAMPLE_COUNT - 1].q);
        assert!((hi - lo - 7.0 * OBSERVED_SIGMA).abs() < 1e-9);
    }
}
