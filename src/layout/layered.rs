//! Layered (Sugiyama-style) layout for directed graphs.
//!
//! Nodes are assigned to layers by longest path from the roots, reordered
//! within each layer by the barycenter of their neighbours to reduce edge
//! crossings, then spaced out with each layer centered on the widest one.
//! Edges are routed from the bottom of the parent to the top of the child.

use std::collections::HashMap;

use crate::graph::Point;

use super::{LayoutEngine, LayoutRequest, LayoutResponse};

/// Default layered layout engine.
#[derive(Clone, Debug)]
pub struct LayeredLayout {
    /// Horizontal gap between nodes in a layer.
    pub node_sep: f64,
    /// Vertical gap between layers.
    pub rank_sep: f64,
    /// Offset of the whole drawing from the origin.
    pub margin: f64,
    /// Number of forward/backward crossing-reduction sweeps.
    pub passes: usize,
}

impl Default for LayeredLayout {
    fn default() -> Self {
        Self {
            node_sep: 40.0,
            rank_sep: 60.0,
            margin: 20.0,
            passes: 4,
        }
    }
}

impl LayeredLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Longest-path rank of every node. Nodes on a cycle go below the rest.
    fn assign_ranks(n: usize, parents: &[Vec<usize>], children: &[Vec<usize>]) -> Vec<usize> {
        let mut in_degree: Vec<usize> = parents.iter().map(Vec::len).collect();
        let mut rank = vec![0usize; n];
        let mut visited = vec![false; n];

        let mut queue: Vec<usize> = (0..n).rev().filter(|&i| in_degree[i] == 0).collect();
        while let Some(node) = queue.pop() {
            visited[node] = true;
            for &child in &children[node] {
                rank[child] = rank[child].max(rank[node] + 1);
                in_degree[child] -= 1;
                if in_degree[child] == 0 {
                    let at = queue.partition_point(|&q| q > child);
                    queue.insert(at, child);
                }
            }
        }

        let trailing = rank
            .iter()
            .zip(&visited)
            .filter(|(_, seen)| **seen)
            .map(|(&r, _)| r + 1)
            .max()
            .unwrap_or(0);
        for (r, seen) in rank.iter_mut().zip(&visited) {
            if !seen {
                *r = trailing;
            }
        }

        rank
    }

    /// Reorder `layer` by the mean position of each node's neighbours in
    /// `reference`. Nodes without such neighbours keep their slot.
    fn reorder_by_barycenter(layer: &mut Vec<usize>, reference: &[usize], neighbours: &[Vec<usize>]) {
        let slots: HashMap<usize, usize> = reference.iter().enumerate().map(|(i, &n)| (n, i)).collect();

        let mut keyed: Vec<(usize, f64)> = layer
            .iter()
            .enumerate()
            .map(|(current, &node)| {
                let positions: Vec<f64> = neighbours[node]
                    .iter()
                    .filter_map(|n| slots.get(n).map(|&s| s as f64))
                    .collect();
                let barycenter = if positions.is_empty() {
                    current as f64
                } else {
                    positions.iter().sum::<f64>() / positions.len() as f64
                };
                (node, barycenter)
            })
            .collect();

        keyed.sort_by(|a, b| a.1.total_cmp(&b.1));
        *layer = keyed.into_iter().map(|(node, _)| node).collect();
    }
}

impl LayoutEngine for LayeredLayout {
    fn layout(&mut self, request: &LayoutRequest) -> LayoutResponse {
        let n = request.nodes.len();
        let lookup: HashMap<&str, usize> = request
            .nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id.as_str(), i))
            .collect();

        let mut parents = vec![Vec::new(); n];
        let mut children = vec![Vec::new(); n];
        for (parent, child) in &request.edges {
            let (Some(&p), Some(&c)) = (lookup.get(parent.as_str()), lookup.get(child.as_str())) else {
                continue;
            };
            if p != c {
                parents[c].push(p);
                children[p].push(c);
            }
        }

        let rank = Self::assign_ranks(n, &parents, &children);
        let layer_count = rank.iter().max().map_or(0, |r| r + 1);
        let mut layers: Vec<Vec<usize>> = vec![Vec::new(); layer_count];
        for (node, &r) in rank.iter().enumerate() {
            layers[r].push(node);
        }

        for _pass in 0..self.passes {
            for i in 1..layers.len() {
                let (before, after) = layers.split_at_mut(i);
                Self::reorder_by_barycenter(&mut after[0], &before[i - 1], &parents);
            }
            for i in (0..layers.len().saturating_sub(1)).rev() {
                let (before, after) = layers.split_at_mut(i + 1);
                Self::reorder_by_barycenter(&mut before[i], &after[0], &children);
            }
        }

        // Coordinates
        let layer_width = |layer: &[usize]| -> f64 {
            let widths: f64 = layer.iter().map(|&i| request.nodes[i].width).sum();
            widths + self.node_sep * layer.len().saturating_sub(1) as f64
        };
        let widest = layers.iter().map(|l| layer_width(l)).fold(0.0, f64::max);

        let mut response = LayoutResponse::default();
        let mut y = self.margin;
        for layer in &layers {
            let mut x = self.margin + (widest - layer_width(layer)) / 2.0;
            let mut tallest: f64 = 0.0;
            for &i in layer {
                let node = &request.nodes[i];
                response.positions.insert(node.id.clone(), Point::new(x, y));
                x += node.width + self.node_sep;
                tallest = tallest.max(node.height);
            }
            y += tallest + self.rank_sep;
        }

        // Edge routes
        for key in &request.edges {
            let (Some(&p), Some(&c)) = (lookup.get(key.0.as_str()), lookup.get(key.1.as_str())) else {
                continue;
            };
            let (Some(from), Some(to)) = (response.positions.get(&key.0), response.positions.get(&key.1)) else {
                continue;
            };
            let (pn, cn) = (&request.nodes[p], &request.nodes[c]);
            let start = Point::new(from.x + pn.width / 2.0, from.y + pn.height);
            let end = Point::new(to.x + cn.width / 2.0, to.y);
            let mid = Point::new((start.x + end.x) / 2.0, (start.y + end.y) / 2.0);
            response.routes.insert(key.clone(), vec![start, mid, end]);
        }

        response
    }
}
