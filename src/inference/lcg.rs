//! Linear conditional Gaussian networks.
//!
//! Each variable is Gaussian given its parents, with a mean that is linear in
//! the parent values:
//!
//! ```text
//! x_i = mean_i + Σ_j w_ij · x_j + stdev_i · z,   z ~ N(0, 1)
//! ```
//!
//! Posteriors are estimated by likelihood weighting: samples are drawn in
//! topological order, observed variables are clamped to their value, and each
//! sample is weighted by the density of the evidence under its parents.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{InferenceEngine, InferenceError, NodeSnapshot, Posterior};

/// A variable of the network with its local conditional distribution.
#[derive(Clone, Debug, PartialEq)]
pub struct LcgNode {
    /// Unique identifier.
    pub id: String,
    /// Display label.
    pub name: String,
    /// Intercept of the conditional mean.
    pub mean: f64,
    /// Conditional standard deviation.
    pub stdev: f64,
    /// Parent positions and their weights.
    parents: Vec<(usize, f64)>,
}

/// A linear conditional Gaussian Bayesian network.
pub struct LinearGaussianNetwork {
    /// Variables in insertion order.
    nodes: Vec<LcgNode>,
    /// Position of each variable by id.
    lookup: HashMap<String, usize>,
    /// Observed values by variable position.
    evidence: HashMap<usize, f64>,
    /// Latest posterior of each variable.
    posteriors: Vec<Posterior>,
    /// Sampling order (topologically sorted positions).
    order: Vec<usize>,
    /// Whether the sampling order is stale.
    needs_sort: bool,
    rng: StdRng,
}

impl Default for LinearGaussianNetwork {
    fn default() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl LinearGaussianNetwork {
    /// Creates an empty network seeded from system entropy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty network with a reproducible random stream.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            nodes: Vec::new(),
            lookup: HashMap::new(),
            evidence: HashMap::new(),
            posteriors: Vec::new(),
            order: Vec::new(),
            needs_sort: false,
            rng,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: &str) -> Option<&LcgNode> {
        self.lookup.get(id).map(|&i| &self.nodes[i])
    }

    /// The value a variable is observed at, if any.
    pub fn observation(&self, id: &str) -> Option<f64> {
        let position = self.lookup.get(id)?;
        self.evidence.get(position).copied()
    }

    // ========================================================================
    // Construction
    // ========================================================================

    /// Adds a variable with the given intercept and noise.
    ///
    /// Until the first call to `sample`, its posterior is `(mean, stdev)`.
    pub fn add_node(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        mean: f64,
        stdev: f64,
    ) -> Result<(), InferenceError> {
        let id = id.into();
        if self.lookup.contains_key(&id) {
            return Err(InferenceError::DuplicateNode(id));
        }

        self.lookup.insert(id.clone(), self.nodes.len());
        self.nodes.push(LcgNode {
            id,
            name: name.into(),
            mean,
            stdev,
            parents: Vec::new(),
        });
        self.posteriors.push(Posterior { avg: mean, stdev });
        self.needs_sort = true;
        Ok(())
    }

    /// Makes `parent` a parent of `child` with the given weight.
    ///
    /// Linking an existing pair again replaces its weight. Links that would
    /// make the network cyclic are rejected and leave it unchanged.
    pub fn add_parent(&mut self, child: &str, parent: &str, weight: f64) -> Result<(), InferenceError> {
        let child_pos = self.position(child)?;
        let parent_pos = self.position(parent)?;

        let parents = &mut self.nodes[child_pos].parents;
        if let Some(link) = parents.iter_mut().find(|(p, _)| *p == parent_pos) {
            link.1 = weight;
            return Ok(());
        }
        parents.push((parent_pos, weight));

        if self.compute_topological_order().len() != self.nodes.len() {
            self.nodes[child_pos].parents.pop();
            return Err(InferenceError::Cycle {
                parent: parent.to_string(),
                child: child.to_string(),
            });
        }

        self.needs_sort = true;
        Ok(())
    }

    fn position(&self, id: &str) -> Result<usize, InferenceError> {
        self.lookup
            .get(id)
            .copied()
            .ok_or_else(|| InferenceError::UnknownNode(id.to_string()))
    }

    // ========================================================================
    // Topological Sort
    // ========================================================================

    /// Kahn's algorithm over parent links, smallest position first.
    ///
    /// Returns fewer positions than there are nodes when the links contain
    /// a cycle.
    fn compute_topological_order(&self) -> Vec<usize> {
        let mut in_degree: Vec<usize> = self.nodes.iter().map(|n| n.parents.len()).collect();
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); self.nodes.len()];
        for (child, node) in self.nodes.iter().enumerate() {
            for &(parent, _) in &node.parents {
                children[parent].push(child);
            }
        }

        // Kept sorted descending so pop() yields the smallest position
        let mut queue: Vec<usize> = (0..self.nodes.len())
            .rev()
            .filter(|&i| in_degree[i] == 0)
            .collect();

        let mut result = Vec::with_capacity(self.nodes.len());
        while let Some(position) = queue.pop() {
            result.push(position);
            for &child in &children[position] {
                in_degree[child] -= 1;
                if in_degree[child] == 0 {
                    let insert_at = queue.partition_point(|&q| q > child);
                    queue.insert(insert_at, child);
                }
            }
        }

        result
    }

    fn update_order(&mut self) {
        if self.needs_sort {
            self.order = self.compute_topological_order();
            self.needs_sort = false;
        }
    }
}

/// Draws a standard normal variate with the Box–Muller transform.
fn standard_normal(rng: &mut impl Rng) -> f64 {
    // 1 - [0, 1) keeps the logarithm's argument in (0, 1]
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

/// Log density of `N(mean, stdev²)` at `x`; a point mass when `stdev` is 0.
fn log_normal_pdf(x: f64, mean: f64, stdev: f64) -> f64 {
    if stdev <= 0.0 {
        return if x == mean { 0.0 } else { f64::NEG_INFINITY };
    }
    let z = (x - mean) / stdev;
    -0.5 * z * z - (stdev * (std::f64::consts::TAU).sqrt()).ln()
}

impl InferenceEngine for LinearGaussianNetwork {
    fn nodes(&self) -> Vec<NodeSnapshot> {
        self.nodes
            .iter()
            .zip(&self.posteriors)
            .map(|(node, posterior)| NodeSnapshot {
                id: node.id.clone(),
                name: node.name.clone(),
                avg: posterior.avg,
                stdev: posterior.stdev,
                parents: node
                    .parents
                    .iter()
                    .map(|&(p, _)| self.nodes[p].id.clone())
                    .collect(),
            })
            .collect()
    }

    fn posterior(&self, id: &str) -> Option<Posterior> {
        self.lookup.get(id).map(|&i| self.posteriors[i])
    }

    fn observe(&mut self, id: &str, value: f64) -> Result<(), InferenceError> {
        let position = self.position(id)?;
        self.evidence.insert(position, value);
        Ok(())
    }

    fn unobserve(&mut self, id: &str) -> Result<(), InferenceError> {
        let position = self.position(id)?;
        self.evidence.remove(&position);
        Ok(())
    }

    fn sample(&mut self, samples: usize) -> Result<(), InferenceError> {
        if samples == 0 {
            return Err(InferenceError::InvalidSampleCount);
        }
        self.update_order();

        let width = self.nodes.len();
        let mut values = vec![0.0; samples * width];
        let mut log_weights = vec![0.0; samples];

        for (row, log_weight) in values.chunks_mut(width.max(1)).zip(log_weights.iter_mut()) {
            for &i in &self.order {
                let node = &self.nodes[i];
                let conditional_mean = node.mean
                    + node
                        .parents
                        .iter()
                        .map(|&(p, w)| w * row[p])
                        .sum::<f64>();

                row[i] = match self.evidence.get(&i) {
                    Some(&value) => {
                        *log_weight += log_normal_pdf(value, conditional_mean, node.stdev);
                        value
                    }
                    None => conditional_mean + node.stdev * standard_normal(&mut self.rng),
                };
            }
        }

        let max_log_weight = log_weights.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if !max_log_weight.is_finite() {
            return Err(InferenceError::DegenerateWeights);
        }
        let weights: Vec<f64> = log_weights
            .iter()
            .map(|lw| (lw - max_log_weight).exp())
            .collect();
        let total: f64 = weights.iter().sum();

        for i in 0..width {
            if let Some(&value) = self.evidence.get(&i) {
                self.posteriors[i] = Posterior { avg: value, stdev: 0.0 };
                continue;
            }

            let column = || values.iter().skip(i).step_by(width).zip(&weights);
            let avg = column().map(|(v, w)| v * w).sum::<f64>() / total;
            let variance = column().map(|(v, w)| w * (v - avg).powi(2)).sum::<f64>() / total;
            self.posteriors[i] = Posterior {
                avg,
                stdev: variance.max(0.0).sqrt(),
            };
        }

        tracing::debug!(samples, variables = width, "likelihood weighting complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: usize = 20_000;

    /// a -> b -> c, unit weights and noise, zero intercepts.
    fn chain() -> LinearGaussianNetwork {
        let mut net = LinearGaussianNetwork::with_seed(7);
        net.add_node("a", "A", 0.0, 1.0).unwrap();
        net.add_node("b", "B", 0.0, 1.0).unwrap();
        net.add_node("c", "C", 0.0, 1.0).unwrap();
        net.add_parent("b", "a", 1.0).unwrap();
        net.add_parent("c", "b", 1.0).unwrap();
        net
    }

    fn avg(net: &LinearGaussianNetwork, id: &str) -> f64 {
        net.posterior(id).unwrap().avg
    }

    #[test]
    fn test_posterior_before_sampling_is_local() {
        let mut net = LinearGaussianNetwork::with_seed(1);
        net.add_node("x", "X", 3.0, 0.5).unwrap();
        assert_eq!(net.posterior("x"), Some(Posterior { avg: 3.0, stdev: 0.5 }));
    }

    #[test]
    fn test_prior_moments() {
        let mut net = chain();
        net.sample(SAMPLES).unwrap();

        assert!(avg(&net, "a").abs() < 0.1);
        assert!(avg(&net, "c").abs() < 0.1);
        // Var(c) = 3
        let sd = net.posterior("c").unwrap().stdev;
        assert!((sd - 3f64.sqrt()).abs() < 0.1, "stdev {}", sd);
    }

    #[test]
    fn test_observing_root_propagates_down() {
        let mut net = chain();
        net.observe("a", 2.0).unwrap();
        net.sample(SAMPLES).unwrap();

        assert_eq!(net.posterior("a"), Some(Posterior { avg: 2.0, stdev: 0.0 }));
        assert!((avg(&net, "b") - 2.0).abs() < 0.1);
        assert!((avg(&net, "c") - 2.0).abs() < 0.1);
    }

    #[test]
    fn test_observing_leaf_propagates_up() {
        let mut net = chain();
        net.observe("c", 3.0).unwrap();
        net.sample(SAMPLES).unwrap();

        // E[a | c = 3] = 3 · Var(a) / Var(c) = 1
        assert!((avg(&net, "a") - 1.0).abs() < 0.2, "a = {}", avg(&net, "a"));
        // E[b | c = 3] = 3 · Var(b) / Var(c) = 2
        assert!((avg(&net, "b") - 2.0).abs() < 0.2, "b = {}", avg(&net, "b"));
    }

    #[test]
    fn test_unobserve_restores_prior() {
        let mut net = chain();
        net.observe("a", 5.0).unwrap();
        net.sample(SAMPLES).unwrap();
        assert!(avg(&net, "b") > 4.0);

        net.unobserve("a").unwrap();
        net.sample(SAMPLES).unwrap();
        assert!(avg(&net, "b").abs() < 0.1);
        assert_eq!(net.observation("a"), None);
    }

    #[test]
    fn test_weights_and_intercepts() {
        let mut net = LinearGaussianNetwork::with_seed(3);
        net.add_node("x", "X", 1.0, 1.0).unwrap();
        net.add_node("y", "Y", 10.0, 0.5).unwrap();
        net.add_parent("y", "x", -2.0).unwrap();
        net.sample(SAMPLES).unwrap();

        // E[y] = 10 - 2 · 1
        assert!((avg(&net, "y") - 8.0).abs() < 0.1);
    }

    #[test]
    fn test_same_seed_is_reproducible() {
        let mut first = chain();
        let mut second = chain();
        first.sample(1000).unwrap();
        second.sample(1000).unwrap();
        assert_eq!(first.posterior("c"), second.posterior("c"));
    }

    #[test]
    fn test_cycle_rejected() {
        let mut net = chain();
        let err = net.add_parent("a", "c", 1.0).unwrap_err();
        assert_eq!(
            err,
            InferenceError::Cycle {
                parent: "c".to_string(),
                child: "a".to_string()
            }
        );
        assert!(net.nodes()[0].parents.is_empty());
        assert!(net.sample(10).is_ok());
    }

    #[test]
    fn test_relinking_replaces_weight() {
        let mut net = chain();
        net.add_parent("b", "a", 3.0).unwrap();
        assert_eq!(net.nodes()[1].parents, vec!["a".to_string()]);
    }

    #[test]
    fn test_unknown_and_duplicate_ids() {
        let mut net = chain();
        assert_eq!(
            net.observe("zz", 1.0),
            Err(InferenceError::UnknownNode("zz".to_string()))
        );
        assert!(net.unobserve("zz").is_err());
        assert!(net.add_parent("a", "zz", 1.0).is_err());
        assert_eq!(
            net.add_node("a", "again", 0.0, 1.0),
            Err(InferenceError::DuplicateNode("a".to_string()))
        );
        assert_eq!(net.posterior("zz"), None);
    }

    #[test]
    fn test_zero_samples_rejected() {
        let mut net = chain();
        assert_eq!(net.sample(0), Err(InferenceError::InvalidSampleCount));
    }

    #[test]
    fn test_impossible_evidence_is_degenerate() {
        let mut net = LinearGaussianNetwork::with_seed(5);
        net.add_node("x", "X", 0.0, 1.0).unwrap();
        net.add_node("y", "Y", 0.0, 0.0).unwrap();
        net.add_parent("y", "x", 1.0).unwrap();
        net.observe("y", 1.0).unwrap();
        assert_eq!(net.sample(100), Err(InferenceError::DegenerateWeights));
    }

    #[test]
    fn test_snapshot_lists_parents() {
        let net = chain();
        let nodes = net.nodes();
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[2].id, "c");
        assert_eq!(nodes[2].name, "C");
        assert_eq!(nodes[2].parents, vec!["b".to_string()]);
    }

    #[test]
    fn test_log_normal_pdf() {
        let expected = -(std::f64::consts::TAU).sqrt().ln();
        assert!((log_normal_pdf(0.0, 0.0, 1.0) - expected).abs() < 1e-12);
        assert_eq!(log_normal_pdf(1.0, 1.0, 0.0), 0.0);
        assert_eq!(log_normal_pdf(1.0, 2.0, 0.0), f64::NEG_INFINITY);
    }
}
