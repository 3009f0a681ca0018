//! Random Forest - Bagged CART trees for binary classification
//!
//! Each tree is grown on a bootstrap sample with a random feature subset
//! considered at every split (gini impurity, class-weighted). Probabilities
//! are the mean of the per-tree leaf probabilities.
//!
//! Training is deterministic for a given seed: every tree owns an RNG
//! seeded from `seed + tree_index`, so the parallel build order does not
//! matter.

use ndarray::ArrayView2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::bundle::FitError;

// ============================================================================
// CLASSIFIER SEAM
// ============================================================================

/// Anything that can score a (normalized) feature row
pub trait BinaryClassifier {
    /// Probability of the positive (phishing) class, in `[0, 1]`
    fn phishing_probability(&self, row: &[f64]) -> f64;

    /// Native hard label. Ties resolve to the negative class.
    fn predict_label(&self, row: &[f64]) -> bool {
        self.phishing_probability(row) > 0.5
    }
}

// ============================================================================
// PARAMETERS
// ============================================================================

/// Forest hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    /// Number of trees
    pub n_trees: usize,
    /// Maximum tree depth (root is depth 0)
    pub max_depth: usize,
    /// Nodes with fewer samples become leaves
    pub min_samples_split: usize,
    /// Features tried per split; `None` means `sqrt(n_features)`
    pub max_features: Option<usize>,
    /// Weight classes inversely to their frequency
    pub balanced_class_weight: bool,
    /// Base RNG seed
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 150,
            max_depth: 15,
            min_samples_split: 5,
            max_features: None,
            balanced_class_weight: true,
            seed: 42,
        }
    }
}

impl ForestParams {
    /// Same defaults with a different seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }

    fn check(&self) -> Result<(), FitError> {
        if self.n_trees == 0 {
            return Err(FitError::InvalidParams("n_trees must be > 0".into()));
        }
        if self.max_depth == 0 {
            return Err(FitError::InvalidParams("max_depth must be > 0".into()));
        }
        if self.min_samples_split < 2 {
            return Err(FitError::InvalidParams("min_samples_split must be >= 2".into()));
        }
        if self.max_features == Some(0) {
            return Err(FitError::InvalidParams("max_features must be > 0".into()));
        }
        Ok(())
    }

    fn features_per_split(&self, n_features: usize) -> usize {
        self.max_features
            .unwrap_or_else(|| (n_features as f64).sqrt() as usize)
            .clamp(1, n_features.max(1))
    }
}

// ============================================================================
// DECISION TREE
// ============================================================================

/// Flattened tree node. Children always have a larger index than their parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Leaf {
        /// Weighted fraction of phishing samples that reached this leaf
        probability: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        /// Taken when `row[feature] <= threshold`
        left: usize,
        right: usize,
    },
}

/// Single CART tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    fn fit(
        x: ArrayView2<f64>,
        y: &[bool],
        weights: &[f64],
        indices: &mut [usize],
        params: &ForestParams,
        rng: StdRng,
    ) -> Self {
        let mut builder = TreeBuilder {
            x: x.view(),
            y,
            weights,
            max_depth: params.max_depth,
            min_samples_split: params.min_samples_split,
            features_per_split: params.features_per_split(x.ncols()),
            rng,
            nodes: Vec::new(),
        };
        builder.grow(indices, 0);
        Self { nodes: builder.nodes }
    }

    /// Leaf probability for a row
    pub fn leaf_probability(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes.get(idx) {
                Some(Node::Leaf { probability }) => return *probability,
                Some(Node::Split { feature, threshold, left, right }) => {
                    let value = row.get(*feature).copied().unwrap_or(0.0);
                    idx = if value <= *threshold { *left } else { *right };
                }
                None => return 0.0,
            }
        }
    }

    /// Maximum depth actually reached
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match nodes.get(idx) {
                Some(Node::Split { left, right, .. }) => 1 + walk(nodes, *left).max(walk(nodes, *right)),
                _ => 0,
            }
        }
        walk(&self.nodes, 0)
    }

    fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Leaf { probability } => {
                    if !(0.0..=1.0).contains(probability) {
                        return Err(format!("node {} has probability {}", idx, probability));
                    }
                }
                Node::Split { feature, threshold, left, right } => {
                    if *feature >= n_features {
                        return Err(format!("node {} splits on feature {}", idx, feature));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {} has non-finite threshold", idx));
                    }
                    for child in [left, right] {
                        if *child <= idx || *child >= self.nodes.len() {
                            return Err(format!("node {} has invalid child {}", idx, child));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

struct TreeBuilder<'a> {
    x: ArrayView2<'a, f64>,
    y: &'a [bool],
    weights: &'a [f64],
    max_depth: usize,
    min_samples_split: usize,
    features_per_split: usize,
    rng: StdRng,
    nodes: Vec<Node>,
}

/// Best split found for a node
struct Candidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

/// Gini impurity of a binary node with positive fraction `p`
fn gini(p: f64) -> f64 {
    2.0 * p * (1.0 - p)
}

impl<'a> TreeBuilder<'a> {
    fn grow(&mut self, indices: &mut [usize], depth: usize) -> usize {
        let (positive, total) = self.class_weights(indices);
        let probability = if total > 0.0 { positive / total } else { 0.0 };

        let node_id = self.nodes.len();
        self.nodes.push(Node::Leaf { probability });

        let pure = positive <= 0.0 || positive >= total;
        if depth >= self.max_depth || indices.len() < self.min_samples_split || pure {
            return node_id;
        }

        let Some(split) = self.best_split(indices, positive, total) else {
            return node_id;
        };

        let mut mid = 0;
        for i in 0..indices.len() {
            if self.x[[indices[i], split.feature]] <= split.threshold {
                indices.swap(i, mid);
                mid += 1;
            }
        }
        if mid == 0 || mid == indices.len() {
            return node_id;
        }

        let (left_indices, right_indices) = indices.split_at_mut(mid);
        let left = self.grow(left_indices, depth + 1);
        let right = self.grow(right_indices, depth + 1);

        self.nodes[node_id] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        node_id
    }

    fn class_weights(&self, indices: &[usize]) -> (f64, f64) {
        indices.iter().fold((0.0, 0.0), |(pos, total), &i| {
            let w = self.weights[i];
            (if self.y[i] { pos + w } else { pos }, total + w)
        })
    }

    fn best_split(&mut self, indices: &[usize], positive: f64, total: f64) -> Option<Candidate> {
        let n_features = self.x.ncols();
        let features = rand::seq::index::sample(&mut self.rng, n_features, self.features_per_split);

        let parent_impurity = total * gini(positive / total);
        let mut best: Option<Candidate> = None;
        let mut column: Vec<(f64, bool, f64)> = Vec::with_capacity(indices.len());

        for feature in features.iter() {
            column.clear();
            column.extend(indices.iter().map(|&i| (self.x[[i, feature]], self.y[i], self.weights[i])));
            column.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left_pos = 0.0;
            let mut left_total = 0.0;

            for k in 0..column.len() - 1 {
                let (value, label, weight) = column[k];
                if label {
                    left_pos += weight;
                }
                left_total += weight;

                let next = column[k + 1].0;
                if !(value < next) {
                    continue;
                }

                let right_total = total - left_total;
                if left_total <= 0.0 || right_total <= 0.0 {
                    continue;
                }
                let right_pos = positive - left_pos;
                let impurity = left_total * gini(left_pos / left_total)
                    + right_total * gini(right_pos / right_total);

                let improves = match &best {
                    Some(b) => impurity < b.impurity - 1e-12,
                    None => true,
                };
                if improves {
                    let mut threshold = value + (next - value) / 2.0;
                    if threshold >= next || !threshold.is_finite() {
                        threshold = value;
                    }
                    best = Some(Candidate { feature, threshold, impurity });
                }
            }
        }

        best.filter(|b| b.impurity < parent_impurity - 1e-12)
    }
}

// ============================================================================
// FOREST
// ============================================================================

/// Ensemble of decision trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    params: ForestParams,
    n_features: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Fit on an (already normalized) matrix with boolean labels.
    pub fn fit(x: ArrayView2<f64>, y: &[bool], params: &ForestParams) -> Result<Self, FitError> {
        params.check()?;

        let n = x.nrows();
        if n == 0 {
            return Err(FitError::Empty);
        }
        if y.len() != n {
            return Err(FitError::ShapeMismatch {
                rows: n,
                labels: y.len(),
            });
        }

        let n_pos = y.iter().filter(|&&l| l).count();
        let n_neg = n - n_pos;
        if n_pos == 0 || n_neg == 0 {
            return Err(FitError::SingleClass);
        }

        let (w_pos, w_neg) = if params.balanced_class_weight {
            (n as f64 / (2.0 * n_pos as f64), n as f64 / (2.0 * n_neg as f64))
        } else {
            (1.0, 1.0)
        };

        let trees: Vec<DecisionTree> = (0..params.n_trees)
            .into_par_iter()
            .map(|t| {
                let mut rng = StdRng::seed_from_u64(params.seed.wrapping_add(t as u64));

                let mut counts = vec![0u32; n];
                for _ in 0..n {
                    counts[rng.gen_range(0..n)] += 1;
                }

                let mut weights = vec![0.0; n];
                let mut indices = Vec::with_capacity(n);
                for (i, &count) in counts.iter().enumerate() {
                    if count > 0 {
                        indices.push(i);
                        weights[i] = count as f64 * if y[i] { w_pos } else { w_neg };
                    }
                }

                DecisionTree::fit(x, y, &weights, &mut indices, params, rng)
            })
            .collect();

        log::debug!(
            "Forest fit: {} trees, {} samples ({} phishing), max depth {}",
            trees.len(),
            n,
            n_pos,
            trees.iter().map(DecisionTree::depth).max().unwrap_or(0)
        );

        Ok(Self {
            params: params.clone(),
            n_features: x.ncols(),
            trees,
        })
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Structural check after deserialization
    pub(crate) fn validate(&self, expected_features: usize) -> Result<(), String> {
        if self.n_features != expected_features {
            return Err(format!(
                "forest expects {} features, layout has {}",
                self.n_features, expected_features
            ));
        }
        if self.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features)
                .map_err(|e| format!("tree {}: {}", i, e))?;
        }
        Ok(())
    }
}

impl BinaryClassifier for RandomForest {
    fn phishing_probability(&self, row: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.trees.iter().map(|t| t.leaf_probability(row)).sum();
        (sum / self.trees.len() as f64).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    /// Two features; label is `x0 > 0.5`, x1 is noise
    fn separable(n: usize) -> (Array2<f64>, Vec<bool>) {
        let mut rng = StdRng::seed_from_u64(7);
        let mut x = Array2::zeros((n, 2));
        let mut y = Vec::with_capacity(n);
        for i in 0..n {
            let a: f64 = rng.gen();
            x[[i, 0]] = a;
            x[[i, 1]] = rng.gen();
            y.push(a > 0.5);
        }
        (x, y)
    }

    fn small_params() -> ForestParams {
        ForestParams {
            n_trees: 10,
            max_features: Some(2),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_params() {
        let params = ForestParams::default();
        assert_eq!(params.n_trees, 150);
        assert_eq!(params.max_depth, 15);
        assert_eq!(params.min_samples_split, 5);
        assert!(params.balanced_class_weight);
        assert_eq!(params.seed, 42);
        assert_eq!(params.features_per_split(18), 4);
    }

    #[test]
    fn test_fit_learns_separable_data() {
        let (x, y) = separable(200);
        let forest = RandomForest::fit(x.view(), &y, &small_params()).unwrap();

        assert_eq!(forest.trees().len(), 10);
        assert!(forest.phishing_probability(&[0.9, 0.5]) > 0.8);
        assert!(forest.phishing_probability(&[0.1, 0.5]) < 0.2);
        assert!(forest.predict_label(&[0.95, 0.1]));
        assert!(!forest.predict_label(&[0.05, 0.9]));
    }

    #[test]
    fn test_fit_is_deterministic_for_seed() {
        let (x, y) = separable(120);
        let a = RandomForest::fit(x.view(), &y, &small_params()).unwrap();
        let b = RandomForest::fit(x.view(), &y, &small_params()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_depth_is_bounded() {
        let (x, y) = separable(300);
        let params = ForestParams {
            max_depth: 2,
            ..small_params()
        };
        let forest = RandomForest::fit(x.view(), &y, &params).unwrap();
        assert!(forest.trees().iter().all(|t| t.depth() <= 2));
    }

    #[test]
    fn test_single_class_rejected() {
        let x = Array2::zeros((4, 2));
        let y = vec![true; 4];
        assert!(matches!(
            RandomForest::fit(x.view(), &y, &small_params()),
            Err(FitError::SingleClass)
        ));
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let x = Array2::zeros((4, 2));
        let y = vec![true, false];
        assert!(matches!(
            RandomForest::fit(x.view(), &y, &small_params()),
            Err(FitError::ShapeMismatch { rows: 4, labels: 2 })
        ));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let (x, y) = separable(20);
        let params = ForestParams {
            n_trees: 0,
            ..Default::default()
        };
        assert!(matches!(
            RandomForest::fit(x.view(), &y, &params),
            Err(FitError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_validate_catches_bad_child() {
        let (x, y) = separable(50);
        let mut forest = RandomForest::fit(x.view(), &y, &small_params()).unwrap();
        assert!(forest.validate(2).is_ok());
        assert!(forest.validate(3).is_err());

        forest.trees[0].nodes[0] = Node::Split {
            feature: 0,
            threshold: 0.5,
            left: 0,
            right: 0,
        };
        assert!(forest.validate(2).is_err());
    }

    #[test]
    fn test_tie_resolves_to_legitimate() {
        let forest = RandomForest {
            params: ForestParams::default(),
            n_features: 1,
            trees: vec![
                DecisionTree { nodes: vec![Node::Leaf { probability: 1.0 }] },
                DecisionTree { nodes: vec![Node::Leaf { probability: 0.0 }] },
            ],
        };
        assert_eq!(forest.phishing_probability(&[0.0]), 0.5);
        assert!(!forest.predict_label(&[0.0]));
    }
}
