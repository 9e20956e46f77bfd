//! Decision tree classifier backed by `linfa-trees`.
//!
//! linfa searches the splits. Its own predictions are majority labels, so the
//! fitted tree is copied into a flat node table and each leaf keeps the
//! fraction of positive training samples routed to it. That fraction is the
//! positive-class probability.
use linfa::traits::Fit;
use linfa::Dataset;
use linfa_trees::{DecisionTree, SplitQuality, TreeNode};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::config::SplitCriterion;
use crate::encoding::IndicatorMatrix;
use crate::error::{CatfoldError, Result};
use crate::models::classifier_trait::{
    check_fit_input, two_class_proba, warn_if_dense_is_large, ClassifierModel,
};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DecisionTreeParams {
    pub criterion: SplitCriterion,
    /// `None` grows until leaves are pure or too small to split.
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Smallest impurity decrease a split must reach. Must be positive.
    pub min_impurity_decrease: f64,
}

impl Default for DecisionTreeParams {
    fn default() -> Self {
        Self {
            criterion: SplitCriterion::Gini,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            min_impurity_decrease: 1e-5,
        }
    }
}

impl DecisionTreeParams {
    fn linfa_params(&self) -> linfa_trees::DecisionTreeParams<f64, usize> {
        let quality = match self.criterion {
            SplitCriterion::Gini => SplitQuality::Gini,
            SplitCriterion::Entropy => SplitQuality::Entropy,
        };
        DecisionTree::params()
            .split_quality(quality)
            .max_depth(self.max_depth)
            .min_weight_split(self.min_samples_split as f32)
            .min_weight_leaf(self.min_samples_leaf as f32)
            .min_impurity_decrease(self.min_impurity_decrease)
    }
}

#[derive(Debug, Clone)]
enum Node {
    Leaf,
    Split {
        feature: usize,
        threshold: f64,
        below: usize,
        above: usize,
    },
}

/// A fitted tree; shared with the random forest.
#[derive(Debug, Clone)]
pub(crate) struct Tree {
    nodes: Vec<Node>,
    /// Positive-class probability per node; only leaf entries are read.
    values: Vec<f64>,
}

impl Tree {
    /// Fit a linfa tree on the `samples` rows (duplicates allowed) and the
    /// `features` columns of `dense`.
    pub(crate) fn fit(
        model: &str,
        dense: &Array2<f64>,
        y: &[u8],
        samples: &[usize],
        features: &[usize],
        params: &DecisionTreeParams,
    ) -> Result<Tree> {
        if samples.is_empty() {
            return Err(CatfoldError::ModelFit {
                model: model.to_string(),
                reason: "no training samples".into(),
            });
        }

        let records = dense.select(Axis(0), samples).select(Axis(1), features);
        let targets = Array1::from_iter(samples.iter().map(|&i| y[i] as usize));
        let dataset = Dataset::new(records, targets);
        let fitted = params
            .linfa_params()
            .fit(&dataset)
            .map_err(|e| CatfoldError::ModelFit {
                model: model.to_string(),
                reason: e.to_string(),
            })?;

        let mut tree = Tree::flatten(fitted.root_node(), features);
        tree.set_leaf_fractions(dense, y, samples);
        Ok(tree)
    }

    /// Copy linfa's node tree, mapping split features back to columns of the
    /// full matrix. Leaves start out with linfa's majority label.
    fn flatten(root: &TreeNode<f64, usize>, features: &[usize]) -> Tree {
        let mut nodes = vec![Node::Leaf];
        let mut values = vec![0.0];
        let mut stack = vec![(root, 0usize)];

        while let Some((node, id)) = stack.pop() {
            let children = node.children();
            let left = children.first().copied().and_then(|c| c.as_deref());
            let right = children.get(1).copied().and_then(|c| c.as_deref());
            match (node.is_leaf(), left, right) {
                (false, Some(left), Some(right)) => {
                    let (feature, threshold, _) = node.split();
                    let below = nodes.len();
                    let above = below + 1;
                    for _ in 0..2 {
                        nodes.push(Node::Leaf);
                        values.push(0.0);
                    }
                    nodes[id] = Node::Split {
                        feature: features[feature],
                        threshold,
                        below,
                        above,
                    };
                    stack.push((left, below));
                    stack.push((right, above));
                }
                _ => values[id] = node.prediction().map_or(0.0, |label| label as f64),
            }
        }

        Tree { nodes, values }
    }

    fn leaf<F: Fn(usize) -> f64>(&self, value_of: F) -> usize {
        let mut id = 0;
        while let Node::Split {
            feature,
            threshold,
            below,
            above,
        } = &self.nodes[id]
        {
            id = if value_of(*feature) < *threshold {
                *below
            } else {
                *above
            };
        }
        id
    }

    fn set_leaf_fractions(&mut self, dense: &Array2<f64>, y: &[u8], samples: &[usize]) {
        // node -> (samples, positives)
        let mut counts = vec![(0usize, 0usize); self.nodes.len()];
        for &i in samples {
            let leaf = self.leaf(|f| dense[[i, f]]);
            counts[leaf].0 += 1;
            counts[leaf].1 += y[i] as usize;
        }
        for (value, (n, pos)) in self.values.iter_mut().zip(counts) {
            if n > 0 {
                *value = pos as f64 / n as f64;
            }
        }
    }

    pub(crate) fn predict_row(&self, row: &[usize]) -> f64 {
        let leaf = self.leaf(|f| if row.binary_search(&f).is_ok() { 1.0 } else { 0.0 });
        self.values[leaf]
    }

    pub(crate) fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf))
            .count()
    }

    pub(crate) fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            if let Node::Split { below, above, .. } = &self.nodes[id] {
                stack.push((*below, depth + 1));
                stack.push((*above, depth + 1));
            }
        }
        max_depth
    }
}

/// Single decision tree classifier.
pub struct DecisionTreeClassifier {
    params: DecisionTreeParams,
    tree: Option<Tree>,
    name: String,
}

impl DecisionTreeClassifier {
    pub fn new(params: DecisionTreeParams) -> Self {
        let name = match params.criterion {
            SplitCriterion::Gini => "decision_tree_gini",
            SplitCriterion::Entropy => "decision_tree_entropy",
        }
        .to_string();
        DecisionTreeClassifier {
            params,
            tree: None,
            name,
        }
    }

    /// Depth of the fitted tree, `None` before `fit`.
    pub fn depth(&self) -> Option<usize> {
        self.tree.as_ref().map(Tree::depth)
    }

    pub fn n_leaves(&self) -> Option<usize> {
        self.tree.as_ref().map(Tree::n_leaves)
    }
}

impl ClassifierModel for DecisionTreeClassifier {
    fn fit(&mut self, x: &IndicatorMatrix, y: &[u8]) -> Result<()> {
        check_fit_input(x, y)?;
        warn_if_dense_is_large(x, &self.name);
        let dense = x.to_dense();
        let samples: Vec<usize> = (0..x.nrows()).collect();
        let features: Vec<usize> = (0..x.ncols()).collect();
        let tree = Tree::fit(&self.name, &dense, y, &samples, &features, &self.params)?;
        log::debug!(
            "Fitted {} with depth {} and {} leaves",
            self.name,
            tree.depth(),
            tree.n_leaves()
        );
        self.tree = Some(tree);
        Ok(())
    }

    fn predict_proba(&self, x: &IndicatorMatrix) -> Result<Array2<f64>> {
        let tree = self.tree.as_ref().ok_or(CatfoldError::NotFitted)?;
        let positive: Vec<f64> = (0..x.nrows()).map(|r| tree.predict_row(x.row(r))).collect();
        Ok(two_class_proba(&positive))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
