//! Bagged ensemble of `linfa-trees` decision trees.
//!
//! Each tree is grown on a bootstrap sample and on a random subset of the
//! feature columns, `max_features` of them. linfa examines every column it is
//! given, so the subset is drawn once per tree rather than per split.
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{MaxFeatures, SplitCriterion};
use crate::encoding::IndicatorMatrix;
use crate::error::{CatfoldError, Result};
use crate::models::classifier_trait::{
    check_fit_input, two_class_proba, warn_if_dense_is_large, ClassifierModel,
};
use crate::models::decision_tree::{DecisionTreeParams, Tree};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RandomForestParams {
    pub n_estimators: usize,
    pub criterion: SplitCriterion,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: MaxFeatures,
    /// Draw a bootstrap sample for each tree; otherwise every tree sees all rows.
    pub bootstrap: bool,
    pub seed: Option<u64>,
}

impl Default for RandomForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            criterion: SplitCriterion::Gini,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            seed: None,
        }
    }
}

impl RandomForestParams {
    fn tree_params(&self) -> DecisionTreeParams {
        DecisionTreeParams {
            criterion: self.criterion,
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            ..DecisionTreeParams::default()
        }
    }
}

/// Random forest classifier; probabilities are the mean of the trees' leaf fractions.
pub struct RandomForestClassifier {
    params: RandomForestParams,
    trees: Vec<Tree>,
}

impl RandomForestClassifier {
    pub fn new(params: RandomForestParams) -> Self {
        RandomForestClassifier {
            params,
            trees: Vec::new(),
        }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl ClassifierModel for RandomForestClassifier {
    fn fit(&mut self, x: &IndicatorMatrix, y: &[u8]) -> Result<()> {
        check_fit_input(x, y)?;
        warn_if_dense_is_large(x, "rf");
        let n = x.nrows();
        let n_features = x.ncols();
        let tree_params = self.params.tree_params();
        let bootstrap = self.params.bootstrap;
        let m = self.params.max_features.resolve(n_features);
        let dense = x.to_dense();

        // Per-tree seeds are drawn up front so the fitted forest does not
        // depend on how rayon schedules the trees.
        let mut rng = match self.params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let seeds: Vec<u64> = (0..self.params.n_estimators.max(1))
            .map(|_| rng.gen())
            .collect();

        let trees = seeds
            .into_par_iter()
            .map(|seed| {
                let mut tree_rng = StdRng::seed_from_u64(seed);
                let samples: Vec<usize> = if bootstrap && n > 0 {
                    (0..n).map(|_| tree_rng.gen_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };
                let mut features: Vec<usize> = (0..n_features).collect();
                if m < n_features {
                    features.shuffle(&mut tree_rng);
                    features.truncate(m);
                    features.sort_unstable();
                }
                Tree::fit("rf", &dense, y, &samples, &features, &tree_params)
            })
            .collect::<Result<Vec<Tree>>>()?;
        self.trees = trees;

        log::debug!(
            "Fitted random forest with {} trees on {} samples, {} of {} features per tree",
            self.trees.len(),
            n,
            m.min(n_features),
            n_features
        );
        Ok(())
    }

    fn predict_proba(&self, x: &IndicatorMatrix) -> Result<Array2<f64>> {
        if self.trees.is_empty() {
            return Err(CatfoldError::NotFitted);
        }
        let n_trees = self.trees.len() as f64;
        let positive: Vec<f64> = (0..x.nrows())
            .into_par_iter()
            .map(|r| {
                let row = x.row(r);
                self.trees.iter().map(|t| t.predict_row(row)).sum::<f64>() / n_trees
            })
            .collect();
        Ok(two_class_proba(&positive))
    }

    fn name(&self) -> &str {
        "rf"
    }
}
