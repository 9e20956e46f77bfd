use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::models::decision_tree::DecisionTreeParams;
use crate::models::gbdt::GbdtParams;
use crate::models::logistic::LogisticRegressionParams;
use crate::models::random_forest::RandomForestParams;

/// Impurity measure used to pick tree splits.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SplitCriterion {
    Gini,
    Entropy,
}

/// Number of features each tree of a random forest is grown on.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MaxFeatures {
    All,
    Sqrt,
    Log2,
    Fixed(usize),
}

impl MaxFeatures {
    pub fn resolve(&self, n_features: usize) -> usize {
        let m = match self {
            MaxFeatures::All => n_features,
            MaxFeatures::Sqrt => (n_features as f64).sqrt() as usize,
            MaxFeatures::Log2 => (n_features as f64).log2() as usize,
            MaxFeatures::Fixed(m) => *m,
        };
        m.clamp(1, n_features.max(1))
    }
}

/// Supported model types and their hyper-parameters.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub enum ModelType {
    DecisionTree(DecisionTreeParams),
    RandomForest(RandomForestParams),
    LogisticRegression(LogisticRegressionParams),
    GBDT(GbdtParams),
}

impl ModelType {
    /// Registry keys that `from_str` understands.
    ///
    /// Every one of these learners densifies the one-hot matrix, and `gbdt`
    /// additionally copies each row into its own `Vec<f32>`. Memory therefore
    /// scales with `rows * encoded columns`.
    pub const BUILTIN_KEYS: [&'static str; 5] = [
        "decision_tree_gini",
        "decision_tree_entropy",
        "rf",
        "log_reg",
        "gbdt",
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ModelType::DecisionTree(_) => "decision_tree",
            ModelType::RandomForest(_) => "random_forest",
            ModelType::LogisticRegression(_) => "logistic_regression",
            ModelType::GBDT(_) => "gbdt",
        }
    }
}

impl Default for ModelType {
    fn default() -> Self {
        ModelType::RandomForest(RandomForestParams::default())
    }
}

impl FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "decision_tree_gini" => Ok(ModelType::DecisionTree(DecisionTreeParams {
                criterion: SplitCriterion::Gini,
                ..DecisionTreeParams::default()
            })),
            "decision_tree_entropy" => Ok(ModelType::DecisionTree(DecisionTreeParams {
                criterion: SplitCriterion::Entropy,
                ..DecisionTreeParams::default()
            })),
            "rf" => Ok(ModelType::RandomForest(RandomForestParams::default())),
            "log_reg" => Ok(ModelType::LogisticRegression(
                LogisticRegressionParams::default(),
            )),
            "gbdt" => Ok(ModelType::GBDT(GbdtParams::default())),
            _ => Err(format!(
                "Unknown model type: {}. Expected one of: {}",
                s,
                Self::BUILTIN_KEYS.join(", ")
            )),
        }
    }
}
