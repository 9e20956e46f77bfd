//! Per-fold training and evaluation.
//!
//! For a fold `f`, records with `kfold != f` train a fresh model and records
//! with `kfold == f` are scored by ROC AUC. Categorical features are one-hot
//! encoded with a vocabulary fit on the union of both sides of the split.
//! That union fit means validation-only categories enter the vocabulary (a
//! mild leakage); it guarantees transform never meets an unknown category.
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::data_handling::Dataset;
use crate::encoding::OneHotEncoder;
use crate::error::{CatfoldError, Result};
use crate::folds::FOLD_COLUMN;
use crate::metrics::{roc_auc_score, roc_curve, RocCurve};
use crate::models::classifier_trait::positive_class_proba;
use crate::models::registry::ModelRegistry;

/// Column roles and missing-value handling for evaluation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EvalSettings {
    pub id_column: String,
    pub target_column: String,
    pub fold_column: String,
    /// Category substituted for empty feature values.
    pub missing_token: String,
}

impl Default for EvalSettings {
    fn default() -> Self {
        Self {
            id_column: "id".to_string(),
            target_column: "target".to_string(),
            fold_column: FOLD_COLUMN.to_string(),
            missing_token: "NONE".to_string(),
        }
    }
}

/// Row indices of one train/validation split.
#[derive(Debug, Clone, PartialEq)]
pub struct FoldSplit {
    pub fold: usize,
    pub train: Vec<usize>,
    pub valid: Vec<usize>,
}

/// Split rows by fold id: `valid` holds rows of `fold`, `train` the rest.
pub fn split_by_fold(fold_ids: &[usize], fold: usize) -> Result<FoldSplit> {
    let (valid, train): (Vec<usize>, Vec<usize>) =
        (0..fold_ids.len()).partition(|&i| fold_ids[i] == fold);
    if valid.is_empty() {
        let available: BTreeSet<usize> = fold_ids.iter().copied().collect();
        return Err(CatfoldError::InvalidFold {
            fold,
            available: available.into_iter().collect(),
        });
    }
    Ok(FoldSplit { fold, train, valid })
}

/// Result of scoring one fold.
#[derive(Debug, Clone)]
pub struct FoldScore {
    pub fold: usize,
    pub model: String,
    pub auc: f64,
    pub n_train: usize,
    pub n_valid: usize,
    /// Width of the one-hot matrix.
    pub n_features: usize,
    pub roc: RocCurve,
}

/// Outcome of one fold when running all folds; failures do not stop the loop.
#[derive(Debug, Clone)]
pub struct FoldOutcome {
    pub fold: usize,
    pub result: std::result::Result<FoldScore, CatfoldError>,
}

/// Mean and spread of fold AUCs.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossValidationSummary {
    pub model: String,
    pub n_scored: usize,
    pub n_failed: usize,
    /// `NaN` when no fold was scored.
    pub mean_auc: f64,
    /// Sample standard deviation; `NaN` with fewer than two scored folds.
    pub std_auc: f64,
}

impl CrossValidationSummary {
    pub fn from_outcomes(model: &str, outcomes: &[FoldOutcome]) -> Self {
        let aucs: Vec<f64> = outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().map(|s| s.auc))
            .collect();
        let (mean_auc, std_auc) = if aucs.is_empty() {
            (f64::NAN, f64::NAN)
        } else {
            (aucs.iter().mean(), aucs.iter().std_dev())
        };
        Self {
            model: model.to_string(),
            n_scored: aucs.len(),
            n_failed: outcomes.len() - aucs.len(),
            mean_auc,
            std_auc,
        }
    }
}

/// Trains and scores models fold by fold over one augmented dataset.
pub struct FoldEvaluator<'a> {
    dataset: &'a Dataset,
    registry: &'a ModelRegistry,
    settings: EvalSettings,
    feature_columns: Vec<usize>,
    fold_ids: Vec<usize>,
    labels: Vec<u8>,
}

impl<'a> FoldEvaluator<'a> {
    /// Validate the dataset and cache labels, fold ids and feature columns.
    pub fn new(
        dataset: &'a Dataset,
        registry: &'a ModelRegistry,
        settings: EvalSettings,
    ) -> Result<Self> {
        let target_idx = dataset.column_index(&settings.target_column)?;
        let fold_idx = dataset.column_index(&settings.fold_column)?;
        let id_idx = dataset.column_index(&settings.id_column).ok();

        let labels = dataset.binary_labels(&settings.target_column)?;
        let fold_ids = dataset.fold_ids(&settings.fold_column)?;

        let feature_columns: Vec<usize> = (0..dataset.columns().len())
            .filter(|&c| c != target_idx && c != fold_idx && Some(c) != id_idx)
            .collect();

        log::debug!(
            "Evaluator ready: {} records, {} categorical features",
            dataset.len(),
            feature_columns.len()
        );

        Ok(Self {
            dataset,
            registry,
            settings,
            feature_columns,
            fold_ids,
            labels,
        })
    }

    pub fn settings(&self) -> &EvalSettings {
        &self.settings
    }

    /// Names of the columns treated as categorical features.
    pub fn feature_names(&self) -> Vec<String> {
        self.feature_columns
            .iter()
            .map(|&c| self.dataset.columns()[c].clone())
            .collect()
    }

    /// Distinct fold ids present in the dataset, ascending.
    pub fn folds(&self) -> Vec<usize> {
        let folds: BTreeSet<usize> = self.fold_ids.iter().copied().collect();
        folds.into_iter().collect()
    }

    /// Number of folds implied by the fold column: one past the largest id.
    ///
    /// Gaps in the ids are kept, so a missing fold is reported when it is run.
    pub fn fold_count(&self) -> usize {
        self.fold_ids.iter().max().map_or(0, |&max| max + 1)
    }

    pub fn split(&self, fold: usize) -> Result<FoldSplit> {
        split_by_fold(&self.fold_ids, fold)
    }

    /// Feature values of `rows`, missing values replaced by the sentinel token.
    fn categorical_rows(&self, rows: &[usize]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|&r| {
                self.feature_columns
                    .iter()
                    .map(|&c| {
                        self.dataset
                            .value(r, c)
                            .unwrap_or(&self.settings.missing_token)
                            .to_string()
                    })
                    .collect()
            })
            .collect()
    }

    /// Train `model_key` on every fold but `fold` and score it on `fold`.
    pub fn run(&self, fold: usize, model_key: &str) -> Result<FoldScore> {
        let factory = self.registry.resolve(model_key)?;
        let split = self.split(fold)?;

        let feature_names = self.feature_names();
        let train_rows = self.categorical_rows(&split.train);
        let valid_rows = self.categorical_rows(&split.valid);

        let encoder = OneHotEncoder::fit(
            &feature_names,
            train_rows
                .iter()
                .chain(valid_rows.iter())
                .map(|r| r.as_slice()),
        )?;
        let x_train = encoder.transform(&train_rows)?;
        let x_valid = encoder.transform(&valid_rows)?;

        let y_train: Vec<u8> = split.train.iter().map(|&i| self.labels[i]).collect();
        let y_valid: Vec<u8> = split.valid.iter().map(|&i| self.labels[i]).collect();

        log::info!(
            "Learning on fold {} with {} training and {} validation records ({} encoded features)",
            fold,
            split.train.len(),
            split.valid.len(),
            encoder.n_features_out()
        );

        let mut model = factory();
        model.fit(&x_train, &y_train)?;
        let proba = model.predict_proba(&x_valid)?;
        let valid_preds = positive_class_proba(&proba).to_vec();

        let auc = roc_auc_score(&y_valid, &valid_preds)?;
        let roc = roc_curve(&y_valid, &valid_preds)?;

        Ok(FoldScore {
            fold,
            model: model_key.to_string(),
            auc,
            n_train: split.train.len(),
            n_valid: split.valid.len(),
            n_features: encoder.n_features_out(),
            roc,
        })
    }

    /// Run `folds` in order, isolating each fold's error.
    ///
    /// `on_fold` sees every outcome as soon as its fold finishes.
    pub fn run_all<I, F>(&self, model_key: &str, folds: I, mut on_fold: F) -> Vec<FoldOutcome>
    where
        I: IntoIterator<Item = usize>,
        F: FnMut(&FoldOutcome),
    {
        folds
            .into_iter()
            .map(|fold| {
                let outcome = FoldOutcome {
                    fold,
                    result: self.run(fold, model_key),
                };
                if let Err(e) = &outcome.result {
                    log::debug!("Fold {} failed ({}): {}", fold, e.kind(), e);
                }
                on_fold(&outcome);
                outcome
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_by_fold_partitions_rows() {
        let folds = vec![0, 1, 2, 0, 1, 2, 0];
        for f in 0..3 {
            let split = split_by_fold(&folds, f).unwrap();
            assert_eq!(split.train.len() + split.valid.len(), folds.len());
            assert!(split.valid.iter().all(|&i| folds[i] == f));
            assert!(split.train.iter().all(|&i| folds[i] != f));
        }
    }

    #[test]
    fn test_split_by_missing_fold() {
        let err = split_by_fold(&[0, 0, 2], 1).unwrap_err();
        assert_eq!(
            err,
            CatfoldError::InvalidFold {
                fold: 1,
                available: vec![0, 2]
            }
        );
    }

    #[test]
    fn test_summary_ignores_failed_folds() {
        let ok = |fold: usize, auc: f64| FoldOutcome {
            fold,
            result: Ok(FoldScore {
                fold,
                model: "rf".into(),
                auc,
                n_train: 8,
                n_valid: 2,
                n_features: 3,
                roc: RocCurve {
                    fpr: vec![0.0, 1.0],
                    tpr: vec![0.0, 1.0],
                    thresholds: vec![f64::INFINITY, 0.5],
                },
            }),
        };
        let outcomes = vec![
            ok(0, 0.6),
            ok(1, 0.8),
            FoldOutcome {
                fold: 2,
                result: Err(CatfoldError::UndefinedMetric {
                    reason: "only one class present in y_true".into(),
                }),
            },
        ];
        let summary = CrossValidationSummary::from_outcomes("rf", &outcomes);
        assert_eq!(summary.n_scored, 2);
        assert_eq!(summary.n_failed, 1);
        assert!((summary.mean_auc - 0.7).abs() < 1e-12);
        assert!((summary.std_auc - 0.02f64.sqrt()).abs() < 1e-12);
    }
}
