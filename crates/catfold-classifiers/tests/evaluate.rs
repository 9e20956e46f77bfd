//! Integration tests for the per-fold train/evaluate loop.

mod common;

use catfold_classifiers::data_handling::Dataset;
use catfold_classifiers::encoding::IndicatorMatrix;
use catfold_classifiers::error::{CatfoldError, Result};
use catfold_classifiers::evaluate::{CrossValidationSummary, EvalSettings, FoldEvaluator};
use catfold_classifiers::folds::{assign_folds, FOLD_COLUMN};
use catfold_classifiers::models::classifier_trait::{two_class_proba, ClassifierModel};
use catfold_classifiers::models::registry::ModelRegistry;
use ndarray::Array2;

use common::{init_logging, synthetic_dataset};

/// Predicts the positive-class rate seen during training for every row.
struct PriorModel {
    rate: Option<f64>,
}

impl ClassifierModel for PriorModel {
    fn fit(&mut self, _x: &IndicatorMatrix, y: &[u8]) -> Result<()> {
        let pos = y.iter().filter(|&&v| v == 1).count();
        self.rate = Some(pos as f64 / y.len().max(1) as f64);
        Ok(())
    }

    fn predict_proba(&self, x: &IndicatorMatrix) -> Result<Array2<f64>> {
        let rate = self.rate.ok_or(CatfoldError::NotFitted)?;
        Ok(two_class_proba(&vec![rate; x.nrows()]))
    }

    fn name(&self) -> &str {
        "prior"
    }
}

fn folded(n: usize, n_pos: usize, k: usize) -> Dataset {
    assign_folds(&synthetic_dataset(n, n_pos, 17), "target", k, Some(5)).unwrap()
}

// ---------------------------------------------------------------------------
// Splits
// ---------------------------------------------------------------------------

#[test]
fn train_and_validation_partition_the_dataset() {
    let ds = folded(120, 30, 4);
    let registry = ModelRegistry::with_defaults();
    let evaluator = FoldEvaluator::new(&ds, &registry, EvalSettings::default()).unwrap();
    let folds = ds.fold_ids(FOLD_COLUMN).unwrap();

    assert_eq!(evaluator.folds(), vec![0, 1, 2, 3]);
    assert_eq!(evaluator.fold_count(), 4);
    for f in evaluator.folds() {
        let split = evaluator.split(f).unwrap();
        let mut all: Vec<usize> = split.train.iter().chain(&split.valid).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..ds.len()).collect::<Vec<_>>());
        assert!(split.valid.iter().all(|&i| folds[i] == f));
        assert!(split.train.iter().all(|&i| folds[i] != f));
    }
}

#[test]
fn id_target_and_fold_columns_are_not_features() {
    let ds = folded(60, 20, 3);
    let registry = ModelRegistry::with_defaults();
    let evaluator = FoldEvaluator::new(&ds, &registry, EvalSettings::default()).unwrap();
    assert_eq!(evaluator.feature_names(), vec!["signal", "noise"]);
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

#[test]
fn every_builtin_model_scores_every_fold() {
    init_logging();
    let ds = folded(300, 60, 3);
    let registry = ModelRegistry::with_defaults();
    let evaluator = FoldEvaluator::new(&ds, &registry, EvalSettings::default()).unwrap();

    for key in ["decision_tree_gini", "decision_tree_entropy", "rf", "log_reg", "gbdt"] {
        let outcomes = evaluator.run_all(key, 0..3, |_| {});
        assert_eq!(outcomes.len(), 3);
        for outcome in &outcomes {
            let score = outcome.result.as_ref().unwrap();
            assert!((0.0..=1.0).contains(&score.auc), "{}: {}", key, score.auc);
            assert_eq!(score.n_train + score.n_valid, 300);
            assert_eq!(score.n_valid, 100);
        }
    }
}

#[test]
fn signal_feature_is_learned() {
    let ds = folded(1000, 100, 5);
    let registry = ModelRegistry::with_defaults();
    let evaluator = FoldEvaluator::new(&ds, &registry, EvalSettings::default()).unwrap();

    let outcomes = evaluator.run_all("log_reg", evaluator.folds(), |_| {});
    let summary = CrossValidationSummary::from_outcomes("log_reg", &outcomes);
    assert_eq!(summary.n_scored, 5);
    assert!(summary.mean_auc > 0.7, "mean AUC {}", summary.mean_auc);
}

#[test]
fn outcomes_are_reported_as_each_fold_finishes() {
    let ds = folded(100, 20, 5);
    let mut registry = ModelRegistry::empty();
    registry.register("prior", || Box::new(PriorModel { rate: None }));
    let evaluator = FoldEvaluator::new(&ds, &registry, EvalSettings::default()).unwrap();

    let mut seen = Vec::new();
    let outcomes = evaluator.run_all("prior", vec![3, 0, 7], |outcome| {
        seen.push((outcome.fold, outcome.result.is_ok()))
    });
    assert_eq!(seen, vec![(3, true), (0, true), (7, false)]);
    assert_eq!(
        outcomes.iter().map(|o| o.fold).collect::<Vec<_>>(),
        vec![3, 0, 7]
    );
}

#[test]
fn injected_model_is_used() {
    let ds = folded(100, 20, 5);
    let mut registry = ModelRegistry::empty();
    registry.register("prior", || Box::new(PriorModel { rate: None }));
    let evaluator = FoldEvaluator::new(&ds, &registry, EvalSettings::default()).unwrap();

    // A constant score ranks nothing: AUC is exactly one half.
    let score = evaluator.run(0, "prior").unwrap();
    assert_eq!(score.auc, 0.5);
    assert_eq!(score.model, "prior");
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn single_class_validation_is_undefined_metric() {
    // Fold 1 holds only negatives.
    let columns = vec!["id".into(), "f".into(), "target".into(), FOLD_COLUMN.into()];
    let rows = [
        ("a", "1", "0"),
        ("b", "0", "0"),
        ("a", "1", "0"),
        ("b", "0", "0"),
        ("a", "0", "1"),
        ("b", "0", "1"),
    ];
    let records = rows
        .iter()
        .enumerate()
        .map(|(i, (f, y, k))| {
            vec![
                Some(i.to_string()),
                Some(f.to_string()),
                Some(y.to_string()),
                Some(k.to_string()),
            ]
        })
        .collect();
    let ds = Dataset::new(columns, records).unwrap();
    let registry = ModelRegistry::with_defaults();
    let evaluator = FoldEvaluator::new(&ds, &registry, EvalSettings::default()).unwrap();

    let err = evaluator.run(1, "decision_tree_gini").unwrap_err();
    assert!(matches!(err, CatfoldError::UndefinedMetric { .. }));
    assert_eq!(err.kind(), "UndefinedMetricError");
}

#[test]
fn unknown_model_is_reported_before_training() {
    let ds = folded(50, 10, 5);
    let registry = ModelRegistry::with_defaults();
    let evaluator = FoldEvaluator::new(&ds, &registry, EvalSettings::default()).unwrap();
    let err = evaluator.run(0, "nonexistent_key").unwrap_err();
    assert!(matches!(err, CatfoldError::UnknownModel { .. }));
}

#[test]
fn failing_fold_does_not_stop_the_rest() {
    let ds = folded(100, 20, 5);
    let registry = ModelRegistry::with_defaults();
    let evaluator = FoldEvaluator::new(&ds, &registry, EvalSettings::default()).unwrap();

    // Ask for one fold more than exists.
    let outcomes = evaluator.run_all("decision_tree_gini", 0..6, |_| {});
    assert_eq!(outcomes.len(), 6);
    assert!(outcomes[..5].iter().all(|o| o.result.is_ok()));
    assert!(matches!(
        outcomes[5].result,
        Err(CatfoldError::InvalidFold { fold: 5, .. })
    ));

    let summary = CrossValidationSummary::from_outcomes("decision_tree_gini", &outcomes);
    assert_eq!(summary.n_failed, 1);
}

#[test]
fn missing_fold_column_is_schema_error() {
    let ds = synthetic_dataset(20, 5, 1);
    let registry = ModelRegistry::with_defaults();
    match FoldEvaluator::new(&ds, &registry, EvalSettings::default()) {
        Err(CatfoldError::Schema { column }) => assert_eq!(column, FOLD_COLUMN),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("expected a schema error"),
    }
}

#[test]
fn custom_missing_token_is_applied() {
    let ds = folded(80, 20, 4);
    let registry = ModelRegistry::with_defaults();
    let settings = EvalSettings {
        missing_token: "UNSEEN".into(),
        ..EvalSettings::default()
    };
    let evaluator = FoldEvaluator::new(&ds, &registry, settings).unwrap();
    assert_eq!(evaluator.settings().missing_token, "UNSEEN");
    // signal: Cold/Hot, noise: UNSEEN/a/b/c
    let score = evaluator.run(0, "log_reg").unwrap();
    assert_eq!(score.n_features, 6);
}
