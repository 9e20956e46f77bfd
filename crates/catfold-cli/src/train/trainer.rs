//! Fold-by-fold training driver for the `train` subcommand.
use std::io::Write;

use anyhow::{bail, Context, Result};

use catfold_classifiers::evaluate::{CrossValidationSummary, FoldEvaluator, FoldOutcome};
use catfold_classifiers::io::read_dataset;
use catfold_classifiers::models::registry::ModelRegistry;
use catfold_classifiers::report::write_cv_report;

use crate::train::input::TrainConfig;
use crate::util::validate_csv_file;

/// Results of a training run.
#[derive(Debug)]
pub struct TrainSummary {
    pub outcomes: Vec<FoldOutcome>,
    pub summary: CrossValidationSummary,
}

impl TrainSummary {
    pub fn all_folds_scored(&self) -> bool {
        self.summary.n_failed == 0
    }
}

/// Built-in models plus the ones declared in the config.
pub fn build_registry(config: &TrainConfig) -> ModelRegistry {
    let mut registry = ModelRegistry::with_defaults();
    for (key, model_type) in &config.models {
        registry.register_config(key, model_type.clone());
    }
    registry
}

/// Train and score `model_key` on every fold, printing one line per fold to stdout.
pub fn run_training(config: &TrainConfig, model_key: &str) -> Result<TrainSummary> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_training_to(config, model_key, &mut out)
}

/// Same as [`run_training`], writing the fold lines to `out`.
///
/// The model key is resolved before the training file is touched. Without an
/// explicit fold count every fold in the file is evaluated. A failing fold is
/// logged and the remaining folds still run.
pub fn run_training_to<W: Write>(
    config: &TrainConfig,
    model_key: &str,
    out: &mut W,
) -> Result<TrainSummary> {
    let registry = build_registry(config);
    registry.resolve(model_key)?;

    validate_csv_file(&config.training_file)?;
    let dataset = read_dataset(&config.training_file)?;
    log::info!(
        "[catfold::train] Loaded {} records from {:?}",
        dataset.len(),
        config.training_file
    );

    let evaluator = FoldEvaluator::new(&dataset, &registry, config.columns.clone())?;

    let present = evaluator.fold_count();
    let n_folds = match config.n_folds {
        Some(k) if k < present => bail!(
            "Training file holds folds up to {} but only {} folds were requested; \
             re-run `catfold folds` or raise --folds",
            present - 1,
            k
        ),
        Some(k) => k,
        None => present,
    };
    if n_folds == 0 {
        bail!("Training file {:?} holds no folds", config.training_file);
    }
    log::info!("[catfold::train] Evaluating {} folds", n_folds);

    let mut write_error = None;
    let outcomes = evaluator.run_all(model_key, 0..n_folds, |outcome| {
        match &outcome.result {
            Ok(score) => {
                if write_error.is_none() {
                    if let Err(e) = writeln!(out, "Fold = {}, AUC = {}", outcome.fold, score.auc) {
                        write_error = Some(e);
                    }
                }
            }
            Err(e) => log::error!("Fold = {} failed with {}: {}", outcome.fold, e.kind(), e),
        }
    });
    if let Some(e) = write_error {
        return Err(e).context("Failed to write fold result");
    }

    let summary = CrossValidationSummary::from_outcomes(model_key, &outcomes);
    log::info!(
        "[catfold::train] {}: mean AUC = {:.4} (std = {:.4}) over {} folds, {} failed",
        model_key,
        summary.mean_auc,
        summary.std_auc,
        summary.n_scored,
        summary.n_failed
    );

    if let Some(report_file) = &config.report_file {
        write_cv_report(model_key, &outcomes, report_file)?;
    }

    Ok(TrainSummary { outcomes, summary })
}
