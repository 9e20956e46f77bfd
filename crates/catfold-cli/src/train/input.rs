use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ArgMatches;
use serde::{Deserialize, Serialize};

use catfold_classifiers::config::ModelType;
use catfold_classifiers::evaluate::EvalSettings;

/// Parameters of the `train` subcommand.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    /// Dataset with a fold column, as written by `catfold folds`.
    pub training_file: PathBuf,
    /// Folds `0..n_folds` are evaluated in order. When unset, the count is
    /// taken from the fold column of the training file.
    pub n_folds: Option<usize>,
    pub columns: EvalSettings,
    /// Extra named models, added to (or overriding) the built-in keys.
    pub models: BTreeMap<String, ModelType>,
    /// Optional HTML report of the fold results.
    pub report_file: Option<PathBuf>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            training_file: PathBuf::from("input/train_folds.csv"),
            n_folds: None,
            columns: EvalSettings::default(),
            models: BTreeMap::new(),
            report_file: None,
        }
    }
}

/// Load a training configuration from a JSON file.
pub fn load_train_config<P: AsRef<Path>>(path: P) -> Result<TrainConfig> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config: {}", path.as_ref().display()))?;
    let config: TrainConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.as_ref().display()))?;
    Ok(config)
}

impl TrainConfig {
    /// Load the config named on the command line (or defaults), then apply
    /// command-line overrides.
    pub fn from_arguments(config_path: Option<&PathBuf>, matches: &ArgMatches) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => {
                log::info!("[catfold::train] Using config: {:?}", path);
                load_train_config(path)?
            }
            None => {
                log::info!("[catfold::train] No config provided; using defaults.");
                TrainConfig::default()
            }
        };

        if let Some(train_data) = matches.get_one::<PathBuf>("train_data") {
            config.training_file = train_data.clone();
        }
        if let Some(n_folds) = matches.get_one::<usize>("folds") {
            config.n_folds = Some(*n_folds);
        }
        if let Some(report_file) = matches.get_one::<PathBuf>("report_file") {
            config.report_file = Some(report_file.clone());
        }

        Ok(config)
    }
}
