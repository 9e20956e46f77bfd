use std::path::PathBuf;

use anyhow::Result;
use clap::ArgMatches;

use catfold_classifiers::folds::DEFAULT_N_FOLDS;

use crate::util::{default_folds_path, validate_csv_file};

/// Parameters of the `folds` subcommand.
#[derive(Debug, Clone, PartialEq)]
pub struct FoldsConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub n_folds: usize,
    pub seed: Option<u64>,
    pub target_column: String,
}

impl FoldsConfig {
    pub fn from_arguments(matches: &ArgMatches) -> Result<Self> {
        let input = matches
            .get_one::<PathBuf>("input")
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Missing input file"))?;
        validate_csv_file(&input)?;

        let output = matches
            .get_one::<PathBuf>("output_file")
            .cloned()
            .unwrap_or_else(|| default_folds_path(&input));

        Ok(Self {
            input,
            output,
            n_folds: matches
                .get_one::<usize>("folds")
                .copied()
                .unwrap_or(DEFAULT_N_FOLDS),
            seed: matches.get_one::<u64>("seed").copied(),
            target_column: matches
                .get_one::<String>("target")
                .cloned()
                .unwrap_or_else(|| "target".to_string()),
        })
    }
}
