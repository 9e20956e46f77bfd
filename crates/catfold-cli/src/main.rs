use anyhow::Result;
use clap::{Arg, ArgMatches, Command, ValueHint};
use log::LevelFilter;
use std::path::PathBuf;

use catfold_classifiers::folds::assign_folds_file;
use catfold_cli::folds::input::FoldsConfig;
use catfold_cli::train::input::TrainConfig;
use catfold_cli::train::trainer;

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or(
            "CATFOLD_LOG",
            "error,catfold_classifiers=info,catfold_cli=info,catfold=info",
        ))
        .init();

    let matches = Command::new("catfold")
        .version(clap::crate_version!())
        .about("Stratified k-fold cross-validation of baseline classifiers on categorical data")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("folds")
                .about("Shuffle a labelled CSV and append a stratified kfold column")
                .arg(
                    Arg::new("input")
                        .help("Path to the labelled training CSV")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output_file")
                        .short('o')
                        .long("output")
                        .help("Path of the CSV with the kfold column. Defaults to <input>_folds.csv")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("folds")
                        .short('k')
                        .long("folds")
                        .help("Number of folds")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .help("Seed for the shuffle. Unseeded runs differ between invocations.")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    Arg::new("target")
                        .long("target")
                        .help("Name of the binary label column")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new()),
                ),
        )
        .subcommand(
            Command::new("train")
                .about("Train and score one model per fold, printing the validation ROC AUC")
                .arg(
                    Arg::new("model")
                        .short('m')
                        .long("model")
                        .help("Registry key of the model, e.g. decision_tree_gini, decision_tree_entropy, rf")
                        .required(true)
                        .value_parser(clap::builder::NonEmptyStringValueParser::new())
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("config")
                        .help("Path to training JSON configuration file")
                        .required(false)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("train_data")
                        .short('d')
                        .long("train_data")
                        .help(
                            "Path to the CSV with a kfold column. Overrides the training file \
                             specified in the configuration file.",
                        )
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("folds")
                        .short('k')
                        .long("folds")
                        .help("Number of folds to evaluate. Overrides n_folds in the configuration file; defaults to every fold in the training file.")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    Arg::new("report_file")
                        .long("report")
                        .help("Write an HTML report of the fold results to this path")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("folds", sub_m)) => handle_folds(sub_m),
        Some(("train", sub_m)) => handle_train(sub_m),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

fn handle_folds(matches: &ArgMatches) -> Result<()> {
    let params = match FoldsConfig::from_arguments(matches) {
        Ok(params) => params,
        Err(e) => {
            log::error!("Invalid arguments: {:#}", e);
            std::process::exit(1)
        }
    };
    log::info!(
        "[catfold::folds] Assigning {} folds to {:?}",
        params.n_folds,
        params.input
    );

    match assign_folds_file(
        &params.input,
        &params.output,
        &params.target_column,
        params.n_folds,
        params.seed,
    ) {
        Ok(_) => Ok(()),
        Err(e) => {
            log::error!("Fold assignment failed: {:#}", e);
            std::process::exit(1)
        }
    }
}

fn handle_train(matches: &ArgMatches) -> Result<()> {
    let model_key: &String = matches
        .get_one("model")
        .expect("--model is required by CLI configuration");
    let config_path: Option<&PathBuf> = matches.get_one("config");

    let params = match TrainConfig::from_arguments(config_path, matches) {
        Ok(params) => params,
        Err(e) => {
            log::error!("Invalid configuration: {:#}", e);
            std::process::exit(1)
        }
    };

    match trainer::run_training(&params, model_key) {
        Ok(summary) if summary.all_folds_scored() => Ok(()),
        Ok(summary) => {
            log::error!(
                "{} of {} folds could not be scored",
                summary.summary.n_failed,
                summary.outcomes.len()
            );
            std::process::exit(1)
        }
        Err(e) => {
            log::error!("Training failed: {:#}", e);
            std::process::exit(1)
        }
    }
}
