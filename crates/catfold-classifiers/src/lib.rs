//! catfold-classifiers: stratified cross-validation for categorical tabular data.
//!
//! This crate assigns stratified folds to a labeled dataset, one-hot encodes
//! categorical features per fold, fits baseline classifiers (decision trees,
//! random forest, logistic regression, GBDT) and scores each fold by ROC AUC.
//! Models are resolved by key through an explicit [`models::registry::ModelRegistry`]
//! so callers can swap in their own implementations.
pub mod config;
pub mod data_handling;
pub mod encoding;
pub mod error;
pub mod evaluate;
pub mod folds;
pub mod io;
pub mod metrics;
pub mod models;
pub mod report;

pub use error::CatfoldError;
