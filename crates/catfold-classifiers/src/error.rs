use std::error::Error;
use std::fmt;

/// Errors raised while assigning folds, encoding features, fitting models or
/// scoring a fold.
#[derive(Debug, Clone, PartialEq)]
pub enum CatfoldError {
    /// A required column is absent from the dataset header.
    Schema { column: String },
    /// A class has fewer members than the requested number of folds.
    InsufficientData {
        class: String,
        count: usize,
        n_folds: usize,
    },
    /// Fewer records than folds; no fold could receive one of each.
    InsufficientRecords { count: usize, n_folds: usize },
    /// The metric cannot be computed for the given labels (e.g. a single class).
    UndefinedMetric { reason: String },
    /// The requested model key is not present in the registry.
    UnknownModel { key: String, available: Vec<String> },
    InvalidFoldCount(usize),
    /// The requested fold index does not occur in the fold column.
    InvalidFold { fold: usize, available: Vec<usize> },
    /// A required value is empty (row index is 0-based over data rows).
    MissingValue { column: String, row: usize },
    /// A value that cannot be parsed for its column (e.g. a non-integer fold id).
    InvalidValue {
        column: String,
        row: usize,
        value: String,
    },
    /// A target value that is not a binary 0/1 label.
    InvalidLabel { row: usize, value: String },
    /// A category not seen while fitting the encoder.
    UnknownCategory { column: String, value: String },
    LengthMismatch { expected: usize, found: usize },
    /// The underlying learner rejected the training data.
    ModelFit { model: String, reason: String },
    /// `predict_proba` was called before `fit`.
    NotFitted,
}

impl CatfoldError {
    /// Short, stable name of the error kind, used in per-fold failure lines.
    pub fn kind(&self) -> &'static str {
        match self {
            CatfoldError::Schema { .. } => "SchemaError",
            CatfoldError::InsufficientData { .. } => "InsufficientDataError",
            CatfoldError::InsufficientRecords { .. } => "InsufficientDataError",
            CatfoldError::UndefinedMetric { .. } => "UndefinedMetricError",
            CatfoldError::UnknownModel { .. } => "UnknownModelError",
            CatfoldError::InvalidFoldCount(_) => "InvalidFoldCountError",
            CatfoldError::InvalidFold { .. } => "InvalidFoldError",
            CatfoldError::MissingValue { .. } => "MissingValueError",
            CatfoldError::InvalidValue { .. } => "InvalidValueError",
            CatfoldError::InvalidLabel { .. } => "InvalidLabelError",
            CatfoldError::UnknownCategory { .. } => "UnknownCategoryError",
            CatfoldError::LengthMismatch { .. } => "LengthMismatchError",
            CatfoldError::ModelFit { .. } => "ModelFitError",
            CatfoldError::NotFitted => "NotFittedError",
        }
    }
}

impl fmt::Display for CatfoldError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CatfoldError::Schema { column } => {
                write!(f, "Required column '{}' is missing from the dataset", column)
            }
            CatfoldError::InsufficientData {
                class,
                count,
                n_folds,
            } => write!(
                f,
                "Class '{}' has only {} members, cannot stratify into {} folds",
                class, count, n_folds
            ),
            CatfoldError::InsufficientRecords { count, n_folds } => write!(
                f,
                "Dataset has only {} records, cannot split into {} folds",
                count, n_folds
            ),
            CatfoldError::UndefinedMetric { reason } => {
                write!(f, "ROC AUC is undefined: {}", reason)
            }
            CatfoldError::UnknownModel { key, available } => write!(
                f,
                "Unknown model '{}'. Available models: {}",
                key,
                available.join(", ")
            ),
            CatfoldError::InvalidFoldCount(k) => {
                write!(f, "Number of folds must be at least 2, got {}", k)
            }
            CatfoldError::InvalidFold { fold, available } => write!(
                f,
                "Fold {} does not exist in the dataset (folds present: {:?})",
                fold, available
            ),
            CatfoldError::MissingValue { column, row } => {
                write!(f, "Missing value in column '{}' at row {}", column, row + 1)
            }
            CatfoldError::InvalidValue { column, row, value } => write!(
                f,
                "Invalid value '{}' in column '{}' at row {}",
                value,
                column,
                row + 1
            ),
            CatfoldError::InvalidLabel { row, value } => write!(
                f,
                "Invalid target label '{}' at row {} (expected 0 or 1)",
                value,
                row + 1
            ),
            CatfoldError::UnknownCategory { column, value } => write!(
                f,
                "Found unknown category '{}' in column '{}' during transform",
                value, column
            ),
            CatfoldError::LengthMismatch { expected, found } => write!(
                f,
                "Length mismatch: expected {} values, found {}",
                expected, found
            ),
            CatfoldError::ModelFit { model, reason } => {
                write!(f, "Failed to fit {}: {}", model, reason)
            }
            CatfoldError::NotFitted => write!(f, "Model must be fitted before predicting"),
        }
    }
}

impl Error for CatfoldError {}

pub type Result<T> = std::result::Result<T, CatfoldError>;
