use ndarray::{Array1, Array2};

use crate::encoding::IndicatorMatrix;
use crate::error::Result;

/// Contract shared by every classifier the fold evaluator can train.
///
/// Labels are binary, `0` for the negative and `1` for the positive class.
pub trait ClassifierModel {
    fn fit(&mut self, x: &IndicatorMatrix, y: &[u8]) -> Result<()>;

    /// Per-class probabilities, shape `(n_samples, 2)`; column 1 is the
    /// positive class.
    fn predict_proba(&self, x: &IndicatorMatrix) -> Result<Array2<f64>>;

    /// Optional human readable name for the model
    fn name(&self) -> &str {
        "classifier"
    }
}

/// Positive-class column of a `predict_proba` result.
pub fn positive_class_proba(proba: &Array2<f64>) -> Array1<f64> {
    proba.column(1).to_owned()
}

/// Stack positive-class probabilities into the `(n, 2)` layout.
pub fn two_class_proba(positive: &[f64]) -> Array2<f64> {
    let mut out = Array2::<f64>::zeros((positive.len(), 2));
    for (i, &p) in positive.iter().enumerate() {
        let p = p.clamp(0.0, 1.0);
        out[[i, 0]] = 1.0 - p;
        out[[i, 1]] = p;
    }
    out
}

/// Dense copies of at least this many cells (2 GiB of `f64`) are reported
/// before they are allocated.
pub(crate) const LARGE_DENSE_CELLS: usize = 1 << 28;

/// Log a warning when densifying `x` for `model` is going to be expensive.
///
/// Every built-in learner takes dense rows, so memory grows with
/// `nrows * ncols` of the one-hot matrix rather than with its non-zeros.
pub(crate) fn warn_if_dense_is_large(x: &IndicatorMatrix, model: &str) -> bool {
    let cells = x.nrows().saturating_mul(x.ncols());
    let large = cells >= LARGE_DENSE_CELLS;
    if large {
        log::warn!(
            "{} expands a {} x {} indicator matrix ({} non-zeros) into {} dense cells",
            model,
            x.nrows(),
            x.ncols(),
            x.nnz(),
            cells
        );
    }
    large
}

pub(crate) fn check_fit_input(x: &IndicatorMatrix, y: &[u8]) -> Result<()> {
    if x.nrows() != y.len() {
        return Err(crate::error::CatfoldError::LengthMismatch {
            expected: x.nrows(),
            found: y.len(),
        });
    }
    Ok(())
}
