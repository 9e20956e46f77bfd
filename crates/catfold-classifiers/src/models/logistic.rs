//! L2-regularised binary logistic regression backed by `linfa-logistic`.
use linfa::traits::Fit;
use linfa::Dataset;
use linfa_logistic::{FittedLogisticRegression, LogisticRegression as LinfaLogisticRegression};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::encoding::IndicatorMatrix;
use crate::error::{CatfoldError, Result};
use crate::models::classifier_trait::{
    check_fit_input, two_class_proba, warn_if_dense_is_large, ClassifierModel,
};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LogisticRegressionParams {
    /// Inverse regularisation strength; smaller values regularise more.
    pub c: f64,
    pub max_iter: usize,
    /// Stop once the gradient norm falls below this.
    pub tol: f64,
    pub fit_intercept: bool,
}

impl Default for LogisticRegressionParams {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iter: 100,
            tol: 1e-4,
            fit_intercept: true,
        }
    }
}

/// Logistic regression minimising `sum(log_loss) + ||w||^2 / (2 * C)`.
///
/// linfa takes the penalty as `alpha = 1 / C`. The intercept is not penalised.
pub struct LogisticRegression {
    params: LogisticRegressionParams,
    model: Option<FittedLogisticRegression<f64, usize>>,
    n_features: usize,
}

impl LogisticRegression {
    pub fn new(params: LogisticRegressionParams) -> Self {
        LogisticRegression {
            params,
            model: None,
            n_features: 0,
        }
    }

    /// Whether linfa treats label `1` as its positive class.
    fn one_is_positive(model: &FittedLogisticRegression<f64, usize>) -> bool {
        model.labels().pos.class == 1
    }

    /// Coefficients oriented towards label `1`, `None` before `fit`.
    pub fn weights(&self) -> Option<Array1<f64>> {
        self.model.as_ref().map(|model| {
            let params = model.params().to_owned();
            if Self::one_is_positive(model) {
                params
            } else {
                -params
            }
        })
    }

    pub fn intercept(&self) -> Option<f64> {
        self.model.as_ref().map(|model| {
            if Self::one_is_positive(model) {
                model.intercept()
            } else {
                -model.intercept()
            }
        })
    }
}

impl ClassifierModel for LogisticRegression {
    fn fit(&mut self, x: &IndicatorMatrix, y: &[u8]) -> Result<()> {
        check_fit_input(x, y)?;
        warn_if_dense_is_large(x, "log_reg");
        let targets = Array1::from_iter(y.iter().map(|&label| label as usize));
        let dataset = Dataset::new(x.to_dense(), targets);

        let model = LinfaLogisticRegression::<f64>::default()
            .alpha(1.0 / self.params.c.max(f64::EPSILON))
            .with_intercept(self.params.fit_intercept)
            .max_iterations(self.params.max_iter as u64)
            .gradient_tolerance(self.params.tol)
            .fit(&dataset)
            .map_err(|e| CatfoldError::ModelFit {
                model: "log_reg".into(),
                reason: e.to_string(),
            })?;

        log::debug!(
            "Fitted logistic regression on {} samples over {} features",
            x.nrows(),
            x.ncols()
        );
        self.n_features = x.ncols();
        self.model = Some(model);
        Ok(())
    }

    fn predict_proba(&self, x: &IndicatorMatrix) -> Result<Array2<f64>> {
        let model = self.model.as_ref().ok_or(CatfoldError::NotFitted)?;
        if x.ncols() != self.n_features {
            return Err(CatfoldError::LengthMismatch {
                expected: self.n_features,
                found: x.ncols(),
            });
        }
        let p = model.predict_probabilities(&x.to_dense());
        let positive: Vec<f64> = if Self::one_is_positive(model) {
            p.to_vec()
        } else {
            p.iter().map(|v| 1.0 - v).collect()
        };
        Ok(two_class_proba(&positive))
    }

    fn name(&self) -> &str {
        "log_reg"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_learns_indicator_direction() {
        // Column 0 -> mostly positive, column 1 -> mostly negative.
        let mut rows = Vec::new();
        let mut y = Vec::new();
        for i in 0..40 {
            let col = i % 2;
            rows.push(vec![col]);
            let flip = i % 10 == 0;
            y.push(if (col == 0) != flip { 1 } else { 0 });
        }
        let x = IndicatorMatrix::from_rows(rows, 2).unwrap();
        let mut model = LogisticRegression::new(LogisticRegressionParams::default());
        model.fit(&x, &y).unwrap();

        let w = model.weights().unwrap();
        assert!(w[0] > w[1]);

        let proba = model.predict_proba(&x).unwrap();
        assert!(proba[[0, 1]] > 0.5);
        assert!(proba[[1, 1]] < 0.5);
    }

    #[test]
    fn test_single_class_is_fit_error() {
        let x = IndicatorMatrix::from_rows(vec![vec![0], vec![1], vec![0]], 2).unwrap();
        let mut model = LogisticRegression::new(LogisticRegressionParams::default());
        let err = model.fit(&x, &[1, 1, 1]).unwrap_err();
        assert!(matches!(err, CatfoldError::ModelFit { ref model, .. } if model == "log_reg"));
    }

    #[test]
    fn test_width_mismatch_is_rejected() {
        let x = IndicatorMatrix::from_rows(vec![vec![0], vec![1]], 2).unwrap();
        let mut model = LogisticRegression::new(LogisticRegressionParams::default());
        model.fit(&x, &[1, 0]).unwrap();
        let wider = IndicatorMatrix::from_rows(vec![vec![2]], 3).unwrap();
        assert!(model.predict_proba(&wider).is_err());
    }
}
