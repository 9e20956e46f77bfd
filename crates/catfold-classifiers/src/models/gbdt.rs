use gbdt::config::Config;
use gbdt::decision_tree::{Data, DataVec};
use gbdt::gradient_boost::GBDT;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::encoding::IndicatorMatrix;
use crate::error::{CatfoldError, Result};
use crate::models::classifier_trait::{
    check_fit_input, two_class_proba, warn_if_dense_is_large, ClassifierModel,
};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GbdtParams {
    pub learning_rate: f32,
    pub max_depth: u32,
    pub num_boost_round: u32,
    pub debug: bool,
    pub training_optimization_level: u8,
    pub loss_type: String,
}

impl Default for GbdtParams {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            max_depth: 6,
            num_boost_round: 50,
            debug: false,
            training_optimization_level: 2,
            loss_type: "LogLikelyhood".to_string(),
        }
    }
}

/// Gradient Boosting Decision Tree (GBDT) classifier
///
/// The `gbdt` crate works on dense rows, so indicator rows are expanded to
/// `ncols` `f32` values each before fitting and prediction. On a one-hot
/// matrix with tens of thousands of columns this needs gigabytes where the
/// sparse form needs megabytes; prefer `log_reg` or a shallow `rf` there.
pub struct GBDTClassifier {
    model: Option<GBDT>,
    params: GbdtParams,
}

impl GBDTClassifier {
    pub fn new(params: GbdtParams) -> Self {
        GBDTClassifier {
            model: None,
            params,
        }
    }

    fn to_data_vec(x: &IndicatorMatrix, labels: Option<&[u8]>) -> DataVec {
        let mut data = DataVec::new();
        for row in 0..x.nrows() {
            // LogLikelyhood expects labels in {-1, 1}.
            let label = match labels {
                Some(y) if y[row] == 1 => 1.0,
                Some(_) => -1.0,
                None => 0.0,
            };
            data.push(Data::new_training_data(x.dense_row(row), 1.0, label, None));
        }
        data
    }
}

impl ClassifierModel for GBDTClassifier {
    fn fit(&mut self, x: &IndicatorMatrix, y: &[u8]) -> Result<()> {
        check_fit_input(x, y)?;
        warn_if_dense_is_large(x, "gbdt");

        let mut config = Config::new();
        config.set_feature_size(x.ncols());
        config.set_shrinkage(self.params.learning_rate);
        config.set_max_depth(self.params.max_depth);
        config.set_iterations(self.params.num_boost_round as usize);
        config.set_debug(self.params.debug);
        config.set_training_optimization_level(self.params.training_optimization_level);
        config.set_loss(&self.params.loss_type);

        let mut gbdt = GBDT::new(&config);
        let mut train_x = Self::to_data_vec(x, Some(y));
        gbdt.fit(&mut train_x);

        self.model = Some(gbdt);
        Ok(())
    }

    fn predict_proba(&self, x: &IndicatorMatrix) -> Result<Array2<f64>> {
        let model = self.model.as_ref().ok_or(CatfoldError::NotFitted)?;
        let test_x = Self::to_data_vec(x, None);
        let positive: Vec<f64> = model
            .predict(&test_x)
            .into_iter()
            .map(|p| p as f64)
            .collect();
        Ok(two_class_proba(&positive))
    }

    fn name(&self) -> &str {
        "gbdt"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gbdt_classifier() {
        let rows = vec![
            vec![0, 2],
            vec![1, 2],
            vec![0, 3],
            vec![1, 3],
            vec![0, 2],
            vec![1, 3],
            vec![0, 3],
            vec![1, 2],
        ];
        let y = vec![1u8, 0, 1, 0, 1, 0, 1, 0];
        let x = IndicatorMatrix::from_rows(rows, 4).unwrap();

        let mut classifier = GBDTClassifier::new(GbdtParams {
            max_depth: 3,
            num_boost_round: 5,
            ..GbdtParams::default()
        });
        classifier.fit(&x, &y).unwrap();

        let proba = classifier.predict_proba(&x).unwrap();
        assert_eq!(proba.nrows(), y.len());
        assert!(proba.column(1).iter().all(|p| (0.0..=1.0).contains(p)));
        assert!(proba[[0, 1]] > proba[[1, 1]]);
    }

    #[test]
    fn test_rows_are_expanded_to_full_width() {
        let x = IndicatorMatrix::from_rows(vec![vec![3], vec![]], 6).unwrap();
        let data = GBDTClassifier::to_data_vec(&x, Some(&[1u8, 0][..]));
        assert_eq!(data.len(), 2);
        assert!(data.iter().all(|d| d.feature.len() == 6));
        assert_eq!(data[0].feature[3], 1.0);
        assert_eq!(data[0].label, 1.0);
        assert_eq!(data[1].label, -1.0);
    }
}
