use crate::config::ModelType;
use crate::models::classifier_trait::ClassifierModel;
use crate::models::decision_tree::DecisionTreeClassifier;
use crate::models::gbdt::GBDTClassifier;
use crate::models::logistic::LogisticRegression;
use crate::models::random_forest::RandomForestClassifier;

/// Build a fresh, unfitted classifier from a `ModelType`.
pub fn build_model(model_type: &ModelType) -> Box<dyn ClassifierModel> {
    match model_type {
        ModelType::DecisionTree(params) => Box::new(DecisionTreeClassifier::new(params.clone())),
        ModelType::RandomForest(params) => Box::new(RandomForestClassifier::new(params.clone())),
        ModelType::LogisticRegression(params) => {
            Box::new(LogisticRegression::new(params.clone()))
        }
        ModelType::GBDT(params) => Box::new(GBDTClassifier::new(params.clone())),
    }
}
