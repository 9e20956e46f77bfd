//! Named model factories resolved by key.
use std::collections::BTreeMap;

use crate::config::ModelType;
use crate::error::{CatfoldError, Result};
use crate::models::classifier_trait::ClassifierModel;
use crate::models::factory::build_model;

/// Produces a fresh classifier for every fold.
pub type ModelFactory = Box<dyn Fn() -> Box<dyn ClassifierModel> + Send + Sync>;

/// Map from model key to factory.
///
/// Built once at startup and handed to the evaluator by reference.
pub struct ModelRegistry {
    factories: BTreeMap<String, ModelFactory>,
}

impl ModelRegistry {
    /// A registry with no models.
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// A registry holding every built-in key of [`ModelType::BUILTIN_KEYS`].
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        for key in ModelType::BUILTIN_KEYS {
            match key.parse::<ModelType>() {
                Ok(model_type) => registry.register_config(key, model_type),
                Err(e) => log::warn!("Skipping built-in model '{}': {}", key, e),
            }
        }
        registry
    }

    /// Register (or replace) a custom factory under `key`.
    pub fn register<F>(&mut self, key: &str, factory: F)
    where
        F: Fn() -> Box<dyn ClassifierModel> + Send + Sync + 'static,
    {
        self.factories.insert(key.to_string(), Box::new(factory));
    }

    /// Register (or replace) `key` with a configured model type.
    pub fn register_config(&mut self, key: &str, model_type: ModelType) {
        self.register(key, move || build_model(&model_type));
    }

    pub fn contains(&self, key: &str) -> bool {
        self.factories.contains_key(key)
    }

    /// Registered keys in sorted order.
    pub fn keys(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    /// Look up `key`, failing with the list of available keys.
    pub fn resolve(&self, key: &str) -> Result<&ModelFactory> {
        self.factories
            .get(key)
            .ok_or_else(|| CatfoldError::UnknownModel {
                key: key.to_string(),
                available: self.keys(),
            })
    }

    /// Build a fresh model for `key`.
    pub fn build(&self, key: &str) -> Result<Box<dyn ClassifierModel>> {
        Ok((self.resolve(key)?)())
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
