use std::sync::Arc;

use serde_json::Value;

use super::Options;
use super::registry::{Concept, Dialect, TranslationRegistry, TranslationRule};
use crate::error::AppError;
use crate::models::criteria::SearchCriteria;

/// Turns criteria into a provider's native query options.
#[derive(Debug, Clone)]
pub struct ParameterTranslator {
    registry: Arc<TranslationRegistry>,
}

impl ParameterTranslator {
    pub fn new(registry: Arc<TranslationRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &TranslationRegistry {
        &self.registry
    }

    /// Translate `criteria` for `provider_id`, then lay `static_options` over
    /// the result. Static options win on key collisions.
    pub fn translate(
        &self,
        provider_id: &str,
        criteria: &SearchCriteria,
        static_options: &Options,
    ) -> Result<Options, AppError> {
        let dialect = self.registry.rules(provider_id)?;
        let mut options = apply_dialect(dialect, criteria);
        for (key, value) in static_options {
            options.insert(key.clone(), value.clone());
        }
        Ok(options)
    }
}

fn apply_dialect(dialect: &Dialect, criteria: &SearchCriteria) -> Options {
    let mut options = Options::new();
    for (concept, rule) in dialect.rules() {
        match rule {
            TranslationRule::Rename(key) => {
                if let Some(value) = concept_value(concept, criteria) {
                    options.insert(key.clone(), value);
                }
            }
            TranslationRule::Transform(transform) => options.extend(transform.apply(criteria)),
        }
    }
    options
}

fn concept_value(concept: Concept, criteria: &SearchCriteria) -> Option<Value> {
    match concept {
        Concept::Keyword => criteria.keyword().map(Value::from),
        Concept::Location => criteria.location().map(|l| Value::from(l.as_str())),
        Concept::Page => Some(criteria.page().into()),
        Concept::PerPage => Some(criteria.per_page().into()),
    }
}
