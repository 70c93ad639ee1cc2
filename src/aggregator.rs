use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::{ProviderConfig, ProvidersFile};
use crate::dispatcher::{ConfiguredProvider, ProviderDispatcher};
use crate::error::AppError;
use crate::models::collection::{MultiCollection, Operator, Order, ResultCollection};
use crate::models::criteria::SearchCriteria;
use crate::models::job::format_date;
use crate::providers::{Provider, build_provider};
use crate::translation::{DialectSpec, ParameterTranslator, TranslationRegistry};

/// Post-processing applied to a merged search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// Keep only jobs posted within this many days.
    pub max_age: Option<u32>,
    pub max_results: Option<usize>,
    pub order_by: Option<String>,
    pub order: Order,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            max_age: None,
            max_results: None,
            order_by: Some("datePosted".to_string()),
            order: Order::Desc,
        }
    }
}

impl SearchOptions {
    /// Merge as-is: no age filter, no reordering, no truncation.
    pub fn none() -> Self {
        Self {
            order_by: None,
            ..Self::default()
        }
    }

    fn apply(&self, results: &mut MultiCollection) -> Result<(), AppError> {
        if let Some(days) = self.max_age {
            let cutoff = TimeDelta::try_days(i64::from(days))
                .and_then(|age| Utc::now().checked_sub_signed(age))
                .ok_or_else(|| {
                    AppError::Validation(format!("max_age of {days} days is out of range"))
                })?;
            results.filter(
                "datePosted",
                &Value::String(format_date(cutoff)),
                Operator::Gt,
            )?;
        }
        if let Some(field) = &self.order_by {
            results.order_by(field, self.order)?;
        }
        results.truncate(self.max_results);
        Ok(())
    }
}

/// A configured provider and the parameter dialect it is queried with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderSummary {
    pub id: String,
    pub endpoint: Option<String>,
    pub dialect: DialectSpec,
}

/// Entry point for federated searches over a fixed set of providers.
///
/// The provider set is fixed at construction. The stored criteria back
/// [`Aggregator::all_jobs`] and [`Aggregator::jobs_by_provider`];
/// [`Aggregator::search`] takes criteria per call so one aggregator can serve
/// concurrent requests.
#[derive(Debug, Clone)]
pub struct Aggregator {
    providers: Vec<ConfiguredProvider>,
    dispatcher: ProviderDispatcher,
    criteria: SearchCriteria,
}

impl Aggregator {
    /// Every configured id must have a registry entry.
    pub fn new(
        providers: Vec<ConfiguredProvider>,
        registry: Arc<TranslationRegistry>,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        for provider in &providers {
            registry.rules(provider.id())?;
        }
        let dispatcher = ProviderDispatcher::new(ParameterTranslator::new(registry), timeout);
        Ok(Self {
            providers,
            dispatcher,
            criteria: SearchCriteria::default(),
        })
    }

    /// Build HTTP providers and the registry from a configuration file.
    pub fn from_file(file: &ProvidersFile, timeout: Duration) -> Result<Self, AppError> {
        let registry = Arc::new(file.registry()?);
        let providers = file
            .providers
            .iter()
            .map(|config| Ok(ConfiguredProvider::new(config.clone(), build_provider(config)?)))
            .collect::<Result<Vec<_>, AppError>>()?;
        Self::new(providers, registry, timeout)
    }

    /// Convenience for callers that supply their own provider clients.
    pub fn with_clients(
        clients: Vec<(ProviderConfig, Arc<dyn Provider>)>,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let providers = clients
            .into_iter()
            .map(|(config, client)| ConfiguredProvider::new(config, client))
            .collect();
        Self::new(providers, Arc::new(TranslationRegistry::builtin()?), timeout)
    }

    pub fn criteria(&self) -> &SearchCriteria {
        &self.criteria
    }

    pub fn set_criteria(&mut self, criteria: SearchCriteria) -> &mut Self {
        self.criteria = criteria;
        self
    }

    pub fn set_keyword(&mut self, keyword: &str) -> &mut Self {
        self.criteria = self.criteria.clone().with_keyword(keyword);
        self
    }

    pub fn set_location(&mut self, location: &str) -> Result<&mut Self, AppError> {
        self.criteria = self.criteria.clone().with_location(location)?;
        Ok(self)
    }

    pub fn set_page(&mut self, page: u32, per_page: u32) -> Result<&mut Self, AppError> {
        self.criteria = self.criteria.clone().with_page(page, per_page)?;
        Ok(self)
    }

    pub fn providers(&self) -> &[ConfiguredProvider] {
        &self.providers
    }

    pub fn provider_ids(&self) -> impl Iterator<Item = &str> {
        self.providers.iter().map(ConfiguredProvider::id)
    }

    pub fn has_provider(&self, id: &str) -> bool {
        self.providers.iter().any(|p| p.id() == id)
    }

    pub fn registry(&self) -> &TranslationRegistry {
        self.dispatcher.translator().registry()
    }

    pub fn describe_providers(&self) -> Result<Vec<ProviderSummary>, AppError> {
        self.providers
            .iter()
            .map(|p| {
                Ok(ProviderSummary {
                    id: p.id().to_string(),
                    endpoint: p.config.endpoint.clone(),
                    dialect: self.registry().rules(p.id())?.to_spec(),
                })
            })
            .collect()
    }

    /// Jobs from one configured provider using the stored criteria.
    /// An id that is not configured yields a collection carrying one error.
    pub async fn jobs_by_provider(&self, id: &str) -> ResultCollection {
        self.search_provider(id, &self.criteria).await
    }

    pub async fn search_provider(&self, id: &str, criteria: &SearchCriteria) -> ResultCollection {
        match self.providers.iter().find(|p| p.id() == id) {
            Some(provider) => self.dispatcher.dispatch(provider, criteria).await,
            None => ResultCollection::from_error(AppError::UnknownProvider(id.to_string()).to_string()),
        }
    }

    /// Per-provider outcomes for the stored criteria, in configuration order.
    pub async fn jobs_per_provider(&self) -> Vec<(String, ResultCollection)> {
        self.dispatcher
            .dispatch_all(&self.providers, &self.criteria)
            .await
    }

    /// Merged jobs from every provider using the stored criteria.
    pub async fn all_jobs(&self, options: &SearchOptions) -> Result<MultiCollection, AppError> {
        self.search(&self.criteria, options).await
    }

    /// Fan out to every provider, merge in configuration order, then apply
    /// `options`. Provider failures show up in the result's errors; only
    /// invalid post-processing (an undefined field, an out-of-range age)
    /// fails the call.
    pub async fn search(
        &self,
        criteria: &SearchCriteria,
        options: &SearchOptions,
    ) -> Result<MultiCollection, AppError> {
        let span = tracing::info_span!("search", request_id = %Uuid::new_v4());
        async {
            let outcomes = self.dispatcher.dispatch_all(&self.providers, criteria).await;

            let mut merged = MultiCollection::new();
            for (_, results) in outcomes {
                merged.append(results);
            }
            tracing::info!(
                "Merged {} jobs with {} provider errors",
                merged.count(),
                merged.errors().len()
            );

            options.apply(&mut merged)?;
            Ok::<_, AppError>(merged)
        }
        .instrument(span)
        .await
    }

    /// Like [`Aggregator::search`] but against a single configured provider.
    pub async fn search_one(
        &self,
        id: &str,
        criteria: &SearchCriteria,
        options: &SearchOptions,
    ) -> Result<MultiCollection, AppError> {
        if !self.has_provider(id) {
            return Err(AppError::UnknownProvider(id.to_string()));
        }
        let mut results = MultiCollection::from(self.search_provider(id, criteria).await);
        options.apply(&mut results)?;
        Ok(results)
    }
}
