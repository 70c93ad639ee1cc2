use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::Instrument;

use crate::config::ProviderConfig;
use crate::error::AppError;
use crate::models::collection::ResultCollection;
use crate::models::criteria::SearchCriteria;
use crate::models::job::JobRecord;
use crate::providers::Provider;
use crate::translation::ParameterTranslator;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A provider's configuration paired with the client that serves it.
#[derive(Clone)]
pub struct ConfiguredProvider {
    pub config: ProviderConfig,
    pub client: Arc<dyn Provider>,
}

impl ConfiguredProvider {
    pub fn new(config: ProviderConfig, client: Arc<dyn Provider>) -> Self {
        Self { config, client }
    }

    pub fn id(&self) -> &str {
        &self.config.id
    }
}

impl std::fmt::Debug for ConfiguredProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfiguredProvider")
            .field("id", &self.config.id)
            .field("client", &self.client.id())
            .finish()
    }
}

/// Runs provider fetches, turning every per-provider failure into data.
#[derive(Debug, Clone)]
pub struct ProviderDispatcher {
    translator: ParameterTranslator,
    timeout: Duration,
}

impl ProviderDispatcher {
    pub fn new(translator: ParameterTranslator, timeout: Duration) -> Self {
        Self {
            translator,
            timeout,
        }
    }

    pub fn translator(&self) -> &ParameterTranslator {
        &self.translator
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Translate and fetch for one provider.
    ///
    /// Never fails: any translation, fetch or timeout error comes back as a
    /// collection with no items and exactly one error.
    pub async fn dispatch(
        &self,
        provider: &ConfiguredProvider,
        criteria: &SearchCriteria,
    ) -> ResultCollection {
        let span = tracing::info_span!("dispatch", provider = %provider.id());
        async {
            match self.try_dispatch(provider, criteria).await {
                Ok(jobs) => {
                    tracing::info!("Provider returned {} jobs", jobs.len());
                    ResultCollection::from(jobs)
                }
                Err(e) => {
                    tracing::warn!("Provider failed: {e}");
                    ResultCollection::from_error(e.to_string())
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Dispatch to every provider concurrently and wait for all of them.
    /// Outcomes come back in the order of `providers`, whatever order the
    /// fetches finish in. Dropping the future abandons in-flight fetches.
    pub async fn dispatch_all(
        &self,
        providers: &[ConfiguredProvider],
        criteria: &SearchCriteria,
    ) -> Vec<(String, ResultCollection)> {
        join_all(providers.iter().map(|provider| async move {
            let results = self.dispatch(provider, criteria).await;
            (provider.id().to_string(), results)
        }))
        .await
    }

    async fn try_dispatch(
        &self,
        provider: &ConfiguredProvider,
        criteria: &SearchCriteria,
    ) -> Result<Vec<JobRecord>, AppError> {
        let options = self
            .translator
            .translate(provider.id(), criteria, &provider.config.options)?;
        tracing::debug!("Translated criteria into {} options", options.len());

        tokio::time::timeout(self.timeout, provider.client.fetch_jobs(&options))
            .await
            .map_err(|_| AppError::Timeout {
                provider: provider.id().to_string(),
                after: self.timeout,
            })?
    }
}
