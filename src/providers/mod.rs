// Job-board providers.
// Defines the fetch capability the dispatcher calls and builds providers
// from configuration.

pub mod http;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::ProviderConfig;
use crate::error::AppError;
use crate::models::job::JobRecord;
use crate::translation::Options;

pub use http::{FieldMap, HttpJsonProvider};

/// Trait that all job-board providers must implement.
/// A provider receives fully translated query options and returns the jobs
/// found, or an error describing why it could not.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Identifier matching the provider's registry entry.
    fn id(&self) -> &str;

    async fn fetch_jobs(&self, options: &Options) -> Result<Vec<JobRecord>, AppError>;
}

/// Build the provider client described by a configuration entry.
pub fn build_provider(config: &ProviderConfig) -> Result<Arc<dyn Provider>, AppError> {
    let endpoint = config.endpoint.as_deref().ok_or_else(|| {
        AppError::Config(format!("Provider '{}' has no endpoint configured", config.id))
    })?;

    let provider = HttpJsonProvider::new(&config.id, endpoint)?
        .with_items_pointer(config.items.clone().unwrap_or_default())
        .with_fields(config.fields.clone());
    Ok(Arc::new(provider))
}
