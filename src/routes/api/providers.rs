use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::aggregator::{Aggregator, ProviderSummary};
use crate::error::AppError;

#[derive(Debug, Serialize)]
pub struct ProvidersResponse {
    pub registry_version: u32,
    pub providers: Vec<ProviderSummary>,
}

/// GET /api/v1/providers
pub async fn list(
    State(aggregator): State<Arc<Aggregator>>,
) -> Result<Json<ProvidersResponse>, AppError> {
    Ok(Json(ProvidersResponse {
        registry_version: aggregator.registry().version(),
        providers: aggregator.describe_providers()?,
    }))
}
