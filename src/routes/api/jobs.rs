use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};

use crate::aggregator::{Aggregator, SearchOptions};
use crate::error::AppError;
use crate::models::collection::MultiCollection;
use crate::models::criteria::{DEFAULT_PAGE, DEFAULT_PER_PAGE, SearchCriteria};
use crate::models::job::JobRecord;

#[derive(Debug, Default, Deserialize)]
pub struct JobSearchQuery {
    pub keyword: Option<String>,
    pub location: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// Restrict the search to one configured provider
    pub provider: Option<String>,
    pub max_age: Option<u32>,
    pub max_results: Option<usize>,
    pub order_by: Option<String>,
    pub order: Option<String>,
}

impl JobSearchQuery {
    pub fn criteria(&self) -> Result<SearchCriteria, AppError> {
        let mut criteria = SearchCriteria::new()
            .with_keyword(self.keyword.clone().unwrap_or_default())
            .with_page(
                self.page.unwrap_or(DEFAULT_PAGE),
                self.per_page.unwrap_or(DEFAULT_PER_PAGE),
            )?;
        if let Some(location) = non_blank(&self.location) {
            criteria = criteria.with_location(location)?;
        }
        Ok(criteria)
    }

    pub fn options(&self) -> Result<SearchOptions, AppError> {
        let defaults = SearchOptions::default();
        Ok(SearchOptions {
            max_age: self.max_age,
            max_results: self.max_results,
            order_by: non_blank(&self.order_by)
                .map(str::to_string)
                .or(defaults.order_by),
            order: match non_blank(&self.order) {
                Some(order) => order.parse()?,
                None => defaults.order,
            },
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Serialize)]
pub struct JobSearchResponse {
    pub count: usize,
    pub jobs: Vec<JobRecord>,
    pub errors: Vec<String>,
}

impl From<MultiCollection> for JobSearchResponse {
    fn from(results: MultiCollection) -> Self {
        let (jobs, errors) = results.into_inner().into_parts();
        Self {
            count: jobs.len(),
            jobs,
            errors,
        }
    }
}

/// GET /api/v1/jobs
///
/// Runs one federated search. Provider failures are reported in `errors`
/// next to whatever the other providers returned.
pub async fn list(
    State(aggregator): State<Arc<Aggregator>>,
    Query(query): Query<JobSearchQuery>,
) -> Result<Json<JobSearchResponse>, AppError> {
    let criteria = query.criteria()?;
    let options = query.options()?;

    let results = match non_blank(&query.provider) {
        Some(provider) => aggregator.search_one(provider, &criteria, &options).await?,
        None => aggregator.search(&criteria, &options).await?,
    };
    Ok(Json(results.into()))
}
