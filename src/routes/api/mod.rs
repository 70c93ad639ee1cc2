pub mod jobs;
pub mod providers;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;

use crate::aggregator::Aggregator;

pub fn router(aggregator: Arc<Aggregator>) -> Router {
    let api = Router::new()
        .route("/jobs", get(jobs::list))
        .route("/providers", get(providers::list))
        .with_state(aggregator);

    Router::new().nest("/api/v1", api)
}
