pub mod api;

use std::sync::Arc;

use axum::Router;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::aggregator::Aggregator;

async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Full application router: health check plus the versioned API.
pub fn router(aggregator: Arc<Aggregator>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .merge(api::router(aggregator))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
