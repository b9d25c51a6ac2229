pub mod health;
pub mod metrics;
mod query;
mod suggestions;

use axum::{
    Router,
    routing::{get, post},
};
use fhir_query_core::QueryResolver;

/// Build query routes
pub fn query_routes() -> Router<QueryResolver> {
    Router::new()
        .route("/query", post(query::resolve))
        .route("/query/summary", post(query::summary))
        .route("/suggestions", get(suggestions::list))
}

/// Fallback for unknown paths
pub async fn not_found(uri: axum::http::Uri) -> crate::error::AppError {
    crate::error::AppError::NotFound(format!("No route for {}", uri.path()))
}
