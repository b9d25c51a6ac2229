//! Natural-language query endpoints

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
};
use fhir_query_core::{ParseResult, QueryResolver, ResolverOutput, Summary};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::middleware::request_id::RequestId;

/// Request body carrying the user's question
#[derive(Deserialize)]
pub struct QueryRequest {
    query: Option<String>,
}

impl QueryRequest {
    /// The question, unless missing or blank
    fn text(&self) -> Result<&str, AppError> {
        self.query
            .as_deref()
            .filter(|q| !q.trim().is_empty())
            .ok_or(AppError::MissingQuery)
    }
}

/// Response body for the summary endpoint
#[derive(Serialize)]
pub struct SummaryResponse {
    nlp_parse: ParseResult,
    #[serde(flatten)]
    summary: Summary,
}

/// Validate the body and resolve its query
fn run(
    resolver: &QueryResolver,
    request_id: &RequestId,
    body: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<ResolverOutput, AppError> {
    let Json(body) = body?;
    let query = body.text()?;

    let output = resolver.resolve(query);

    tracing::debug!(request_id = %request_id.0, query = query, "Query text");
    tracing::info!(
        request_id = %request_id.0,
        query_len = query.len(),
        intent = %output.parse.intent,
        resource_type = %output.parse.resource_type,
        entries = output.bundle.len(),
        "Resolved query"
    );
    metrics::counter!("query_intents_total", "intent" => output.parse.intent.clone()).increment(1);

    Ok(output)
}

/// POST /query - Classify a question and return its parse and result bundle
pub async fn resolve(
    State(resolver): State<QueryResolver>,
    Extension(request_id): Extension<RequestId>,
    body: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<ResolverOutput>, AppError> {
    run(&resolver, &request_id, body).map(Json)
}

/// POST /query/summary - Chart and table aggregates for a question
pub async fn summary(
    State(resolver): State<QueryResolver>,
    Extension(request_id): Extension<RequestId>,
    body: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<SummaryResponse>, AppError> {
    let output = run(&resolver, &request_id, body)?;
    let summary = Summary::of(&output);
    Ok(Json(SummaryResponse {
        nlp_parse: output.parse,
        summary,
    }))
}
