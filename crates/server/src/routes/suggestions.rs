use axum::{Json, extract::Query};
use fhir_query_core::suggest::suggest;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Default)]
pub struct SuggestParams {
    #[serde(default)]
    q: String,
}

#[derive(Serialize)]
pub struct SuggestResponse {
    suggestions: Vec<&'static str>,
}

/// GET /suggestions?q= - Example queries matching the typed prefix
pub async fn list(Query(params): Query<SuggestParams>) -> Json<SuggestResponse> {
    Json(SuggestResponse {
        suggestions: suggest(&params.q),
    })
}
