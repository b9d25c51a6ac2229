//! HTTP client for the query API
//!
//! Transport failures are reported to the caller, never retried.

use fhir_query_core::{OperationOutcome, ResolverOutput};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced to callers of the query API
#[derive(Debug, Error)]
pub enum ClientError {
    /// Server answered with a non-success status
    #[error("HTTP error! status: {status}: {message}")]
    Status { status: StatusCode, message: String },

    /// Network, TLS or body decoding failure
    #[error("Failed to fetch data: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status(),
        }
    }
}

#[derive(Serialize)]
struct QueryBody<'a> {
    query: &'a str,
}

#[derive(Deserialize)]
struct SuggestBody {
    suggestions: Vec<String>,
}

/// Client for a running query server
#[derive(Clone)]
pub struct QueryClient {
    http: reqwest::Client,
    base_url: String,
}

impl QueryClient {
    /// Create a client for the server at `base_url` (e.g. `http://127.0.0.1:5000`)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// POST /query
    pub async fn query(&self, query: &str) -> Result<ResolverOutput, ClientError> {
        let response = self
            .http
            .post(format!("{}/query", self.base_url))
            .json(&QueryBody { query })
            .send()
            .await?;

        let response = check_status(response).await?;
        Ok(response.json::<ResolverOutput>().await?)
    }

    /// GET /suggestions
    pub async fn suggestions(&self, input: &str) -> Result<Vec<String>, ClientError> {
        let response = self
            .http
            .get(format!("{}/suggestions", self.base_url))
            .query(&[("q", input)])
            .send()
            .await?;

        let response = check_status(response).await?;
        Ok(response.json::<SuggestBody>().await?.suggestions)
    }
}

/// Turn a non-success response into `ClientError::Status`, preferring the
/// OperationOutcome diagnostics over the raw body
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<OperationOutcome>(&body)
        .ok()
        .and_then(|outcome| outcome.message().map(String::from))
        .unwrap_or(body);

    tracing::warn!(status = %status, message = %message, "Query request failed");
    Err(ClientError::Status { status, message })
}
