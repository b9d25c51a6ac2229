//! Application error handling

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use fhir_query_core::{IssueType, OperationOutcome};

/// Diagnostics returned when a request carries no usable query
pub const NO_QUERY_PROVIDED: &str = "No query provided";

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// Required input missing or blank
    MissingQuery,
    BadRequest(String),
    NotFound(String),
    TooManyRequests,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, outcome) = match self {
            AppError::MissingQuery => (
                StatusCode::BAD_REQUEST,
                OperationOutcome::required(NO_QUERY_PROVIDED),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, OperationOutcome::invalid(&msg)),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, OperationOutcome::not_found(&msg)),
            AppError::TooManyRequests => (
                StatusCode::TOO_MANY_REQUESTS,
                OperationOutcome::error(
                    IssueType::Throttled,
                    "Rate limit exceeded. Please try again later.",
                ),
            ),
        };

        (status, Json(outcome)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}
