//! Integration tests for the query server.
//!
//! Most tests drive the Axum router in-process with `oneshot`; the client
//! tests bind a real listener on an ephemeral port.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value as JsonValue, json};
use tower::ServiceExt;

use fhir_query_core::{QueryResolver, ResourceType};
use fhir_query_server::client::{ClientError, QueryClient};
use fhir_query_server::config::Config;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build the app router with test configuration.
fn test_app() -> Router {
    test_app_with_rps(1000)
}

fn test_app_with_rps(rate_limit_rps: u32) -> Router {
    let config = Config {
        bind_address: "127.0.0.1:0".to_string(),
        cors_origins: vec!["http://localhost:3000".to_string()],
        rate_limit_rps,
    };
    fhir_query_server::build_app(QueryResolver::with_fixtures(), &config)
}

/// Send a request to the app and return (status, body as JSON).
async fn request(app: &Router, req: Request<Body>) -> (StatusCode, JsonValue) {
    let response = app.clone().oneshot(req).await.expect("Request failed");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();

    let body = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null)
    };

    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Build a POST request with JSON body.
fn post(uri: &str, body: JsonValue) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

/// Serve the app on an ephemeral port and return its base URL.
async fn spawn_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().unwrap();
    let app = test_app();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_health() {
    let app = test_app();
    let (status, body) = request(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "healthy"}));
}

#[tokio::test]
async fn test_query_contract() {
    let app = test_app();
    let (status, body) = request(
        &app,
        post("/query", json!({"query": "Show me all diabetic patients over 50"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["nlp_parse"],
        json!({
            "intent": "get_diabetic_patients_over_50",
            "resource_type": "Patient",
            "fhir_params": {"condition": "Diabetes Mellitus", "age": "50"},
            "simulated_fhir_request_url": "Patient?condition=DiabetesMellitus&age=gt50",
            "original_query": "Show me all diabetic patients over 50"
        })
    );

    let bundle = &body["simulated_fhir_response"];
    assert_eq!(bundle["resourceType"], "Bundle");
    assert_eq!(
        bundle["entry"],
        json!([
            {"resource": {"resourceType": "Patient", "id": "p1", "name": "John Doe", "age": 55,
                          "gender": "male", "conditions": ["Diabetes Mellitus", "Hypertension"]}},
            {"resource": {"resourceType": "Patient", "id": "p2", "name": "Jane Smith", "age": 62,
                          "gender": "female", "conditions": ["Diabetes Mellitus"]}}
        ])
    );
}

#[tokio::test]
async fn test_condition_query() {
    let app = test_app();
    let (status, body) = request(
        &app,
        post("/query", json!({"query": "What conditions does Alice Smith have?"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["nlp_parse"]["resource_type"], "Condition");
    assert_eq!(body["nlp_parse"]["fhir_params"], json!({"name": "Alice Smith"}));

    let entries = body["simulated_fhir_response"]["entry"].as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["resource"]["id"], "p_alice");
    assert_eq!(
        entries[2]["resource"],
        json!({
            "resourceType": "Condition",
            "id": "c_allergy",
            "code": {"text": "Allergy to Penicillin"},
            "subject": {"reference": "Patient/p_alice", "display": "Alice Smith"}
        })
    );
}

#[tokio::test]
async fn test_unknown_query() {
    let app = test_app();
    let (status, body) = request(&app, post("/query", json!({"query": "Book me a taxi"}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["nlp_parse"]["intent"], "unknown_query");
    assert_eq!(body["nlp_parse"]["resource_type"], "N/A");
    assert_eq!(body["nlp_parse"]["simulated_fhir_request_url"], "N/A");
    assert_eq!(body["simulated_fhir_response"]["entry"], json!([]));
}

#[tokio::test]
async fn test_missing_or_blank_query_rejected() {
    let app = test_app();

    for payload in [json!({}), json!({"query": ""}), json!({"query": "   "}), json!({"query": null})] {
        let (status, body) = request(&app, post("/query", payload.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload: {}", payload);
        assert_eq!(body["resourceType"], "OperationOutcome");
        assert_eq!(body["issue"][0]["diagnostics"], "No query provided");
    }
}

#[tokio::test]
async fn test_malformed_body_rejected() {
    let app = test_app();
    let req = Request::builder()
        .method("POST")
        .uri("/query")
        .header("Content-Type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = request(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["issue"][0]["code"], "invalid");
}

#[tokio::test]
async fn test_summary() {
    let app = test_app();
    let (status, body) = request(&app, post("/query/summary", json!({"query": "Male patients"}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["nlp_parse"]["intent"], "get_male_patients");
    assert_eq!(
        body["age_distribution"],
        json!([
            {"bucket": "0-20", "count": 0},
            {"bucket": "21-40", "count": 0},
            {"bucket": "41-60", "count": 1},
            {"bucket": "61-80", "count": 2},
            {"bucket": "81+", "count": 0}
        ])
    );
    assert_eq!(
        body["condition_distribution"],
        json!([
            {"condition": "Diabetes Mellitus", "count": 1},
            {"condition": "Hypertension", "count": 2},
            {"condition": "Asthma", "count": 1},
            {"condition": "Arthritis", "count": 1}
        ])
    );
    assert_eq!(body["rows"].as_array().unwrap().len(), 3);
    assert_eq!(body["rows"][2]["conditions"], "Arthritis");
}

#[tokio::test]
async fn test_suggestions() {
    let app = test_app();

    let (status, body) = request(&app, get("/suggestions?q=asth")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["suggestions"], json!(["Female patients with asthma"]));

    let (_, body) = request(&app, get("/suggestions")).await;
    assert_eq!(body["suggestions"].as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn test_request_id_echoed() {
    let app = test_app();

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .header(fhir_query_server::REQUEST_ID_HEADER, "trace-123")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(
        response.headers()[fhir_query_server::REQUEST_ID_HEADER],
        "trace-123"
    );

    let response = app.clone().oneshot(get("/health")).await.unwrap();
    assert!(response.headers().contains_key(fhir_query_server::REQUEST_ID_HEADER));
}

#[tokio::test]
async fn test_unknown_route() {
    let app = test_app();
    let (status, body) = request(&app, get("/fhir/Patient")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["resourceType"], "OperationOutcome");
}

#[tokio::test]
async fn test_rate_limit() {
    let app = test_app_with_rps(1);

    let (status, _) = request(&app, post("/query", json!({"query": "all patients"}))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = request(&app, post("/query", json!({"query": "all patients"}))).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["issue"][0]["code"], "throttled");

    // health is not rate limited
    let (status, _) = request(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
}

/// Fetch /metrics as text.
async fn metrics_text(app: &Router) -> String {
    let response = app.clone().oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = test_app();
    request(&app, post("/query", json!({"query": "all patients"}))).await;

    let body = metrics_text(&app).await;
    assert!(body.contains("query_intents_total"), "metrics body: {}", body);
    assert!(body.contains(r#"intent="get_all_patients""#), "metrics body: {}", body);
    assert!(body.contains("http_requests_total"), "metrics body: {}", body);
}

#[tokio::test]
async fn test_metrics_shared_across_apps() {
    let _first = test_app();
    let second = test_app();
    request(&second, post("/query", json!({"query": "Patients over 70"}))).await;

    let body = metrics_text(&second).await;
    assert!(body.contains(r#"intent="get_patients_over_70""#), "metrics body: {}", body);
}

#[tokio::test]
async fn test_client_round_trip() {
    let base_url = spawn_server().await;
    let client = QueryClient::new(base_url);

    let output = client.query("ALL PATIENTS").await.expect("query failed");
    assert_eq!(output.parse.intent, "get_all_patients");
    assert_eq!(output.parse.resource_type, ResourceType::Patient);
    assert_eq!(output.bundle.patients().count(), 7);

    let expected = QueryResolver::with_fixtures().resolve("ALL PATIENTS");
    assert_eq!(output, expected);

    let suggestions = client.suggestions("patients over").await.expect("suggestions failed");
    assert_eq!(suggestions.len(), 3);
}

#[tokio::test]
async fn test_client_reports_status_errors() {
    let base_url = spawn_server().await;
    let client = QueryClient::new(format!("{}/", base_url));

    let err = client.query("  ").await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    match err {
        ClientError::Status { message, .. } => assert_eq!(message, "No query provided"),
        other => panic!("Expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_client_reports_transport_errors() {
    // Bind then drop to get a port nothing listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = QueryClient::new(format!("http://{}", addr));
    let err = client.query("all patients").await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)));
    assert!(err.to_string().starts_with("Failed to fetch data"));
}
