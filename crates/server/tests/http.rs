//! Router tests driven through the Axum app via `tower::ServiceExt`.
//!
//! These cover everything reachable without the external collaborators:
//! liveness, input validation, and API-key enforcement. Requests that would
//! reach Gemini or BigQuery are exercised in `pipeline.rs` against fakes.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::Value as JsonValue;
use tower::ServiceExt;

use nlq_server::config::Config;
use nlq_server::{AppState, BigQueryClient, GeminiClient};

const TEST_API_KEY: &str = "test-secret-key";

/// Build the app router with test configuration.
fn test_app(api_key: Option<&str>) -> Router {
    let config = Config {
        gcp_project: "test-project".to_string(),
        bigquery_access_token: "test-token".to_string(),
        bigquery_location: "US".to_string(),
        gemini_api_key: "test-key".to_string(),
        gemini_model: "gemini-2.0-flash".to_string(),
        bind_address: "0.0.0.0:0".to_string(),
        api_key: api_key.map(String::from),
        cors_origins: vec!["*".to_string()],
        rate_limit_rps: 1000,
    };

    let state = AppState {
        llm: GeminiClient::new(config.gemini_api_key.clone(), config.gemini_model.clone()),
        warehouse: BigQueryClient::new(
            config.gcp_project.clone(),
            config.bigquery_access_token.clone(),
            config.bigquery_location.clone(),
        ),
    };

    nlq_server::build_app(state, &config)
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

fn post_query(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/query")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_reports_healthy() {
    let app = test_app(None);
    let req = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let (status, body) = request(&app, req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn missing_text_input_is_rejected_without_downstream_calls() {
    let app = test_app(None);

    let (status, body) = request(&app, post_query("{}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "MISSING_INPUT");
    assert_eq!(body["message"], "textInput is required.");
}

#[tokio::test]
async fn blank_text_input_counts_as_missing() {
    let app = test_app(None);

    let (status, body) = request(&app, post_query(r#"{"textInput": "   "}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "MISSING_INPUT");
}

#[tokio::test]
async fn config_options_do_not_substitute_for_input() {
    let app = test_app(None);

    let (status, body) = request(&app, post_query(r#"{"limit": 10, "dryRun": true}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "MISSING_INPUT");
}

#[tokio::test]
async fn api_key_is_enforced_when_configured() {
    let app = test_app(Some(TEST_API_KEY));

    // No key
    let (status, body) = request(&app, post_query("{}")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHORIZED");

    // Wrong key
    let req = Request::builder()
        .method("POST")
        .uri("/api/query")
        .header("content-type", "application/json")
        .header("X-API-Key", "wrong")
        .body(Body::from("{}"))
        .unwrap();
    let (status, _) = request(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Correct key reaches the handler (which then rejects the empty body)
    let req = Request::builder()
        .method("POST")
        .uri("/api/query")
        .header("content-type", "application/json")
        .header("X-API-Key", TEST_API_KEY)
        .body(Body::from("{}"))
        .unwrap();
    let (status, body) = request(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "MISSING_INPUT");
}

#[tokio::test]
async fn health_is_public_even_with_auth_enabled() {
    let app = test_app(Some(TEST_API_KEY));
    let req = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let (status, _) = request(&app, req).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let app = test_app(None);
    let req = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(req).await.unwrap();
    assert!(response.headers().contains_key("X-Request-ID"));
}
