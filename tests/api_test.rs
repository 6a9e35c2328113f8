//! HTTP API tests, driven in-process through the router

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use premium_engine::api::{create_router, AppState, RateLimiter};
use premium_engine::{RateTable, TelemetryCollector};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn app_with_limit(limit: u32) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(
        RateTable::builtin(),
        Arc::new(TelemetryCollector::new()),
        Arc::new(RateLimiter::new(limit, Duration::from_secs(60))),
    ));
    (create_router(state.clone()), state)
}

fn app() -> (Router, Arc<AppState>) {
    app_with_limit(1000)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health() {
    let (app, _) = app();
    let (status, body) = send(app.clone(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "healthy");
    assert_eq!(body["data"]["categories"], 4);

    let (status, _) = send(app, get("/v1/health")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_estimate_auto() {
    let (app, state) = app();
    let (status, body) = send(
        app,
        post_json(
            "/v1/premium/estimate",
            json!({ "category": "auto", "age": 45, "driving_history": "fair", "coverage": "premium" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["category"], "auto");
    assert_eq!(data["label"], "Auto Insurance");
    assert_eq!(data["annual_premium"], 1548);
    assert_eq!(data["monthly_premium"], 129.0);
    assert_eq!(data["annual_premium_display"], "$1548.00");
    assert_eq!(data["monthly_premium_display"], "$129.00");
    assert_eq!(data["breakdown"].as_array().unwrap().len(), 3);
    assert!(data["estimate_id"].as_str().unwrap().len() > 10);
    assert!(data["disclaimer"].as_str().unwrap().contains("estimate"));

    assert_eq!(state.telemetry.get_stats().total_estimates, 1);
}

#[tokio::test]
async fn test_estimate_home() {
    let (app, _) = app();
    let (status, body) = send(
        app,
        post_json(
            "/v1/premium/estimate",
            json!({ "category": "home", "property_value": 600000, "location": "rural", "coverage": "basic" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["annual_premium"], 1965);
    assert_eq!(body["data"]["monthly_premium"], 163.75);
}

#[tokio::test]
async fn test_unknown_category_is_bad_request() {
    let (app, state) = app();
    let (status, body) = send(
        app,
        post_json("/v1/premium/estimate", json!({ "category": "boat", "coverage": "basic" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "RATE_UNKNOWN_CATEGORY");
    assert_eq!(body["error"]["message"], "Please select a valid insurance type");

    let stats = state.telemetry.get_stats();
    assert_eq!(stats.total_failures, 1);
    assert_eq!(stats.failures_by_code.get("RATE_UNKNOWN_CATEGORY"), Some(&1));
}

#[tokio::test]
async fn test_missing_field_is_unprocessable() {
    let (app, _) = app();
    let (status, body) = send(
        app,
        post_json("/v1/premium/estimate", json!({ "category": "home", "coverage": "standard" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "RATE_MISSING_FIELD");
    assert_eq!(body["error"]["field"], "property_value");
    assert_eq!(body["error"]["details"], "missing: property_value, location");
}

#[tokio::test]
async fn test_categories() {
    let (app, _) = app();
    let (status, body) = send(app, get("/v1/categories")).await;

    assert_eq!(status, StatusCode::OK);
    let categories = body["data"].as_array().unwrap();
    let keys: Vec<&str> = categories.iter().map(|c| c["key"].as_str().unwrap()).collect();
    assert_eq!(keys, vec!["auto", "home", "life", "health"]);

    let auto = &categories[0];
    assert_eq!(auto["base_price"], 1200.0);
    assert_eq!(auto["min_age"], 18);
    assert_eq!(auto["max_age"], 80);
    assert_eq!(
        auto["required_fields"],
        json!(["age", "driving_history", "coverage"])
    );
}

#[tokio::test]
async fn test_batch_estimate() {
    let (app, state) = app();
    let (status, body) = send(
        app,
        post_json(
            "/v1/premium/estimate/batch",
            json!({ "requests": [
                { "category": "life", "age": 30, "health_status": "good", "coverage": "standard" },
                { "category": "health", "age": 30, "health_status": "good", "coverage": "standard" },
                { "category": "pet", "coverage": "standard" },
                { "category": "auto", "age": 30 }
            ]}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["total_requested"], 4);
    assert_eq!(data["total_succeeded"], 2);
    assert_eq!(data["total_failed"], 2);
    assert_eq!(data["results"][0]["estimate"]["annual_premium"], 800);
    assert_eq!(data["results"][1]["estimate"]["annual_premium"], 2000);
    assert_eq!(data["results"][2]["error"]["code"], "RATE_UNKNOWN_CATEGORY");
    assert_eq!(data["results"][3]["error"]["field"], "driving_history");

    let stats = state.telemetry.get_stats();
    assert_eq!(stats.total_estimates, 2);
    assert_eq!(stats.total_failures, 2);
}

#[tokio::test]
async fn test_empty_batch_rejected() {
    let (app, _) = app();
    let (status, body) = send(
        app,
        post_json("/v1/premium/estimate/batch", json!({ "requests": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "API_BAD_REQUEST");
}

#[tokio::test]
async fn test_stats_reflect_estimates() {
    let (app, _) = app();
    let request = json!({ "category": "auto", "age": 25, "driving_history": "good", "coverage": "standard" });
    send(app.clone(), post_json("/v1/premium/estimate", request.clone())).await;
    send(app.clone(), post_json("/v1/premium/estimate", request)).await;

    let (status, body) = send(app, get("/v1/stats")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_estimates"], 2);
    assert_eq!(body["data"]["estimates_by_category"]["auto"], 2);
    assert_eq!(body["data"]["avg_annual_premium"], 1200.0);
}

#[tokio::test]
async fn test_rate_limit() {
    let (app, _) = app_with_limit(2);
    let request = || {
        Request::builder()
            .uri("/v1/categories")
            .header("x-forwarded-for", "198.51.100.4")
            .body(Body::empty())
            .unwrap()
    };

    let response = app.clone().oneshot(request()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-ratelimit-remaining"], "1");

    let response = app.clone().oneshot(request()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, body) = send(app.clone(), request()).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"]["code"], "API_RATE_LIMITED");

    // Health checks are never limited
    let (status, _) = send(app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
}
