//! Integration tests for health check endpoints

mod common;

use axum::http::StatusCode;

#[tokio::test]
async fn test_health_endpoint() {
    let app = common::TestApp::in_memory();

    let response = app.get("/health", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "healthy");
}

#[tokio::test]
async fn test_liveness_endpoint() {
    let app = common::TestApp::in_memory();

    let response = app.get("/health/live", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "alive");
}

#[tokio::test]
async fn test_readiness_endpoint() {
    let app = common::TestApp::in_memory();

    let response = app.get("/health/ready", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ready");
    assert_eq!(response.body["checks"]["store"]["status"], "healthy");
}

#[tokio::test]
async fn test_unknown_route() {
    let app = common::TestApp::in_memory();

    let response = app.get("/api/v1/", None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["message"], "Sorry Not Found");
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_readiness_against_postgres() {
    let app = common::TestApp::postgres().await;

    let response = app.get("/health/ready", None).await;

    assert_eq!(response.status, StatusCode::OK);
}
