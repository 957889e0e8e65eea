//! Health endpoint and routing basics.

use axum::http::StatusCode;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_health_without_database_is_degraded() {
    let app = TestApp::offline();

    let response = app.request("GET", "/api/v1/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "degraded");
    assert_eq!(response.body["data"]["active_uploads"], 0);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_health_with_database_is_ok() {
    let app = TestApp::with_database().await;

    let response = app.request("GET", "/api/v1/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
    assert_eq!(response.body["data"]["database"], true);
}

#[tokio::test]
async fn test_routes_outside_api_prefix_are_not_found() {
    let app = TestApp::offline();

    let response = app.request("GET", "/health", None, None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
