//! Registration, login, token refresh, and account deactivation.

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use crate::helpers::{PASSWORD, TestApp};

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = TestApp::offline();

    for path in ["/api/v1/users/me", "/api/v1/files", "/api/v1/tags"] {
        let response = app.request("GET", path, None, None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{path}");
        assert_eq!(response.body["error"], "AUTHENTICATION");
    }
}

#[tokio::test]
async fn test_register_rejects_invalid_fields() {
    let app = TestApp::offline();

    let response = app
        .request(
            "POST",
            "/api/v1/users/register",
            Some(json!({
                "email": "not-an-email",
                "password": "short",
                "first_name": "",
                "last_name": "User",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let details = &response.body["details"];
    assert!(details["email"].is_array());
    assert!(details["first_name"].is_array());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_register_then_login() {
    let app = TestApp::with_database().await;
    let (user_id, token) = app.register("ada@example.com").await;

    let me = app.request("GET", "/api/v1/users/me", None, Some(&token)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["data"]["id"], user_id.to_string());
    assert_eq!(me.body["data"]["total_storage_used"], 0);
    assert_eq!(me.body["data"]["storage_quota"], 5_000_000_000i64);

    let login = app
        .request(
            "POST",
            "/api/v1/users/login",
            Some(json!({ "email": "ada@example.com", "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(login.status, StatusCode::OK);
    assert_eq!(login.body["data"]["token_type"], "Bearer");
    assert!(login.body["data"]["user"]["last_login_at"].is_string());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_duplicate_email_conflicts() {
    let app = TestApp::with_database().await;
    app.register("dup@example.com").await;

    let response = app
        .request(
            "POST",
            "/api/v1/users/register",
            Some(json!({
                "email": "DUP@example.com",
                "password": PASSWORD,
                "first_name": "Again",
                "last_name": "User",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_wrong_password_is_unauthorized() {
    let app = TestApp::with_database().await;
    app.register("grace@example.com").await;

    let response = app
        .request(
            "POST",
            "/api/v1/users/login",
            Some(json!({ "email": "grace@example.com", "password": "not-the-password" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["message"], "Invalid credentials");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_refresh_token_rotates() {
    let app = TestApp::with_database().await;
    app.register("linus@example.com").await;

    let login = app
        .request(
            "POST",
            "/api/v1/users/login",
            Some(json!({ "email": "linus@example.com", "password": PASSWORD })),
            None,
        )
        .await;
    let refresh = login.body["data"]["refresh_token"]
        .as_str()
        .unwrap()
        .to_string();

    let first = app
        .request(
            "POST",
            "/api/v1/users/refresh-token",
            Some(json!({ "refresh_token": refresh })),
            None,
        )
        .await;
    assert_eq!(first.status, StatusCode::OK);
    assert_ne!(first.body["data"]["refresh_token"], refresh.as_str());

    // The consumed token cannot be replayed.
    let replay = app
        .request(
            "POST",
            "/api/v1/users/refresh-token",
            Some(json!({ "refresh_token": refresh })),
            None,
        )
        .await;
    assert_eq!(replay.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_deactivated_user_cannot_log_in() {
    let app = TestApp::with_database().await;
    let (_, token) = app.register("gone@example.com").await;

    let deleted = app
        .request("DELETE", "/api/v1/users/me", None, Some(&token))
        .await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let login = app
        .request(
            "POST",
            "/api/v1/users/login",
            Some(json!({ "email": "gone@example.com", "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(login.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_cannot_delete_another_user() {
    let app = TestApp::with_database().await;
    let (_, token) = app.register("alice@example.com").await;
    let (bob, _) = app.register("bob@example.com").await;

    let response = app
        .request(
            "DELETE",
            &format!("/api/v1/users/{bob}"),
            None,
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_signed_token_reaches_handler() {
    let app = TestApp::offline();
    let token = app.mint_token(Uuid::new_v4());

    // Cancelling an unknown upload is answered from memory, past the auth check.
    let response = app
        .request("DELETE", "/api/v1/uploads/no-such-upload", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION");
    assert_eq!(response.body["message"], "Invalid upload session.");
}
