//! Chunked upload sessions.

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use crate::helpers::{TestApp, multipart_body, multipart_content_type};

const HELLO_WORLD_SHA256: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

async fn send_chunk(
    app: &TestApp,
    token: &str,
    upload_id: &str,
    chunk_number: u32,
    data: &[u8],
) -> crate::helpers::TestResponse {
    let number = chunk_number.to_string();
    app.send(
        "POST",
        &format!("/api/v1/uploads/{upload_id}"),
        Some(token),
        multipart_content_type(),
        multipart_body(&[
            ("chunk_number", None, number.as_bytes()),
            ("chunk", Some("blob"), data),
        ]),
        &[],
    )
    .await
}

#[tokio::test]
async fn test_chunk_for_unknown_session_is_rejected() {
    let app = TestApp::offline();
    let token = app.mint_token(Uuid::new_v4());

    let response = send_chunk(&app, &token, "no-such-upload", 0, b"data").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_chunk_without_number_is_rejected() {
    let app = TestApp::offline();
    let token = app.mint_token(Uuid::new_v4());

    let response = app
        .send(
            "POST",
            "/api/v1/uploads/whatever",
            Some(&token),
            multipart_content_type(),
            multipart_body(&[("chunk", Some("blob"), b"data")]),
            &[],
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "chunk_number is required");
}

#[tokio::test]
async fn test_initiate_rejects_non_positive_size() {
    let app = TestApp::offline();
    let token = app.mint_token(Uuid::new_v4());

    let response = app
        .request(
            "POST",
            "/api/v1/uploads/initiate",
            Some(json!({ "file_name": "a.bin", "content_type": "application/octet-stream", "file_size": 0 })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_chunked_upload_assembles_in_order() {
    let app = TestApp::with_database().await;
    let (_, token) = app.register("chunks@example.com").await;

    let initiated = app
        .request(
            "POST",
            "/api/v1/uploads/initiate",
            Some(json!({ "file_name": "greeting.txt", "content_type": "text/plain", "file_size": 11 })),
            Some(&token),
        )
        .await;
    assert_eq!(initiated.status, StatusCode::CREATED);
    let upload_id = initiated.body["data"]["upload_id"]
        .as_str()
        .unwrap()
        .to_string();

    // Out of order on purpose.
    let second = send_chunk(&app, &token, &upload_id, 1, b"world").await;
    assert_eq!(second.status, StatusCode::OK);
    let first = send_chunk(&app, &token, &upload_id, 0, b"hello ").await;
    assert_eq!(first.body["data"]["received_bytes"], 11);

    let completed = app
        .request(
            "POST",
            &format!("/api/v1/uploads/{upload_id}/complete"),
            Some(json!({ "file_hash": HELLO_WORLD_SHA256 })),
            Some(&token),
        )
        .await;
    assert_eq!(completed.status, StatusCode::CREATED);
    assert_eq!(completed.body["data"]["hash"], HELLO_WORLD_SHA256);

    let file_id = completed.body["data"]["id"].as_str().unwrap();
    let download = app
        .request(
            "GET",
            &format!("/api/v1/files/{file_id}/download"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(download.bytes, b"hello world");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_incomplete_upload_cannot_complete() {
    let app = TestApp::with_database().await;
    let (_, token) = app.register("partial@example.com").await;

    let initiated = app
        .request(
            "POST",
            "/api/v1/uploads/initiate",
            Some(json!({ "file_name": "half.txt", "content_type": "text/plain", "file_size": 10 })),
            Some(&token),
        )
        .await;
    let upload_id = initiated.body["data"]["upload_id"]
        .as_str()
        .unwrap()
        .to_string();
    send_chunk(&app, &token, &upload_id, 0, b"12345").await;

    let completed = app
        .request(
            "POST",
            &format!("/api/v1/uploads/{upload_id}/complete"),
            Some(json!({})),
            Some(&token),
        )
        .await;
    assert_eq!(completed.status, StatusCode::BAD_REQUEST);

    // The session is gone after a failed completion.
    let cancel = app
        .request(
            "DELETE",
            &format!("/api/v1/uploads/{upload_id}"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(cancel.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_sessions_are_private_to_their_owner() {
    let app = TestApp::with_database().await;
    let (_, owner) = app.register("mine@example.com").await;
    let (_, other) = app.register("yours@example.com").await;

    let initiated = app
        .request(
            "POST",
            "/api/v1/uploads/initiate",
            Some(json!({ "file_name": "x.txt", "content_type": "text/plain", "file_size": 3 })),
            Some(&owner),
        )
        .await;
    let upload_id = initiated.body["data"]["upload_id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = send_chunk(&app, &other, &upload_id, 0, b"abc").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let cancel = app
        .request(
            "DELETE",
            &format!("/api/v1/uploads/{upload_id}"),
            None,
            Some(&owner),
        )
        .await;
    assert_eq!(cancel.status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_chunk_number_query_must_be_numeric() {
    let app = TestApp::offline();
    let token = app.mint_token(Uuid::new_v4());

    let response = app
        .send(
            "POST",
            "/api/v1/uploads/whatever?chunk_number=first",
            Some(&token),
            multipart_content_type(),
            multipart_body(&[("chunk", Some("blob"), b"data")]),
            &[],
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.content_type.as_deref(), Some("application/json"));
    assert_eq!(response.body["error"], "VALIDATION");
}
