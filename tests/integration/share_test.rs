//! Per-user shares, visibility, ownership transfer, and public links.

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_public_link_with_unknown_token_needs_database() {
    let app = TestApp::offline();

    // Public routes carry no auth, so the lookup itself fails.
    let response = app
        .request("GET", "/api/v1/public/unknown-token", None, None)
        .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["message"], "An unexpected error occurred");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_unshared_file_is_invisible_to_others() {
    let app = TestApp::with_database().await;
    let (_, owner) = app.register("owner@example.com").await;
    let (_, stranger) = app.register("stranger@example.com").await;
    let file_id = app.upload(&owner, "secret.txt", b"classified").await;

    let response = app
        .request("GET", &format!("/api/v1/files/{file_id}"), None, Some(&stranger))
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_share_grants_and_revoke_removes_access() {
    let app = TestApp::with_database().await;
    let (_, owner) = app.register("sharer@example.com").await;
    let (friend_id, friend) = app.register("friend@example.com").await;
    let file_id = app.upload(&owner, "plans.txt", b"picnic").await;

    let shared = app
        .request(
            "POST",
            &format!("/api/v1/files/{file_id}/share"),
            Some(json!({ "user_id": friend_id, "permission": "read" })),
            Some(&owner),
        )
        .await;
    assert_eq!(shared.status, StatusCode::CREATED);
    assert_eq!(shared.body["data"]["permission"], "read");

    let listed = app
        .request("GET", "/api/v1/files/shared", None, Some(&friend))
        .await;
    assert_eq!(listed.body["data"]["items"][0]["id"], file_id.to_string());

    let download = app
        .request(
            "GET",
            &format!("/api/v1/files/{file_id}/download"),
            None,
            Some(&friend),
        )
        .await;
    assert_eq!(download.bytes, b"picnic");

    // Read does not include write.
    let rename = app
        .request(
            "PUT",
            &format!("/api/v1/files/{file_id}"),
            Some(json!({ "name": "mine.txt" })),
            Some(&friend),
        )
        .await;
    assert_eq!(rename.status, StatusCode::FORBIDDEN);

    let revoked = app
        .request(
            "DELETE",
            &format!("/api/v1/files/{file_id}/share/{friend_id}"),
            None,
            Some(&owner),
        )
        .await;
    assert_eq!(revoked.status, StatusCode::NO_CONTENT);

    let after = app
        .request("GET", &format!("/api/v1/files/{file_id}"), None, Some(&friend))
        .await;
    assert_eq!(after.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_owner_permission_cannot_be_shared() {
    let app = TestApp::with_database().await;
    let (_, owner) = app.register("keeper@example.com").await;
    let (other_id, _) = app.register("hopeful@example.com").await;
    let file_id = app.upload(&owner, "deed.txt", b"mine").await;

    let response = app
        .request(
            "POST",
            &format!("/api/v1/files/{file_id}/share"),
            Some(json!({ "user_id": other_id, "permission": "owner" })),
            Some(&owner),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_public_visibility_allows_any_user_to_read() {
    let app = TestApp::with_database().await;
    let (_, owner) = app.register("publisher@example.com").await;
    let (_, reader) = app.register("reader@example.com").await;
    let file_id = app.upload(&owner, "poster.txt", b"hello world").await;

    let visible = app
        .request(
            "PUT",
            &format!("/api/v1/files/{file_id}/visibility"),
            Some(json!({ "visibility": "public" })),
            Some(&owner),
        )
        .await;
    assert_eq!(visible.status, StatusCode::OK);

    let response = app
        .request("GET", &format!("/api/v1/files/{file_id}"), None, Some(&reader))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["visibility"], "public");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_transfer_ownership_moves_usage() {
    let app = TestApp::with_database().await;
    let (_, giver) = app.register("giver@example.com").await;
    let (taker_id, taker) = app.register("taker@example.com").await;
    let file_id = app.upload(&giver, "gift.txt", b"12345").await;

    let response = app
        .request(
            "POST",
            &format!("/api/v1/files/{file_id}/transfer-ownership"),
            Some(json!({ "new_owner_id": taker_id })),
            Some(&giver),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["owner_id"], taker_id.to_string());

    let giver_me = app.request("GET", "/api/v1/users/me", None, Some(&giver)).await;
    let taker_me = app.request("GET", "/api/v1/users/me", None, Some(&taker)).await;
    assert_eq!(giver_me.body["data"]["total_storage_used"], 0);
    assert_eq!(taker_me.body["data"]["total_storage_used"], 5);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_password_protected_public_link() {
    let app = TestApp::with_database().await;
    let (_, owner) = app.register("linker@example.com").await;
    let file_id = app.upload(&owner, "invite.txt", b"party at eight").await;

    let created = app
        .request(
            "POST",
            &format!("/api/v1/files/{file_id}/share-link"),
            Some(json!({ "password": "open-sesame" })),
            Some(&owner),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["data"]["requires_password"], true);
    let token = created.body["data"]["token"].as_str().unwrap().to_string();
    assert_eq!(created.body["data"]["url"], format!("/p/{token}"));

    let locked = app
        .request("GET", &format!("/api/v1/public/{token}"), None, None)
        .await;
    assert_eq!(locked.status, StatusCode::FORBIDDEN);

    let wrong = app
        .send(
            "GET",
            &format!("/api/v1/public/{token}"),
            None,
            "application/json".to_string(),
            Vec::new(),
            &[("x-link-password", "guess")],
        )
        .await;
    assert_eq!(wrong.status, StatusCode::FORBIDDEN);

    let download = app
        .request(
            "GET",
            &format!("/api/v1/public/{token}/download?password=open-sesame"),
            None,
            None,
        )
        .await;
    assert_eq!(download.status, StatusCode::OK);
    assert_eq!(download.bytes, b"party at eight");

    let removed = app
        .request(
            "DELETE",
            &format!("/api/v1/files/{file_id}/share-link"),
            None,
            Some(&owner),
        )
        .await;
    assert_eq!(removed.status, StatusCode::OK);

    let dead = app
        .request(
            "GET",
            &format!("/api/v1/public/{token}?password=open-sesame"),
            None,
            None,
        )
        .await;
    assert_eq!(dead.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_expired_public_link_is_not_found() {
    let app = TestApp::with_database().await;
    let (_, owner) = app.register("fleeting@example.com").await;
    let file_id = app.upload(&owner, "flyer.txt", b"sale today").await;

    let created = app
        .request(
            "POST",
            &format!("/api/v1/files/{file_id}/share-link"),
            Some(json!({})),
            Some(&owner),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let token = created.body["data"]["token"].as_str().unwrap().to_string();

    let live = app
        .request("GET", &format!("/api/v1/public/{token}"), None, None)
        .await;
    assert_eq!(live.status, StatusCode::OK);

    sqlx::query("UPDATE public_links SET expires_at = NOW() - INTERVAL '1 second' WHERE token = $1")
        .bind(&token)
        .execute(&app.db_pool)
        .await
        .unwrap();

    let expired = app
        .request("GET", &format!("/api/v1/public/{token}/download"), None, None)
        .await;
    assert_eq!(expired.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_link_password_keeps_surrounding_spaces() {
    let app = TestApp::with_database().await;
    let (_, owner) = app.register("spacey@example.com").await;
    let file_id = app.upload(&owner, "padded.txt", b"mind the gap").await;

    let created = app
        .request(
            "POST",
            &format!("/api/v1/files/{file_id}/share-link"),
            Some(json!({ "password": " s3cret " })),
            Some(&owner),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let token = created.body["data"]["token"].as_str().unwrap().to_string();

    let exact = app
        .request(
            "GET",
            &format!("/api/v1/public/{token}?password=%20s3cret%20"),
            None,
            None,
        )
        .await;
    assert_eq!(exact.status, StatusCode::OK);

    let trimmed = app
        .request("GET", &format!("/api/v1/public/{token}?password=s3cret"), None, None)
        .await;
    assert_eq!(trimmed.status, StatusCode::FORBIDDEN);
}
