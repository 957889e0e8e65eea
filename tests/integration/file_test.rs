//! File upload, metadata, versions, tags, favorites, and deletion.

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use crate::helpers::{TestApp, multipart_body, multipart_content_type};

#[tokio::test]
async fn test_upload_requires_token() {
    let app = TestApp::offline();

    let response = app
        .send(
            "POST",
            "/api/v1/files/upload",
            None,
            multipart_content_type(),
            multipart_body(&[("file", Some("a.txt"), b"hello")]),
            &[],
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_file_type_is_json_validation_error() {
    let app = TestApp::offline();
    let token = app.mint_token(Uuid::new_v4());

    let response = app
        .request("GET", "/api/v1/files?file_type=bogus", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.content_type.as_deref(), Some("application/json"));
    assert_eq!(response.body["error"], "VALIDATION");
    assert!(
        response.body["message"]
            .as_str()
            .unwrap()
            .starts_with("Invalid query string")
    );
}

#[tokio::test]
async fn test_upload_without_multipart_is_json_validation_error() {
    let app = TestApp::offline();
    let token = app.mint_token(Uuid::new_v4());

    let response = app
        .request(
            "POST",
            "/api/v1/files/upload",
            Some(json!({ "name": "a.txt" })),
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.content_type.as_deref(), Some("application/json"));
    assert_eq!(response.body["error"], "VALIDATION");
}

#[tokio::test]
async fn test_tag_search_with_bad_limit_is_json_validation_error() {
    let app = TestApp::offline();
    let token = app.mint_token(Uuid::new_v4());

    let response = app
        .request("GET", "/api/v1/tags/search?q=a&limit=lots", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_upload_and_download_round_trip() {
    let app = TestApp::with_database().await;
    let (owner, token) = app.register("files@example.com").await;

    let file_id = app.upload(&token, "notes.txt", b"remember the milk").await;

    let meta = app
        .request("GET", &format!("/api/v1/files/{file_id}"), None, Some(&token))
        .await;
    assert_eq!(meta.status, StatusCode::OK);
    assert_eq!(meta.body["data"]["name"], "notes.txt");
    assert_eq!(meta.body["data"]["size"], 17);
    assert_eq!(meta.body["data"]["owner_id"], owner.to_string());
    assert_eq!(meta.body["data"]["version_count"], 1);
    assert_eq!(meta.body["data"]["visibility"], "private");

    let download = app
        .request(
            "GET",
            &format!("/api/v1/files/{file_id}/download"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(download.status, StatusCode::OK);
    assert_eq!(download.bytes, b"remember the milk");

    let me = app.request("GET", "/api/v1/users/me", None, Some(&token)).await;
    assert_eq!(me.body["data"]["total_storage_used"], 17);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_new_version_replaces_content() {
    let app = TestApp::with_database().await;
    let (_, token) = app.register("versions@example.com").await;
    let file_id = app.upload(&token, "draft.txt", b"v1").await;

    let response = app
        .send(
            "POST",
            &format!("/api/v1/files/{file_id}/versions"),
            Some(&token),
            multipart_content_type(),
            multipart_body(&[("file", Some("draft.txt"), b"version two")]),
            &[],
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["data"]["version_count"], 2);
    assert_eq!(response.body["data"]["size"], 11);

    let versions = app
        .request(
            "GET",
            &format!("/api/v1/files/{file_id}/versions"),
            None,
            Some(&token),
        )
        .await;
    let numbers: Vec<i64> = versions.body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["version_number"].as_i64().unwrap())
        .collect();
    assert_eq!(numbers, vec![2, 1]);

    let first = app
        .request(
            "GET",
            &format!("/api/v1/files/{file_id}/versions/1/download"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(first.bytes, b"v1");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_update_metadata_and_tags() {
    let app = TestApp::with_database().await;
    let (_, token) = app.register("tags@example.com").await;
    let file_id = app.upload(&token, "photo.txt", b"pixels").await;

    let updated = app
        .request(
            "PUT",
            &format!("/api/v1/files/{file_id}"),
            Some(json!({ "name": "holiday.txt", "description": "Beach" })),
            Some(&token),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["data"]["name"], "holiday.txt");

    let tagged = app
        .request(
            "PUT",
            &format!("/api/v1/files/{file_id}/tags"),
            Some(json!({ "tags": ["Travel", "travel", " summer "] })),
            Some(&token),
        )
        .await;
    assert_eq!(tagged.status, StatusCode::OK);
    assert_eq!(tagged.body["data"]["tags"], json!(["summer", "travel"]));

    let search = app
        .request("GET", "/api/v1/files?tags=travel", None, Some(&token))
        .await;
    assert_eq!(search.status, StatusCode::OK);
    assert_eq!(search.body["data"]["total_items"], 1);

    let suggestions = app
        .request("GET", "/api/v1/tags/search?q=sum", None, Some(&token))
        .await;
    assert_eq!(suggestions.body["data"], json!(["summer"]));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_favorites() {
    let app = TestApp::with_database().await;
    let (_, token) = app.register("fav@example.com").await;
    let file_id = app.upload(&token, "keep.txt", b"keep").await;

    let added = app
        .request(
            "POST",
            &format!("/api/v1/files/{file_id}/favorite"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(added.status, StatusCode::NO_CONTENT);

    let favorites = app
        .request("GET", "/api/v1/files/favorites", None, Some(&token))
        .await;
    assert_eq!(favorites.body["data"]["items"][0]["id"], file_id.to_string());
    assert_eq!(favorites.body["data"]["items"][0]["is_favorite"], true);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_delete_releases_quota_and_restore_charges_it() {
    let app = TestApp::with_database().await;
    let (_, token) = app.register("trash@example.com").await;
    let file_id = app.upload(&token, "old.txt", b"0123456789").await;

    let deleted = app
        .request("DELETE", &format!("/api/v1/files/{file_id}"), None, Some(&token))
        .await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let gone = app
        .request("GET", &format!("/api/v1/files/{file_id}"), None, Some(&token))
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);

    let me = app.request("GET", "/api/v1/users/me", None, Some(&token)).await;
    assert_eq!(me.body["data"]["total_storage_used"], 0);

    let restored = app
        .request(
            "POST",
            &format!("/api/v1/files/{file_id}/restore"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(restored.status, StatusCode::OK);

    let me = app.request("GET", "/api/v1/users/me", None, Some(&token)).await;
    assert_eq!(me.body["data"]["total_storage_used"], 10);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_upload_over_quota_is_rejected() {
    let app = TestApp::with_database().await;
    let (user_id, token) = app.register("tight@example.com").await;

    sqlx::query("UPDATE users SET storage_quota = 4 WHERE id = $1")
        .bind(user_id)
        .execute(&app.db_pool)
        .await
        .unwrap();

    let response = app
        .send(
            "POST",
            "/api/v1/files/upload",
            Some(&token),
            multipart_content_type(),
            multipart_body(&[("file", Some("big.txt"), b"too large")]),
            &[],
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "Storage quota exceeded");
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_tag_filter_requires_every_tag() {
    let app = TestApp::with_database().await;
    let (_, token) = app.register("alltags@example.com").await;
    let both = app.upload(&token, "both.txt", b"ab").await;
    let only_a = app.upload(&token, "only-a.txt", b"a").await;

    for (file_id, tags) in [(both, json!(["alpha", "beta"])), (only_a, json!(["alpha"]))] {
        let response = app
            .request(
                "PUT",
                &format!("/api/v1/files/{file_id}/tags"),
                Some(json!({ "tags": tags })),
                Some(&token),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
    }

    let either = app
        .request("GET", "/api/v1/files?tags=alpha", None, Some(&token))
        .await;
    assert_eq!(either.body["data"]["total_items"], 2);

    let all = app
        .request("GET", "/api/v1/files?tags=Alpha,beta", None, Some(&token))
        .await;
    assert_eq!(all.body["data"]["total_items"], 1);
    assert_eq!(all.body["data"]["items"][0]["id"], both.to_string());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_search_term_matches_name_or_description() {
    let app = TestApp::with_database().await;
    let (_, token) = app.register("finder@example.com").await;
    let report = app.upload(&token, "Quarterly Report.txt", b"q3").await;
    let described = app.upload(&token, "scan-001.txt", b"img").await;
    let sale = app.upload(&token, "50%_off.txt", b"coupon").await;
    app.upload(&token, "500 offers.txt", b"spam").await;

    let response = app
        .request(
            "PUT",
            &format!("/api/v1/files/{described}"),
            Some(json!({ "description": "Signed REPORT from the bank" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let by_text = app
        .request("GET", "/api/v1/files?search_term=report", None, Some(&token))
        .await;
    assert_eq!(by_text.body["data"]["total_items"], 2);
    let ids: Vec<&str> = by_text.body["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|f| f["id"].as_str())
        .collect();
    assert!(ids.contains(&report.to_string().as_str()));
    assert!(ids.contains(&described.to_string().as_str()));

    // `%` and `_` are literal characters, not wildcards.
    let literal = app
        .request("GET", "/api/v1/files?search_term=50%25_off", None, Some(&token))
        .await;
    assert_eq!(literal.body["data"]["total_items"], 1);
    assert_eq!(literal.body["data"]["items"][0]["id"], sale.to_string());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_expired_share_is_no_longer_listed() {
    let app = TestApp::with_database().await;
    let (_, owner) = app.register("lender@example.com").await;
    let (friend_id, friend) = app.register("borrower@example.com").await;
    let file_id = app.upload(&owner, "loan.txt", b"until friday").await;

    let shared = app
        .request(
            "POST",
            &format!("/api/v1/files/{file_id}/share"),
            Some(json!({ "user_id": friend_id, "permission": "read" })),
            Some(&owner),
        )
        .await;
    assert_eq!(shared.status, StatusCode::CREATED);

    let before = app
        .request("GET", "/api/v1/files?file_type=all", None, Some(&friend))
        .await;
    assert_eq!(before.body["data"]["total_items"], 1);

    sqlx::query(
        "UPDATE file_shares SET expires_at = NOW() - INTERVAL '1 minute' WHERE file_id = $1",
    )
    .bind(file_id)
    .execute(&app.db_pool)
    .await
    .unwrap();

    let shared_list = app
        .request("GET", "/api/v1/files/shared", None, Some(&friend))
        .await;
    assert_eq!(shared_list.body["data"]["total_items"], 0);

    let all = app
        .request("GET", "/api/v1/files?file_type=all", None, Some(&friend))
        .await;
    assert_eq!(all.body["data"]["total_items"], 0);

    let direct = app
        .request("GET", &format!("/api/v1/files/{file_id}"), None, Some(&friend))
        .await;
    assert_eq!(direct.status, StatusCode::NOT_FOUND);
}
