//! E2E tests for video listings, playback reads, comments and likes

mod common;

use common::TestServer;

#[tokio::test]
async fn test_listing_paginates_and_reports_totals() {
    let server = TestServer::new().await;
    let (owner_id, _access) = server.signup("uploader").await;

    for i in 0..15 {
        server
            .seed_video(&owner_id, &format!("video-{:02}", i), true)
            .await;
    }

    let response = server
        .client
        .get(server.url("/api/v1/videos?page=2&limit=10"))
        .send()
        .await
        .expect("request succeeds");
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.expect("response body");
    let data = &body["data"];
    assert_eq!(data["page"], 2);
    assert_eq!(data["limit"], 10);
    assert_eq!(data["totalItems"], 15);
    assert_eq!(data["totalPages"], 2);
    assert_eq!(data["items"].as_array().unwrap().len(), 5);

    // Owner columns fold into a nested object with a resolved avatar
    let first = &data["items"][0];
    assert_eq!(first["owner"]["username"], "uploader");
    assert!(first["owner"]["avatar"].as_str().unwrap().starts_with("https://"));
    assert!(first["videoUrl"]
        .as_str()
        .unwrap()
        .starts_with("https://media.test.example.com/videos/"));
}

#[tokio::test]
async fn test_listing_rejects_bad_page_params() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url("/api/v1/videos?page=0&limit=10"))
        .send()
        .await
        .expect("request succeeds");
    assert_eq!(response.status(), 400);

    let response = server
        .client
        .get(server.url("/api/v1/videos?sortBy=nonsense"))
        .send()
        .await
        .expect("request succeeds");
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_unpublished_video_hidden_from_public() {
    let server = TestServer::new().await;
    let (owner_id, owner_access) = server.signup("creator").await;
    let (_other_id, other_access) = server.signup("viewer").await;

    let draft_id = server.seed_video(&owner_id, "draft", false).await;

    // Absent from the public listing
    let response = server
        .client
        .get(server.url("/api/v1/videos"))
        .send()
        .await
        .expect("request succeeds");
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"]["totalItems"], 0);

    // 404 for strangers, visible to the owner
    let as_other = server
        .client
        .get(server.url(&format!("/api/v1/videos/{}", draft_id)))
        .bearer_auth(&other_access)
        .send()
        .await
        .expect("request succeeds");
    assert_eq!(as_other.status(), 404);

    let as_owner = server
        .client
        .get(server.url(&format!("/api/v1/videos/{}", draft_id)))
        .bearer_auth(&owner_access)
        .send()
        .await
        .expect("request succeeds");
    assert_eq!(as_owner.status(), 200);
}

#[tokio::test]
async fn test_authenticated_view_counts_and_records_history() {
    let server = TestServer::new().await;
    let (owner_id, _owner_access) = server.signup("channel").await;
    let (_viewer_id, viewer_access) = server.signup("watcher").await;

    let video_id = server.seed_video(&owner_id, "watchable", true).await;

    // Anonymous playback does not count
    let anon = server
        .client
        .get(server.url(&format!("/api/v1/videos/{}", video_id)))
        .send()
        .await
        .expect("request succeeds");
    let anon_body: serde_json::Value = anon.json().await.unwrap();
    assert_eq!(anon_body["data"]["views"], 0);

    // Authenticated playback does, twice over
    for _ in 0..2 {
        server
            .client
            .get(server.url(&format!("/api/v1/videos/{}", video_id)))
            .bearer_auth(&viewer_access)
            .send()
            .await
            .expect("request succeeds");
    }

    let check = server
        .client
        .get(server.url(&format!("/api/v1/videos/{}", video_id)))
        .send()
        .await
        .expect("request succeeds");
    let body: serde_json::Value = check.json().await.unwrap();
    assert_eq!(body["data"]["views"], 2);

    // Re-watching deduplicated into a single history entry
    let history = server
        .client
        .get(server.url("/api/v1/users/history"))
        .bearer_auth(&viewer_access)
        .send()
        .await
        .expect("request succeeds");
    let history_body: serde_json::Value = history.json().await.unwrap();
    assert_eq!(history_body["data"]["totalItems"], 1);
    assert_eq!(history_body["data"]["items"][0]["videoId"], video_id);
}

#[tokio::test]
async fn test_comment_lifecycle_and_ownership() {
    let server = TestServer::new().await;
    let (owner_id, _owner_access) = server.signup("host").await;
    let (_c1, commenter_access) = server.signup("commenter").await;
    let (_c2, intruder_access) = server.signup("intruder").await;

    let video_id = server.seed_video(&owner_id, "discussed", true).await;

    let created = server
        .client
        .post(server.url(&format!("/api/v1/comments/{}", video_id)))
        .bearer_auth(&commenter_access)
        .json(&serde_json::json!({"content": "first!"}))
        .send()
        .await
        .expect("request succeeds");
    assert_eq!(created.status(), 201);
    let created_body: serde_json::Value = created.json().await.unwrap();
    let comment_id = created_body["data"]["id"].as_str().unwrap().to_string();

    // Someone else cannot edit it
    let forbidden = server
        .client
        .patch(server.url(&format!("/api/v1/comments/c/{}", comment_id)))
        .bearer_auth(&intruder_access)
        .json(&serde_json::json!({"content": "hijacked"}))
        .send()
        .await
        .expect("request succeeds");
    assert_eq!(forbidden.status(), 403);

    // The author can
    let updated = server
        .client
        .patch(server.url(&format!("/api/v1/comments/c/{}", comment_id)))
        .bearer_auth(&commenter_access)
        .json(&serde_json::json!({"content": "edited"}))
        .send()
        .await
        .expect("request succeeds");
    assert_eq!(updated.status(), 200);

    let listing = server
        .client
        .get(server.url(&format!("/api/v1/comments/{}", video_id)))
        .send()
        .await
        .expect("request succeeds");
    let listing_body: serde_json::Value = listing.json().await.unwrap();
    assert_eq!(listing_body["data"]["totalItems"], 1);
    assert_eq!(listing_body["data"]["items"][0]["content"], "edited");
    assert_eq!(listing_body["data"]["items"][0]["owner"]["username"], "commenter");
}

#[tokio::test]
async fn test_like_toggle_roundtrip() {
    let server = TestServer::new().await;
    let (owner_id, _owner_access) = server.signup("likedchannel").await;
    let (_fan_id, fan_access) = server.signup("fan").await;

    let video_id = server.seed_video(&owner_id, "likeable", true).await;
    let toggle_url = server.url(&format!("/api/v1/likes/toggle/v/{}", video_id));

    let first: serde_json::Value = server
        .client
        .post(&toggle_url)
        .bearer_auth(&fan_access)
        .send()
        .await
        .expect("request succeeds")
        .json()
        .await
        .unwrap();
    assert_eq!(first["data"]["liked"], true);

    let liked: serde_json::Value = server
        .client
        .get(server.url("/api/v1/likes/videos"))
        .bearer_auth(&fan_access)
        .send()
        .await
        .expect("request succeeds")
        .json()
        .await
        .unwrap();
    assert_eq!(liked["data"]["totalItems"], 1);
    assert_eq!(liked["data"]["items"][0]["likeCount"], 1);

    let second: serde_json::Value = server
        .client
        .post(&toggle_url)
        .bearer_auth(&fan_access)
        .send()
        .await
        .expect("request succeeds")
        .json()
        .await
        .unwrap();
    assert_eq!(second["data"]["liked"], false);

    // Liking something that is gone is a 404
    let missing = server
        .client
        .post(server.url("/api/v1/likes/toggle/v/01MISSINGMISSINGMISSING00"))
        .bearer_auth(&fan_access)
        .send()
        .await
        .expect("request succeeds");
    assert_eq!(missing.status(), 404);
}
