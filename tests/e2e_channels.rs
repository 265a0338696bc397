//! E2E tests for tweets, subscriptions, playlists and the dashboard

mod common;

use common::TestServer;

#[tokio::test]
async fn test_tweet_lifecycle_and_ownership() {
    let server = TestServer::new().await;
    let (author_id, author_access) = server.signup("tweeter").await;
    let (_other_id, other_access) = server.signup("bystander").await;

    let created: serde_json::Value = server
        .client
        .post(server.url("/api/v1/tweets"))
        .bearer_auth(&author_access)
        .json(&serde_json::json!({"content": "hello world"}))
        .send()
        .await
        .expect("request succeeds")
        .json()
        .await
        .unwrap();
    assert_eq!(created["statusCode"], 201);
    let tweet_id = created["data"]["id"].as_str().unwrap().to_string();

    // Blank content rejected
    let blank = server
        .client
        .post(server.url("/api/v1/tweets"))
        .bearer_auth(&author_access)
        .json(&serde_json::json!({"content": "   "}))
        .send()
        .await
        .expect("request succeeds");
    assert_eq!(blank.status(), 400);

    // Only the author may delete
    let forbidden = server
        .client
        .delete(server.url(&format!("/api/v1/tweets/{}", tweet_id)))
        .bearer_auth(&other_access)
        .send()
        .await
        .expect("request succeeds");
    assert_eq!(forbidden.status(), 403);

    let listing: serde_json::Value = server
        .client
        .get(server.url(&format!("/api/v1/tweets/user/{}", author_id)))
        .send()
        .await
        .expect("request succeeds")
        .json()
        .await
        .unwrap();
    assert_eq!(listing["data"]["totalItems"], 1);
    assert_eq!(listing["data"]["items"][0]["content"], "hello world");

    let deleted = server
        .client
        .delete(server.url(&format!("/api/v1/tweets/{}", tweet_id)))
        .bearer_auth(&author_access)
        .send()
        .await
        .expect("request succeeds");
    assert_eq!(deleted.status(), 200);
}

#[tokio::test]
async fn test_subscription_toggle_and_profile_counts() {
    let server = TestServer::new().await;
    let (channel_id, channel_access) = server.signup("bigchannel").await;
    let (_fan_id, fan_access) = server.signup("loyalfan").await;

    // Self-subscription rejected
    let own = server
        .client
        .post(server.url(&format!("/api/v1/subscriptions/c/{}", channel_id)))
        .bearer_auth(&channel_access)
        .send()
        .await
        .expect("request succeeds");
    assert_eq!(own.status(), 400);

    let subscribed: serde_json::Value = server
        .client
        .post(server.url(&format!("/api/v1/subscriptions/c/{}", channel_id)))
        .bearer_auth(&fan_access)
        .send()
        .await
        .expect("request succeeds")
        .json()
        .await
        .unwrap();
    assert_eq!(subscribed["data"]["subscribed"], true);

    // Counts come out in the channel profile; is_subscribed reflects
    // the viewer's token
    let profile: serde_json::Value = server
        .client
        .get(server.url("/api/v1/users/c/bigchannel"))
        .bearer_auth(&fan_access)
        .send()
        .await
        .expect("request succeeds")
        .json()
        .await
        .unwrap();
    assert_eq!(profile["data"]["subscriberCount"], 1);
    assert_eq!(profile["data"]["isSubscribed"], true);

    let anon_profile: serde_json::Value = server
        .client
        .get(server.url("/api/v1/users/c/bigchannel"))
        .send()
        .await
        .expect("request succeeds")
        .json()
        .await
        .unwrap();
    assert_eq!(anon_profile["data"]["isSubscribed"], false);

    // Toggle back
    let unsubscribed: serde_json::Value = server
        .client
        .post(server.url(&format!("/api/v1/subscriptions/c/{}", channel_id)))
        .bearer_auth(&fan_access)
        .send()
        .await
        .expect("request succeeds")
        .json()
        .await
        .unwrap();
    assert_eq!(unsubscribed["data"]["subscribed"], false);
}

#[tokio::test]
async fn test_playlist_membership() {
    let server = TestServer::new().await;
    let (owner_id, owner_access) = server.signup("curator").await;
    let (_other_id, other_access) = server.signup("meddler").await;

    let video_id = server.seed_video(&owner_id, "collected", true).await;
    let draft_id = server.seed_video(&owner_id, "hidden-draft", false).await;

    let created: serde_json::Value = server
        .client
        .post(server.url("/api/v1/playlists"))
        .bearer_auth(&owner_access)
        .json(&serde_json::json!({"name": "Favorites", "description": "The best ones"}))
        .send()
        .await
        .expect("request succeeds")
        .json()
        .await
        .unwrap();
    assert_eq!(created["statusCode"], 201);
    let playlist_id = created["data"]["id"].as_str().unwrap().to_string();

    let add_url = |vid: &str| server.url(&format!("/api/v1/playlists/add/{}/{}", vid, playlist_id));

    let added = server
        .client
        .patch(add_url(&video_id))
        .bearer_auth(&owner_access)
        .send()
        .await
        .expect("request succeeds");
    assert_eq!(added.status(), 200);

    // Duplicate add conflicts
    let duplicate = server
        .client
        .patch(add_url(&video_id))
        .bearer_auth(&owner_access)
        .send()
        .await
        .expect("request succeeds");
    assert_eq!(duplicate.status(), 409);

    // Drafts can be added but stay invisible in the listing
    server
        .client
        .patch(add_url(&draft_id))
        .bearer_auth(&owner_access)
        .send()
        .await
        .expect("request succeeds");

    let detail: serde_json::Value = server
        .client
        .get(server.url(&format!("/api/v1/playlists/{}", playlist_id)))
        .send()
        .await
        .expect("request succeeds")
        .json()
        .await
        .unwrap();
    assert_eq!(detail["data"]["name"], "Favorites");
    assert_eq!(detail["data"]["videos"].as_array().unwrap().len(), 1);
    assert_eq!(detail["data"]["videos"][0]["id"], video_id);

    // A stranger cannot touch the playlist
    let forbidden = server
        .client
        .patch(add_url(&video_id))
        .bearer_auth(&other_access)
        .send()
        .await
        .expect("request succeeds");
    assert_eq!(forbidden.status(), 403);
}

#[tokio::test]
async fn test_dashboard_counts_drafts_and_totals() {
    let server = TestServer::new().await;
    let (owner_id, owner_access) = server.signup("statschannel").await;
    let (_fan_id, fan_access) = server.signup("statsfan").await;

    let public_id = server.seed_video(&owner_id, "public-one", true).await;
    server.seed_video(&owner_id, "draft-one", false).await;

    // One like and one subscriber
    server
        .client
        .post(server.url(&format!("/api/v1/likes/toggle/v/{}", public_id)))
        .bearer_auth(&fan_access)
        .send()
        .await
        .expect("request succeeds");
    server
        .client
        .post(server.url(&format!("/api/v1/subscriptions/c/{}", owner_id)))
        .bearer_auth(&fan_access)
        .send()
        .await
        .expect("request succeeds");
    // One authenticated view
    server
        .client
        .get(server.url(&format!("/api/v1/videos/{}", public_id)))
        .bearer_auth(&fan_access)
        .send()
        .await
        .expect("request succeeds");

    let stats: serde_json::Value = server
        .client
        .get(server.url("/api/v1/dashboard/stats"))
        .bearer_auth(&owner_access)
        .send()
        .await
        .expect("request succeeds")
        .json()
        .await
        .unwrap();
    assert_eq!(stats["data"]["totalVideos"], 2);
    assert_eq!(stats["data"]["totalViews"], 1);
    assert_eq!(stats["data"]["totalLikes"], 1);
    assert_eq!(stats["data"]["totalSubscribers"], 1);

    // Dashboard listing includes the draft; the public one does not
    let dashboard: serde_json::Value = server
        .client
        .get(server.url("/api/v1/dashboard/videos"))
        .bearer_auth(&owner_access)
        .send()
        .await
        .expect("request succeeds")
        .json()
        .await
        .unwrap();
    assert_eq!(dashboard["data"]["totalItems"], 2);

    let public_listing: serde_json::Value = server
        .client
        .get(server.url("/api/v1/videos"))
        .send()
        .await
        .expect("request succeeds")
        .json()
        .await
        .unwrap();
    assert_eq!(public_listing["data"]["totalItems"], 1);
}
