//! Database tests

use super::*;
use chrono::{Duration, Utc};
use tempfile::TempDir;

/// Helper to create a test database
async fn create_test_db() -> (Database, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let db = Database::connect(&db_path).await.unwrap();
    (db, temp_dir)
}

fn make_user(username: &str) -> User {
    let now = Utc::now();
    User {
        id: EntityId::new().0,
        username: username.to_string(),
        email: format!("{}@example.com", username),
        full_name: format!("{} Example", username),
        avatar_key: None,
        cover_key: None,
        password_hash: "argon2-test-hash".to_string(),
        refresh_token_hash: None,
        created_at: now,
        updated_at: now,
    }
}

fn make_video(owner: &User, title: &str, created_at: chrono::DateTime<Utc>) -> Video {
    Video {
        id: EntityId::new().0,
        owner_id: owner.id.clone(),
        title: title.to_string(),
        description: String::new(),
        video_key: format!("videos/{}.mp4", title),
        thumbnail_key: format!("thumbnails/{}.webp", title),
        duration_seconds: 60.0,
        views: 0,
        published: true,
        created_at,
        updated_at: created_at,
    }
}

#[tokio::test]
async fn test_database_connection() {
    let (_db, _temp_dir) = create_test_db().await;
    // Connection successful if we get here without panicking
}

#[tokio::test]
async fn test_user_insert_and_lookup() {
    let (db, _temp_dir) = create_test_db().await;

    let user = make_user("alice");
    db.insert_user(&user).await.unwrap();

    let by_id = db.get_user(&user.id).await.unwrap().unwrap();
    assert_eq!(by_id.username, "alice");

    let by_username = db.find_user_by_login("alice").await.unwrap();
    assert!(by_username.is_some());

    // Username matching is case-insensitive
    let by_upper = db.find_user_by_login("ALICE").await.unwrap();
    assert!(by_upper.is_some());

    let by_email = db.find_user_by_login("alice@example.com").await.unwrap();
    assert!(by_email.is_some());
}

#[tokio::test]
async fn test_duplicate_username_is_conflict() {
    let (db, _temp_dir) = create_test_db().await;

    db.insert_user(&make_user("alice")).await.unwrap();

    let mut dup = make_user("Alice");
    dup.email = "other@example.com".to_string();
    let error = db.insert_user(&dup).await.unwrap_err();
    assert!(matches!(error, crate::error::AppError::Conflict(_)));

    let mut email_dup = make_user("bob");
    email_dup.email = "alice@example.com".to_string();
    let error = db.insert_user(&email_dup).await.unwrap_err();
    assert!(matches!(error, crate::error::AppError::Conflict(_)));
}

#[tokio::test]
async fn test_refresh_token_rotation_cas() {
    let (db, _temp_dir) = create_test_db().await;

    let user = make_user("alice");
    db.insert_user(&user).await.unwrap();

    db.set_refresh_token_hash(&user.id, Some("digest-1"))
        .await
        .unwrap();

    // Rotation from the current digest succeeds
    let rotated = db
        .rotate_refresh_token_hash(&user.id, "digest-1", "digest-2")
        .await
        .unwrap();
    assert!(rotated);

    // The stale digest no longer matches
    let stale = db
        .rotate_refresh_token_hash(&user.id, "digest-1", "digest-3")
        .await
        .unwrap();
    assert!(!stale);

    // Logout clears the digest; further rotation attempts fail
    db.set_refresh_token_hash(&user.id, None).await.unwrap();
    let after_logout = db
        .rotate_refresh_token_hash(&user.id, "digest-2", "digest-4")
        .await
        .unwrap();
    assert!(!after_logout);
}

#[tokio::test]
async fn test_video_pagination_scenario() {
    let (db, _temp_dir) = create_test_db().await;

    let alice = make_user("alice");
    db.insert_user(&alice).await.unwrap();

    let base = Utc::now();
    for i in 0..15 {
        let video = make_video(&alice, &format!("video-{:02}", i), base + Duration::seconds(i));
        db.insert_video(&video).await.unwrap();
    }

    let request = PageRequest { page: 2, limit: 10 };
    let page = db
        .list_videos(
            Some(&alice.id),
            None,
            VideoSortKey::CreatedAt,
            SortDirection::Desc,
            true,
            request,
        )
        .await
        .unwrap();

    assert_eq!(page.items.len(), 5);
    assert_eq!(page.total_items, 15);
    assert_eq!(page.total_pages, 2);
    // Page 2 of a descending sort holds the oldest five
    assert_eq!(page.items[0].title, "video-04");
    assert_eq!(page.items[4].title, "video-00");

    // Page beyond range is empty, not an error
    let beyond = db
        .list_videos(
            Some(&alice.id),
            None,
            VideoSortKey::CreatedAt,
            SortDirection::Desc,
            true,
            PageRequest { page: 9, limit: 10 },
        )
        .await
        .unwrap();
    assert!(beyond.items.is_empty());
    assert_eq!(beyond.total_items, 15);
}

#[tokio::test]
async fn test_video_listing_filters_unpublished() {
    let (db, _temp_dir) = create_test_db().await;

    let alice = make_user("alice");
    db.insert_user(&alice).await.unwrap();

    let mut draft = make_video(&alice, "draft", Utc::now());
    draft.published = false;
    db.insert_video(&draft).await.unwrap();
    db.insert_video(&make_video(&alice, "live", Utc::now()))
        .await
        .unwrap();

    let request = PageRequest { page: 1, limit: 10 };
    let public = db
        .list_videos(
            None,
            None,
            VideoSortKey::CreatedAt,
            SortDirection::Desc,
            true,
            request,
        )
        .await
        .unwrap();
    assert_eq!(public.total_items, 1);
    assert_eq!(public.items[0].title, "live");

    // The channel dashboard sees drafts too
    let own = db.channel_videos(&alice.id, request).await.unwrap();
    assert_eq!(own.total_items, 2);
}

#[tokio::test]
async fn test_like_toggle_roundtrip() {
    let (db, _temp_dir) = create_test_db().await;

    let alice = make_user("alice");
    db.insert_user(&alice).await.unwrap();
    let video = make_video(&alice, "clip", Utc::now());
    db.insert_video(&video).await.unwrap();

    let first = db
        .toggle_like(&alice.id, LikeTarget::Video, &video.id)
        .await
        .unwrap();
    assert_eq!(first, ToggleOutcome::Added);
    assert_eq!(db.like_count(LikeTarget::Video, &video.id).await.unwrap(), 1);

    let second = db
        .toggle_like(&alice.id, LikeTarget::Video, &video.id)
        .await
        .unwrap();
    assert_eq!(second, ToggleOutcome::Removed);
    assert_eq!(db.like_count(LikeTarget::Video, &video.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_subscription_toggle_and_uniqueness() {
    let (db, _temp_dir) = create_test_db().await;

    let alice = make_user("alice");
    let bob = make_user("bob");
    db.insert_user(&alice).await.unwrap();
    db.insert_user(&bob).await.unwrap();

    let first = db.toggle_subscription(&alice.id, &bob.id).await.unwrap();
    assert_eq!(first, ToggleOutcome::Added);
    assert_eq!(
        db.subscription_row_count(&alice.id, &bob.id).await.unwrap(),
        1
    );

    let subscribers = db.channel_subscribers(&bob.id).await.unwrap();
    assert_eq!(subscribers.len(), 1);
    assert_eq!(subscribers[0].username, "alice");

    let channels = db.subscribed_channels(&alice.id).await.unwrap();
    assert_eq!(channels.len(), 1);
    assert_eq!(channels[0].username, "bob");

    let second = db.toggle_subscription(&alice.id, &bob.id).await.unwrap();
    assert_eq!(second, ToggleOutcome::Removed);
    assert_eq!(
        db.subscription_row_count(&alice.id, &bob.id).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn test_channel_profile_aggregation() {
    let (db, _temp_dir) = create_test_db().await;

    let alice = make_user("alice");
    let bob = make_user("bob");
    let carol = make_user("carol");
    db.insert_user(&alice).await.unwrap();
    db.insert_user(&bob).await.unwrap();
    db.insert_user(&carol).await.unwrap();

    // bob and carol subscribe to alice; alice subscribes to bob
    db.toggle_subscription(&bob.id, &alice.id).await.unwrap();
    db.toggle_subscription(&carol.id, &alice.id).await.unwrap();
    db.toggle_subscription(&alice.id, &bob.id).await.unwrap();

    let profile = db
        .get_channel_profile("alice", Some(&bob.id))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(profile.subscriber_count, 2);
    assert_eq!(profile.subscribed_to_count, 1);
    assert!(profile.is_subscribed);

    // Anonymous viewer
    let anon = db.get_channel_profile("alice", None).await.unwrap().unwrap();
    assert!(!anon.is_subscribed);

    // Unknown channel
    assert!(db.get_channel_profile("nobody", None).await.unwrap().is_none());
}

#[tokio::test]
async fn test_watch_history_dedupes_and_reorders() {
    let (db, _temp_dir) = create_test_db().await;

    let alice = make_user("alice");
    db.insert_user(&alice).await.unwrap();
    let first = make_video(&alice, "first", Utc::now());
    let second = make_video(&alice, "second", Utc::now());
    db.insert_video(&first).await.unwrap();
    db.insert_video(&second).await.unwrap();

    db.record_watch(&alice.id, &first.id).await.unwrap();
    db.record_watch(&alice.id, &second.id).await.unwrap();
    // Re-watch the first video; it should move to the front without
    // duplicating.
    db.record_watch(&alice.id, &first.id).await.unwrap();

    let request = PageRequest { page: 1, limit: 10 };
    let history = db.watch_history(&alice.id, request).await.unwrap();
    assert_eq!(history.total_items, 2);
    assert_eq!(history.items[0].video_id, first.id);
    assert_eq!(history.items[1].video_id, second.id);
}

#[tokio::test]
async fn test_comment_listing_joins_owner_and_likes() {
    let (db, _temp_dir) = create_test_db().await;

    let alice = make_user("alice");
    let bob = make_user("bob");
    db.insert_user(&alice).await.unwrap();
    db.insert_user(&bob).await.unwrap();
    let video = make_video(&alice, "clip", Utc::now());
    db.insert_video(&video).await.unwrap();

    let base = Utc::now();
    for i in 0..3 {
        let comment = Comment {
            id: EntityId::new().0,
            video_id: video.id.clone(),
            owner_id: bob.id.clone(),
            content: format!("comment-{}", i),
            created_at: base + Duration::seconds(i),
            updated_at: base + Duration::seconds(i),
        };
        db.insert_comment(&comment).await.unwrap();
        if i == 2 {
            db.toggle_like(&alice.id, LikeTarget::Comment, &comment.id)
                .await
                .unwrap();
        }
    }

    let request = PageRequest { page: 1, limit: 2 };
    let page = db.list_video_comments(&video.id, request).await.unwrap();
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.total_items, 3);
    assert_eq!(page.total_pages, 2);
    // Newest first, with its like joined in
    assert_eq!(page.items[0].content, "comment-2");
    assert_eq!(page.items[0].like_count, 1);
    assert_eq!(page.items[0].owner_username, "bob");
}

#[tokio::test]
async fn test_playlist_membership() {
    let (db, _temp_dir) = create_test_db().await;

    let alice = make_user("alice");
    db.insert_user(&alice).await.unwrap();
    let video = make_video(&alice, "clip", Utc::now());
    db.insert_video(&video).await.unwrap();

    let now = Utc::now();
    let playlist = Playlist {
        id: EntityId::new().0,
        owner_id: alice.id.clone(),
        name: "favourites".to_string(),
        description: String::new(),
        created_at: now,
        updated_at: now,
    };
    db.insert_playlist(&playlist).await.unwrap();

    db.add_video_to_playlist(&playlist.id, &video.id)
        .await
        .unwrap();

    // Duplicate add is a conflict, not a second row
    let error = db
        .add_video_to_playlist(&playlist.id, &video.id)
        .await
        .unwrap_err();
    assert!(matches!(error, crate::error::AppError::Conflict(_)));

    let videos = db.playlist_videos(&playlist.id).await.unwrap();
    assert_eq!(videos.len(), 1);

    assert!(db
        .remove_video_from_playlist(&playlist.id, &video.id)
        .await
        .unwrap());
    assert!(!db
        .remove_video_from_playlist(&playlist.id, &video.id)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_channel_stats() {
    let (db, _temp_dir) = create_test_db().await;

    let alice = make_user("alice");
    let bob = make_user("bob");
    db.insert_user(&alice).await.unwrap();
    db.insert_user(&bob).await.unwrap();

    let mut video = make_video(&alice, "clip", Utc::now());
    video.views = 7;
    db.insert_video(&video).await.unwrap();
    db.insert_video(&make_video(&alice, "other", Utc::now()))
        .await
        .unwrap();

    db.toggle_like(&bob.id, LikeTarget::Video, &video.id)
        .await
        .unwrap();
    db.toggle_subscription(&bob.id, &alice.id).await.unwrap();

    let stats = db.channel_stats(&alice.id).await.unwrap();
    assert_eq!(stats.total_videos, 2);
    assert_eq!(stats.total_views, 7);
    assert_eq!(stats.total_likes, 1);
    assert_eq!(stats.total_subscribers, 1);
}

#[tokio::test]
async fn test_video_delete_sweeps_dependents() {
    let (db, _temp_dir) = create_test_db().await;

    let alice = make_user("alice");
    db.insert_user(&alice).await.unwrap();
    let video = make_video(&alice, "clip", Utc::now());
    db.insert_video(&video).await.unwrap();

    let now = Utc::now();
    let comment = Comment {
        id: EntityId::new().0,
        video_id: video.id.clone(),
        owner_id: alice.id.clone(),
        content: "gone with the video".to_string(),
        created_at: now,
        updated_at: now,
    };
    db.insert_comment(&comment).await.unwrap();
    db.toggle_like(&alice.id, LikeTarget::Video, &video.id)
        .await
        .unwrap();
    db.record_watch(&alice.id, &video.id).await.unwrap();

    db.delete_video(&video.id).await.unwrap();

    assert!(db.get_video(&video.id).await.unwrap().is_none());
    assert!(db.get_comment(&comment.id).await.unwrap().is_none());
    assert_eq!(db.like_count(LikeTarget::Video, &video.id).await.unwrap(), 0);
    let history = db
        .watch_history(&alice.id, PageRequest { page: 1, limit: 10 })
        .await
        .unwrap();
    assert_eq!(history.total_items, 0);
}
