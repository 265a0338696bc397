//! JSON views returned to clients.
//!
//! These translate internal rows into the public shapes: storage keys
//! become public URLs, owner columns fold into a nested object, and
//! credential fields never leave the server.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::data::{
    ChannelProfile, ChannelStats, Comment, CommentListItem, OwnerSummary, Playlist, Tweet,
    TweetListItem, User, Video, VideoListItem, WatchHistoryItem,
};
use crate::AppState;

/// Public URL for a stored media key, or None when nothing is stored.
fn media_url(state: &AppState, key: Option<&str>) -> Option<String> {
    key.map(|k| state.storage.get_public_url(k))
}

/// Avatar URL with the configured default as fallback.
fn avatar_url(state: &AppState, key: Option<&str>) -> String {
    media_url(state, key).unwrap_or_else(|| state.config.media.default_avatar_url.clone())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerView {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub avatar: String,
}

impl OwnerView {
    pub fn from_summary(state: &AppState, summary: &OwnerSummary) -> Self {
        Self {
            id: summary.id.clone(),
            username: summary.username.clone(),
            full_name: summary.full_name.clone(),
            avatar: avatar_url(state, summary.avatar_key.as_deref()),
        }
    }

    fn from_columns(
        state: &AppState,
        id: &str,
        username: &str,
        full_name: &str,
        avatar_key: Option<&str>,
    ) -> Self {
        Self {
            id: id.to_string(),
            username: username.to_string(),
            full_name: full_name.to_string(),
            avatar: avatar_url(state, avatar_key),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar: String,
    pub cover: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UserView {
    pub fn from_user(state: &AppState, user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            avatar: avatar_url(state, user.avatar_key.as_deref()),
            cover: media_url(state, user.cover_key.as_deref()),
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoView {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: String,
    pub duration_seconds: f64,
    pub views: i64,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VideoView {
    pub fn from_video(state: &AppState, video: &Video) -> Self {
        Self {
            id: video.id.clone(),
            owner_id: video.owner_id.clone(),
            title: video.title.clone(),
            description: video.description.clone(),
            video_url: state.storage.get_public_url(&video.video_key),
            thumbnail_url: state.storage.get_public_url(&video.thumbnail_key),
            duration_seconds: video.duration_seconds,
            views: video.views,
            published: video.published,
            created_at: video.created_at,
            updated_at: video.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoListView {
    pub id: String,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub thumbnail_url: String,
    pub duration_seconds: f64,
    pub views: i64,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub owner: OwnerView,
    pub like_count: i64,
}

impl VideoListView {
    pub fn from_item(state: &AppState, item: &VideoListItem) -> Self {
        Self {
            id: item.id.clone(),
            title: item.title.clone(),
            description: item.description.clone(),
            video_url: state.storage.get_public_url(&item.video_key),
            thumbnail_url: state.storage.get_public_url(&item.thumbnail_key),
            duration_seconds: item.duration_seconds,
            views: item.views,
            published: item.published,
            created_at: item.created_at,
            owner: OwnerView::from_columns(
                state,
                &item.owner_id,
                &item.owner_username,
                &item.owner_full_name,
                item.owner_avatar_key.as_deref(),
            ),
            like_count: item.like_count,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: String,
    pub video_id: String,
    pub owner_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CommentView {
    pub fn from_comment(comment: &Comment) -> Self {
        Self {
            id: comment.id.clone(),
            video_id: comment.video_id.clone(),
            owner_id: comment.owner_id.clone(),
            content: comment.content.clone(),
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentListView {
    pub id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner: OwnerView,
    pub like_count: i64,
}

impl CommentListView {
    pub fn from_item(state: &AppState, item: &CommentListItem) -> Self {
        Self {
            id: item.id.clone(),
            content: item.content.clone(),
            created_at: item.created_at,
            updated_at: item.updated_at,
            owner: OwnerView::from_columns(
                state,
                &item.owner_id,
                &item.owner_username,
                &item.owner_full_name,
                item.owner_avatar_key.as_deref(),
            ),
            like_count: item.like_count,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TweetView {
    pub id: String,
    pub owner_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TweetView {
    pub fn from_tweet(tweet: &Tweet) -> Self {
        Self {
            id: tweet.id.clone(),
            owner_id: tweet.owner_id.clone(),
            content: tweet.content.clone(),
            created_at: tweet.created_at,
            updated_at: tweet.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TweetListView {
    pub id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner: OwnerView,
    pub like_count: i64,
}

impl TweetListView {
    pub fn from_item(state: &AppState, item: &TweetListItem) -> Self {
        Self {
            id: item.id.clone(),
            content: item.content.clone(),
            created_at: item.created_at,
            updated_at: item.updated_at,
            owner: OwnerView::from_columns(
                state,
                &item.owner_id,
                &item.owner_username,
                &item.owner_full_name,
                item.owner_avatar_key.as_deref(),
            ),
            like_count: item.like_count,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistView {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PlaylistView {
    pub fn from_playlist(playlist: &Playlist) -> Self {
        Self {
            id: playlist.id.clone(),
            owner_id: playlist.owner_id.clone(),
            name: playlist.name.clone(),
            description: playlist.description.clone(),
            created_at: playlist.created_at,
            updated_at: playlist.updated_at,
        }
    }
}

/// A playlist with its playable contents inlined.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistDetailView {
    #[serde(flatten)]
    pub playlist: PlaylistView,
    pub videos: Vec<VideoListView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelProfileView {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub avatar: String,
    pub cover: Option<String>,
    pub subscriber_count: i64,
    pub subscribed_to_count: i64,
    pub is_subscribed: bool,
}

impl ChannelProfileView {
    pub fn from_profile(state: &AppState, profile: &ChannelProfile) -> Self {
        Self {
            id: profile.id.clone(),
            username: profile.username.clone(),
            full_name: profile.full_name.clone(),
            avatar: avatar_url(state, profile.avatar_key.as_deref()),
            cover: media_url(state, profile.cover_key.as_deref()),
            subscriber_count: profile.subscriber_count,
            subscribed_to_count: profile.subscribed_to_count,
            is_subscribed: profile.is_subscribed,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchHistoryView {
    pub video_id: String,
    pub title: String,
    pub thumbnail_url: String,
    pub duration_seconds: f64,
    pub views: i64,
    pub watched_at: DateTime<Utc>,
    pub owner: OwnerView,
}

impl WatchHistoryView {
    pub fn from_item(state: &AppState, item: &WatchHistoryItem) -> Self {
        Self {
            video_id: item.video_id.clone(),
            title: item.title.clone(),
            thumbnail_url: state.storage.get_public_url(&item.thumbnail_key),
            duration_seconds: item.duration_seconds,
            views: item.views,
            watched_at: item.watched_at,
            owner: OwnerView::from_columns(
                state,
                &item.owner_id,
                &item.owner_username,
                &item.owner_full_name,
                item.owner_avatar_key.as_deref(),
            ),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStatsView {
    pub total_videos: i64,
    pub total_views: i64,
    pub total_likes: i64,
    pub total_subscribers: i64,
}

impl ChannelStatsView {
    pub fn from_stats(stats: &ChannelStats) -> Self {
        Self {
            total_videos: stats.total_videos,
            total_views: stats.total_views,
            total_likes: stats.total_likes,
            total_subscribers: stats.total_subscribers,
        }
    }
}
