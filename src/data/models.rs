//! Data models
//!
//! Rust structs representing database entities and read views.
//! All models use ULID for IDs and chrono for timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// ID Types
// =============================================================================

/// Entity ID wrapper (ULID format, 26 characters)
///
/// Example: "01ARZ3NDEKTSV4RRFFQ69G5FAV"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    /// Generate a new ULID
    pub fn new() -> Self {
        Self(ulid::Ulid::new().to_string())
    }

    /// Create from existing string
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// User
// =============================================================================

/// A registered user (also a channel)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    /// Unique, matched case-insensitively
    pub username: String,
    pub email: String,
    pub full_name: String,
    /// Storage key for the avatar image (None = default avatar)
    pub avatar_key: Option<String>,
    /// Storage key for the cover image
    pub cover_key: Option<String>,
    /// Argon2 hash of the password
    pub password_hash: String,
    /// sha256 digest of the single currently valid refresh token
    pub refresh_token_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public owner fields joined into list views
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OwnerSummary {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub avatar_key: Option<String>,
}

// =============================================================================
// Video
// =============================================================================

/// An uploaded video
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Video {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: String,
    /// Storage key for the video file
    pub video_key: String,
    /// Storage key for the thumbnail image
    pub thumbnail_key: String,
    pub duration_seconds: f64,
    pub views: i64,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Video row joined with its owner and like count
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct VideoListItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub video_key: String,
    pub thumbnail_key: String,
    pub duration_seconds: f64,
    pub views: i64,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub owner_id: String,
    pub owner_username: String,
    pub owner_full_name: String,
    pub owner_avatar_key: Option<String>,
    pub like_count: i64,
}

/// Sort keys accepted for video listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoSortKey {
    CreatedAt,
    Views,
    Duration,
}

impl VideoSortKey {
    /// Column name for ORDER BY. Must never interpolate user input.
    pub fn column(&self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::Views => "views",
            Self::Duration => "duration_seconds",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "createdAt" | "created_at" => Some(Self::CreatedAt),
            "views" => Some(Self::Views),
            "duration" => Some(Self::Duration),
            _ => None,
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

// =============================================================================
// Comment / Tweet
// =============================================================================

/// A comment on a video
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: String,
    pub video_id: String,
    pub owner_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Comment joined with its owner and like count
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentListItem {
    pub id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner_id: String,
    pub owner_username: String,
    pub owner_full_name: String,
    pub owner_avatar_key: Option<String>,
    pub like_count: i64,
}

/// A short text post
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tweet {
    pub id: String,
    pub owner_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Tweet joined with its owner and like count
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TweetListItem {
    pub id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner_id: String,
    pub owner_username: String,
    pub owner_full_name: String,
    pub owner_avatar_key: Option<String>,
    pub like_count: i64,
}

// =============================================================================
// Playlist
// =============================================================================

/// A named collection of videos
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Playlist {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Relation records
// =============================================================================

/// What a like points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeTarget {
    Video,
    Comment,
    Tweet,
}

impl LikeTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Comment => "comment",
            Self::Tweet => "tweet",
        }
    }
}

/// A like relation (presence = liked)
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Like {
    pub id: String,
    pub user_id: String,
    pub target_kind: String,
    pub target_id: String,
    pub created_at: DateTime<Utc>,
}

/// A subscription relation (presence = subscribed)
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Subscription {
    pub id: String,
    pub subscriber_id: String,
    pub channel_id: String,
    pub created_at: DateTime<Utc>,
}

/// Outcome of a relation toggle; each call flips state exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
}

// =============================================================================
// Aggregated views
// =============================================================================

/// Derived public profile metrics for a channel
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ChannelProfile {
    pub id: String,
    pub username: String,
    pub full_name: String,
    pub avatar_key: Option<String>,
    pub cover_key: Option<String>,
    pub subscriber_count: i64,
    pub subscribed_to_count: i64,
    pub is_subscribed: bool,
}

/// Watch-history entry joined through the video to its owner
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WatchHistoryItem {
    pub video_id: String,
    pub title: String,
    pub thumbnail_key: String,
    pub duration_seconds: f64,
    pub views: i64,
    pub watched_at: DateTime<Utc>,
    pub owner_id: String,
    pub owner_username: String,
    pub owner_full_name: String,
    pub owner_avatar_key: Option<String>,
}

/// Channel dashboard totals
#[derive(Debug, Clone, Default, sqlx::FromRow)]
pub struct ChannelStats {
    pub total_videos: i64,
    pub total_views: i64,
    pub total_likes: i64,
    pub total_subscribers: i64,
}
