//! SQLite database operations
//!
//! All database access goes through this module.
//! Uses SQLx with a connection pool; list views are built as
//! filter -> deterministic sort -> skip/limit, with totals computed
//! from the filter alone.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Pool, QueryBuilder, Sqlite, SqlitePool};
use std::path::Path;

use super::models::*;
use super::page::{Page, PageRequest};
use crate::error::{map_unique_violation, AppError};

/// Database connection pool wrapper.
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Connect to the SQLite database and run migrations.
    pub async fn connect(path: &Path) -> Result<Self, AppError> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::Database(sqlx::Error::Io(e)))?;
        }

        // Foreign keys are off by default in SQLite; the cascade rules
        // in the schema depend on them.
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePool::connect_with(options).await?;

        // Run migrations
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Migration failed: {}", e);
                AppError::Internal(anyhow::anyhow!("Migration failed: {}", e))
            })?;

        tracing::info!("Database connected and migrated successfully");

        Ok(Self { pool })
    }

    /// Cheap liveness probe for the healthcheck endpoint.
    pub async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Insert a new user.
    ///
    /// The unique indexes on username and email enforce uniqueness;
    /// violations surface as `Conflict`.
    pub async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        crate::metrics::DB_QUERIES_TOTAL
            .with_label_values(&["insert", "users"])
            .inc();
        sqlx::query(
            r#"
            INSERT INTO users (
                id, username, email, full_name, avatar_key, cover_key,
                password_hash, refresh_token_hash, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.avatar_key)
        .bind(&user.cover_key)
        .bind(&user.password_hash)
        .bind(&user.refresh_token_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "User with username or email already exists"))?;

        Ok(())
    }

    pub async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Look up a user by username (case-insensitive) or exact email.
    pub async fn find_user_by_login(&self, identifier: &str) -> Result<Option<User>, AppError> {
        crate::metrics::DB_QUERIES_TOTAL
            .with_label_values(&["select", "users"])
            .inc();
        let user =
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ? OR email = ?")
                .bind(identifier)
                .bind(identifier)
                .fetch_optional(&self.pool)
                .await?;

        Ok(user)
    }

    /// Replace the stored refresh-token digest unconditionally.
    ///
    /// Used on login (any prior token is invalidated) and on logout
    /// (`None` clears the session server-side).
    pub async fn set_refresh_token_hash(
        &self,
        user_id: &str,
        hash: Option<&str>,
    ) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE users SET refresh_token_hash = ? WHERE id = ?")
            .bind(hash)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    /// Rotate the refresh-token digest with a compare-and-swap.
    ///
    /// The UPDATE only matches while the stored digest still equals
    /// `old_hash`, so a stale token (already rotated or cleared) loses
    /// the race atomically.
    ///
    /// # Returns
    /// `true` if the rotation took effect.
    pub async fn rotate_refresh_token_hash(
        &self,
        user_id: &str,
        old_hash: &str,
        new_hash: &str,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE users SET refresh_token_hash = ? WHERE id = ? AND refresh_token_hash = ?",
        )
        .bind(new_hash)
        .bind(user_id)
        .bind(old_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Update the avatar key, returning the previous key for cleanup.
    pub async fn update_user_avatar_key(
        &self,
        user_id: &str,
        avatar_key: &str,
    ) -> Result<Option<String>, AppError> {
        let previous =
            sqlx::query_scalar::<_, Option<String>>("SELECT avatar_key FROM users WHERE id = ?")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or(AppError::NotFound)?;

        sqlx::query("UPDATE users SET avatar_key = ?, updated_at = ? WHERE id = ?")
            .bind(avatar_key)
            .bind(Utc::now())
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(previous)
    }

    /// Compute the public channel profile in one read.
    ///
    /// Subscriber counts come from the relations table at read time;
    /// `is_subscribed` is an EXISTS test against the viewer id and is
    /// false for anonymous viewers.
    pub async fn get_channel_profile(
        &self,
        username: &str,
        viewer_id: Option<&str>,
    ) -> Result<Option<ChannelProfile>, AppError> {
        let profile = sqlx::query_as::<_, ChannelProfile>(
            r#"
            SELECT
                u.id,
                u.username,
                u.full_name,
                u.avatar_key,
                u.cover_key,
                (SELECT COUNT(*) FROM subscriptions s WHERE s.channel_id = u.id)
                    AS subscriber_count,
                (SELECT COUNT(*) FROM subscriptions s WHERE s.subscriber_id = u.id)
                    AS subscribed_to_count,
                EXISTS(
                    SELECT 1 FROM subscriptions s
                    WHERE s.channel_id = u.id AND s.subscriber_id = ?
                ) AS is_subscribed
            FROM users u
            WHERE u.username = ?
            "#,
        )
        .bind(viewer_id.unwrap_or(""))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    // =========================================================================
    // Watch history
    // =========================================================================

    /// Record a watch. Re-watching moves the entry to the front of the
    /// recency ordering instead of duplicating it.
    pub async fn record_watch(&self, user_id: &str, video_id: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO watch_history (user_id, video_id, watched_at)
            VALUES (?, ?, ?)
            ON CONFLICT (user_id, video_id)
            DO UPDATE SET watched_at = excluded.watched_at
            "#,
        )
        .bind(user_id)
        .bind(video_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Paginated watch history, most recently watched first.
    pub async fn watch_history(
        &self,
        user_id: &str,
        request: PageRequest,
    ) -> Result<Page<WatchHistoryItem>, AppError> {
        let items = sqlx::query_as::<_, WatchHistoryItem>(
            r#"
            SELECT
                v.id AS video_id,
                v.title,
                v.thumbnail_key,
                v.duration_seconds,
                v.views,
                h.watched_at,
                u.id AS owner_id,
                u.username AS owner_username,
                u.full_name AS owner_full_name,
                u.avatar_key AS owner_avatar_key
            FROM watch_history h
            JOIN videos v ON v.id = h.video_id
            JOIN users u ON u.id = v.owner_id
            WHERE h.user_id = ?
            ORDER BY h.watched_at DESC, v.id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(user_id)
        .bind(request.limit)
        .bind(request.offset())
        .fetch_all(&self.pool)
        .await?;

        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM watch_history WHERE user_id = ?")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(Page::new(items, request, total))
    }

    // =========================================================================
    // Videos
    // =========================================================================

    pub async fn insert_video(&self, video: &Video) -> Result<(), AppError> {
        crate::metrics::DB_QUERIES_TOTAL
            .with_label_values(&["insert", "videos"])
            .inc();
        sqlx::query(
            r#"
            INSERT INTO videos (
                id, owner_id, title, description, video_key, thumbnail_key,
                duration_seconds, views, published, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&video.id)
        .bind(&video.owner_id)
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.video_key)
        .bind(&video.thumbnail_key)
        .bind(video.duration_seconds)
        .bind(video.views)
        .bind(video.published)
        .bind(video.created_at)
        .bind(video.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_video(&self, id: &str) -> Result<Option<Video>, AppError> {
        let video = sqlx::query_as::<_, Video>("SELECT * FROM videos WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(video)
    }

    pub async fn update_video(&self, video: &Video) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE videos
            SET title = ?, description = ?, thumbnail_key = ?, published = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.thumbnail_key)
        .bind(video.published)
        .bind(video.updated_at)
        .bind(&video.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete a video row along with its likes.
    ///
    /// Comments, playlist entries and watch history cascade via foreign
    /// keys; likes are keyed polymorphically and need an explicit sweep.
    pub async fn delete_video(&self, id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM likes WHERE target_kind = 'video' AND target_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM videos WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn increment_video_views(&self, id: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE videos SET views = views + 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Paginated, joined video listing.
    ///
    /// Filters (owner, free-text query, published flag) feed both the
    /// page query and the COUNT so totals stay independent of paging.
    /// The sort key is always followed by `id` to keep skip/limit
    /// slices stable under ties.
    pub async fn list_videos(
        &self,
        owner_id: Option<&str>,
        query: Option<&str>,
        sort_key: VideoSortKey,
        direction: SortDirection,
        published_only: bool,
        request: PageRequest,
    ) -> Result<Page<VideoListItem>, AppError> {
        let pattern = query.map(|q| format!("%{}%", q));

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            r#"
            SELECT
                v.id, v.title, v.description, v.video_key, v.thumbnail_key,
                v.duration_seconds, v.views, v.published, v.created_at,
                u.id AS owner_id,
                u.username AS owner_username,
                u.full_name AS owner_full_name,
                u.avatar_key AS owner_avatar_key,
                (SELECT COUNT(*) FROM likes l
                 WHERE l.target_kind = 'video' AND l.target_id = v.id) AS like_count
            FROM videos v
            JOIN users u ON u.id = v.owner_id
            WHERE 1 = 1
            "#,
        );
        Self::push_video_filters(&mut builder, owner_id, pattern.as_deref(), published_only);

        // Sort column comes from the VideoSortKey enum, never from the
        // raw query string.
        builder.push(" ORDER BY v.");
        builder.push(sort_key.column());
        builder.push(" ");
        builder.push(direction.keyword());
        builder.push(", v.id ");
        builder.push(direction.keyword());
        builder.push(" LIMIT ");
        builder.push_bind(request.limit);
        builder.push(" OFFSET ");
        builder.push_bind(request.offset());

        let items = builder
            .build_query_as::<VideoListItem>()
            .fetch_all(&self.pool)
            .await?;

        let mut count_builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT COUNT(*) FROM videos v WHERE 1 = 1");
        Self::push_video_filters(
            &mut count_builder,
            owner_id,
            pattern.as_deref(),
            published_only,
        );
        let total = count_builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        Ok(Page::new(items, request, total))
    }

    fn push_video_filters<'a>(
        builder: &mut QueryBuilder<'a, Sqlite>,
        owner_id: Option<&'a str>,
        pattern: Option<&'a str>,
        published_only: bool,
    ) {
        if let Some(owner) = owner_id {
            builder.push(" AND v.owner_id = ");
            builder.push_bind(owner);
        }
        if let Some(pattern) = pattern {
            builder.push(" AND (v.title LIKE ");
            builder.push_bind(pattern);
            builder.push(" OR v.description LIKE ");
            builder.push_bind(pattern);
            builder.push(")");
        }
        if published_only {
            builder.push(" AND v.published = 1");
        }
    }

    /// A channel's own videos, including unpublished, newest first.
    pub async fn channel_videos(
        &self,
        owner_id: &str,
        request: PageRequest,
    ) -> Result<Page<Video>, AppError> {
        let items = sqlx::query_as::<_, Video>(
            r#"
            SELECT * FROM videos
            WHERE owner_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(owner_id)
        .bind(request.limit)
        .bind(request.offset())
        .fetch_all(&self.pool)
        .await?;

        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM videos WHERE owner_id = ?")
                .bind(owner_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(Page::new(items, request, total))
    }

    /// Channel dashboard totals in one aggregate read.
    pub async fn channel_stats(&self, owner_id: &str) -> Result<ChannelStats, AppError> {
        let stats = sqlx::query_as::<_, ChannelStats>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM videos v WHERE v.owner_id = ?) AS total_videos,
                (SELECT COALESCE(SUM(v.views), 0) FROM videos v WHERE v.owner_id = ?)
                    AS total_views,
                (SELECT COUNT(*) FROM likes l
                 JOIN videos v ON v.id = l.target_id
                 WHERE l.target_kind = 'video' AND v.owner_id = ?) AS total_likes,
                (SELECT COUNT(*) FROM subscriptions s WHERE s.channel_id = ?)
                    AS total_subscribers
            "#,
        )
        .bind(owner_id)
        .bind(owner_id)
        .bind(owner_id)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(stats)
    }

    // =========================================================================
    // Comments
    // =========================================================================

    pub async fn insert_comment(&self, comment: &Comment) -> Result<(), AppError> {
        crate::metrics::DB_QUERIES_TOTAL
            .with_label_values(&["insert", "comments"])
            .inc();
        sqlx::query(
            r#"
            INSERT INTO comments (id, video_id, owner_id, content, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&comment.id)
        .bind(&comment.video_id)
        .bind(&comment.owner_id)
        .bind(&comment.content)
        .bind(comment.created_at)
        .bind(comment.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_comment(&self, id: &str) -> Result<Option<Comment>, AppError> {
        let comment = sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(comment)
    }

    pub async fn update_comment_content(&self, id: &str, content: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE comments SET content = ?, updated_at = ? WHERE id = ?")
            .bind(content)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn delete_comment(&self, id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM likes WHERE target_kind = 'comment' AND target_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Comments for a video joined with owner fields and like counts,
    /// newest first.
    pub async fn list_video_comments(
        &self,
        video_id: &str,
        request: PageRequest,
    ) -> Result<Page<CommentListItem>, AppError> {
        let items = sqlx::query_as::<_, CommentListItem>(
            r#"
            SELECT
                c.id, c.content, c.created_at, c.updated_at,
                u.id AS owner_id,
                u.username AS owner_username,
                u.full_name AS owner_full_name,
                u.avatar_key AS owner_avatar_key,
                (SELECT COUNT(*) FROM likes l
                 WHERE l.target_kind = 'comment' AND l.target_id = c.id) AS like_count
            FROM comments c
            JOIN users u ON u.id = c.owner_id
            WHERE c.video_id = ?
            ORDER BY c.created_at DESC, c.id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(video_id)
        .bind(request.limit)
        .bind(request.offset())
        .fetch_all(&self.pool)
        .await?;

        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments WHERE video_id = ?")
                .bind(video_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(Page::new(items, request, total))
    }

    // =========================================================================
    // Tweets
    // =========================================================================

    pub async fn insert_tweet(&self, tweet: &Tweet) -> Result<(), AppError> {
        crate::metrics::DB_QUERIES_TOTAL
            .with_label_values(&["insert", "tweets"])
            .inc();
        sqlx::query(
            r#"
            INSERT INTO tweets (id, owner_id, content, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&tweet.id)
        .bind(&tweet.owner_id)
        .bind(&tweet.content)
        .bind(tweet.created_at)
        .bind(tweet.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_tweet(&self, id: &str) -> Result<Option<Tweet>, AppError> {
        let tweet = sqlx::query_as::<_, Tweet>("SELECT * FROM tweets WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(tweet)
    }

    pub async fn update_tweet_content(&self, id: &str, content: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE tweets SET content = ?, updated_at = ? WHERE id = ?")
            .bind(content)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn delete_tweet(&self, id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM likes WHERE target_kind = 'tweet' AND target_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM tweets WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// A user's tweets joined with owner fields and like counts.
    pub async fn list_user_tweets(
        &self,
        user_id: &str,
        request: PageRequest,
    ) -> Result<Page<TweetListItem>, AppError> {
        let items = sqlx::query_as::<_, TweetListItem>(
            r#"
            SELECT
                t.id, t.content, t.created_at, t.updated_at,
                u.id AS owner_id,
                u.username AS owner_username,
                u.full_name AS owner_full_name,
                u.avatar_key AS owner_avatar_key,
                (SELECT COUNT(*) FROM likes l
                 WHERE l.target_kind = 'tweet' AND l.target_id = t.id) AS like_count
            FROM tweets t
            JOIN users u ON u.id = t.owner_id
            WHERE t.owner_id = ?
            ORDER BY t.created_at DESC, t.id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(user_id)
        .bind(request.limit)
        .bind(request.offset())
        .fetch_all(&self.pool)
        .await?;

        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM tweets WHERE owner_id = ?")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(Page::new(items, request, total))
    }

    // =========================================================================
    // Playlists
    // =========================================================================

    pub async fn insert_playlist(&self, playlist: &Playlist) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO playlists (id, owner_id, name, description, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&playlist.id)
        .bind(&playlist.owner_id)
        .bind(&playlist.name)
        .bind(&playlist.description)
        .bind(playlist.created_at)
        .bind(playlist.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_playlist(&self, id: &str) -> Result<Option<Playlist>, AppError> {
        let playlist = sqlx::query_as::<_, Playlist>("SELECT * FROM playlists WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(playlist)
    }

    pub async fn list_user_playlists(&self, user_id: &str) -> Result<Vec<Playlist>, AppError> {
        let playlists = sqlx::query_as::<_, Playlist>(
            "SELECT * FROM playlists WHERE owner_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(playlists)
    }

    pub async fn update_playlist(
        &self,
        id: &str,
        name: &str,
        description: &str,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE playlists SET name = ?, description = ?, updated_at = ? WHERE id = ?")
            .bind(name)
            .bind(description)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn delete_playlist(&self, id: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM playlists WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Add a video to a playlist. Duplicate adds surface as `Conflict`.
    pub async fn add_video_to_playlist(
        &self,
        playlist_id: &str,
        video_id: &str,
    ) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO playlist_videos (playlist_id, video_id, added_at) VALUES (?, ?, ?)",
        )
        .bind(playlist_id)
        .bind(video_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "Video already in playlist"))?;

        Ok(())
    }

    /// Remove a video from a playlist.
    ///
    /// # Returns
    /// `true` if an entry was removed.
    pub async fn remove_video_from_playlist(
        &self,
        playlist_id: &str,
        video_id: &str,
    ) -> Result<bool, AppError> {
        let result =
            sqlx::query("DELETE FROM playlist_videos WHERE playlist_id = ? AND video_id = ?")
                .bind(playlist_id)
                .bind(video_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Published videos in a playlist, in insertion order.
    pub async fn playlist_videos(&self, playlist_id: &str) -> Result<Vec<VideoListItem>, AppError> {
        let videos = sqlx::query_as::<_, VideoListItem>(
            r#"
            SELECT
                v.id, v.title, v.description, v.video_key, v.thumbnail_key,
                v.duration_seconds, v.views, v.published, v.created_at,
                u.id AS owner_id,
                u.username AS owner_username,
                u.full_name AS owner_full_name,
                u.avatar_key AS owner_avatar_key,
                (SELECT COUNT(*) FROM likes l
                 WHERE l.target_kind = 'video' AND l.target_id = v.id) AS like_count
            FROM playlist_videos pv
            JOIN videos v ON v.id = pv.video_id
            JOIN users u ON u.id = v.owner_id
            WHERE pv.playlist_id = ? AND v.published = 1
            ORDER BY pv.added_at ASC, v.id ASC
            "#,
        )
        .bind(playlist_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(videos)
    }

    // =========================================================================
    // Likes
    // =========================================================================

    /// Toggle a like relation atomically.
    ///
    /// The insert races safely against concurrent toggles: ON CONFLICT
    /// DO NOTHING means only one of two simultaneous inserts wins, and
    /// the loser falls through to the delete branch.
    pub async fn toggle_like(
        &self,
        user_id: &str,
        target: LikeTarget,
        target_id: &str,
    ) -> Result<ToggleOutcome, AppError> {
        crate::metrics::DB_QUERIES_TOTAL
            .with_label_values(&["toggle", "likes"])
            .inc();
        let inserted = sqlx::query(
            r#"
            INSERT INTO likes (id, user_id, target_kind, target_id, created_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (user_id, target_kind, target_id) DO NOTHING
            "#,
        )
        .bind(EntityId::new().0)
        .bind(user_id)
        .bind(target.as_str())
        .bind(target_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if inserted.rows_affected() > 0 {
            return Ok(ToggleOutcome::Added);
        }

        sqlx::query("DELETE FROM likes WHERE user_id = ? AND target_kind = ? AND target_id = ?")
            .bind(user_id)
            .bind(target.as_str())
            .bind(target_id)
            .execute(&self.pool)
            .await?;

        Ok(ToggleOutcome::Removed)
    }

    pub async fn like_count(&self, target: LikeTarget, target_id: &str) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM likes WHERE target_kind = ? AND target_id = ?",
        )
        .bind(target.as_str())
        .bind(target_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Videos a user has liked, most recently liked first.
    pub async fn liked_videos(
        &self,
        user_id: &str,
        request: PageRequest,
    ) -> Result<Page<VideoListItem>, AppError> {
        let items = sqlx::query_as::<_, VideoListItem>(
            r#"
            SELECT
                v.id, v.title, v.description, v.video_key, v.thumbnail_key,
                v.duration_seconds, v.views, v.published, v.created_at,
                u.id AS owner_id,
                u.username AS owner_username,
                u.full_name AS owner_full_name,
                u.avatar_key AS owner_avatar_key,
                (SELECT COUNT(*) FROM likes lc
                 WHERE lc.target_kind = 'video' AND lc.target_id = v.id) AS like_count
            FROM likes l
            JOIN videos v ON v.id = l.target_id
            JOIN users u ON u.id = v.owner_id
            WHERE l.user_id = ? AND l.target_kind = 'video'
            ORDER BY l.created_at DESC, v.id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(user_id)
        .bind(request.limit)
        .bind(request.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM likes WHERE user_id = ? AND target_kind = 'video'",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Page::new(items, request, total))
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Toggle a subscription relation atomically (same shape as
    /// `toggle_like`).
    pub async fn toggle_subscription(
        &self,
        subscriber_id: &str,
        channel_id: &str,
    ) -> Result<ToggleOutcome, AppError> {
        crate::metrics::DB_QUERIES_TOTAL
            .with_label_values(&["toggle", "subscriptions"])
            .inc();
        let inserted = sqlx::query(
            r#"
            INSERT INTO subscriptions (id, subscriber_id, channel_id, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT (subscriber_id, channel_id) DO NOTHING
            "#,
        )
        .bind(EntityId::new().0)
        .bind(subscriber_id)
        .bind(channel_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if inserted.rows_affected() > 0 {
            return Ok(ToggleOutcome::Added);
        }

        sqlx::query("DELETE FROM subscriptions WHERE subscriber_id = ? AND channel_id = ?")
            .bind(subscriber_id)
            .bind(channel_id)
            .execute(&self.pool)
            .await?;

        Ok(ToggleOutcome::Removed)
    }

    /// Users subscribed to a channel.
    pub async fn channel_subscribers(
        &self,
        channel_id: &str,
    ) -> Result<Vec<OwnerSummary>, AppError> {
        let subscribers = sqlx::query_as::<_, OwnerSummary>(
            r#"
            SELECT u.id, u.username, u.full_name, u.avatar_key
            FROM subscriptions s
            JOIN users u ON u.id = s.subscriber_id
            WHERE s.channel_id = ?
            ORDER BY s.created_at DESC, u.id DESC
            "#,
        )
        .bind(channel_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(subscribers)
    }

    /// Channels a user is subscribed to.
    pub async fn subscribed_channels(
        &self,
        subscriber_id: &str,
    ) -> Result<Vec<OwnerSummary>, AppError> {
        let channels = sqlx::query_as::<_, OwnerSummary>(
            r#"
            SELECT u.id, u.username, u.full_name, u.avatar_key
            FROM subscriptions s
            JOIN users u ON u.id = s.channel_id
            WHERE s.subscriber_id = ?
            ORDER BY s.created_at DESC, u.id DESC
            "#,
        )
        .bind(subscriber_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(channels)
    }

    /// Number of subscription rows for a (subscriber, channel) pair.
    /// Only used by tests to assert the uniqueness invariant.
    #[cfg(test)]
    pub async fn subscription_row_count(
        &self,
        subscriber_id: &str,
        channel_id: &str,
    ) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM subscriptions WHERE subscriber_id = ? AND channel_id = ?",
        )
        .bind(subscriber_id)
        .bind(channel_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
