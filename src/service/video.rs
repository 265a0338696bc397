//! Video lifecycle: publishing, playback reads, edits, deletion.

use chrono::Utc;

use super::account::UploadedFile;
use crate::auth::Identity;
use crate::data::{
    EntityId, Page, PageRequest, SortDirection, Video, VideoListItem, VideoSortKey,
};
use crate::error::AppError;
use crate::AppState;

/// Fields accepted when publishing a video.
pub struct NewVideo {
    pub title: String,
    pub description: String,
    pub duration_seconds: f64,
    pub published: bool,
}

/// Editable metadata fields.
pub struct VideoEdit {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Public listing of published videos with optional owner and
/// free-text filters.
pub async fn list(
    state: &AppState,
    owner_id: Option<&str>,
    query: Option<&str>,
    sort_key: VideoSortKey,
    direction: SortDirection,
    request: PageRequest,
) -> Result<Page<VideoListItem>, AppError> {
    state
        .db
        .list_videos(owner_id, query, sort_key, direction, true, request)
        .await
}

/// Publish a new video.
///
/// Both files are uploaded before the row is inserted. A failure at
/// any later step sweeps whatever was already uploaded, best-effort.
pub async fn publish(
    state: &AppState,
    actor: &Identity,
    meta: NewVideo,
    video_file: UploadedFile,
    thumbnail_file: UploadedFile,
) -> Result<Video, AppError> {
    let title = super::require_text(&meta.title, "title")?;
    if meta.duration_seconds <= 0.0 {
        return Err(AppError::Validation(
            "duration must be greater than zero".to_string(),
        ));
    }
    if video_file.data.is_empty() {
        return Err(AppError::Validation("video file is required".to_string()));
    }
    if thumbnail_file.data.is_empty() {
        return Err(AppError::Validation(
            "thumbnail file is required".to_string(),
        ));
    }

    let id = EntityId::new();

    let (video_key, _) = state
        .storage
        .upload_video(&id.0, video_file.data, &video_file.content_type)
        .await?;

    let (thumbnail_key, _) = match state
        .storage
        .upload_thumbnail(&id.0, thumbnail_file.data, &thumbnail_file.content_type)
        .await
    {
        Ok(uploaded) => uploaded,
        Err(error) => {
            state.storage.delete_best_effort(&video_key).await;
            return Err(error);
        }
    };

    let now = Utc::now();
    let video = Video {
        id: id.0,
        owner_id: actor.user_id.clone(),
        title,
        description: meta.description.trim().to_string(),
        video_key: video_key.clone(),
        thumbnail_key: thumbnail_key.clone(),
        duration_seconds: meta.duration_seconds,
        views: 0,
        published: meta.published,
        created_at: now,
        updated_at: now,
    };

    if let Err(error) = state.db.insert_video(&video).await {
        state.storage.delete_best_effort(&video_key).await;
        state.storage.delete_best_effort(&thumbnail_key).await;
        return Err(error);
    }

    tracing::info!(video_id = %video.id, owner = %actor.username, "Published video");
    Ok(video)
}

/// Fetch a single video for playback.
///
/// Unpublished videos are visible only to their owner and otherwise
/// indistinguishable from missing ones. An authenticated view counts
/// toward the view total and lands in the viewer's watch history;
/// anonymous playback changes nothing.
pub async fn get(
    state: &AppState,
    video_id: &str,
    viewer: Option<&Identity>,
) -> Result<Video, AppError> {
    let mut video = state
        .db
        .get_video(video_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let is_owner = viewer.map(|v| v.user_id == video.owner_id).unwrap_or(false);
    if !video.published && !is_owner {
        return Err(AppError::NotFound);
    }

    if let Some(viewer) = viewer {
        state.db.increment_video_views(&video.id).await?;
        video.views += 1;
        state.db.record_watch(&viewer.user_id, &video.id).await?;
    }

    Ok(video)
}

/// Update title, description and optionally the thumbnail.
pub async fn update(
    state: &AppState,
    actor: &Identity,
    video_id: &str,
    edit: VideoEdit,
    thumbnail: Option<UploadedFile>,
) -> Result<Video, AppError> {
    let mut video = state
        .db
        .get_video(video_id)
        .await?
        .ok_or(AppError::NotFound)?;
    super::ensure_owner(&actor.user_id, &video.owner_id)?;

    if let Some(title) = edit.title {
        video.title = super::require_text(&title, "title")?;
    }
    if let Some(description) = edit.description {
        video.description = description.trim().to_string();
    }

    let old_thumbnail = match thumbnail {
        Some(file) => {
            let (new_key, _) = state
                .storage
                .upload_thumbnail(&EntityId::new().0, file.data, &file.content_type)
                .await?;
            let old = std::mem::replace(&mut video.thumbnail_key, new_key);
            Some(old)
        }
        None => None,
    };

    video.updated_at = Utc::now();

    if let Err(error) = state.db.update_video(&video).await {
        if old_thumbnail.is_some() {
            state.storage.delete_best_effort(&video.thumbnail_key).await;
        }
        return Err(error);
    }

    if let Some(old_key) = old_thumbnail {
        state.storage.delete_best_effort(&old_key).await;
    }

    Ok(video)
}

/// Delete a video.
///
/// The database row goes first; once it is gone the media files are
/// unreachable and their deletion can be best-effort.
pub async fn delete(state: &AppState, actor: &Identity, video_id: &str) -> Result<(), AppError> {
    let video = state
        .db
        .get_video(video_id)
        .await?
        .ok_or(AppError::NotFound)?;
    super::ensure_owner(&actor.user_id, &video.owner_id)?;

    state.db.delete_video(&video.id).await?;

    state.storage.delete_best_effort(&video.video_key).await;
    state.storage.delete_best_effort(&video.thumbnail_key).await;

    tracing::info!(video_id = %video.id, owner = %actor.username, "Deleted video");
    Ok(())
}

/// Flip the published flag.
pub async fn toggle_publish(
    state: &AppState,
    actor: &Identity,
    video_id: &str,
) -> Result<Video, AppError> {
    let mut video = state
        .db
        .get_video(video_id)
        .await?
        .ok_or(AppError::NotFound)?;
    super::ensure_owner(&actor.user_id, &video.owner_id)?;

    video.published = !video.published;
    video.updated_at = Utc::now();
    state.db.update_video(&video).await?;

    Ok(video)
}
