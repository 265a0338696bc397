//! Playlists: named collections of videos.

use chrono::Utc;

use crate::auth::Identity;
use crate::data::{EntityId, Playlist, VideoListItem};
use crate::error::AppError;
use crate::AppState;

pub async fn create(
    state: &AppState,
    actor: &Identity,
    name: &str,
    description: &str,
) -> Result<Playlist, AppError> {
    let name = super::require_text(name, "name")?;

    let now = Utc::now();
    let playlist = Playlist {
        id: EntityId::new().0,
        owner_id: actor.user_id.clone(),
        name,
        description: description.trim().to_string(),
        created_at: now,
        updated_at: now,
    };
    state.db.insert_playlist(&playlist).await?;

    Ok(playlist)
}

/// A playlist with its playable contents. Unpublished videos are
/// filtered out of the listing even if they were added while public.
pub async fn get(
    state: &AppState,
    playlist_id: &str,
) -> Result<(Playlist, Vec<VideoListItem>), AppError> {
    let playlist = state
        .db
        .get_playlist(playlist_id)
        .await?
        .ok_or(AppError::NotFound)?;
    let videos = state.db.playlist_videos(playlist_id).await?;

    Ok((playlist, videos))
}

pub async fn list_for_user(state: &AppState, user_id: &str) -> Result<Vec<Playlist>, AppError> {
    state
        .db
        .get_user(user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    state.db.list_user_playlists(user_id).await
}

pub async fn update(
    state: &AppState,
    actor: &Identity,
    playlist_id: &str,
    name: &str,
    description: &str,
) -> Result<Playlist, AppError> {
    let name = super::require_text(name, "name")?;

    let playlist = state
        .db
        .get_playlist(playlist_id)
        .await?
        .ok_or(AppError::NotFound)?;
    super::ensure_owner(&actor.user_id, &playlist.owner_id)?;

    state
        .db
        .update_playlist(playlist_id, &name, description.trim())
        .await?;

    state
        .db
        .get_playlist(playlist_id)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn delete(
    state: &AppState,
    actor: &Identity,
    playlist_id: &str,
) -> Result<(), AppError> {
    let playlist = state
        .db
        .get_playlist(playlist_id)
        .await?
        .ok_or(AppError::NotFound)?;
    super::ensure_owner(&actor.user_id, &playlist.owner_id)?;

    state.db.delete_playlist(playlist_id).await
}

/// Add a video to a playlist the actor owns. Adding the same video
/// twice is a `Conflict`.
pub async fn add_video(
    state: &AppState,
    actor: &Identity,
    playlist_id: &str,
    video_id: &str,
) -> Result<(), AppError> {
    let playlist = state
        .db
        .get_playlist(playlist_id)
        .await?
        .ok_or(AppError::NotFound)?;
    super::ensure_owner(&actor.user_id, &playlist.owner_id)?;

    state
        .db
        .get_video(video_id)
        .await?
        .ok_or(AppError::NotFound)?;

    state.db.add_video_to_playlist(playlist_id, video_id).await
}

pub async fn remove_video(
    state: &AppState,
    actor: &Identity,
    playlist_id: &str,
    video_id: &str,
) -> Result<(), AppError> {
    let playlist = state
        .db
        .get_playlist(playlist_id)
        .await?
        .ok_or(AppError::NotFound)?;
    super::ensure_owner(&actor.user_id, &playlist.owner_id)?;

    let removed = state
        .db
        .remove_video_from_playlist(playlist_id, video_id)
        .await?;
    if !removed {
        return Err(AppError::NotFound);
    }

    Ok(())
}
