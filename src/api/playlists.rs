//! Playlist endpoints.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use super::views::{PlaylistDetailView, PlaylistView, VideoListView};
use super::ApiResponse;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::service::playlist;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PlaylistBody {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// POST /api/v1/playlists
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Json(body): Json<PlaylistBody>,
) -> Result<impl IntoResponse, AppError> {
    let playlist = playlist::create(&state, &identity, &body.name, &body.description).await?;

    Ok(ApiResponse::created(
        PlaylistView::from_playlist(&playlist),
        "Playlist created successfully",
    ))
}

/// GET /api/v1/playlists/:playlistId
pub async fn get(
    State(state): State<AppState>,
    Path(playlist_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let (playlist, videos) = playlist::get(&state, &playlist_id).await?;

    let view = PlaylistDetailView {
        playlist: PlaylistView::from_playlist(&playlist),
        videos: videos
            .iter()
            .map(|item| VideoListView::from_item(&state, item))
            .collect(),
    };
    Ok(ApiResponse::ok(view, "Success"))
}

/// GET /api/v1/playlists/user/:userId
pub async fn list_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let playlists = playlist::list_for_user(&state, &user_id).await?;
    let views: Vec<PlaylistView> = playlists.iter().map(PlaylistView::from_playlist).collect();

    Ok(ApiResponse::ok(views, "Success"))
}

/// PATCH /api/v1/playlists/:playlistId
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(playlist_id): Path<String>,
    Json(body): Json<PlaylistBody>,
) -> Result<impl IntoResponse, AppError> {
    let playlist =
        playlist::update(&state, &identity, &playlist_id, &body.name, &body.description).await?;

    Ok(ApiResponse::ok(
        PlaylistView::from_playlist(&playlist),
        "Playlist updated successfully",
    ))
}

/// DELETE /api/v1/playlists/:playlistId
pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(playlist_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    playlist::delete(&state, &identity, &playlist_id).await?;

    Ok(ApiResponse::ok((), "Playlist deleted successfully"))
}

/// PATCH /api/v1/playlists/add/:videoId/:playlistId
pub async fn add_video(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path((video_id, playlist_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    playlist::add_video(&state, &identity, &playlist_id, &video_id).await?;

    Ok(ApiResponse::ok((), "Video added to playlist"))
}

/// PATCH /api/v1/playlists/remove/:videoId/:playlistId
pub async fn remove_video(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path((video_id, playlist_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    playlist::remove_video(&state, &identity, &playlist_id, &video_id).await?;

    Ok(ApiResponse::ok((), "Video removed from playlist"))
}
