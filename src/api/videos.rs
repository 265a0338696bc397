//! Video endpoints.

use axum::extract::{Multipart, Path, Query, State};
use axum::response::IntoResponse;
use serde::Deserialize;

use super::users::{read_multipart, take_file, text_field};
use super::views::{VideoListView, VideoView};
use super::ApiResponse;
use crate::auth::{CurrentUser, MaybeUser};
use crate::data::{PageParams, PageRequest, SortDirection, VideoSortKey};
use crate::error::AppError;
use crate::service::video::{self, NewVideo, VideoEdit};
use crate::AppState;

// Pagination fields are inlined rather than flattened in: serde's
// flatten buffers query values as strings, which breaks integer
// deserialization under serde_urlencoded.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoListParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// Free-text filter over title and description
    pub query: Option<String>,
    pub sort_by: Option<String>,
    pub sort_type: Option<String>,
    /// Restrict to one channel's videos
    pub user_id: Option<String>,
}

impl VideoListParams {
    fn page_params(&self) -> PageParams {
        PageParams {
            page: self.page,
            limit: self.limit,
        }
    }
}

fn parse_sort(params: &VideoListParams) -> Result<(VideoSortKey, SortDirection), AppError> {
    let key = match &params.sort_by {
        Some(raw) => VideoSortKey::parse(raw)
            .ok_or_else(|| AppError::Validation(format!("unknown sort key: {}", raw)))?,
        None => VideoSortKey::CreatedAt,
    };
    let direction = match &params.sort_type {
        Some(raw) => SortDirection::parse(raw)
            .ok_or_else(|| AppError::Validation(format!("unknown sort direction: {}", raw)))?,
        None => SortDirection::Desc,
    };
    Ok((key, direction))
}

/// GET /api/v1/videos
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<VideoListParams>,
) -> Result<impl IntoResponse, AppError> {
    let request = PageRequest::from_params(&params.page_params())?;
    let (sort_key, direction) = parse_sort(&params)?;

    let page = video::list(
        &state,
        params.user_id.as_deref(),
        params.query.as_deref(),
        sort_key,
        direction,
        request,
    )
    .await?;
    let page = page.map(|item| VideoListView::from_item(&state, &item));

    Ok(ApiResponse::ok(page, "Success"))
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// POST /api/v1/videos
///
/// Multipart form: title, description, duration, published (optional),
/// videoFile, thumbnail.
pub async fn publish(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let (texts, mut files) = read_multipart(multipart).await?;

    let duration_seconds = text_field(&texts, "duration")
        .ok_or_else(|| AppError::Validation("duration is required".to_string()))?
        .parse::<f64>()
        .map_err(|_| AppError::Validation("duration must be a number".to_string()))?;
    let published = match text_field(&texts, "published") {
        Some(raw) => parse_bool(&raw)
            .ok_or_else(|| AppError::Validation("published must be true or false".to_string()))?,
        None => true,
    };

    let meta = NewVideo {
        title: text_field(&texts, "title").unwrap_or_default(),
        description: text_field(&texts, "description").unwrap_or_default(),
        duration_seconds,
        published,
    };

    let video_file = take_file(&mut files, "videoFile")
        .ok_or_else(|| AppError::Validation("videoFile is required".to_string()))?;
    let thumbnail = take_file(&mut files, "thumbnail")
        .ok_or_else(|| AppError::Validation("thumbnail is required".to_string()))?;

    let video = video::publish(&state, &identity, meta, video_file, thumbnail).await?;

    Ok(ApiResponse::created(
        VideoView::from_video(&state, &video),
        "Video published successfully",
    ))
}

/// GET /api/v1/videos/:id
pub async fn get(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(video_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let video = video::get(&state, &video_id, viewer.as_ref()).await?;

    Ok(ApiResponse::ok(
        VideoView::from_video(&state, &video),
        "Success",
    ))
}

/// PATCH /api/v1/videos/:id
///
/// Multipart form: title (optional), description (optional),
/// thumbnail (optional).
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(video_id): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let (texts, mut files) = read_multipart(multipart).await?;

    let edit = VideoEdit {
        title: text_field(&texts, "title"),
        description: text_field(&texts, "description"),
    };
    let thumbnail = take_file(&mut files, "thumbnail");

    let video = video::update(&state, &identity, &video_id, edit, thumbnail).await?;

    Ok(ApiResponse::ok(
        VideoView::from_video(&state, &video),
        "Video updated successfully",
    ))
}

/// DELETE /api/v1/videos/:id
pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(video_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    video::delete(&state, &identity, &video_id).await?;

    Ok(ApiResponse::ok((), "Video deleted successfully"))
}

/// PATCH /api/v1/videos/:id/toggle-publish
pub async fn toggle_publish(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(video_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let video = video::toggle_publish(&state, &identity, &video_id).await?;

    let message = if video.published {
        "Video published"
    } else {
        "Video unpublished"
    };
    Ok(ApiResponse::ok(VideoView::from_video(&state, &video), message))
}
