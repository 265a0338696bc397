//! Comment endpoints.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use super::views::{CommentListView, CommentView};
use super::ApiResponse;
use crate::auth::CurrentUser;
use crate::data::{PageParams, PageRequest};
use crate::error::AppError;
use crate::service::comment;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CommentBody {
    pub content: String,
}

/// GET /api/v1/comments/:videoId
pub async fn list(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let request = PageRequest::from_params(&params)?;
    let page = comment::list(&state, &video_id, request).await?;
    let page = page.map(|item| CommentListView::from_item(&state, &item));

    Ok(ApiResponse::ok(page, "Success"))
}

/// POST /api/v1/comments/:videoId
pub async fn add(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(video_id): Path<String>,
    Json(body): Json<CommentBody>,
) -> Result<impl IntoResponse, AppError> {
    let comment = comment::add(&state, &identity, &video_id, &body.content).await?;

    Ok(ApiResponse::created(
        CommentView::from_comment(&comment),
        "Comment added successfully",
    ))
}

/// PATCH /api/v1/comments/c/:commentId
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(comment_id): Path<String>,
    Json(body): Json<CommentBody>,
) -> Result<impl IntoResponse, AppError> {
    let comment = comment::update(&state, &identity, &comment_id, &body.content).await?;

    Ok(ApiResponse::ok(
        CommentView::from_comment(&comment),
        "Comment updated successfully",
    ))
}

/// DELETE /api/v1/comments/c/:commentId
pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(comment_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    comment::delete(&state, &identity, &comment_id).await?;

    Ok(ApiResponse::ok((), "Comment deleted successfully"))
}
