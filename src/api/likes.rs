//! Like toggle endpoints.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use serde::Serialize;

use super::views::VideoListView;
use super::ApiResponse;
use crate::auth::CurrentUser;
use crate::data::{LikeTarget, PageParams, PageRequest, ToggleOutcome};
use crate::error::AppError;
use crate::service::engagement;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct LikeToggleView {
    pub liked: bool,
}

async fn toggle(
    state: &AppState,
    identity: &crate::auth::Identity,
    target: LikeTarget,
    target_id: &str,
) -> Result<ApiResponse<LikeToggleView>, AppError> {
    let outcome = engagement::toggle_like(state, identity, target, target_id).await?;

    let liked = outcome == ToggleOutcome::Added;
    let message = if liked { "Liked" } else { "Like removed" };
    Ok(ApiResponse::ok(LikeToggleView { liked }, message))
}

/// POST /api/v1/likes/toggle/v/:videoId
pub async fn toggle_video(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(video_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    toggle(&state, &identity, LikeTarget::Video, &video_id).await
}

/// POST /api/v1/likes/toggle/c/:commentId
pub async fn toggle_comment(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(comment_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    toggle(&state, &identity, LikeTarget::Comment, &comment_id).await
}

/// POST /api/v1/likes/toggle/t/:tweetId
pub async fn toggle_tweet(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(tweet_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    toggle(&state, &identity, LikeTarget::Tweet, &tweet_id).await
}

/// GET /api/v1/likes/videos
pub async fn liked_videos(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let request = PageRequest::from_params(&params)?;
    let page = engagement::liked_videos(&state, &identity, request).await?;
    let page = page.map(|item| VideoListView::from_item(&state, &item));

    Ok(ApiResponse::ok(page, "Success"))
}
