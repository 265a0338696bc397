//! Channel dashboard endpoints.

use axum::extract::{Query, State};
use axum::response::IntoResponse;

use super::views::{ChannelStatsView, VideoView};
use super::ApiResponse;
use crate::auth::CurrentUser;
use crate::data::{PageParams, PageRequest};
use crate::error::AppError;
use crate::service::engagement;
use crate::AppState;

/// GET /api/v1/dashboard/stats
pub async fn stats(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let stats = engagement::dashboard_stats(&state, &identity).await?;

    Ok(ApiResponse::ok(
        ChannelStatsView::from_stats(&stats),
        "Success",
    ))
}

/// GET /api/v1/dashboard/videos
///
/// Unlike the public listing this includes unpublished drafts.
pub async fn videos(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let request = PageRequest::from_params(&params)?;
    let page = engagement::dashboard_videos(&state, &identity, request).await?;
    let page = page.map(|video| VideoView::from_video(&state, &video));

    Ok(ApiResponse::ok(page, "Success"))
}
