//! Tweet endpoints.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use super::views::{TweetListView, TweetView};
use super::ApiResponse;
use crate::auth::CurrentUser;
use crate::data::{PageParams, PageRequest};
use crate::error::AppError;
use crate::service::tweet;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TweetBody {
    pub content: String,
}

/// POST /api/v1/tweets
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Json(body): Json<TweetBody>,
) -> Result<impl IntoResponse, AppError> {
    let tweet = tweet::create(&state, &identity, &body.content).await?;

    Ok(ApiResponse::created(
        TweetView::from_tweet(&tweet),
        "Tweet created successfully",
    ))
}

/// GET /api/v1/tweets/user/:userId
pub async fn list_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let request = PageRequest::from_params(&params)?;
    let page = tweet::list_for_user(&state, &user_id, request).await?;
    let page = page.map(|item| TweetListView::from_item(&state, &item));

    Ok(ApiResponse::ok(page, "Success"))
}

/// PATCH /api/v1/tweets/:tweetId
pub async fn update(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(tweet_id): Path<String>,
    Json(body): Json<TweetBody>,
) -> Result<impl IntoResponse, AppError> {
    let tweet = tweet::update(&state, &identity, &tweet_id, &body.content).await?;

    Ok(ApiResponse::ok(
        TweetView::from_tweet(&tweet),
        "Tweet updated successfully",
    ))
}

/// DELETE /api/v1/tweets/:tweetId
pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(tweet_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    tweet::delete(&state, &identity, &tweet_id).await?;

    Ok(ApiResponse::ok((), "Tweet deleted successfully"))
}
