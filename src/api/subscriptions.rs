//! Subscription endpoints.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use serde::Serialize;

use super::views::OwnerView;
use super::ApiResponse;
use crate::auth::CurrentUser;
use crate::data::ToggleOutcome;
use crate::error::AppError;
use crate::service::engagement;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct SubscriptionToggleView {
    pub subscribed: bool,
}

/// POST /api/v1/subscriptions/c/:channelId
pub async fn toggle(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Path(channel_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = engagement::toggle_subscription(&state, &identity, &channel_id).await?;

    let subscribed = outcome == ToggleOutcome::Added;
    let message = if subscribed {
        "Subscribed"
    } else {
        "Unsubscribed"
    };
    Ok(ApiResponse::ok(
        SubscriptionToggleView { subscribed },
        message,
    ))
}

/// GET /api/v1/subscriptions/c/:channelId
pub async fn subscribers(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let subscribers = engagement::channel_subscribers(&state, &channel_id).await?;
    let views: Vec<OwnerView> = subscribers
        .iter()
        .map(|summary| OwnerView::from_summary(&state, summary))
        .collect();

    Ok(ApiResponse::ok(views, "Success"))
}

/// GET /api/v1/subscriptions/u/:subscriberId
pub async fn subscribed_channels(
    State(state): State<AppState>,
    Path(subscriber_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let channels = engagement::subscribed_channels(&state, &subscriber_id).await?;
    let views: Vec<OwnerView> = channels
        .iter()
        .map(|summary| OwnerView::from_summary(&state, summary))
        .collect();

    Ok(ApiResponse::ok(views, "Success"))
}
