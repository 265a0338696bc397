//! Likes, subscriptions, and the channel dashboard.

use crate::auth::Identity;
use crate::data::{
    ChannelStats, LikeTarget, OwnerSummary, Page, PageRequest, ToggleOutcome, Video, VideoListItem,
};
use crate::error::AppError;
use crate::AppState;

/// Toggle a like on a video, comment or tweet.
///
/// The target must exist; liking a deleted entity is a 404, not a
/// silent orphan row.
pub async fn toggle_like(
    state: &AppState,
    actor: &Identity,
    target: LikeTarget,
    target_id: &str,
) -> Result<ToggleOutcome, AppError> {
    let exists = match target {
        LikeTarget::Video => state.db.get_video(target_id).await?.is_some(),
        LikeTarget::Comment => state.db.get_comment(target_id).await?.is_some(),
        LikeTarget::Tweet => state.db.get_tweet(target_id).await?.is_some(),
    };
    if !exists {
        return Err(AppError::NotFound);
    }

    state.db.toggle_like(&actor.user_id, target, target_id).await
}

pub async fn liked_videos(
    state: &AppState,
    actor: &Identity,
    request: PageRequest,
) -> Result<Page<VideoListItem>, AppError> {
    state.db.liked_videos(&actor.user_id, request).await
}

/// Toggle a subscription to a channel.
pub async fn toggle_subscription(
    state: &AppState,
    actor: &Identity,
    channel_id: &str,
) -> Result<ToggleOutcome, AppError> {
    if actor.user_id == channel_id {
        return Err(AppError::Validation(
            "cannot subscribe to your own channel".to_string(),
        ));
    }

    state
        .db
        .get_user(channel_id)
        .await?
        .ok_or(AppError::NotFound)?;

    state
        .db
        .toggle_subscription(&actor.user_id, channel_id)
        .await
}

pub async fn channel_subscribers(
    state: &AppState,
    channel_id: &str,
) -> Result<Vec<OwnerSummary>, AppError> {
    state
        .db
        .get_user(channel_id)
        .await?
        .ok_or(AppError::NotFound)?;

    state.db.channel_subscribers(channel_id).await
}

pub async fn subscribed_channels(
    state: &AppState,
    user_id: &str,
) -> Result<Vec<OwnerSummary>, AppError> {
    state
        .db
        .get_user(user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    state.db.subscribed_channels(user_id).await
}

/// Dashboard totals for the authenticated channel.
pub async fn dashboard_stats(state: &AppState, actor: &Identity) -> Result<ChannelStats, AppError> {
    state.db.channel_stats(&actor.user_id).await
}

/// The authenticated channel's own videos, drafts included.
pub async fn dashboard_videos(
    state: &AppState,
    actor: &Identity,
    request: PageRequest,
) -> Result<Page<Video>, AppError> {
    state.db.channel_videos(&actor.user_id, request).await
}
