//! Tweets: short text posts attached to a channel.

use chrono::Utc;

use crate::auth::Identity;
use crate::data::{EntityId, Page, PageRequest, Tweet, TweetListItem};
use crate::error::AppError;
use crate::AppState;

const MAX_TWEET_LENGTH: usize = 500;

fn validate_content(content: &str) -> Result<String, AppError> {
    let content = super::require_text(content, "content")?;
    if content.chars().count() > MAX_TWEET_LENGTH {
        return Err(AppError::Validation(format!(
            "content must be at most {} characters",
            MAX_TWEET_LENGTH
        )));
    }
    Ok(content)
}

pub async fn create(state: &AppState, actor: &Identity, content: &str) -> Result<Tweet, AppError> {
    let content = validate_content(content)?;

    let now = Utc::now();
    let tweet = Tweet {
        id: EntityId::new().0,
        owner_id: actor.user_id.clone(),
        content,
        created_at: now,
        updated_at: now,
    };
    state.db.insert_tweet(&tweet).await?;

    Ok(tweet)
}

pub async fn list_for_user(
    state: &AppState,
    user_id: &str,
    request: PageRequest,
) -> Result<Page<TweetListItem>, AppError> {
    state
        .db
        .get_user(user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    state.db.list_user_tweets(user_id, request).await
}

pub async fn update(
    state: &AppState,
    actor: &Identity,
    tweet_id: &str,
    content: &str,
) -> Result<Tweet, AppError> {
    let content = validate_content(content)?;

    let tweet = state
        .db
        .get_tweet(tweet_id)
        .await?
        .ok_or(AppError::NotFound)?;
    super::ensure_owner(&actor.user_id, &tweet.owner_id)?;

    state.db.update_tweet_content(tweet_id, &content).await?;

    state
        .db
        .get_tweet(tweet_id)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn delete(state: &AppState, actor: &Identity, tweet_id: &str) -> Result<(), AppError> {
    let tweet = state
        .db
        .get_tweet(tweet_id)
        .await?
        .ok_or(AppError::NotFound)?;
    super::ensure_owner(&actor.user_id, &tweet.owner_id)?;

    state.db.delete_tweet(tweet_id).await
}
