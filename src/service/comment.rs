//! Comments on videos.

use chrono::Utc;

use crate::auth::Identity;
use crate::data::{Comment, CommentListItem, EntityId, Page, PageRequest};
use crate::error::AppError;
use crate::AppState;

pub async fn add(
    state: &AppState,
    actor: &Identity,
    video_id: &str,
    content: &str,
) -> Result<Comment, AppError> {
    let content = super::require_text(content, "content")?;

    // The foreign key would also reject this, but a clean 404 beats a
    // surfaced constraint error.
    state
        .db
        .get_video(video_id)
        .await?
        .ok_or(AppError::NotFound)?;

    let now = Utc::now();
    let comment = Comment {
        id: EntityId::new().0,
        video_id: video_id.to_string(),
        owner_id: actor.user_id.clone(),
        content,
        created_at: now,
        updated_at: now,
    };
    state.db.insert_comment(&comment).await?;

    Ok(comment)
}

pub async fn list(
    state: &AppState,
    video_id: &str,
    request: PageRequest,
) -> Result<Page<CommentListItem>, AppError> {
    state
        .db
        .get_video(video_id)
        .await?
        .ok_or(AppError::NotFound)?;

    state.db.list_video_comments(video_id, request).await
}

pub async fn update(
    state: &AppState,
    actor: &Identity,
    comment_id: &str,
    content: &str,
) -> Result<Comment, AppError> {
    let content = super::require_text(content, "content")?;

    let comment = state
        .db
        .get_comment(comment_id)
        .await?
        .ok_or(AppError::NotFound)?;
    super::ensure_owner(&actor.user_id, &comment.owner_id)?;

    state.db.update_comment_content(comment_id, &content).await?;

    state
        .db
        .get_comment(comment_id)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn delete(
    state: &AppState,
    actor: &Identity,
    comment_id: &str,
) -> Result<(), AppError> {
    let comment = state
        .db
        .get_comment(comment_id)
        .await?
        .ok_or(AppError::NotFound)?;
    super::ensure_owner(&actor.user_id, &comment.owner_id)?;

    state.db.delete_comment(comment_id).await
}
