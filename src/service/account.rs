//! Account lifecycle: registration, login, token refresh, logout,
//! profiles and watch history.

use chrono::Utc;

use crate::auth::{
    hash_password, mint_token_pair, refresh_token_digest, verify_password, verify_refresh_token,
    TokenPair,
};
use crate::data::{ChannelProfile, EntityId, Page, PageRequest, User, WatchHistoryItem};
use crate::error::AppError;
use crate::AppState;

/// An uploaded file as it arrives from a multipart form.
pub struct UploadedFile {
    pub data: Vec<u8>,
    pub content_type: String,
}

/// Fields required to register a new account.
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password: String,
}

const MIN_PASSWORD_LENGTH: usize = 8;

/// Register a new user.
///
/// Profile images (when provided) are uploaded before the row is
/// inserted, so a failed insert never leaves a user pointing at
/// missing media. Orphaned uploads are swept best-effort instead.
pub async fn register(
    state: &AppState,
    account: NewAccount,
    avatar: Option<UploadedFile>,
    cover: Option<UploadedFile>,
) -> Result<User, AppError> {
    let username = super::require_text(&account.username, "username")?;
    let email = super::require_text(&account.email, "email")?;
    let full_name = super::require_text(&account.full_name, "fullName")?;

    if !email.contains('@') {
        return Err(AppError::Validation("email is not valid".to_string()));
    }
    if account.password.len() < MIN_PASSWORD_LENGTH {
        return Err(AppError::Validation(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    let password_hash = hash_password(&account.password)?;
    let id = EntityId::new();

    let avatar_key = match avatar {
        Some(file) => {
            let (key, _url) = state
                .storage
                .upload_avatar(&id.0, file.data, &file.content_type)
                .await?;
            Some(key)
        }
        None => None,
    };

    let cover_key = match cover {
        Some(file) => {
            match state
                .storage
                .upload_cover(&id.0, file.data, &file.content_type)
                .await
            {
                Ok((key, _url)) => Some(key),
                Err(error) => {
                    if let Some(key) = &avatar_key {
                        state.storage.delete_best_effort(key).await;
                    }
                    return Err(error);
                }
            }
        }
        None => None,
    };

    let now = Utc::now();
    let user = User {
        id: id.0,
        username,
        email,
        full_name,
        avatar_key: avatar_key.clone(),
        cover_key: cover_key.clone(),
        password_hash,
        refresh_token_hash: None,
        created_at: now,
        updated_at: now,
    };

    if let Err(error) = state.db.insert_user(&user).await {
        for key in avatar_key.iter().chain(cover_key.iter()) {
            state.storage.delete_best_effort(key).await;
        }
        return Err(error);
    }

    tracing::info!(user_id = %user.id, username = %user.username, "Registered new user");
    Ok(user)
}

/// Authenticate by username or email and open a session.
///
/// Unknown identifier and wrong password both report `Unauthorized`
/// with the same message, so the response does not reveal which
/// accounts exist.
pub async fn login(
    state: &AppState,
    identifier: &str,
    password: &str,
) -> Result<(User, TokenPair), AppError> {
    let user = state.db.find_user_by_login(identifier.trim()).await?;

    let Some(user) = user else {
        crate::metrics::AUTH_LOGINS_TOTAL
            .with_label_values(&["failure"])
            .inc();
        return Err(AppError::Unauthorized);
    };

    if !verify_password(password, &user.password_hash) {
        crate::metrics::AUTH_LOGINS_TOTAL
            .with_label_values(&["failure"])
            .inc();
        return Err(AppError::Unauthorized);
    }

    let pair = mint_token_pair(&user.id, &user.username, &state.config.auth)?;

    // Single-session model: logging in invalidates any previously
    // issued refresh token.
    let digest = refresh_token_digest(&pair.refresh_token);
    state
        .db
        .set_refresh_token_hash(&user.id, Some(&digest))
        .await?;

    crate::metrics::AUTH_LOGINS_TOTAL
        .with_label_values(&["success"])
        .inc();
    tracing::info!(user_id = %user.id, username = %user.username, "User logged in");

    Ok((user, pair))
}

/// Exchange a valid refresh token for a new access/refresh pair.
///
/// Rotation is compare-and-swap against the stored digest, so a token
/// can be redeemed at most once. A replayed or superseded token fails
/// as `Unauthorized` without disturbing the live session.
pub async fn refresh_session(
    state: &AppState,
    refresh_token: &str,
) -> Result<(User, TokenPair), AppError> {
    let claims = verify_refresh_token(refresh_token, &state.config.auth).map_err(|e| {
        crate::metrics::AUTH_REFRESHES_TOTAL
            .with_label_values(&["failure"])
            .inc();
        e
    })?;

    let user = state
        .db
        .get_user(&claims.sub)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let presented_digest = refresh_token_digest(refresh_token);
    let pair = mint_token_pair(&user.id, &user.username, &state.config.auth)?;
    let new_digest = refresh_token_digest(&pair.refresh_token);

    let rotated = state
        .db
        .rotate_refresh_token_hash(&user.id, &presented_digest, &new_digest)
        .await?;

    if !rotated {
        crate::metrics::AUTH_REFRESHES_TOTAL
            .with_label_values(&["failure"])
            .inc();
        tracing::warn!(user_id = %user.id, "Stale refresh token rejected");
        return Err(AppError::Unauthorized);
    }

    crate::metrics::AUTH_REFRESHES_TOTAL
        .with_label_values(&["success"])
        .inc();

    Ok((user, pair))
}

/// Close the session server-side by clearing the stored digest.
/// Any outstanding refresh token is dead after this.
pub async fn logout(state: &AppState, user_id: &str) -> Result<(), AppError> {
    state.db.set_refresh_token_hash(user_id, None).await?;
    tracing::info!(user_id = %user_id, "User logged out");
    Ok(())
}

pub async fn current_user(state: &AppState, user_id: &str) -> Result<User, AppError> {
    state
        .db
        .get_user(user_id)
        .await?
        .ok_or(AppError::Unauthorized)
}

/// Public channel profile with derived subscription counts.
pub async fn channel_profile(
    state: &AppState,
    username: &str,
    viewer_id: Option<&str>,
) -> Result<ChannelProfile, AppError> {
    state
        .db
        .get_channel_profile(username, viewer_id)
        .await?
        .ok_or(AppError::NotFound)
}

pub async fn watch_history(
    state: &AppState,
    user_id: &str,
    request: PageRequest,
) -> Result<Page<WatchHistoryItem>, AppError> {
    state.db.watch_history(user_id, request).await
}

/// Replace the avatar.
///
/// The new file goes up under a fresh key before the row changes; the
/// previous object is swept best-effort once the row points away from
/// it.
pub async fn update_avatar(
    state: &AppState,
    user_id: &str,
    file: UploadedFile,
) -> Result<User, AppError> {
    let (new_key, _url) = state
        .storage
        .upload_avatar(&EntityId::new().0, file.data, &file.content_type)
        .await?;

    let previous = match state.db.update_user_avatar_key(user_id, &new_key).await {
        Ok(previous) => previous,
        Err(error) => {
            state.storage.delete_best_effort(&new_key).await;
            return Err(error);
        }
    };

    if let Some(old_key) = previous {
        state.storage.delete_best_effort(&old_key).await;
    }

    state
        .db
        .get_user(user_id)
        .await?
        .ok_or(AppError::NotFound)
}
