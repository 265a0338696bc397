//! User and session endpoints.

use axum::extract::{Multipart, Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};

use super::views::{ChannelProfileView, UserView, WatchHistoryView};
use super::ApiResponse;
use crate::auth::{CurrentUser, MaybeUser, TokenPair, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
use crate::data::{PageParams, PageRequest};
use crate::error::AppError;
use crate::service::account::{self, NewAccount, UploadedFile};
use crate::AppState;

fn same_site_mode(state: &AppState) -> SameSite {
    match state.config.auth.cookie_same_site.to_ascii_lowercase().as_str() {
        "strict" => SameSite::Strict,
        "none" => SameSite::None,
        _ => SameSite::Lax,
    }
}

fn auth_cookie(state: &AppState, name: &'static str, value: String, max_age: i64) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(state.config.should_use_secure_cookies())
        .same_site(same_site_mode(state))
        .max_age(time::Duration::seconds(max_age))
        .build()
}

/// Set both session cookies for a freshly minted pair.
fn session_cookies(state: &AppState, jar: CookieJar, pair: &TokenPair) -> CookieJar {
    jar.add(auth_cookie(
        state,
        ACCESS_TOKEN_COOKIE,
        pair.access_token.clone(),
        state.config.auth.access_token_ttl,
    ))
    .add(auth_cookie(
        state,
        REFRESH_TOKEN_COOKIE,
        pair.refresh_token.clone(),
        state.config.auth.refresh_token_ttl,
    ))
}

fn clear_session_cookies(state: &AppState, jar: CookieJar) -> CookieJar {
    jar.add(auth_cookie(state, ACCESS_TOKEN_COOKIE, String::new(), 0))
        .add(auth_cookie(state, REFRESH_TOKEN_COOKIE, String::new(), 0))
}

/// Read a multipart form into named text fields and files.
pub(super) async fn read_multipart(
    mut multipart: Multipart,
) -> Result<(Vec<(String, String)>, Vec<(String, UploadedFile)>), AppError> {
    let mut texts = Vec::new();
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {}", e)))?
    {
        let Some(name) = field.name().map(ToOwned::to_owned) else {
            continue;
        };

        if field.file_name().is_some() {
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("failed to read file field: {}", e)))?;
            files.push((
                name,
                UploadedFile {
                    data: data.to_vec(),
                    content_type,
                },
            ));
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| AppError::Validation(format!("failed to read text field: {}", e)))?;
            texts.push((name, value));
        }
    }

    Ok((texts, files))
}

pub(super) fn text_field(texts: &[(String, String)], name: &str) -> Option<String> {
    texts
        .iter()
        .find(|(field, _)| field == name)
        .map(|(_, value)| value.clone())
}

pub(super) fn take_file(files: &mut Vec<(String, UploadedFile)>, name: &str) -> Option<UploadedFile> {
    let index = files.iter().position(|(field, _)| field == name)?;
    Some(files.remove(index).1)
}

/// POST /api/v1/users/register
pub async fn register(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let (texts, mut files) = read_multipart(multipart).await?;

    let account = NewAccount {
        username: text_field(&texts, "username").unwrap_or_default(),
        email: text_field(&texts, "email").unwrap_or_default(),
        full_name: text_field(&texts, "fullName").unwrap_or_default(),
        password: text_field(&texts, "password").unwrap_or_default(),
    };
    let avatar = take_file(&mut files, "avatar");
    let cover = take_file(&mut files, "coverImage");

    let user = account::register(&state, account, avatar, cover).await?;

    Ok(ApiResponse::created(
        UserView::from_user(&state, &user),
        "User registered successfully",
    ))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username or email
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub user: UserView,
    pub access_token: String,
    pub refresh_token: String,
}

/// POST /api/v1/users/login
///
/// Tokens go out both in the body (for API clients) and as HttpOnly
/// cookies (for browsers).
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (user, pair) = account::login(&state, &request.identifier, &request.password).await?;

    let session = SessionView {
        user: UserView::from_user(&state, &user),
        access_token: pair.access_token.clone(),
        refresh_token: pair.refresh_token.clone(),
    };
    let jar = session_cookies(&state, jar, &pair);

    Ok((jar, ApiResponse::ok(session, "Logged in successfully")))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// POST /api/v1/users/refresh-token
///
/// The refresh token may arrive in the cookie or the body. Redeeming
/// it rotates the pair; the old refresh token is dead afterwards.
pub async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
    body: Option<Json<RefreshRequest>>,
) -> Result<impl IntoResponse, AppError> {
    let from_cookie = jar
        .get(REFRESH_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_owned());
    let token = body
        .and_then(|Json(request)| request.refresh_token)
        .or(from_cookie)
        .ok_or(AppError::Unauthorized)?;

    let (user, pair) = account::refresh_session(&state, &token).await?;

    let session = SessionView {
        user: UserView::from_user(&state, &user),
        access_token: pair.access_token.clone(),
        refresh_token: pair.refresh_token.clone(),
    };
    let jar = session_cookies(&state, jar, &pair);

    Ok((jar, ApiResponse::ok(session, "Session refreshed")))
}

/// POST /api/v1/users/logout
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    CurrentUser(identity): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    account::logout(&state, &identity.user_id).await?;

    let jar = clear_session_cookies(&state, jar);
    Ok((jar, ApiResponse::ok((), "Logged out successfully")))
}

/// GET /api/v1/users/current-user
pub async fn current_user(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
) -> Result<impl IntoResponse, AppError> {
    let user = account::current_user(&state, &identity.user_id).await?;

    Ok(ApiResponse::ok(
        UserView::from_user(&state, &user),
        "Success",
    ))
}

/// PATCH /api/v1/users/avatar
pub async fn update_avatar(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let (_texts, mut files) = read_multipart(multipart).await?;
    let avatar = take_file(&mut files, "avatar")
        .ok_or_else(|| AppError::Validation("avatar file is required".to_string()))?;

    let user = account::update_avatar(&state, &identity.user_id, avatar).await?;

    Ok(ApiResponse::ok(
        UserView::from_user(&state, &user),
        "Avatar updated successfully",
    ))
}

/// GET /api/v1/users/c/:username
pub async fn channel_profile(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let viewer_id = viewer.as_ref().map(|v| v.user_id.as_str());
    let profile = account::channel_profile(&state, &username, viewer_id).await?;

    Ok(ApiResponse::ok(
        ChannelProfileView::from_profile(&state, &profile),
        "Success",
    ))
}

/// GET /api/v1/users/history
pub async fn watch_history(
    State(state): State<AppState>,
    CurrentUser(identity): CurrentUser,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let request = PageRequest::from_params(&params)?;
    let page = account::watch_history(&state, &identity.user_id, request).await?;
    let page = page.map(|item| WatchHistoryView::from_item(&state, &item));

    Ok(ApiResponse::ok(page, "Success"))
}
