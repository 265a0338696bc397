//! API layer
//!
//! HTTP handlers, the response envelope, JSON views, and the route
//! table. Everything user-facing lives under `/api/v1`; `/metrics`
//! stays outside the versioned prefix.

mod comments;
mod dashboard;
mod envelope;
mod healthcheck;
mod likes;
pub mod metrics;
mod playlists;
mod subscriptions;
mod tweets;
mod users;
mod videos;
mod views;

pub use envelope::ApiResponse;
pub use metrics::metrics_router;

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use axum::routing::{get, patch, post};
use axum::{middleware, Router};

use crate::auth::require_auth;
use crate::metrics::{HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION_SECONDS};
use crate::AppState;

/// Record request count and latency per method and route template.
pub async fn track_metrics(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_string());

    let timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[&method, &path])
        .start_timer();
    let response = next.run(request).await;
    timer.observe_duration();

    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, response.status().as_str()])
        .inc();

    response
}

/// Routes reachable without an access token.
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/healthcheck", get(healthcheck::healthcheck))
        .route("/users/register", post(users::register))
        .route("/users/login", post(users::login))
        .route("/users/refresh-token", post(users::refresh_token))
        .route("/users/c/:username", get(users::channel_profile))
        .route("/videos", get(videos::list))
        .route("/videos/:videoId", get(videos::get))
        .route("/comments/:videoId", get(comments::list))
        .route("/tweets/user/:userId", get(tweets::list_for_user))
        .route("/playlists/:playlistId", get(playlists::get))
        .route("/playlists/user/:userId", get(playlists::list_for_user))
        .route("/subscriptions/c/:channelId", get(subscriptions::subscribers))
        .route(
            "/subscriptions/u/:subscriberId",
            get(subscriptions::subscribed_channels),
        )
}

/// Routes gated by the auth middleware.
fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/users/logout", post(users::logout))
        .route("/users/current-user", get(users::current_user))
        .route("/users/avatar", patch(users::update_avatar))
        .route("/users/history", get(users::watch_history))
        .route("/videos", post(videos::publish))
        .route(
            "/videos/:videoId",
            patch(videos::update).delete(videos::delete),
        )
        .route(
            "/videos/:videoId/toggle-publish",
            patch(videos::toggle_publish),
        )
        .route("/comments/:videoId", post(comments::add))
        .route(
            "/comments/c/:commentId",
            patch(comments::update).delete(comments::delete),
        )
        .route("/likes/toggle/v/:videoId", post(likes::toggle_video))
        .route("/likes/toggle/c/:commentId", post(likes::toggle_comment))
        .route("/likes/toggle/t/:tweetId", post(likes::toggle_tweet))
        .route("/likes/videos", get(likes::liked_videos))
        .route("/dashboard/stats", get(dashboard::stats))
        .route("/dashboard/videos", get(dashboard::videos))
        .route("/subscriptions/c/:channelId", post(subscriptions::toggle))
        .route("/tweets", post(tweets::create))
        .route(
            "/tweets/:tweetId",
            patch(tweets::update).delete(tweets::delete),
        )
        .route("/playlists", post(playlists::create))
        .route(
            "/playlists/:playlistId",
            patch(playlists::update).delete(playlists::delete),
        )
        .route(
            "/playlists/add/:videoId/:playlistId",
            patch(playlists::add_video),
        )
        .route(
            "/playlists/remove/:videoId/:playlistId",
            patch(playlists::remove_video),
        )
}

/// The versioned API router.
pub fn api_router(state: AppState) -> Router<AppState> {
    let protected = protected_routes()
        .route_layer(middleware::from_fn_with_state(state, require_auth));

    Router::new().nest("/api/v1", public_routes().merge(protected))
}
