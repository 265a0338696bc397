//! Liveness probe.

use std::time::Instant;

use axum::extract::State;
use axum::response::IntoResponse;
use lazy_static::lazy_static;
use serde::Serialize;

use super::ApiResponse;
use crate::AppState;

lazy_static! {
    static ref STARTED_AT: Instant = Instant::now();
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthView {
    pub status: &'static str,
    pub database: &'static str,
    pub uptime_seconds: u64,
}

/// GET /api/v1/healthcheck
///
/// Always answers 200; a broken database shows up in the payload so
/// probes can distinguish "down" from "degraded".
pub async fn healthcheck(State(state): State<AppState>) -> impl IntoResponse {
    let database = match state.db.ping().await {
        Ok(()) => "ok",
        Err(error) => {
            tracing::error!(%error, "Healthcheck database ping failed");
            "unavailable"
        }
    };

    let view = HealthView {
        status: "ok",
        database,
        uptime_seconds: STARTED_AT.elapsed().as_secs(),
    };
    ApiResponse::ok(view, "Service is healthy")
}
