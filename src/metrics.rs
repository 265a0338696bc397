//! Prometheus metrics registry and instruments.
//!
//! This module is framework-agnostic and can be used from any layer.

use lazy_static::lazy_static;
use prometheus::{Counter, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("cliptide_http_requests_total", "Total number of HTTP requests"),
        &["method", "endpoint", "status"]
    ).expect("metric can be created");
    pub static ref HTTP_REQUEST_DURATION_SECONDS: prometheus::HistogramVec = prometheus::HistogramVec::new(
        HistogramOpts::new(
            "cliptide_http_request_duration_seconds",
            "HTTP request duration in seconds"
        ).buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["method", "endpoint"]
    ).expect("metric can be created");

    // Database Metrics
    pub static ref DB_QUERIES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("cliptide_db_queries_total", "Total number of database queries"),
        &["operation", "table"]
    ).expect("metric can be created");

    // Error Metrics
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("cliptide_errors_total", "Total number of errors returned to clients"),
        &["error_type"]
    ).expect("metric can be created");

    // Auth Metrics
    pub static ref AUTH_LOGINS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("cliptide_auth_logins_total", "Total number of login attempts"),
        &["status"]
    ).expect("metric can be created");
    pub static ref AUTH_REFRESHES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("cliptide_auth_refreshes_total", "Total number of token refresh attempts"),
        &["status"]
    ).expect("metric can be created");

    // Storage Metrics
    pub static ref MEDIA_UPLOADS_TOTAL: IntCounter = IntCounter::new(
        "cliptide_media_uploads_total",
        "Total number of media uploads"
    ).expect("metric can be created");
    pub static ref MEDIA_BYTES_UPLOADED: Counter = Counter::new(
        "cliptide_media_bytes_uploaded_total",
        "Total bytes of media uploaded"
    ).expect("metric can be created");
    pub static ref MEDIA_DELETE_FAILURES_TOTAL: IntCounter = IntCounter::new(
        "cliptide_media_delete_failures_total",
        "Total number of best-effort media deletes that failed"
    ).expect("metric can be created");
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once; duplicate registrations are ignored.
pub fn init_metrics() {
    let _ = REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(DB_QUERIES_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(ERRORS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(AUTH_LOGINS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(AUTH_REFRESHES_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(MEDIA_UPLOADS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(MEDIA_BYTES_UPLOADED.clone()));
    let _ = REGISTRY.register(Box::new(MEDIA_DELETE_FAILURES_TOTAL.clone()));
}
