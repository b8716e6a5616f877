use std::sync::Arc;

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde_json::json;

use crate::infra::AppState;
use loan_ai::screening::{
    screening_router, ApplicationRepository, DecisionPublisher, ScreeningService,
};

pub(crate) fn with_screening_routes<R, P>(service: Arc<ScreeningService<R, P>>) -> axum::Router
where
    R: ApplicationRepository + 'static,
    P: DecisionPublisher + 'static,
{
    screening_router(service)
        .route("/", axum::routing::get(welcome))
        .route("/hello", axum::routing::get(hello))
        .route("/response", axum::routing::post(post_response))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

// The three plain-text routes predate the JSON API and are kept for
// integrations that still probe them.
pub(crate) async fn welcome() -> &'static str {
    "welcome to the loan screening service"
}

pub(crate) async fn hello() -> &'static str {
    "hello from the loan screening service"
}

pub(crate) async fn post_response() -> &'static str {
    "This is the response from post method"
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
