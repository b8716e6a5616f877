use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::domain::{ApplicationId, LoanApplication};
use super::repository::{ApplicationRepository, DecisionPublisher, RepositoryError};
use super::service::{ScreeningService, ScreeningServiceError};

/// Router builder exposing HTTP endpoints for intake, decisions, and
/// one-shot predictions.
pub fn screening_router<R, P>(service: Arc<ScreeningService<R, P>>) -> Router
where
    R: ApplicationRepository + 'static,
    P: DecisionPublisher + 'static,
{
    Router::new()
        .route("/api/v1/loans/applications", post(submit_handler::<R, P>))
        .route(
            "/api/v1/loans/applications/:application_id",
            get(status_handler::<R, P>),
        )
        .route(
            "/api/v1/loans/applications/:application_id/decision",
            post(decide_handler::<R, P>),
        )
        .route("/api/v1/loans/predictions", post(predict_handler::<R, P>))
        .with_state(service)
}

pub(crate) async fn submit_handler<R, P>(
    State(service): State<Arc<ScreeningService<R, P>>>,
    axum::Json(application): axum::Json<LoanApplication>,
) -> Response
where
    R: ApplicationRepository + 'static,
    P: DecisionPublisher + 'static,
{
    match service.submit(application) {
        Ok(record) => {
            let view = record.status_view();
            (StatusCode::ACCEPTED, axum::Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<R, P>(
    State(service): State<Arc<ScreeningService<R, P>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    P: DecisionPublisher + 'static,
{
    let id = ApplicationId(application_id);
    match service.get(&id) {
        Ok(record) => {
            let view = record.status_view();
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn decide_handler<R, P>(
    State(service): State<Arc<ScreeningService<R, P>>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    P: DecisionPublisher + 'static,
{
    let id = ApplicationId(application_id);
    match service.evaluate(&id) {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn predict_handler<R, P>(
    State(service): State<Arc<ScreeningService<R, P>>>,
    axum::Json(application): axum::Json<LoanApplication>,
) -> Response
where
    R: ApplicationRepository + 'static,
    P: DecisionPublisher + 'static,
{
    match service.predict(application) {
        Ok(prediction) => (StatusCode::OK, axum::Json(prediction)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: ScreeningServiceError) -> Response {
    let status = match &error {
        ScreeningServiceError::Intake(_) | ScreeningServiceError::Encoding(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ScreeningServiceError::Classifier(_) => StatusCode::SERVICE_UNAVAILABLE,
        ScreeningServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ScreeningServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ScreeningServiceError::Repository(_) | ScreeningServiceError::Alert(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
