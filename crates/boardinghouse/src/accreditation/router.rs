use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tracing::error;

use super::domain::{AccreditationForm, AccreditationId, AccreditationSubmission};
use super::repository::{AccreditationRepository, AccreditationStatusView, RepositoryError};
use super::service::{AccreditationService, AccreditationServiceError};

/// Router builder exposing HTTP endpoints for evaluation and record keeping.
pub fn accreditation_router<R>(service: Arc<AccreditationService<R>>) -> Router
where
    R: AccreditationRepository + 'static,
{
    Router::new()
        .route("/api/rubric", get(rubric_handler::<R>))
        .route(
            "/api/accreditations/evaluate",
            post(evaluate_handler::<R>),
        )
        .route(
            "/api/accreditations/summary",
            get(summary_handler::<R>),
        )
        .route(
            "/api/accreditations",
            post(submit_handler::<R>).get(list_handler::<R>),
        )
        .route(
            "/api/accreditations/:id",
            get(record_handler::<R>).put(update_handler::<R>),
        )
        .with_state(service)
}

fn error_response(error: AccreditationServiceError) -> Response {
    match error {
        AccreditationServiceError::Validation(error) => {
            let payload = json!({ "error": error.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        AccreditationServiceError::Repository(RepositoryError::NotFound) => {
            let payload = json!({ "error": "accreditation not found" });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        AccreditationServiceError::Repository(RepositoryError::Conflict) => {
            let payload = json!({ "error": "accreditation already exists" });
            (StatusCode::CONFLICT, Json(payload)).into_response()
        }
        other => {
            error!(error = %other, "accreditation request failed");
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn rubric_handler<R>(
    State(service): State<Arc<AccreditationService<R>>>,
) -> Response
where
    R: AccreditationRepository + 'static,
{
    (StatusCode::OK, Json(service.rubric().clone())).into_response()
}

pub(crate) async fn evaluate_handler<R>(
    State(service): State<Arc<AccreditationService<R>>>,
    Json(form): Json<AccreditationForm>,
) -> Response
where
    R: AccreditationRepository + 'static,
{
    match service.evaluate(form) {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_handler<R>(
    State(service): State<Arc<AccreditationService<R>>>,
    Json(submission): Json<AccreditationSubmission>,
) -> Response
where
    R: AccreditationRepository + 'static,
{
    match service.submit(submission) {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_handler<R>(
    State(service): State<Arc<AccreditationService<R>>>,
    Path(id): Path<String>,
    Json(submission): Json<AccreditationSubmission>,
) -> Response
where
    R: AccreditationRepository + 'static,
{
    match service.update(&AccreditationId(id), submission) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn record_handler<R>(
    State(service): State<Arc<AccreditationService<R>>>,
    Path(id): Path<String>,
) -> Response
where
    R: AccreditationRepository + 'static,
{
    match service.get(&AccreditationId(id)) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_handler<R>(
    State(service): State<Arc<AccreditationService<R>>>,
) -> Response
where
    R: AccreditationRepository + 'static,
{
    match service.list() {
        Ok(records) => {
            let views: Vec<AccreditationStatusView> =
                records.iter().map(|record| record.status_view()).collect();
            (StatusCode::OK, Json(views)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn summary_handler<R>(
    State(service): State<Arc<AccreditationService<R>>>,
) -> Response
where
    R: AccreditationRepository + 'static,
{
    match service.summary() {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(error) => error_response(error),
    }
}
