use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use boardinghouse::accreditation::{
    accreditation_router, AccreditationRepository, AccreditationService,
};
use boardinghouse::listings::{listings_router, ListingService};
use boardinghouse::prediction::{prediction_router, LikelihoodHeuristic};
use boardinghouse::routing::{routing_router, RoutePlanner};
use boardinghouse::session::session_router;
use serde_json::json;
use std::sync::Arc;

/// Everything the HTTP surface needs, wired once at startup.
pub(crate) struct Services<R> {
    pub(crate) accreditations: Arc<AccreditationService<R>>,
    pub(crate) listings: Arc<ListingService>,
    pub(crate) planner: Arc<dyn RoutePlanner>,
    pub(crate) heuristic: Arc<LikelihoodHeuristic>,
}

pub(crate) fn app_router<R>(services: Services<R>) -> Router
where
    R: AccreditationRepository + 'static,
{
    Router::new()
        .route("/api/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .merge(accreditation_router(services.accreditations))
        .merge(listings_router(services.listings))
        .merge(routing_router(services.planner))
        .merge(prediction_router(services.heuristic))
        .merge(session_router())
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
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
