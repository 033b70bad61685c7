use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error};

use super::domain::{GeoPoint, RouteFeature};
use super::planner::{RoutePlanner, RoutingError};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RouteQuery {
    start_lat: Option<String>,
    start_lng: Option<String>,
    end_lat: Option<String>,
    end_lng: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum QueryProblem {
    Missing,
    Invalid,
}

impl RouteQuery {
    pub(crate) fn endpoints(&self) -> Result<(GeoPoint, GeoPoint), QueryProblem> {
        let raw = [&self.start_lat, &self.start_lng, &self.end_lat, &self.end_lng];
        if raw
            .iter()
            .any(|value| value.as_deref().map_or(true, |value| value.trim().is_empty()))
        {
            return Err(QueryProblem::Missing);
        }

        let mut parsed = [0.0_f64; 4];
        for (slot, value) in parsed.iter_mut().zip(raw) {
            *slot = value
                .as_deref()
                .unwrap_or_default()
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|number| number.is_finite())
                .ok_or(QueryProblem::Invalid)?;
        }

        Ok((
            GeoPoint::new(parsed[0], parsed[1]),
            GeoPoint::new(parsed[2], parsed[3]),
        ))
    }
}

/// Shortest-path proxy endpoint.
pub fn routing_router(planner: Arc<dyn RoutePlanner>) -> Router {
    Router::new()
        .route("/api/route", get(route_handler))
        .with_state(planner)
}

pub(crate) async fn route_handler(
    State(planner): State<Arc<dyn RoutePlanner>>,
    Query(query): Query<RouteQuery>,
) -> Response {
    let (start, end) = match query.endpoints() {
        Ok(endpoints) => endpoints,
        Err(QueryProblem::Missing) => {
            let payload = json!({ "error": "Missing coordinates" });
            return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
        }
        Err(QueryProblem::Invalid) => {
            let payload = json!({ "error": "Invalid coordinates" });
            return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
        }
    };

    match planner.route(start, end).await {
        Ok(geometry) => {
            debug!(backend = planner.backend(), "route resolved");
            (StatusCode::OK, Json(RouteFeature::new(geometry))).into_response()
        }
        Err(RoutingError::NoRoute) => {
            let payload = json!({ "error": "No route found" });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        Err(RoutingError::Backend(reason)) => {
            error!(backend = planner.backend(), %reason, "routing failed");
            let payload = json!({ "error": "Routing failed" });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
