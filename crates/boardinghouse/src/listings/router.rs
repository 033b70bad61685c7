use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::domain::{ListingId, ListingUpdate, NewListing};
use super::service::{ListingError, ListingService};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListingQuery {
    locality: Option<String>,
    #[serde(alias = "search")]
    q: Option<String>,
}

/// Map listing and locality endpoints.
pub fn listings_router(service: Arc<ListingService>) -> Router {
    Router::new()
        .route("/api/pois", get(list_handler).post(add_handler))
        .route("/api/pois/:id", put(update_handler).delete(delete_handler))
        .route("/api/localities", get(localities_handler))
        .with_state(service)
}

fn error_response(error: ListingError) -> Response {
    let status = match &error {
        ListingError::MissingName
        | ListingError::UnknownLocality(_)
        | ListingError::OutsideServiceArea { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ListingError::ReadOnly(_) => StatusCode::CONFLICT,
        ListingError::NotFound(_) => StatusCode::NOT_FOUND,
        ListingError::Store(_) => {
            error!(error = %error, "listing store failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, Json(json!({ "error": error.to_string() }))).into_response()
}

pub(crate) async fn list_handler(
    State(service): State<Arc<ListingService>>,
    Query(query): Query<ListingQuery>,
) -> Response {
    let locality = query.locality.as_deref().filter(|value| !value.is_empty());
    match service.search(locality, query.q.as_deref()) {
        Ok(listings) => (StatusCode::OK, Json(listings)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn add_handler(
    State(service): State<Arc<ListingService>>,
    Json(listing): Json<NewListing>,
) -> Response {
    match service.add(listing) {
        Ok(listing) => (StatusCode::CREATED, Json(listing)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_handler(
    State(service): State<Arc<ListingService>>,
    Path(id): Path<ListingId>,
    Json(update): Json<ListingUpdate>,
) -> Response {
    match service.update(id, update) {
        Ok(listing) => (StatusCode::OK, Json(listing)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_handler(
    State(service): State<Arc<ListingService>>,
    Path(id): Path<ListingId>,
) -> Response {
    match service.delete(id) {
        Ok(listing) => (StatusCode::OK, Json(listing)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn localities_handler(State(service): State<Arc<ListingService>>) -> Response {
    let payload = json!({
        "localities": service.localities(),
        "bounds": service.catalog().area(),
    });
    (StatusCode::OK, Json(payload)).into_response()
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::listings::{InMemoryListingStore, ListingCatalog};

    fn router() -> Router {
        let catalog = Arc::new(ListingCatalog::standard());
        let store = Arc::new(InMemoryListingStore::new(catalog.max_id()));
        listings_router(Arc::new(ListingService::new(catalog, store)))
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    #[tokio::test]
    async fn lists_listings_for_locality() {
        let request = Request::builder()
            .uri("/api/pois?locality=Dauis&q=student")
            .body(Body::empty())
            .expect("request");

        let (status, body) = send(router(), request).await;

        assert_eq!(status, StatusCode::OK);
        let listings = body.as_array().expect("array");
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0]["name"], "Dauis Student Home");
        assert_eq!(listings[0]["status"], "Accredited");
    }

    #[tokio::test]
    async fn catalog_listing_cannot_be_deleted() {
        let request = Request::builder()
            .method(Method::DELETE)
            .uri("/api/pois/3")
            .body(Body::empty())
            .expect("request");

        let (status, body) = send(router(), request).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].as_str().expect("message").contains("catalog"));
    }

    #[tokio::test]
    async fn pin_outside_service_area_is_rejected() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/pois")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({
                    "name": "Far Away Inn",
                    "locality": "dauis",
                    "coordinates": { "lat": 10.3, "lng": 123.9 }
                })
                .to_string(),
            ))
            .expect("request");

        let (status, _) = send(router(), request).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn localities_include_bounds() {
        let request = Request::builder()
            .uri("/api/localities")
            .body(Body::empty())
            .expect("request");

        let (status, body) = send(router(), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["localities"][0]["key"], "tagbilaran");
        assert_eq!(body["bounds"]["south_west"]["lat"], 9.59);
    }
}
