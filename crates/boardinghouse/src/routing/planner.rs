use async_trait::async_trait;
use tracing::warn;

use super::domain::{GeoPoint, RouteGeometry, RoutePath};

/// Shortest-path backend between two coordinates.
#[async_trait]
pub trait RoutePlanner: Send + Sync {
    async fn route(&self, start: GeoPoint, end: GeoPoint) -> Result<RouteGeometry, RoutingError>;

    /// Short backend label for logs and readiness output.
    fn backend(&self) -> &'static str;
}

#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    #[error("No route found")]
    NoRoute,
    #[error("routing backend failed: {0}")]
    Backend(String),
}

/// Route drawn for a client, with a flag when the backend could not be used.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResolution {
    pub path: RoutePath,
    pub fallback: bool,
}

/// Ask the planner for a route; on backend failure draw a straight line
/// between the endpoints instead. A missing route is returned as-is.
pub async fn resolve_route(
    planner: &dyn RoutePlanner,
    start: GeoPoint,
    end: GeoPoint,
) -> Result<RouteResolution, RoutingError> {
    match planner.route(start, end).await {
        Ok(geometry) => Ok(RouteResolution {
            path: geometry.to_path(),
            fallback: false,
        }),
        Err(RoutingError::NoRoute) => Err(RoutingError::NoRoute),
        Err(RoutingError::Backend(reason)) => {
            warn!(backend = planner.backend(), %reason, "routing unavailable, drawing straight line");
            Ok(RouteResolution {
                path: RoutePath::straight_line(start, end),
                fallback: true,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    #[async_trait]
    impl RoutePlanner for Failing {
        async fn route(&self, _: GeoPoint, _: GeoPoint) -> Result<RouteGeometry, RoutingError> {
            Err(RoutingError::Backend("connection refused".to_string()))
        }

        fn backend(&self) -> &'static str {
            "failing"
        }
    }

    struct Unreachable;

    #[async_trait]
    impl RoutePlanner for Unreachable {
        async fn route(&self, _: GeoPoint, _: GeoPoint) -> Result<RouteGeometry, RoutingError> {
            Err(RoutingError::NoRoute)
        }

        fn backend(&self) -> &'static str {
            "unreachable"
        }
    }

    #[tokio::test]
    async fn backend_failure_falls_back_to_straight_line() {
        let start = GeoPoint::new(9.6725, 123.8563);
        let end = GeoPoint::new(9.6150, 123.8650);

        let resolution = resolve_route(&Failing, start, end).await.expect("fallback");

        assert!(resolution.fallback);
        assert_eq!(resolution.path, RoutePath::straight_line(start, end));
        assert!(resolution.path.length_km() > 6.0);
    }

    #[tokio::test]
    async fn missing_route_is_not_papered_over() {
        let start = GeoPoint::new(9.6725, 123.8563);
        let end = GeoPoint::new(9.6150, 123.8650);

        let error = resolve_route(&Unreachable, start, end)
            .await
            .expect_err("no route");

        assert!(matches!(error, RoutingError::NoRoute));
    }
}
