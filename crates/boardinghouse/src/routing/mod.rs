//! Shortest-path routing between map points, backed by pgRouting or an
//! in-process road graph.

pub mod domain;
pub mod network;
pub mod planner;
pub mod postgres;
pub mod router;

pub use domain::{GeoPoint, RouteFeature, RouteGeometry, RoutePath};
pub use network::{NetworkError, RoadNetwork, Vertex, Way};
pub use planner::{resolve_route, RoutePlanner, RouteResolution, RoutingError};
pub use postgres::PgRoutingPlanner;
pub use router::routing_router;
