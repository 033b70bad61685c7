use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::debug;

use super::domain::{GeoPoint, RouteGeometry};
use super::planner::{RoutePlanner, RoutingError};

// Endpoints snap to the nearest vertex of `ways_vertices_pgr`; the edges of the
// Dijkstra path over `ways` are merged into one GeoJSON geometry. Parameters
// are lng/lat pairs.
const ROUTE_QUERY: &str = r#"
WITH
  start_pt AS (SELECT ST_SetSRID(ST_Point($1::float8, $2::float8), 4326) AS geom),
  end_pt AS (SELECT ST_SetSRID(ST_Point($3::float8, $4::float8), 4326) AS geom),
  start_vid AS (
    SELECT id AS vid FROM ways_vertices_pgr
    ORDER BY the_geom <-> (SELECT geom FROM start_pt) LIMIT 1
  ),
  end_vid AS (
    SELECT id AS vid FROM ways_vertices_pgr
    ORDER BY the_geom <-> (SELECT geom FROM end_pt) LIMIT 1
  ),
  d AS (
    SELECT * FROM pgr_dijkstra(
      'SELECT id, source, target, cost, reverse_cost FROM ways',
      (SELECT vid FROM start_vid),
      (SELECT vid FROM end_vid),
      directed := $5
    )
  )
SELECT ST_AsGeoJSON(ST_LineMerge(ST_UnaryUnion(ST_Collect(w.geom)))) AS geojson
FROM d
JOIN ways w ON d.edge = w.id
WHERE d.edge <> -1
"#;

/// pgRouting backend over a PostGIS road network.
#[derive(Debug, Clone)]
pub struct PgRoutingPlanner {
    pool: PgPool,
    directed: bool,
}

impl PgRoutingPlanner {
    pub fn new(pool: PgPool, directed: bool) -> Self {
        Self { pool, directed }
    }

    /// Build a pool without touching the database; connections open on the
    /// first route request.
    pub fn connect_lazy(
        database_url: &str,
        max_connections: u32,
        directed: bool,
    ) -> Result<Self, RoutingError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_lazy(database_url)
            .map_err(|e| RoutingError::Backend(format!("postgres pool setup failed: {e}")))?;
        Ok(Self::new(pool, directed))
    }
}

#[async_trait]
impl RoutePlanner for PgRoutingPlanner {
    async fn route(&self, start: GeoPoint, end: GeoPoint) -> Result<RouteGeometry, RoutingError> {
        let row = sqlx::query(ROUTE_QUERY)
            .bind(start.lng)
            .bind(start.lat)
            .bind(end.lng)
            .bind(end.lat)
            .bind(self.directed)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| RoutingError::Backend(format!("pgrouting query failed: {e}")))?;

        let geojson: Option<String> = match row {
            Some(row) => row
                .try_get("geojson")
                .map_err(|e| RoutingError::Backend(format!("pgrouting row decode failed: {e}")))?,
            None => None,
        };
        let geojson = geojson.ok_or(RoutingError::NoRoute)?;
        debug!(bytes = geojson.len(), "pgrouting geometry received");

        serde_json::from_str(&geojson)
            .map_err(|e| RoutingError::Backend(format!("unexpected route geometry: {e}")))
    }

    fn backend(&self) -> &'static str {
        "pgrouting"
    }
}
