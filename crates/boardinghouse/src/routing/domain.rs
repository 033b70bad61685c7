use serde::{Deserialize, Serialize};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// Great-circle distance (haversine).
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lng = (other.lng - self.lng).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos()
                * other.lat.to_radians().cos()
                * (d_lng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
    }

    fn to_position(self) -> [f64; 2] {
        [self.lng, self.lat]
    }

    fn from_position(position: [f64; 2]) -> Self {
        Self::new(position[1], position[0])
    }
}

/// Ordered sequence of points along a route.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutePath {
    pub points: Vec<GeoPoint>,
}

impl RoutePath {
    pub fn new(points: Vec<GeoPoint>) -> Self {
        Self { points }
    }

    pub fn straight_line(start: GeoPoint, end: GeoPoint) -> Self {
        Self::new(vec![start, end])
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn length_km(&self) -> f64 {
        self.points
            .windows(2)
            .map(|pair| pair[0].distance_km(&pair[1]))
            .sum()
    }
}

/// GeoJSON geometry returned by the routing backend; positions are
/// `[lng, lat]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum RouteGeometry {
    LineString(Vec<[f64; 2]>),
    MultiLineString(Vec<Vec<[f64; 2]>>),
}

impl RouteGeometry {
    pub fn line(path: &RoutePath) -> Self {
        RouteGeometry::LineString(path.points.iter().map(|point| point.to_position()).collect())
    }

    /// Flatten into a single path, joining multi-line parts end to end and
    /// dropping repeated joints.
    pub fn to_path(&self) -> RoutePath {
        let positions: Vec<[f64; 2]> = match self {
            RouteGeometry::LineString(line) => line.clone(),
            RouteGeometry::MultiLineString(lines) => lines.iter().flatten().copied().collect(),
        };
        let mut points: Vec<GeoPoint> = Vec::with_capacity(positions.len());
        for point in positions.into_iter().map(GeoPoint::from_position) {
            if points.last() != Some(&point) {
                points.push(point);
            }
        }
        RoutePath::new(points)
    }
}

/// GeoJSON feature wrapping a route geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteFeature {
    #[serde(rename = "type")]
    pub kind: FeatureKind,
    pub geometry: RouteGeometry,
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FeatureKind {
    #[default]
    Feature,
}

impl RouteFeature {
    pub fn new(geometry: RouteGeometry) -> Self {
        Self {
            kind: FeatureKind::Feature,
            geometry,
            properties: serde_json::Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haversine_distance_between_listings() {
        let sunrise = GeoPoint::new(9.6725, 123.8563);
        let dauis_home = GeoPoint::new(9.6150, 123.8650);

        let distance = sunrise.distance_km(&dauis_home);

        assert!((distance - 6.47).abs() < 0.05, "distance was {distance}");
        assert_eq!(sunrise.distance_km(&sunrise), 0.0);
    }

    #[test]
    fn feature_serializes_as_geojson() {
        let path = RoutePath::new(vec![GeoPoint::new(9.67, 123.85), GeoPoint::new(9.66, 123.86)]);
        let feature = RouteFeature::new(RouteGeometry::line(&path));

        let value = serde_json::to_value(&feature).expect("serialize");

        assert_eq!(value["type"], "Feature");
        assert_eq!(value["geometry"]["type"], "LineString");
        assert_eq!(value["geometry"]["coordinates"][0][0], 123.85);
        assert_eq!(value["properties"], serde_json::json!({}));
    }

    #[test]
    fn multi_line_geometry_flattens_shared_joints() {
        let geometry: RouteGeometry = serde_json::from_value(serde_json::json!({
            "type": "MultiLineString",
            "coordinates": [[[123.85, 9.67], [123.86, 9.66]], [[123.86, 9.66], [123.87, 9.65]]]
        }))
        .expect("geometry");

        let path = geometry.to_path();

        assert_eq!(path.points.len(), 3);
        assert_eq!(path.points[2], GeoPoint::new(9.65, 123.87));
    }
}
