use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use async_trait::async_trait;
use petgraph::algo::astar;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::Deserialize;

use super::domain::{GeoPoint, RouteGeometry, RoutePath};
use super::planner::{RoutePlanner, RoutingError};

pub type VertexId = i64;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Vertex {
    pub id: VertexId,
    pub lat: f64,
    pub lng: f64,
}

impl Vertex {
    fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }
}

/// Road segment. A negative cost closes that direction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Way {
    pub id: i64,
    pub source: VertexId,
    pub target: VertexId,
    pub cost: f64,
    #[serde(default = "closed")]
    pub reverse_cost: f64,
    /// `[lng, lat]` positions from source to target; defaults to the
    /// straight segment between the two vertices.
    #[serde(default)]
    pub geometry: Vec<[f64; 2]>,
}

fn closed() -> f64 {
    -1.0
}

#[derive(Debug, Default, Deserialize)]
struct NetworkFile {
    #[serde(default)]
    vertices: Vec<Vertex>,
    #[serde(default)]
    ways: Vec<Way>,
}

#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error("unable to read road network: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed road network: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("way {way} references unknown vertex {vertex}")]
    UnknownVertex { way: i64, vertex: VertexId },
}

/// Traversal of one way in one direction.
#[derive(Debug, Clone, Copy)]
struct Edge {
    way: usize,
    cost: f64,
    forward: bool,
}

/// In-process road graph answering the same queries as the pgRouting
/// backend: snap both endpoints to the nearest vertex, then the cheapest
/// path. Node weights are positions in `vertices`.
#[derive(Debug, Clone)]
pub struct RoadNetwork {
    vertices: Vec<Vertex>,
    ways: Vec<Way>,
    graph: DiGraph<usize, Edge>,
    directed: bool,
}

/// Weights per direction. Undirected graphs open both directions at the
/// cheaper non-negative cost.
fn direction_costs(way: &Way, directed: bool) -> (f64, f64) {
    if directed {
        return (way.cost, way.reverse_cost);
    }
    let cost = match (way.cost >= 0.0, way.reverse_cost >= 0.0) {
        (true, true) => way.cost.min(way.reverse_cost),
        (true, false) => way.cost,
        (false, true) => way.reverse_cost,
        (false, false) => -1.0,
    };
    (cost, cost)
}

impl RoadNetwork {
    pub fn new(vertices: Vec<Vertex>, ways: Vec<Way>, directed: bool) -> Result<Self, NetworkError> {
        let index: HashMap<VertexId, usize> = vertices
            .iter()
            .enumerate()
            .map(|(position, vertex)| (vertex.id, position))
            .collect();
        let mut graph = DiGraph::with_capacity(vertices.len(), ways.len() * 2);
        for position in 0..vertices.len() {
            graph.add_node(position);
        }

        for (position, way) in ways.iter().enumerate() {
            let lookup = |vertex: VertexId| {
                index
                    .get(&vertex)
                    .map(|node| NodeIndex::new(*node))
                    .ok_or(NetworkError::UnknownVertex { way: way.id, vertex })
            };
            let source = lookup(way.source)?;
            let target = lookup(way.target)?;

            let (forward, backward) = direction_costs(way, directed);
            if forward >= 0.0 {
                graph.add_edge(
                    source,
                    target,
                    Edge {
                        way: position,
                        cost: forward,
                        forward: true,
                    },
                );
            }
            if backward >= 0.0 {
                graph.add_edge(
                    target,
                    source,
                    Edge {
                        way: position,
                        cost: backward,
                        forward: false,
                    },
                );
            }
        }

        Ok(Self {
            vertices,
            ways,
            graph,
            directed,
        })
    }

    pub fn empty(directed: bool) -> Self {
        Self {
            vertices: Vec::new(),
            ways: Vec::new(),
            graph: DiGraph::new(),
            directed,
        }
    }

    pub fn from_reader<R: Read>(reader: R, directed: bool) -> Result<Self, NetworkError> {
        let file: NetworkFile = serde_json::from_reader(reader)?;
        Self::new(file.vertices, file.ways, directed)
    }

    pub fn from_path(path: &Path, directed: bool) -> Result<Self, NetworkError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), directed)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn way_count(&self) -> usize {
        self.ways.len()
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    fn nearest_vertex(&self, point: GeoPoint) -> Option<NodeIndex> {
        self.vertices
            .iter()
            .enumerate()
            .min_by(|(_, left), (_, right)| {
                point
                    .distance_km(&left.point())
                    .total_cmp(&point.distance_km(&right.point()))
            })
            .map(|(position, _)| NodeIndex::new(position))
    }

    /// Edges along the cheapest path, in travel order.
    fn shortest_path(&self, from: NodeIndex, to: NodeIndex) -> Option<Vec<Edge>> {
        let (_, nodes) = astar(
            &self.graph,
            from,
            |node| node == to,
            |edge| edge.weight().cost,
            |_| 0.0,
        )?;

        let edges: Vec<Edge> = nodes
            .windows(2)
            .filter_map(|hop| {
                self.graph
                    .edges_connecting(hop[0], hop[1])
                    .map(|edge| *edge.weight())
                    .min_by(|left, right| left.cost.total_cmp(&right.cost))
            })
            .collect();
        (!edges.is_empty()).then_some(edges)
    }

    fn way_points(&self, edge: &Edge) -> Vec<GeoPoint> {
        let way = &self.ways[edge.way];
        let mut points: Vec<GeoPoint> = if way.geometry.is_empty() {
            let (source, target) = if edge.forward {
                (way.source, way.target)
            } else {
                (way.target, way.source)
            };
            [source, target]
                .iter()
                .filter_map(|id| self.vertices.iter().find(|vertex| vertex.id == *id))
                .map(Vertex::point)
                .collect()
        } else {
            way.geometry
                .iter()
                .map(|position| GeoPoint::new(position[1], position[0]))
                .collect()
        };
        if !way.geometry.is_empty() && !edge.forward {
            points.reverse();
        }
        points
    }

    pub fn plan(&self, start: GeoPoint, end: GeoPoint) -> Result<RouteGeometry, RoutingError> {
        let from = self.nearest_vertex(start).ok_or(RoutingError::NoRoute)?;
        let to = self.nearest_vertex(end).ok_or(RoutingError::NoRoute)?;
        let edges = self.shortest_path(from, to).ok_or(RoutingError::NoRoute)?;

        let points: Vec<GeoPoint> = edges.iter().flat_map(|edge| self.way_points(edge)).collect();
        let merged = RouteGeometry::line(&RoutePath::new(points)).to_path();
        Ok(RouteGeometry::line(&merged))
    }
}

#[async_trait]
impl RoutePlanner for RoadNetwork {
    async fn route(&self, start: GeoPoint, end: GeoPoint) -> Result<RouteGeometry, RoutingError> {
        self.plan(start, end)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vertex(id: VertexId, lat: f64, lng: f64) -> Vertex {
        Vertex { id, lat, lng }
    }

    fn way(id: i64, source: VertexId, target: VertexId, cost: f64, reverse_cost: f64) -> Way {
        Way {
            id,
            source,
            target,
            cost,
            reverse_cost,
            geometry: Vec::new(),
        }
    }

    // 1 -- 2 -- 3 with a costly shortcut 1 -- 3; way 2 is one-way 2 -> 3.
    fn square(directed: bool) -> RoadNetwork {
        RoadNetwork::new(
            vec![
                vertex(1, 9.6700, 123.8500),
                vertex(2, 9.6700, 123.8600),
                vertex(3, 9.6600, 123.8600),
            ],
            vec![
                way(10, 1, 2, 1.0, 1.0),
                way(11, 2, 3, 1.0, -1.0),
                way(12, 1, 3, 5.0, 5.0),
            ],
            directed,
        )
        .expect("network")
    }

    #[test]
    fn picks_cheapest_path_between_snapped_vertices() {
        let network = square(true);

        let path = network
            .plan(GeoPoint::new(9.6701, 123.8501), GeoPoint::new(9.6599, 123.8601))
            .expect("route")
            .to_path();

        assert_eq!(
            path.points,
            vec![
                GeoPoint::new(9.6700, 123.8500),
                GeoPoint::new(9.6700, 123.8600),
                GeoPoint::new(9.6600, 123.8600),
            ]
        );
    }

    #[test]
    fn directed_network_respects_closed_direction() {
        let directed = square(true);
        let path = directed
            .plan(GeoPoint::new(9.6600, 123.8600), GeoPoint::new(9.6700, 123.8500))
            .expect("route")
            .to_path();
        assert_eq!(path.points.len(), 2, "only the shortcut is open 3 -> 1");

        let undirected = square(false);
        let path = undirected
            .plan(GeoPoint::new(9.6600, 123.8600), GeoPoint::new(9.6700, 123.8500))
            .expect("route")
            .to_path();
        assert_eq!(path.points.len(), 3);
    }

    #[test]
    fn undirected_way_uses_cheaper_direction() {
        // Way 20 is cheap only against its digitised direction.
        let network = RoadNetwork::new(
            vec![
                vertex(1, 9.6700, 123.8500),
                vertex(2, 9.6700, 123.8600),
                vertex(3, 9.6600, 123.8550),
            ],
            vec![
                way(20, 1, 2, 10.0, 1.0),
                way(21, 1, 3, 3.0, 3.0),
                way(22, 3, 2, 3.0, 3.0),
            ],
            false,
        )
        .expect("network");

        let path = network
            .plan(GeoPoint::new(9.6700, 123.8500), GeoPoint::new(9.6700, 123.8600))
            .expect("route")
            .to_path();

        assert_eq!(
            path.points,
            vec![GeoPoint::new(9.6700, 123.8500), GeoPoint::new(9.6700, 123.8600)]
        );
    }

    #[test]
    fn empty_network_has_no_route() {
        let error = RoadNetwork::empty(false)
            .plan(GeoPoint::new(9.6725, 123.8563), GeoPoint::new(9.6150, 123.8650))
            .expect_err("empty graph");
        assert!(matches!(error, RoutingError::NoRoute));
    }

    #[test]
    fn same_snapped_vertex_has_no_route() {
        let error = square(false)
            .plan(GeoPoint::new(9.6700, 123.8500), GeoPoint::new(9.6702, 123.8502))
            .expect_err("zero-length route");
        assert!(matches!(error, RoutingError::NoRoute));
    }

    #[test]
    fn rejects_way_with_unknown_vertex() {
        let json = r#"{"vertices":[{"id":1,"lat":9.67,"lng":123.85}],"ways":[{"id":4,"source":1,"target":9,"cost":1.0}]}"#;

        let error = RoadNetwork::from_reader(json.as_bytes(), false).expect_err("bad way");

        assert!(matches!(error, NetworkError::UnknownVertex { way: 4, vertex: 9 }));
    }
}
