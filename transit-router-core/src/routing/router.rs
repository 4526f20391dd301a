//! All-pairs shortest paths over a [`DirectedWeightedGraph`]

use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::dijkstra::shortest_path_tree;
use crate::model::DirectedWeightedGraph;
use crate::{EdgeId, Error, Minutes, VertexId};

/// Precomputed shortest path between one ordered pair of vertices
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteInternalData {
    pub weight: Minutes,
    /// Last edge of the path, absent only for the empty path of a vertex to itself
    pub prev_edge: Option<EdgeId>,
}

/// Shortest path as an edge sequence
#[derive(Debug, Clone, PartialEq)]
pub struct RouteInfo {
    pub weight: Minutes,
    pub edges: Vec<EdgeId>,
}

/// Shortest path router.
///
/// Runs Dijkstra from every vertex once at construction and keeps a dense
/// |V|×|V| table, so a query only walks the stored back pointers.
#[derive(Debug, Clone)]
pub struct Router {
    graph: DirectedWeightedGraph,
    /// Row-major table, entry `from * |V| + to`
    routes: Vec<Option<RouteInternalData>>,
}

impl Router {
    /// Precomputes shortest paths between all pairs of vertices
    pub fn new(graph: DirectedWeightedGraph) -> Self {
        let vertex_count = graph.vertex_count();
        info!("Precomputing shortest paths between {vertex_count} vertices");

        // Rows are independent, collect keeps them in source order
        let rows: Vec<Vec<Option<RouteInternalData>>> = (0..vertex_count)
            .into_par_iter()
            .map(|source| shortest_path_tree(&graph, source))
            .collect();
        let routes: Vec<_> = rows.into_iter().flatten().collect();

        info!(
            "Precomputed {} reachable vertex pairs",
            routes.iter().filter(|route| route.is_some()).count()
        );
        Self { graph, routes }
    }

    /// Restores a router from a graph and a previously computed table
    /// without running the precomputation again
    ///
    /// # Errors
    ///
    /// Returns an error if the table doesn't describe shortest path trees
    /// of the given graph
    pub fn from_parts(
        graph: DirectedWeightedGraph,
        routes: Vec<Option<RouteInternalData>>,
    ) -> Result<Self, Error> {
        let vertex_count = graph.vertex_count();
        if routes.len() != vertex_count * vertex_count {
            return Err(Error::CorruptState(format!(
                "Expected {} route entries for {vertex_count} vertices, got {}",
                vertex_count * vertex_count,
                routes.len()
            )));
        }

        if vertex_count > 0 {
            for (source, row) in routes.chunks(vertex_count).enumerate() {
                validate_row(&graph, source, row)?;
            }
        }

        Ok(Self { graph, routes })
    }

    pub fn graph(&self) -> &DirectedWeightedGraph {
        &self.graph
    }

    /// Flattened route table, row-major by source vertex
    pub fn routes(&self) -> &[Option<RouteInternalData>] {
        &self.routes
    }

    pub fn into_parts(self) -> (DirectedWeightedGraph, Vec<Option<RouteInternalData>>) {
        (self.graph, self.routes)
    }

    /// Precomputed entry for a vertex pair, `None` if `to` is unreachable
    pub fn route_data(&self, from: VertexId, to: VertexId) -> Option<&RouteInternalData> {
        let vertex_count = self.graph.vertex_count();
        if from >= vertex_count || to >= vertex_count {
            return None;
        }
        self.routes[from * vertex_count + to].as_ref()
    }

    /// Shortest path from `from` to `to`, `None` if there is none
    ///
    /// # Panics
    ///
    /// If the back pointers of the table don't lead from `to` back to `from`
    pub fn build_route(&self, from: VertexId, to: VertexId) -> Option<RouteInfo> {
        let weight = self.route_data(from, to)?.weight;
        let vertex_count = self.graph.vertex_count();

        let mut edges = Vec::new();
        let mut current = to;
        while current != from {
            assert!(
                edges.len() < vertex_count,
                "route {from} -> {to} doesn't lead back to its source"
            );
            let edge_id = self
                .route_data(from, current)
                .and_then(|route| route.prev_edge)
                .unwrap_or_else(|| panic!("route {from} -> {to} is broken at vertex {current}"));

            let edge = self.graph.edge(edge_id);
            assert_eq!(edge.to, current, "edge {edge_id} doesn't end at vertex {current}");
            edges.push(edge_id);
            current = edge.from;
        }
        edges.reverse();

        Some(RouteInfo { weight, edges })
    }
}

/// Path weights equal up to the rounding of summing edge weights
pub(crate) fn same_weight(lhs: Minutes, rhs: Minutes) -> bool {
    (lhs - rhs).abs() <= 1e-9 * lhs.abs().max(rhs.abs()).max(1.0)
}

/// Checks that one row of the table forms a shortest path tree rooted at `source`
fn validate_row(
    graph: &DirectedWeightedGraph,
    source: VertexId,
    row: &[Option<RouteInternalData>],
) -> Result<(), Error> {
    let corrupt = |message: String| Error::CorruptState(format!("Route from {source}: {message}"));

    match row[source] {
        Some(RouteInternalData {
            weight,
            prev_edge: None,
        }) if weight == 0.0 => {}
        _ => return Err(corrupt("source entry must be an empty path".into())),
    }

    for (target, route) in row.iter().enumerate() {
        let Some(route) = route else { continue };
        if !route.weight.is_finite() || route.weight < 0.0 {
            return Err(corrupt(format!("invalid weight {} to {target}", route.weight)));
        }
        if target == source {
            continue;
        }

        let edge_id = route
            .prev_edge
            .ok_or_else(|| corrupt(format!("no previous edge to {target}")))?;
        if edge_id >= graph.edge_count() {
            return Err(corrupt(format!("unknown edge {edge_id} to {target}")));
        }
        let edge = graph.edge(edge_id);
        let Some(previous) = row[edge.from].filter(|_| edge.to == target) else {
            return Err(corrupt(format!("edge {edge_id} doesn't lead to {target}")));
        };
        if !same_weight(route.weight, previous.weight + edge.weight) {
            return Err(corrupt(format!(
                "weight {} to {target} doesn't match its last edge {edge_id}",
                route.weight
            )));
        }
    }

    // No edge may shorten or extend a stored path
    for (edge_id, edge) in graph.edges().iter().enumerate() {
        let Some(previous) = row[edge.from] else { continue };
        let through_edge = previous.weight + edge.weight;
        let shortest = row[edge.to].is_some_and(|route| {
            route.weight <= through_edge || same_weight(route.weight, through_edge)
        });
        if !shortest {
            return Err(corrupt(format!(
                "edge {edge_id} gives a shorter path to {}",
                edge.to
            )));
        }
    }

    // Every back pointer chain has to reach the source
    const UNSEEN: u8 = 0;
    const ON_CHAIN: u8 = 1;
    const ROOTED: u8 = 2;
    let mut marks = vec![UNSEEN; row.len()];
    marks[source] = ROOTED;

    let mut chain = Vec::new();
    for target in 0..row.len() {
        let mut current = target;
        while row[current].is_some() && marks[current] == UNSEEN {
            marks[current] = ON_CHAIN;
            chain.push(current);
            // validated above: every non-source entry has a previous edge
            let edge_id = row[current].and_then(|route| route.prev_edge).unwrap_or_default();
            current = graph.edge(edge_id).from;
        }
        if marks[current] == ON_CHAIN {
            return Err(corrupt(format!("back pointers loop through vertex {current}")));
        }
        for vertex in chain.drain(..) {
            marks[vertex] = ROOTED;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Edge;

    fn graph(vertex_count: usize, edges: &[(VertexId, VertexId, f64)]) -> DirectedWeightedGraph {
        let mut graph = DirectedWeightedGraph::new(vertex_count);
        for &(from, to, weight) in edges {
            graph.add_edge(Edge { from, to, weight });
        }
        graph
    }

    fn sample_router() -> Router {
        Router::new(graph(
            5,
            &[
                (0, 1, 1.0),
                (1, 2, 1.0),
                (0, 2, 5.0),
                (2, 3, 0.5),
                (3, 0, 2.0),
            ],
        ))
    }

    #[test]
    fn empty_route_to_itself() {
        let router = sample_router();
        for vertex in 0..5 {
            let route = router.build_route(vertex, vertex).unwrap();
            assert_eq!(route.weight, 0.0);
            assert!(route.edges.is_empty());
        }
    }

    #[test]
    fn reconstructs_edges_in_travel_order() {
        let router = sample_router();

        let route = router.build_route(0, 3).unwrap();
        assert_eq!(route.edges, vec![0, 1, 3]);
        assert_eq!(route.weight, 2.5);

        let route = router.build_route(2, 1).unwrap();
        assert_eq!(route.edges, vec![3, 4, 0]);
        assert_eq!(route.weight, 3.5);
    }

    #[test]
    fn edge_weights_add_up_to_route_weight() {
        let router = sample_router();
        for from in 0..5 {
            for to in 0..5 {
                if let Some(route) = router.build_route(from, to) {
                    let total: f64 = route
                        .edges
                        .iter()
                        .map(|&edge| router.graph().edge(edge).weight)
                        .sum();
                    assert!((total - route.weight).abs() < 1e-12);
                }
            }
        }
    }

    #[test]
    fn unreachable_and_unknown_vertices_have_no_route() {
        let router = sample_router();
        assert!(router.build_route(0, 4).is_none());
        assert!(router.build_route(4, 0).is_none());
        assert!(router.build_route(0, 99).is_none());
    }

    #[test]
    fn from_parts_answers_like_the_original() {
        let router = sample_router();
        let (graph, routes) = router.clone().into_parts();
        let restored = Router::from_parts(graph, routes).unwrap();

        for from in 0..5 {
            for to in 0..5 {
                assert_eq!(restored.build_route(from, to), router.build_route(from, to));
            }
        }
    }

    #[test]
    fn from_parts_rejects_broken_tables() {
        let (graph, routes) = sample_router().into_parts();

        let mut truncated = routes.clone();
        truncated.pop();
        assert!(Router::from_parts(graph.clone(), truncated).is_err());

        // route 0 -> 2 claims to arrive through an edge ending elsewhere
        let mut wrong_edge = routes.clone();
        wrong_edge[2] = Some(RouteInternalData {
            weight: 2.0,
            prev_edge: Some(0),
        });
        assert!(Router::from_parts(graph.clone(), wrong_edge).is_err());

        let mut missing_source = routes.clone();
        missing_source[0] = None;
        assert!(Router::from_parts(graph.clone(), missing_source).is_err());

        let mut negative = routes;
        negative[1] = Some(RouteInternalData {
            weight: -1.0,
            prev_edge: Some(0),
        });
        assert!(Router::from_parts(graph, negative).is_err());
    }

    #[test]
    fn from_parts_rejects_tampered_weights() {
        let (graph, routes) = sample_router().into_parts();

        // 0 -> 3 costs 2.5 through 0 -> 1 -> 2 -> 3
        let mut cheaper = routes.clone();
        cheaper[3] = cheaper[3].map(|route| RouteInternalData {
            weight: 1.0,
            ..route
        });
        assert!(matches!(
            Router::from_parts(graph.clone(), cheaper),
            Err(Error::CorruptState(_))
        ));

        // 0 -> 2 through the direct edge is consistent but not the shortest
        let mut detour = routes.clone();
        detour[2] = Some(RouteInternalData {
            weight: 5.0,
            prev_edge: Some(2),
        });
        detour[3] = Some(RouteInternalData {
            weight: 5.5,
            prev_edge: Some(3),
        });
        assert!(Router::from_parts(graph.clone(), detour).is_err());

        // 0 -> 3 dropped although 2 -> 3 reaches it
        let mut unreachable = routes;
        unreachable[3] = None;
        assert!(Router::from_parts(graph, unreachable).is_err());
    }

    #[test]
    fn from_parts_rejects_back_pointer_loops() {
        // 0 <-> 1 <-> 2 with zero weights
        let graph = graph(3, &[(0, 1, 0.0), (1, 2, 0.0), (2, 1, 0.0)]);
        let (graph, mut routes) = Router::new(graph).into_parts();

        // from 0: make 1 come from 2 while 2 comes from 1
        routes[1] = Some(RouteInternalData {
            weight: 0.0,
            prev_edge: Some(2),
        });
        assert!(matches!(
            Router::from_parts(graph, routes),
            Err(Error::CorruptState(_))
        ));
    }
}
