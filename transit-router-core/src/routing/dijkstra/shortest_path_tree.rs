use std::collections::BinaryHeap;

use fixedbitset::FixedBitSet;

use super::state::State;
use crate::VertexId;
use crate::model::DirectedWeightedGraph;
use crate::routing::router::RouteInternalData;

/// Dijkstra's algorithm from a single source over non-negative weights.
///
/// Returns one entry per vertex: `None` if it can't be reached, otherwise
/// the path weight and the last edge of the shortest path. The source
/// itself has weight 0 and no previous edge.
pub(crate) fn shortest_path_tree(
    graph: &DirectedWeightedGraph,
    source: VertexId,
) -> Vec<Option<RouteInternalData>> {
    let vertex_count = graph.vertex_count();
    let mut routes: Vec<Option<RouteInternalData>> = vec![None; vertex_count];
    let mut settled = FixedBitSet::with_capacity(vertex_count);
    let mut heap = BinaryHeap::new();

    // Source vertex has weight 0
    routes[source] = Some(RouteInternalData {
        weight: 0.0,
        prev_edge: None,
    });
    heap.push(State {
        cost: 0.0,
        vertex: source,
    });

    while let Some(State { cost, vertex }) = heap.pop() {
        // Stale heap entry, vertex already has its final weight
        if settled.put(vertex) {
            continue;
        }

        for edge_id in graph.incident_edges(vertex) {
            let edge = graph.edge(edge_id);
            if settled.contains(edge.to) {
                continue;
            }

            let next_cost = cost + edge.weight;
            let improves = routes[edge.to].is_none_or(|route| next_cost < route.weight);
            if improves {
                routes[edge.to] = Some(RouteInternalData {
                    weight: next_cost,
                    prev_edge: Some(edge_id),
                });
                heap.push(State {
                    cost: next_cost,
                    vertex: edge.to,
                });
            }
        }
    }

    routes
}
