use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::config::RoutingSettings;
use crate::model::{Bus, Catalogue, DirectedWeightedGraph, Edge};
use crate::routing::itinerary::{Item, ItemKind};
use crate::{EdgeId, Error, StopId, VertexId};

/// The two graph vertices owned by a stop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StopVertices {
    pub stop_name: String,
    /// Arrived at the stop, waiting for a bus
    pub wait: VertexId,
    /// Boarded a bus at the stop
    pub depart: VertexId,
}

/// Routing graph together with the lookups needed to answer queries
#[derive(Debug, Clone)]
pub struct TransitGraph {
    pub graph: DirectedWeightedGraph,
    /// Vertices of every stop, indexed by stop id
    pub stop_vertices: Vec<StopVertices>,
    /// Itinerary item of every edge, indexed by edge id
    pub items: Vec<Item>,
}

/// Creates the routing graph for a catalogue
///
/// # Errors
///
/// Returns an error if the routing settings are invalid
pub fn build_transit_graph(
    catalogue: &Catalogue,
    settings: &RoutingSettings,
) -> Result<TransitGraph, Error> {
    settings.validate()?;

    info!(
        "Building routing graph for {} stops and {} buses",
        catalogue.stop_count(),
        catalogue.bus_count()
    );

    let mut builder = GraphBuilder::new(catalogue, *settings);
    for bus in catalogue.buses() {
        builder.add_bus_legs(bus);
    }
    let transit_graph = builder.finish();

    info!(
        "Routing graph has {} vertices and {} edges",
        transit_graph.graph.vertex_count(),
        transit_graph.graph.edge_count()
    );
    Ok(transit_graph)
}

/// Incrementally translates catalogue stops and buses into graph edges.
///
/// Every stop gets a wait vertex and a depart vertex joined by a wait edge.
/// Every bus gets one edge per (boarding stop, alighting stop) pair, so a
/// bus leg of any length is a single edge in the shortest path.
pub struct GraphBuilder<'a> {
    catalogue: &'a Catalogue,
    settings: RoutingSettings,
    graph: DirectedWeightedGraph,
    stop_vertices: Vec<StopVertices>,
    items: Vec<Item>,
}

impl<'a> GraphBuilder<'a> {
    /// Creates a builder with the vertices and wait edges of every stop
    /// already in place
    pub fn new(catalogue: &'a Catalogue, settings: RoutingSettings) -> Self {
        let mut builder = Self {
            catalogue,
            settings,
            graph: DirectedWeightedGraph::new(catalogue.stop_count() * 2),
            stop_vertices: Vec::with_capacity(catalogue.stop_count()),
            items: Vec::new(),
        };
        builder.assign_stop_vertices();
        builder
    }

    fn assign_stop_vertices(&mut self) {
        let wait_time = self.settings.wait_time();

        for (stop_id, stop) in self.catalogue.stops().iter().enumerate() {
            let wait = stop_id * 2;
            let depart = wait + 1;

            self.add_edge(
                Edge {
                    from: wait,
                    to: depart,
                    weight: wait_time,
                },
                Item {
                    kind: ItemKind::Wait,
                    name: stop.name.clone(),
                    time: wait_time,
                    span_count: 1,
                },
            );
            self.stop_vertices.push(StopVertices {
                stop_name: stop.name.clone(),
                wait,
                depart,
            });
        }

        debug!("Assigned vertices to {} stops", self.stop_vertices.len());
    }

    /// Adds an edge for every stop pair a bus connects without a change.
    ///
    /// Non round trips also get edges for the way back, weighted with the
    /// distances measured in that direction.
    pub fn add_bus_legs(&mut self, bus: &Bus) {
        let stops = &bus.stops;
        let edges_before = self.graph.edge_count();

        for start in 0..stops.len().saturating_sub(1) {
            let mut forward_distance = 0.0;
            let mut backward_distance = 0.0;

            for end in start + 1..stops.len() {
                let span_count = end - start;

                forward_distance += self.catalogue.distance(stops[end - 1], stops[end]);
                self.add_bus_edge(bus, stops[start], stops[end], span_count, forward_distance);

                if !bus.is_roundtrip {
                    backward_distance += self.catalogue.distance(stops[end], stops[end - 1]);
                    self.add_bus_edge(bus, stops[end], stops[start], span_count, backward_distance);
                }
            }
        }

        debug!(
            "Bus '{}' added {} edges",
            bus.name,
            self.graph.edge_count() - edges_before
        );
    }

    fn add_bus_edge(
        &mut self,
        bus: &Bus,
        from: StopId,
        to: StopId,
        span_count: usize,
        distance: f64,
    ) {
        let time = distance / self.settings.metres_per_minute();

        self.add_edge(
            Edge {
                from: self.stop_vertices[from].depart,
                to: self.stop_vertices[to].wait,
                weight: time,
            },
            Item {
                kind: ItemKind::Bus,
                name: bus.name.clone(),
                time,
                span_count,
            },
        );
    }

    fn add_edge(&mut self, edge: Edge, item: Item) -> EdgeId {
        let id = self.graph.add_edge(edge);
        debug_assert_eq!(id, self.items.len());
        self.items.push(item);
        id
    }

    pub fn finish(self) -> TransitGraph {
        TransitGraph {
            graph: self.graph,
            stop_vertices: self.stop_vertices,
            items: self.items,
        }
    }
}
